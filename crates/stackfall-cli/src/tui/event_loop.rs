use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

/// Events handed to the play screen.
#[derive(Debug)]
pub(crate) enum LoopEvent {
    /// Game logic update, carrying the time actually elapsed since the
    /// previous tick.
    Tick(Duration),
    /// Screen redraw timing.
    Render,
    /// Terminal event such as key input or resize.
    Input(event::Event),
}

/// Poll-based tick/render/input triage.
///
/// Ticks fire on a fixed cadence but report the measured delta, so the game
/// sees real elapsed time even when the loop is delayed. A render is
/// emitted after every state change (tick or terminal event).
#[derive(Debug)]
pub(crate) struct EventLoop {
    tick_interval: Duration,
    last_tick: Instant,
    dirty: bool,
}

impl EventLoop {
    pub(crate) fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            last_tick: Instant::now(),
            // Initial render is required on startup.
            dirty: true,
        }
    }

    /// Returns the next event, blocking until a tick is due or a terminal
    /// event arrives.
    pub(crate) fn next(&mut self) -> io::Result<LoopEvent> {
        loop {
            if self.dirty {
                self.dirty = false;
                return Ok(LoopEvent::Render);
            }

            let since_tick = self.last_tick.elapsed();
            if since_tick >= self.tick_interval {
                self.last_tick = Instant::now();
                self.dirty = true;
                return Ok(LoopEvent::Tick(since_tick));
            }

            let timeout = self.tick_interval - since_tick;
            if event::poll(timeout)? {
                self.dirty = true;
                return Ok(LoopEvent::Input(event::read()?));
            }
        }
    }
}
