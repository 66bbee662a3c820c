use std::{io, mem, time::Duration};

use crossterm::event::{Event, KeyCode, KeyEventKind};
use rand::Rng as _;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Paragraph},
};
use stackfall_engine::{
    BagSpawner, Game, GameConfig, InputFrame, Phase, Shift, SpawnSeed, Spin,
};

use crate::{tui::{EventLoop, LoopEvent}, ui::widgets::BoardDisplay};

/// Engine ticks per second; the measured delta between ticks is what the
/// game actually consumes.
const TICK_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Seed for the piece sequence (random when omitted)
    #[clap(long)]
    seed: Option<u64>,
    /// Gravity step interval in milliseconds
    #[clap(long)]
    step_millis: Option<u64>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let seed = arg.seed.map_or_else(|| rand::rng().random(), SpawnSeed::new);
    let mut config = GameConfig::default();
    if let Some(millis) = arg.step_millis {
        config.step_interval = Duration::from_millis(millis);
    }

    let game = Game::new(config, Box::new(BagSpawner::with_seed(seed)))?;
    let mut screen = PlayScreen::new(game);
    ratatui::run(|terminal| screen.run(terminal))?;
    Ok(())
}

#[derive(Debug)]
struct PlayScreen {
    game: Game,
    /// Input edges collected since the last tick.
    pending: InputFrame,
    paused: bool,
    exiting: bool,
}

impl PlayScreen {
    fn new(game: Game) -> Self {
        Self {
            game,
            pending: InputFrame::default(),
            paused: false,
            exiting: false,
        }
    }

    fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        let mut events = EventLoop::new(TICK_INTERVAL);
        while !self.exiting {
            match events.next()? {
                LoopEvent::Tick(delta) => {
                    if !self.paused {
                        let input = mem::take(&mut self.pending);
                        self.game.tick(delta, input);
                    }
                }
                LoopEvent::Render => {
                    terminal.draw(|frame| self.draw(frame))?;
                }
                LoopEvent::Input(event) => self.handle_event(&event),
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        let playing = !self.paused && self.game.phase().is_falling();
        match key.code {
            KeyCode::Left if playing => self.pending.shift = Some(Shift::Left),
            KeyCode::Right if playing => self.pending.shift = Some(Shift::Right),
            KeyCode::Char('z') if playing => self.pending.spin = Some(Spin::Ccw),
            KeyCode::Char('x') if playing => self.pending.spin = Some(Spin::Cw),
            KeyCode::Down if playing => self.pending.soft_drop_step = true,
            KeyCode::Up if playing => self.pending.hard_drop = true,
            KeyCode::Char('p') if self.game.phase().is_falling() => self.paused = !self.paused,
            KeyCode::Char('q') => self.exiting = true,
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        let piece = self.game.active_piece();
        let board = BoardDisplay::new(self.game.grid())
            .ghost(self.game.drop_preview())
            .falling(piece.kind(), piece.cells())
            .block(Block::bordered());

        let [board_area, side_area] =
            Layout::horizontal([Constraint::Length(board.width()), Constraint::Fill(1)])
                .areas::<2>(frame.area());
        frame.render_widget(&board, board_area);

        let stats = self.game.stats();
        let status = if self.game.phase() == Phase::GameOver {
            "GAME OVER"
        } else if self.paused {
            "PAUSED"
        } else {
            ""
        };
        let side = Text::from(vec![
            Line::raw(""),
            Line::from(format!(" pieces {}", stats.pieces_locked())),
            Line::from(format!(" lines  {}", stats.total_cleared_lines())),
            Line::raw(""),
            Line::styled(format!(" {status}"), Style::new().fg(Color::Red)),
            Line::raw(""),
            Line::styled(
                " <- -> move | v soft drop | ^ hard drop",
                Style::new().fg(Color::DarkGray),
            ),
            Line::styled(
                " z/x rotate | p pause | q quit",
                Style::new().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(side), side_area);
    }
}
