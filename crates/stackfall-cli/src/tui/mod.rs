pub(crate) use self::event_loop::{EventLoop, LoopEvent};

mod event_loop;
