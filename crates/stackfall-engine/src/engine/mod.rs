//! Game orchestration around the core playfield types.
//!
//! - [`GameConfig`] - validated configuration (board size, timing, danger row)
//! - [`Game`] - the tick-driven state machine owning grid and active piece
//! - [`PieceSource`] / [`BagSpawner`] - the spawn collaborator seam and its
//!   default 7-bag implementation
//!
//! A session is driven by calling [`Game::tick`] once per external time
//! step with the elapsed delta and the input edges collected since the last
//! tick; everything else (rendering, input devices, wall-clock time) lives
//! outside the engine.

pub use self::{config::*, game::*, spawner::*};

pub(crate) mod config;
pub(crate) mod game;
pub(crate) mod spawner;
