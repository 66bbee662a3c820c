use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::Coord;

/// Engine configuration.
///
/// Values are plain data; [`GameConfig::validated`] is the fail-fast gate a
/// [`Game`](super::Game) runs at construction, so a malformed configuration
/// can never reach play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Board width in cells.
    pub width: i32,
    /// Board height in cells.
    pub height: i32,
    /// Time between gravity steps.
    pub step_interval: Duration,
    /// Divisor applied to the step interval while soft drop is held.
    pub soft_drop_divisor: u32,
    /// Grace period on support before a piece locks.
    pub lock_delay: Duration,
    /// Row index the stack must not reach: any cell still occupied at or
    /// above this row once a lock's line clears have settled is a board
    /// overflow and ends the game.
    pub danger_row: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::with_board(10, 20)
    }
}

impl GameConfig {
    /// Rows kept clear at the top of the board by default.
    pub const DANGER_MARGIN: i32 = 6;

    /// Default timing and danger row for a board of the given size.
    #[must_use]
    pub fn with_board(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            step_interval: Duration::from_millis(800),
            soft_drop_divisor: 10,
            lock_delay: Duration::from_millis(500),
            danger_row: height - Self::DANGER_MARGIN,
        }
    }

    /// Checks every field, returning the configuration unchanged when it is
    /// usable.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::NonPositiveDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.width < 4 || self.height < 3 {
            return Err(ConfigError::BoardTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        if self.step_interval.is_zero() {
            return Err(ConfigError::ZeroStepInterval);
        }
        if self.soft_drop_divisor == 0 {
            return Err(ConfigError::ZeroSoftDropDivisor);
        }
        if self.danger_row < 1 || self.danger_row > self.height {
            return Err(ConfigError::DangerRowOutOfRange {
                row: self.danger_row,
                height: self.height,
            });
        }
        Ok(self)
    }

    /// Top-center anchor every piece spawns at.
    ///
    /// Shapes occupy the anchor row and the row above it, so spawning at
    /// `height - 2` keeps a fresh piece fully on the board.
    #[must_use]
    pub const fn spawn_anchor(&self) -> Coord {
        (self.width / 2 - 1, self.height - 2)
    }

    /// Gravity interval while soft drop is held.
    #[must_use]
    pub fn soft_drop_interval(&self) -> Duration {
        self.step_interval / self.soft_drop_divisor
    }
}

/// A configuration the engine refuses to play with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board dimensions must be positive, got {width}x{height}")]
    NonPositiveDimensions { width: i32, height: i32 },
    #[display("board too small to host a spawned piece, got {width}x{height}")]
    BoardTooSmall { width: i32, height: i32 },
    #[display("gravity step interval must be non-zero")]
    ZeroStepInterval,
    #[display("soft-drop divisor must be non-zero")]
    ZeroSoftDropDivisor,
    #[display("danger row {row} outside the board of height {height}")]
    DangerRowOutOfRange { row: i32, height: i32 },
}
