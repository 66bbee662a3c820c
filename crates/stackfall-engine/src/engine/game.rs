use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    core::{ActivePiece, ClearedRows, Coord, Grid, Offset, Spin, TetrominoKind},
    engine::{
        config::{ConfigError, GameConfig},
        spawner::PieceSource,
    },
};

/// Horizontal movement input, one step per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Left,
    Right,
}

impl Shift {
    #[must_use]
    pub const fn offset(self) -> Offset {
        match self {
            Shift::Left => (-1, 0),
            Shift::Right => (1, 0),
        }
    }
}

/// The input edges collected since the previous tick.
///
/// All fields are already-debounced edges or levels; the engine never sees
/// raw device state. Horizontal moves and rotations are mutually exclusive
/// within their field by construction (`Option`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFrame {
    /// One horizontal step, edge-triggered.
    pub shift: Option<Shift>,
    /// One quarter turn, edge-triggered.
    pub spin: Option<Spin>,
    /// Soft drop held: gravity runs at the divided interval this tick.
    pub soft_drop_held: bool,
    /// One immediate downward step, edge-triggered.
    pub soft_drop_step: bool,
    /// Drop to the floor and lock immediately, edge-triggered.
    pub hard_drop: bool,
}

/// A piece committed into the grid, reported so a renderer can update the
/// cells it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedPiece {
    pub kind: TetrominoKind,
    pub cells: [Coord; 4],
}

/// What one call to [`Game::tick`] did to the board.
///
/// Fields report transitions of this tick only; a tick on an ended game
/// returns the default (inert) result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickResult {
    /// The piece locked this tick, if any.
    pub locked: Option<LockedPiece>,
    /// Rows cleared by the lock, topmost first.
    pub cleared_rows: ClearedRows,
    /// Kind of the piece spawned after the lock, if any.
    pub spawned: Option<TetrominoKind>,
    /// Whether this tick ended the game.
    pub game_over: bool,
}

/// Externally visible state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Phase {
    /// A piece is live and under player control.
    Falling,
    /// Terminal: the board overflowed; input and gravity are inert.
    GameOver,
}

/// Running tallies of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pieces_locked: usize,
    total_cleared_lines: usize,
    /// Indexed by lines cleared at once (0 through 4).
    line_clear_counter: [usize; 5],
}

impl GameStats {
    #[must_use]
    pub const fn pieces_locked(&self) -> usize {
        self.pieces_locked
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// How many locks cleared exactly `lines` rows.
    #[must_use]
    pub fn locks_clearing(&self, lines: usize) -> usize {
        self.line_clear_counter.get(lines).copied().unwrap_or(0)
    }

    fn record_lock(&mut self, cleared_lines: usize) {
        self.pieces_locked += 1;
        self.total_cleared_lines += cleared_lines;
        self.line_clear_counter[cleared_lines] += 1;
    }
}

/// A round of play: the grid, the active piece and the tick state machine.
///
/// The game exclusively owns its grid and piece; collaborators interact
/// only through [`Game::tick`] and the read accessors. One tick performs,
/// in order: input (horizontal, rotation, soft-drop step, hard drop), then
/// gravity, then the lock check - so an input is never processed twice
/// within a tick.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use stackfall_engine::{BagSpawner, Game, GameConfig, InputFrame, SpawnSeed};
///
/// let spawner = BagSpawner::with_seed(SpawnSeed::new(42));
/// let mut game = Game::new(GameConfig::default(), Box::new(spawner)).unwrap();
///
/// let result = game.tick(Duration::from_millis(16), InputFrame::default());
/// assert!(result.locked.is_none());
/// ```
pub struct Game {
    config: GameConfig,
    grid: Grid,
    piece: ActivePiece,
    phase: Phase,
    source: Box<dyn PieceSource>,
    stats: GameStats,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("config", &self.config)
            .field("grid", &self.grid)
            .field("piece", &self.piece)
            .field("phase", &self.phase)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Starts a round on an empty board, spawning the first piece.
    ///
    /// Fails fast when the configuration is unusable; a validated board is
    /// always large enough for the first spawn.
    pub fn new(config: GameConfig, mut source: Box<dyn PieceSource>) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        let grid = Grid::new(config.width, config.height);
        let piece = ActivePiece::spawn(source.next_piece(), config.spawn_anchor());
        debug_assert!(piece.fits(&grid));
        Ok(Self {
            config,
            grid,
            piece,
            phase: Phase::Falling,
            source,
            stats: GameStats::default(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub const fn active_piece(&self) -> &ActivePiece {
        &self.piece
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Where the active piece would come to rest if hard-dropped now.
    #[must_use]
    pub fn drop_preview(&self) -> [Coord; 4] {
        let mut ghost = self.piece.clone();
        ghost.hard_drop(&self.grid);
        ghost.cells()
    }

    /// Advances the game by one tick.
    ///
    /// Applies the input edges in their fixed priority order, then gravity
    /// for the elapsed `delta`, then the lock check. Illegal moves and
    /// rotations are silent no-ops. After the game has ended every tick
    /// returns the inert default result.
    pub fn tick(&mut self, delta: Duration, input: InputFrame) -> TickResult {
        let mut result = TickResult::default();
        if self.phase.is_game_over() {
            return result;
        }

        if let Some(shift) = input.shift {
            self.piece.try_move(&self.grid, shift.offset());
        }
        if let Some(spin) = input.spin {
            self.piece.try_rotate(&self.grid, spin);
        }
        if input.soft_drop_step {
            self.piece.try_move(&self.grid, (0, -1));
        }
        if input.hard_drop {
            self.piece.hard_drop(&self.grid);
            self.lock_active_piece(&mut result);
            return result;
        }

        let interval = if input.soft_drop_held {
            self.config.soft_drop_interval()
        } else {
            self.config.step_interval
        };
        self.piece.advance_gravity(&self.grid, delta, interval);

        if self
            .piece
            .advance_lock(&self.grid, delta, self.config.lock_delay)
        {
            self.lock_active_piece(&mut result);
        }
        result
    }

    /// Commits the active piece, clears lines, and spawns the next piece or
    /// ends the game.
    fn lock_active_piece(&mut self, result: &mut TickResult) {
        let kind = self.piece.kind();
        let cells = self.piece.cells();
        self.grid.commit(&cells, kind);
        let cleared = self.grid.clear_full_lines();
        self.stats.record_lock(cleared.len());
        result.locked = Some(LockedPiece { kind, cells });
        result.cleared_rows = cleared;

        // Board overflow: the settled stack reaches the danger rows.
        if self.grid.any_occupied_at_or_above(self.config.danger_row) {
            self.phase = Phase::GameOver;
            result.game_over = true;
            return;
        }

        let next = ActivePiece::spawn(self.source.next_piece(), self.config.spawn_anchor());
        if !next.fits(&self.grid) {
            self.phase = Phase::GameOver;
            result.game_over = true;
            return;
        }
        result.spawned = Some(next.kind());
        self.piece = next;
    }
}
