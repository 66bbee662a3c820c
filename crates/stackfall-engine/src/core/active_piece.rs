use std::time::Duration;

use super::{
    Coord, Offset,
    grid::Grid,
    tetromino::{KICK_TRANSITIONS, KickTable, Spin, TetrominoData, TetrominoKind},
};

/// The falling piece currently under player control.
///
/// An `ActivePiece` owns its anchor position, rotation index, the four cell
/// offsets derived from the current rotation, and the two timers the game
/// loop drives (gravity accumulator and lock timer). It never touches the
/// [`Grid`] beyond read-only legality queries; committing cells at lock time
/// is the game loop's job.
///
/// Movement and rotation are all-or-nothing: an illegal request leaves the
/// piece exactly as it was and reports `false`.
#[derive(Debug, Clone)]
pub struct ActivePiece {
    kind: TetrominoKind,
    wall_kicks: &'static KickTable,
    anchor: Coord,
    rotation: u8,
    /// Cell offsets relative to the anchor in the current rotation.
    cells: [Offset; 4],
    fall_elapsed: Duration,
    lock_elapsed: Duration,
}

impl ActivePiece {
    /// Creates a freshly spawned piece: rotation 0, cells taken from the
    /// shape data, both timers at zero.
    #[must_use]
    pub fn spawn(data: TetrominoData, anchor: Coord) -> Self {
        Self {
            kind: data.kind(),
            wall_kicks: data.wall_kicks(),
            anchor,
            rotation: 0,
            cells: data.spawn_cells(),
            fall_elapsed: Duration::ZERO,
            lock_elapsed: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TetrominoKind {
        self.kind
    }

    #[must_use]
    pub const fn anchor(&self) -> Coord {
        self.anchor
    }

    /// Current rotation index in `0..4`.
    #[must_use]
    pub const fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Time accumulated toward the next gravity step.
    #[must_use]
    pub const fn fall_elapsed(&self) -> Duration {
        self.fall_elapsed
    }

    /// Time the piece has rested on its support without moving.
    #[must_use]
    pub const fn lock_elapsed(&self) -> Duration {
        self.lock_elapsed
    }

    /// The four absolute cell coordinates of the piece.
    #[must_use]
    pub fn cells(&self) -> [Coord; 4] {
        let (ax, ay) = self.anchor;
        self.cells.map(|(dx, dy)| (ax + dx, ay + dy))
    }

    /// Whether every cell of the piece is in bounds and unoccupied.
    #[must_use]
    pub fn fits(&self, grid: &Grid) -> bool {
        self.cells().into_iter().all(|c| grid.is_free(c))
    }

    /// Whether the piece could move by `delta` without changing state.
    #[must_use]
    pub fn can_move(&self, grid: &Grid, (dx, dy): Offset) -> bool {
        self.cells()
            .into_iter()
            .all(|(x, y)| grid.is_free((x + dx, y + dy)))
    }

    /// Whether a downward move currently fails.
    #[must_use]
    pub fn is_grounded(&self, grid: &Grid) -> bool {
        !self.can_move(grid, (0, -1))
    }

    /// Attempts to translate the piece by `delta`.
    ///
    /// On success the new position is kept and the lock timer resets; on
    /// failure the piece is unchanged.
    pub fn try_move(&mut self, grid: &Grid, delta: Offset) -> bool {
        let legal = self.can_move(grid, delta);
        if legal {
            self.anchor = (self.anchor.0 + delta.0, self.anchor.1 + delta.1);
            self.lock_elapsed = Duration::ZERO;
        }
        legal
    }

    /// Attempts a quarter-turn rotation, trying wall kicks when blocked.
    ///
    /// The rotated cells are tried at every offset of the kick row for this
    /// transition, in table order, via [`Self::try_move`]; the first offset
    /// that lands keeps the rotation (no backtracking past a success). When
    /// every offset fails, rotation index and cells revert to their
    /// pre-attempt values.
    pub fn try_rotate(&mut self, grid: &Grid, spin: Spin) -> bool {
        let saved_cells = self.cells;
        let saved_rotation = self.rotation;

        self.cells = self.rotated_cells(spin.direction());
        self.rotation = wrap_rotation(i32::from(saved_rotation) + spin.direction());

        for &offset in &self.wall_kicks[kick_row(saved_rotation, spin)] {
            if self.try_move(grid, offset) {
                return true;
            }
        }

        self.cells = saved_cells;
        self.rotation = saved_rotation;
        false
    }

    /// Drops the piece straight down as far as it can go.
    ///
    /// Bounded by the board height; returns the number of rows descended.
    /// Locking the landed piece is the game loop's decision.
    pub fn hard_drop(&mut self, grid: &Grid) -> i32 {
        let mut rows = 0;
        while self.try_move(grid, (0, -1)) {
            rows += 1;
        }
        rows
    }

    /// Accumulates `delta` toward the gravity step and attempts one
    /// downward move when `step_interval` has elapsed.
    ///
    /// The accumulator resets whether or not the step lands. Returns
    /// whether the piece actually moved down.
    pub fn advance_gravity(&mut self, grid: &Grid, delta: Duration, step_interval: Duration) -> bool {
        self.fall_elapsed += delta;
        if self.fall_elapsed < step_interval {
            return false;
        }
        self.fall_elapsed = Duration::ZERO;
        self.try_move(grid, (0, -1))
    }

    /// Accrues the lock timer while the piece is grounded.
    ///
    /// The timer only runs while a downward move fails; any successful move
    /// or rotation resets it through [`Self::try_move`]. Returns whether
    /// the piece has rested for `lock_delay` and should now be committed.
    pub fn advance_lock(&mut self, grid: &Grid, delta: Duration, lock_delay: Duration) -> bool {
        if !self.is_grounded(grid) {
            return false;
        }
        self.lock_elapsed += delta;
        self.lock_elapsed >= lock_delay
    }

    /// Applies the 90° rotation matrix to every cell offset.
    ///
    /// `x' = -y * dir`, `y' = x * dir`. The bar and the square pivot about
    /// a center offset by 0.5 on both axes with ceiling rounding, which
    /// keeps their rotations visually in place; for all other kinds the
    /// transform is exact integer math.
    #[expect(clippy::cast_possible_truncation)]
    fn rotated_cells(&self, direction: i32) -> [Offset; 4] {
        let dir = f64::from(direction);
        self.cells.map(|(x, y)| {
            if self.kind.rotates_about_half_cell() {
                let cx = f64::from(x) - 0.5;
                let cy = f64::from(y) - 0.5;
                ((-cy * dir).ceil() as i32, (cx * dir).ceil() as i32)
            } else {
                (-y * direction, x * direction)
            }
        })
    }
}

fn wrap_rotation(raw: i32) -> u8 {
    u8::try_from(raw.rem_euclid(4)).unwrap_or(0)
}

/// Selects the kick-table row for rotating out of `from_rotation`.
///
/// Clockwise transitions use the even rows, counter-clockwise the odd row
/// just below, wrapped into the table: `from * 2 - (ccw ? 1 : 0)`.
fn kick_row(from_rotation: u8, spin: Spin) -> usize {
    let raw = i32::from(from_rotation) * 2 - i32::from(spin == Spin::Ccw);
    usize::try_from(raw.rem_euclid(i32::try_from(KICK_TRANSITIONS).unwrap())).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn open_grid() -> Grid {
        Grid::new(10, 20)
    }

    fn spawn(kind: TetrominoKind, anchor: Coord) -> ActivePiece {
        ActivePiece::spawn(kind.data(), anchor)
    }

    fn cell_set(piece: &ActivePiece) -> BTreeSet<Coord> {
        piece.cells().into_iter().collect()
    }

    #[test]
    fn test_kick_row_even_odd_mapping() {
        assert_eq!(kick_row(0, Spin::Cw), 0);
        assert_eq!(kick_row(1, Spin::Ccw), 1);
        assert_eq!(kick_row(1, Spin::Cw), 2);
        assert_eq!(kick_row(2, Spin::Ccw), 3);
        assert_eq!(kick_row(2, Spin::Cw), 4);
        assert_eq!(kick_row(3, Spin::Ccw), 5);
        assert_eq!(kick_row(3, Spin::Cw), 6);
        // From rotation 0 counter-clockwise wraps to the last row.
        assert_eq!(kick_row(0, Spin::Ccw), 7);
    }

    #[test]
    fn test_rotation_is_a_closed_cycle_of_four() {
        let grid = open_grid();
        for kind in TetrominoKind::ALL {
            for spin in [Spin::Cw, Spin::Ccw] {
                let mut piece = spawn(kind, (4, 10));
                let original = cell_set(&piece);
                for turn in 1..=4 {
                    assert!(piece.try_rotate(&grid, spin), "{kind:?} turn {turn}");
                }
                assert_eq!(piece.rotation(), 0, "{kind:?} {spin:?}");
                assert_eq!(cell_set(&piece), original, "{kind:?} {spin:?}");
            }
        }
    }

    #[test]
    fn test_square_rotation_is_visually_stationary() {
        let grid = open_grid();
        let mut piece = spawn(TetrominoKind::O, (4, 10));
        let original = cell_set(&piece);
        assert!(piece.try_rotate(&grid, Spin::Cw));
        assert_eq!(piece.rotation(), 1);
        assert_eq!(cell_set(&piece), original);
    }

    #[test]
    fn test_bar_rotates_between_horizontal_and_vertical() {
        let grid = open_grid();
        let mut piece = spawn(TetrominoKind::I, (4, 10));
        assert!(piece.try_rotate(&grid, Spin::Cw));
        let xs: BTreeSet<i32> = piece.cells().into_iter().map(|(x, _)| x).collect();
        assert_eq!(xs.len(), 1, "vertical bar occupies a single column");
    }

    #[test]
    fn test_try_move_commits_or_leaves_unchanged() {
        let grid = open_grid();
        let mut piece = spawn(TetrominoKind::T, (4, 10));

        assert!(piece.try_move(&grid, (-1, 0)));
        assert_eq!(piece.anchor(), (3, 10));

        // Walk into the left wall: the last legal column for the T anchor
        // is x = 1, and the blocked move changes nothing.
        while piece.try_move(&grid, (-1, 0)) {}
        let parked = piece.cells();
        assert_eq!(piece.anchor(), (1, 10));
        assert!(!piece.try_move(&grid, (-1, 0)));
        assert_eq!(piece.cells(), parked);
    }

    #[test]
    fn test_move_postcondition_cells_always_legal() {
        let grid = Grid::from_rows(&[
            "..........", //
            "..........", //
            "..........", //
            "....##....", //
            "..........", //
        ]);
        let mut piece = spawn(TetrominoKind::Z, (4, 3));
        for delta in [(0, -1), (-1, 0), (1, 0), (0, -1), (0, -1), (1, 0)] {
            piece.try_move(&grid, delta);
            for cell in piece.cells() {
                assert!(grid.is_free(cell), "piece landed on {cell:?}");
            }
        }
    }

    #[test]
    fn test_wall_kick_rescues_bar_at_right_wall() {
        let grid = open_grid();
        let mut piece = spawn(TetrominoKind::I, (4, 10));
        assert!(piece.try_rotate(&grid, Spin::Cw));
        while piece.try_move(&grid, (1, 0)) {}
        assert_eq!(piece.anchor(), (9, 10), "vertical bar parks at the wall");
        assert!(piece.try_move(&grid, (-1, 0)));

        // Rotating back to horizontal in place would stick out past the
        // wall; the first in-bounds kick offset shifts the piece left.
        assert!(piece.try_rotate(&grid, Spin::Cw));
        assert_eq!(piece.rotation(), 2);
        assert_eq!(piece.anchor(), (7, 10));
        for cell in piece.cells() {
            assert!(grid.is_free(cell));
        }
    }

    #[test]
    fn test_rotation_reverts_fully_when_no_kick_fits() {
        // The bar lies in a one-row slot with every neighboring cell
        // occupied, so no kick offset can rescue a rotation.
        let grid = Grid::from_rows(&[
            "##########", //
            "##########", //
            "#....#####", //
            "##########", //
            "##########", //
        ]);
        let mut piece = spawn(TetrominoKind::I, (2, 1));
        assert!(piece.fits(&grid));
        let cells_before = piece.cells();

        assert!(!piece.try_rotate(&grid, Spin::Cw));
        assert_eq!(piece.rotation(), 0);
        assert_eq!(piece.cells(), cells_before);
        assert_eq!(piece.anchor(), (2, 1));
    }

    #[test]
    fn test_hard_drop_terminates_at_lowest_legal_row() {
        let grid = open_grid();
        let mut piece = spawn(TetrominoKind::T, (4, 18));
        let rows = piece.hard_drop(&grid);
        assert_eq!(rows, 18);
        assert_eq!(piece.anchor(), (4, 0));
        assert!(piece.is_grounded(&grid));
    }

    #[test]
    fn test_hard_drop_rests_on_stack() {
        let grid = Grid::from_rows(&[
            "..........", //
            "..........", //
            "..........", //
            "..........", //
            "...##.....", //
            "...##.....", //
        ]);
        let mut piece = spawn(TetrominoKind::O, (3, 4));
        piece.hard_drop(&grid);
        // The square lands on top of the stack, two rows up.
        assert_eq!(piece.anchor(), (3, 2));
        assert!(piece.is_grounded(&grid));
    }

    #[test]
    fn test_gravity_accumulates_and_steps() {
        let grid = open_grid();
        let mut piece = spawn(TetrominoKind::L, (4, 10));
        let interval = Duration::from_millis(800);

        assert!(!piece.advance_gravity(&grid, Duration::from_millis(400), interval));
        assert_eq!(piece.anchor(), (4, 10));

        assert!(piece.advance_gravity(&grid, Duration::from_millis(400), interval));
        assert_eq!(piece.anchor(), (4, 9));
        assert_eq!(piece.fall_elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_gravity_accumulator_resets_even_when_blocked() {
        let grid = open_grid();
        let mut piece = spawn(TetrominoKind::J, (4, 10));
        piece.hard_drop(&grid);
        let interval = Duration::from_millis(100);

        assert!(!piece.advance_gravity(&grid, Duration::from_millis(150), interval));
        assert_eq!(piece.fall_elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_lock_timer_accrues_only_on_support() {
        let grid = open_grid();
        let mut piece = spawn(TetrominoKind::S, (4, 10));
        let delay = Duration::from_millis(500);

        // Airborne: no accrual.
        assert!(!piece.advance_lock(&grid, Duration::from_millis(300), delay));
        assert_eq!(piece.lock_elapsed(), Duration::ZERO);

        piece.hard_drop(&grid);
        assert!(!piece.advance_lock(&grid, Duration::from_millis(300), delay));
        assert!(piece.advance_lock(&grid, Duration::from_millis(300), delay));
    }

    #[test]
    fn test_successful_move_resets_lock_timer() {
        let grid = open_grid();
        let mut piece = spawn(TetrominoKind::T, (4, 10));
        piece.hard_drop(&grid);
        let delay = Duration::from_millis(500);

        assert!(!piece.advance_lock(&grid, Duration::from_millis(400), delay));
        assert!(piece.try_move(&grid, (1, 0)));
        assert_eq!(piece.lock_elapsed(), Duration::ZERO);
        assert!(!piece.advance_lock(&grid, Duration::from_millis(400), delay));
    }
}
