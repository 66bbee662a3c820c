use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{Coord, tetromino::TetrominoKind};

/// Occupant of a single playfield cell.
///
/// The engine only consults occupied-or-not; the kind tag is carried so a
/// renderer can color locked cells.
pub type Cell = Option<TetrominoKind>;

/// Most rows a single locked piece can complete at once (a piece spans at
/// most four rows).
pub const MAX_SIMULTANEOUS_CLEARS: usize = 4;

/// Row indices cleared by one compaction pass, in scan order (topmost
/// first).
pub type ClearedRows = ArrayVec<i32, MAX_SIMULTANEOUS_CLEARS>;

/// The playfield: a fixed-size board of occupied/empty cells.
///
/// The grid is the sole owner of occupancy state; a locked piece's cells are
/// copied into it, never referenced. Dimensions come from the game
/// configuration, row 0 is the bottom row.
///
/// All queries are total: out-of-range coordinates read as "invalid" (see
/// [`Grid::cell`]) instead of panicking. Mutations expect already-validated
/// coordinates; the canonical caller is the active piece, which always runs
/// the legality check first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    /// Row-major, `index = y * width + x`, bottom row first.
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is not positive; the game configuration
    /// validates dimensions before any grid is built.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        let len = usize::try_from(width * height).unwrap();
        Self {
            width,
            height,
            cells: vec![None; len],
        }
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Pure boundary test.
    #[must_use]
    pub const fn is_in_bounds(&self, (x, y): Coord) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Returns the cell at `coord`, or `None` when the coordinate is out of
    /// range.
    #[must_use]
    pub fn cell(&self, coord: Coord) -> Option<Cell> {
        self.index(coord).map(|i| self.cells[i])
    }

    /// Whether `coord` is in bounds and occupied.
    #[must_use]
    pub fn is_occupied(&self, coord: Coord) -> bool {
        matches!(self.cell(coord), Some(Some(_)))
    }

    /// Whether `coord` is in bounds and empty.
    #[must_use]
    pub fn is_free(&self, coord: Coord) -> bool {
        matches!(self.cell(coord), Some(None))
    }

    /// Marks each given cell as occupied by `kind`.
    ///
    /// Callers must have validated every cell as in-bounds and free; the
    /// active piece's legality check always runs before a commit.
    pub fn commit(&mut self, cells: &[Coord], kind: TetrominoKind) {
        for &coord in cells {
            debug_assert!(self.is_free(coord), "commit into non-free cell {coord:?}");
            if let Some(i) = self.index(coord) {
                self.cells[i] = Some(kind);
            }
        }
    }

    /// Whether every column of row `y` is occupied.
    #[must_use]
    pub fn is_row_full(&self, y: i32) -> bool {
        (0..self.width).all(|x| self.is_occupied((x, y)))
    }

    /// Row indices of all full rows, scanned from the top row down.
    #[must_use]
    pub fn full_rows(&self) -> ClearedRows {
        (0..self.height)
            .rev()
            .filter(|&y| self.is_row_full(y))
            .collect()
    }

    /// Empties every cell of row `y`.
    pub fn clear_row(&mut self, y: i32) {
        for x in 0..self.width {
            if let Some(i) = self.index((x, y)) {
                self.cells[i] = None;
            }
        }
    }

    /// Shifts every row above `y` down by exactly one; the topmost row
    /// becomes empty.
    pub fn collapse_above(&mut self, y: i32) {
        for src in y + 1..self.height {
            for x in 0..self.width {
                let cell = self.cell((x, src)).unwrap_or(None);
                if let Some(i) = self.index((x, src - 1)) {
                    self.cells[i] = cell;
                }
            }
        }
        self.clear_row(self.height - 1);
    }

    /// Clears all full rows and compacts the stack, returning the cleared
    /// row indices in scan order.
    ///
    /// The scan runs from the top row down, clearing and collapsing each
    /// full row immediately and then moving down exactly one index per
    /// iteration. When cleared rows are adjacent, the collapse re-fills the
    /// just-scanned index with the row that was above it; that row is
    /// caught when the scan reaches its own index, so a single pass clears
    /// any stack of adjacent full rows.
    pub fn clear_full_lines(&mut self) -> ClearedRows {
        let mut cleared = ClearedRows::new();
        let mut y = self.height - 1;
        while y >= 0 {
            if self.is_row_full(y) {
                self.clear_row(y);
                self.collapse_above(y);
                cleared.push(y);
            }
            y -= 1;
        }
        cleared
    }

    /// Total number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Whether any occupied cell sits at row `y` or above.
    #[must_use]
    pub fn any_occupied_at_or_above(&self, y: i32) -> bool {
        (y.max(0)..self.height).any(|row| (0..self.width).any(|x| self.is_occupied((x, row))))
    }

    /// Builds a grid from ASCII rows for tests, top row first.
    ///
    /// `.` is an empty cell, a kind letter (`I`, `O`, `S`, `Z`, `J`, `L`,
    /// `T`) is a cell occupied by that kind, and `#` is an occupied cell of
    /// unspecified kind.
    ///
    /// # Panics
    ///
    /// Panics when rows are empty, ragged, or contain an unknown character.
    #[must_use]
    pub fn from_rows(rows: &[&str]) -> Self {
        assert!(!rows.is_empty(), "grid needs at least one row");
        let width = i32::try_from(rows[0].chars().count()).unwrap();
        let height = i32::try_from(rows.len()).unwrap();
        let mut grid = Self::new(width, height);
        for (i, row) in rows.iter().enumerate() {
            let y = height - 1 - i32::try_from(i).unwrap();
            let row_width = i32::try_from(row.chars().count()).unwrap();
            assert_eq!(row_width, width, "ragged row {i}");
            for (x, c) in row.chars().enumerate() {
                let cell = match c {
                    '.' => None,
                    '#' => Some(TetrominoKind::O),
                    _ => Some(
                        TetrominoKind::from_char(c)
                            .unwrap_or_else(|| panic!("unknown cell char {c:?}")),
                    ),
                };
                let idx = grid.index((i32::try_from(x).unwrap(), y)).unwrap();
                grid.cells[idx] = cell;
            }
        }
        grid
    }

    fn index(&self, (x, y): Coord) -> Option<usize> {
        self.is_in_bounds((x, y))
            .then(|| usize::try_from(y * self.width + x).unwrap())
    }

    fn row_string(&self, y: i32) -> String {
        (0..self.width)
            .map(|x| match self.cell((x, y)) {
                Some(Some(kind)) => kind.as_char(),
                _ => '.',
            })
            .collect()
    }
}

impl Serialize for Grid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: one string per row, top row first, '.' for empty cells
        // and the kind letter for occupied ones.
        let rows: Vec<String> = (0..self.height).rev().map(|y| self.row_string(y)).collect();
        rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        if rows.is_empty() {
            return Err(serde::de::Error::custom("grid needs at least one row"));
        }
        let width = i32::try_from(rows[0].chars().count())
            .map_err(|_| serde::de::Error::custom("row too wide"))?;
        if width == 0 {
            return Err(serde::de::Error::custom("grid rows must not be empty"));
        }
        let height = i32::try_from(rows.len())
            .map_err(|_| serde::de::Error::custom("too many rows"))?;
        let mut grid = Self::new(width, height);
        for (i, row) in rows.iter().enumerate() {
            let y = height - 1 - i32::try_from(i).unwrap();
            if i32::try_from(row.chars().count()).unwrap_or(-1) != width {
                return Err(serde::de::Error::custom(format!(
                    "expected {width} cells in every row, row {i} differs"
                )));
            }
            for (x, c) in row.chars().enumerate() {
                let cell = match c {
                    '.' => None,
                    _ => Some(TetrominoKind::from_char(c).ok_or_else(|| {
                        serde::de::Error::custom(format!("invalid cell char {c:?} at row {i}"))
                    })?),
                };
                let index = grid.index((i32::try_from(x).unwrap(), y)).unwrap();
                grid.cells[index] = cell;
            }
        }
        Ok(grid)
    }
}
