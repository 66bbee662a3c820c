pub use self::{active_piece::*, grid::*, tetromino::*};

pub(crate) mod active_piece;
pub(crate) mod grid;
pub(crate) mod tetromino;

/// Cell coordinate on the playfield, `(x, y)` with the origin at the bottom
/// left and `y` increasing upward.
///
/// Coordinates are signed so that candidate positions may be transiently
/// outside the board; the [`Grid`] queries treat out-of-range coordinates as
/// "not free" rather than panicking.
pub type Coord = (i32, i32);

/// Relative offset that can be added to a [`Coord`].
pub type Offset = (i32, i32);
