use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::Offset;

/// One of the seven canonical tetromino shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TetrominoKind {
    /// I-piece (the 4-long bar).
    I = 0,
    /// O-piece (the 2×2 block).
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Serialize for TetrominoKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_char(self.as_char())
    }
}

impl<'de> Deserialize<'de> for TetrominoKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let c = char::deserialize(deserializer)?;
        Self::from_char(c)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid tetromino kind: {c}")))
    }
}

impl Distribution<TetrominoKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TetrominoKind {
        TetrominoKind::ALL[rng.random_range(0..TetrominoKind::LEN)]
    }
}

impl TetrominoKind {
    /// Number of tetromino kinds (7).
    pub const LEN: usize = 7;

    /// All kinds in declaration order.
    ///
    /// `TetrominoKind::ALL[k as usize] == k` holds for every kind.
    pub const ALL: [Self; Self::LEN] = [
        TetrominoKind::I,
        TetrominoKind::O,
        TetrominoKind::S,
        TetrominoKind::Z,
        TetrominoKind::J,
        TetrominoKind::L,
        TetrominoKind::T,
    ];

    /// Returns the single character representation of this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackfall_engine::TetrominoKind;
    ///
    /// assert_eq!(TetrominoKind::I.as_char(), 'I');
    /// assert_eq!(TetrominoKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            TetrominoKind::I => 'I',
            TetrominoKind::O => 'O',
            TetrominoKind::S => 'S',
            TetrominoKind::Z => 'Z',
            TetrominoKind::J => 'J',
            TetrominoKind::L => 'L',
            TetrominoKind::T => 'T',
        }
    }

    /// Parses a kind from its single character representation.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(TetrominoKind::I),
            'O' => Some(TetrominoKind::O),
            'S' => Some(TetrominoKind::S),
            'Z' => Some(TetrominoKind::Z),
            'J' => Some(TetrominoKind::J),
            'L' => Some(TetrominoKind::L),
            'T' => Some(TetrominoKind::T),
            _ => None,
        }
    }

    /// Returns the immutable shape descriptor for this kind.
    #[must_use]
    pub const fn data(self) -> TetrominoData {
        TetrominoData {
            kind: self,
            spawn_cells: SPAWN_CELLS[self as usize],
            wall_kicks: match self {
                TetrominoKind::I => &I_KICKS,
                _ => &JLOSTZ_KICKS,
            },
        }
    }

    /// Whether this kind rotates about a half-cell center.
    ///
    /// The bar and the square have an even cell extent, so rotating them
    /// about an integer cell produces lopsided jumps; they instead rotate
    /// about a fictitious center offset by 0.5 on both axes, with ceiling
    /// rounding of the result.
    #[must_use]
    pub const fn rotates_about_half_cell(self) -> bool {
        matches!(self, TetrominoKind::I | TetrominoKind::O)
    }
}

/// Rotation direction of an active piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    /// Clockwise quarter turn.
    Cw,
    /// Counter-clockwise quarter turn.
    Ccw,
}

impl Spin {
    /// Signed direction used by the rotation matrix: `+1` for clockwise,
    /// `-1` for counter-clockwise.
    #[must_use]
    pub const fn direction(self) -> i32 {
        match self {
            Spin::Cw => 1,
            Spin::Ccw => -1,
        }
    }
}

/// Number of rotation transitions a kick table covers (four base rotations
/// times two directions).
pub const KICK_TRANSITIONS: usize = 8;
/// Number of kick offsets tried per transition, in order.
pub const KICK_ATTEMPTS: usize = 5;

/// Wall-kick offset table, one row per rotation transition.
pub type KickTable = [[Offset; KICK_ATTEMPTS]; KICK_TRANSITIONS];

/// Immutable shape descriptor: a kind, its four cell offsets in the spawn
/// rotation, and the wall-kick table consulted when a rotation is blocked.
///
/// Shape data is shared; `TetrominoData` is `Copy` and hands out references
/// into the static tables.
#[derive(Debug, Clone, Copy)]
pub struct TetrominoData {
    kind: TetrominoKind,
    spawn_cells: [Offset; 4],
    wall_kicks: &'static KickTable,
}

impl TetrominoData {
    #[must_use]
    pub const fn kind(&self) -> TetrominoKind {
        self.kind
    }

    /// Cell offsets relative to the anchor in the spawn rotation.
    #[must_use]
    pub const fn spawn_cells(&self) -> [Offset; 4] {
        self.spawn_cells
    }

    #[must_use]
    pub const fn wall_kicks(&self) -> &'static KickTable {
        self.wall_kicks
    }
}

/// Spawn-rotation cell offsets per kind, indexed by `kind as usize`.
///
/// Offsets are relative to the anchor cell, y-up. Every shape occupies the
/// anchor row and the row above it.
const SPAWN_CELLS: [[Offset; 4]; TetrominoKind::LEN] = [
    [(-1, 1), (0, 1), (1, 1), (2, 1)], // I
    [(0, 1), (1, 1), (0, 0), (1, 0)],  // O
    [(0, 1), (1, 1), (-1, 0), (0, 0)], // S
    [(-1, 1), (0, 1), (0, 0), (1, 0)], // Z
    [(-1, 1), (-1, 0), (0, 0), (1, 0)], // J
    [(1, 1), (-1, 0), (0, 0), (1, 0)], // L
    [(0, 1), (-1, 0), (0, 0), (1, 0)], // T
];

// Kick tables are indexed by transition row (see the kick-row selection in
// the active piece) and tried left to right; the first offset of every row
// is (0, 0), the in-place test. Offsets are y-up.

/// Kick offsets for the I-piece.
pub const I_KICKS: KickTable = [
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)], // 0 -> 1
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)], // 1 -> 0
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)], // 1 -> 2
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)], // 2 -> 1
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)], // 2 -> 3
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)], // 3 -> 2
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)], // 3 -> 0
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)], // 0 -> 3
];

/// Kick offsets shared by the J, L, O, S, T and Z pieces.
pub const JLOSTZ_KICKS: KickTable = [
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)], // 0 -> 1
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],     // 1 -> 0
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],     // 1 -> 2
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)], // 2 -> 1
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],    // 2 -> 3
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],  // 3 -> 2
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],  // 3 -> 0
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],    // 0 -> 3
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_char_roundtrip() {
        for kind in TetrominoKind::ALL {
            assert_eq!(TetrominoKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(TetrominoKind::from_char('X'), None);
        assert_eq!(TetrominoKind::from_char('i'), None);
    }

    #[test]
    fn test_kind_serde_as_char() {
        let serialized = serde_json::to_string(&TetrominoKind::S).unwrap();
        assert_eq!(serialized, "\"S\"");

        let deserialized: TetrominoKind = serde_json::from_str("\"J\"").unwrap();
        assert_eq!(deserialized, TetrominoKind::J);

        assert!(serde_json::from_str::<TetrominoKind>("\"Q\"").is_err());
        assert!(serde_json::from_str::<TetrominoKind>("\"\"").is_err());
    }

    #[test]
    fn test_all_index_matches_discriminant() {
        for (i, kind) in TetrominoKind::ALL.into_iter().enumerate() {
            assert_eq!(kind as usize, i);
        }
    }

    #[test]
    fn test_spawn_cells_are_distinct() {
        for kind in TetrominoKind::ALL {
            let cells = kind.data().spawn_cells();
            for i in 0..cells.len() {
                for j in i + 1..cells.len() {
                    assert_ne!(cells[i], cells[j], "{kind:?} has duplicate cells");
                }
            }
        }
    }

    #[test]
    fn test_spawn_cells_hug_the_anchor_rows() {
        // Every shape spawns within the anchor row and the row above, so a
        // spawn anchor at height - 2 keeps the whole piece on the board.
        for kind in TetrominoKind::ALL {
            for (_, dy) in kind.data().spawn_cells() {
                assert!(dy == 0 || dy == 1, "{kind:?} cell outside spawn rows");
            }
        }
    }

    #[test]
    fn test_sampling_yields_every_kind() {
        let mut rng = rand::rng();
        let mut seen = [false; TetrominoKind::LEN];
        for _ in 0..1000 {
            let kind: TetrominoKind = rng.random();
            seen[kind as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_kick_tables_lead_with_identity() {
        for row in I_KICKS.iter().chain(JLOSTZ_KICKS.iter()) {
            assert_eq!(row[0], (0, 0));
        }
    }

    #[test]
    fn test_only_bar_and_square_use_half_cell_pivot() {
        assert!(TetrominoKind::I.rotates_about_half_cell());
        assert!(TetrominoKind::O.rotates_about_half_cell());
        for kind in [
            TetrominoKind::S,
            TetrominoKind::Z,
            TetrominoKind::J,
            TetrominoKind::L,
            TetrominoKind::T,
        ] {
            assert!(!kind.rotates_about_half_cell());
        }
    }
}
