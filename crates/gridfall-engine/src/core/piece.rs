use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A tetromino instance: shape kind, rotation state, anchor position.
///
/// Pieces are immutable values - movement and rotation return new `Piece`
/// candidates without consulting the grid. The board orchestrator validates a
/// candidate against its grid before committing it, so a `Piece` by itself
/// never knows whether it is legal.
///
/// # Coordinate System
///
/// The anchor is the top-left corner of the piece's 4×4 bounding box in board
/// coordinates (row 0 at the bottom, y growing upward). The anchor may sit
/// outside the grid for candidate pieces; only the occupied cells matter.
///
/// # Example
///
/// ```
/// use gridfall_engine::{Piece, ShapeKind};
///
/// let piece = Piece::spawn(ShapeKind::T, 10, 20);
/// let candidate = piece.translated(-1, 0).rotated_cw();
/// assert_ne!(candidate, piece);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: ShapeKind,
    rotation: Rotation,
    x: i32,
    y: i32,
}

impl Piece {
    /// Creates a piece at the spawn anchor for a grid of the given
    /// dimensions: horizontally centered, bounding box flush with the top.
    #[must_use]
    pub fn spawn(kind: ShapeKind, grid_width: usize, grid_height: usize) -> Self {
        #[expect(clippy::cast_possible_truncation)]
        let (width, height) = (grid_width as i32, grid_height as i32);
        Self {
            kind,
            rotation: Rotation::default(),
            x: (width - BOX_SIZE) / 2,
            y: height - 1,
        }
    }

    #[must_use]
    pub fn kind(self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(self) -> Rotation {
        self.rotation
    }

    /// The anchor position (top-left of the bounding box).
    #[must_use]
    pub fn anchor(self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// The absolute board cells this piece occupies. Always exactly four.
    #[must_use]
    pub fn occupied_cells(self) -> ArrayVec<(i32, i32), 4> {
        let shape = self.kind.shape_box(self.rotation);
        let mut cells = ArrayVec::new();
        for (row, line) in shape.iter().enumerate() {
            for (col, &filled) in line.iter().enumerate() {
                if filled {
                    #[expect(clippy::cast_possible_truncation)]
                    cells.push((self.x + col as i32, self.y - row as i32));
                }
            }
        }
        cells
    }

    /// A candidate shifted by the given delta. Does not check the grid.
    #[must_use]
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// A candidate rotated 90° clockwise around the same anchor.
    ///
    /// Rotation is a pure table lookup per shape; there are no wall kicks.
    /// A blocked rotation is simply rejected by the board.
    #[must_use]
    pub fn rotated_cw(self) -> Self {
        Self {
            rotation: self.rotation.rotated_cw(),
            ..self
        }
    }

    /// A candidate rotated 90° counterclockwise around the same anchor.
    #[must_use]
    pub fn rotated_ccw(self) -> Self {
        Self {
            rotation: self.rotation.rotated_ccw(),
            ..self
        }
    }
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Format: "kind#rotation@x,y" (e.g. "T#1@3,18")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.index(),
            self.x,
            self.y
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let s = String::deserialize(deserializer)?;
        let malformed = || Error::custom(format!("expected 'kind#rotation@x,y', got '{s}'"));

        let (kind_str, rest) = s.split_once('#').ok_or_else(malformed)?;
        let (rotation_str, position_str) = rest.split_once('@').ok_or_else(malformed)?;
        let (x_str, y_str) = position_str.split_once(',').ok_or_else(malformed)?;

        let mut kind_chars = kind_str.chars();
        let kind = kind_chars
            .next()
            .filter(|_| kind_chars.next().is_none())
            .and_then(ShapeKind::from_char)
            .ok_or_else(|| Error::custom(format!("invalid piece kind: '{kind_str}'")))?;

        let rotation_index: u8 = rotation_str
            .parse()
            .map_err(|e| Error::custom(format!("invalid rotation: {rotation_str} ({e})")))?;
        if rotation_index >= ROTATION_STATES {
            return Err(Error::custom(format!(
                "rotation must be 0-3, got {rotation_index}"
            )));
        }

        let x = x_str
            .parse()
            .map_err(|e| Error::custom(format!("invalid x position: {x_str} ({e})")))?;
        let y = y_str
            .parse()
            .map_err(|e| Error::custom(format!("invalid y position: {y_str} ({e})")))?;

        Ok(Piece {
            kind,
            rotation: Rotation(rotation_index),
            x,
            y,
        })
    }
}

const ROTATION_STATES: u8 = 4;

/// Rotation state of a piece: one of four 90° steps, wrapping modulo 4.
///
/// `0` is the spawn orientation, `1` is 90° clockwise, and so on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rotation(u8);

impl Rotation {
    #[must_use]
    pub fn rotated_cw(self) -> Self {
        Rotation((self.0 + 1) % ROTATION_STATES)
    }

    #[must_use]
    pub fn rotated_ccw(self) -> Self {
        Rotation((self.0 + ROTATION_STATES - 1) % ROTATION_STATES)
    }

    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// One of the seven canonical tetromino kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum ShapeKind {
    I = 0,
    O = 1,
    T = 2,
    S = 3,
    Z = 4,
    J = 5,
    L = 6,
}

impl Distribution<ShapeKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeKind {
        ShapeKind::ALL[rng.random_range(0..ShapeKind::LEN)]
    }
}

impl ShapeKind {
    /// Number of shape kinds (7).
    pub const LEN: usize = 7;

    /// All kinds in declaration order.
    pub const ALL: [Self; Self::LEN] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::J,
        ShapeKind::L,
    ];

    /// Returns the single character representation of this shape kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridfall_engine::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::I.as_char(), 'I');
    /// assert_eq!(ShapeKind::from_char('Z'), Some(ShapeKind::Z));
    /// assert_eq!(ShapeKind::from_char('x'), None);
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            ShapeKind::I => 'I',
            ShapeKind::O => 'O',
            ShapeKind::T => 'T',
            ShapeKind::S => 'S',
            ShapeKind::Z => 'Z',
            ShapeKind::J => 'J',
            ShapeKind::L => 'L',
        }
    }

    /// Parses a shape kind from its single character representation.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(ShapeKind::I),
            'O' => Some(ShapeKind::O),
            'T' => Some(ShapeKind::T),
            'S' => Some(ShapeKind::S),
            'Z' => Some(ShapeKind::Z),
            'J' => Some(ShapeKind::J),
            'L' => Some(ShapeKind::L),
            _ => None,
        }
    }

    pub(crate) fn shape_box(self, rotation: Rotation) -> &'static ShapeBox {
        &SHAPE_BOXES[self as usize][rotation.as_usize()]
    }
}

const BOX_SIZE: i32 = 4;

/// Occupancy of a piece within its 4×4 bounding box, row 0 at the top of the
/// box.
pub(crate) type ShapeBox = [[bool; 4]; 4];

/// Generates all 4 rotation states of a shape by rotating 90° clockwise
/// inside its effective sub-box.
///
/// # Arguments
///
/// * `size` - Effective size of the shape (4 for I, 2 for O, 3 for the rest)
/// * `base` - Shape occupancy at the spawn orientation
const fn box_rotations(size: usize, base: ShapeBox) -> [ShapeBox; 4] {
    let mut states = [base; 4];
    let mut i = 1;
    while i < 4 {
        let mut rotated = [[false; 4]; 4];
        let mut row = 0;
        while row < size {
            let mut col = 0;
            while col < size {
                rotated[row][col] = states[i - 1][size - 1 - col][row];
                col += 1;
            }
            row += 1;
        }
        states[i] = rotated;
        i += 1;
    }
    states
}

const SHAPE_BOXES: [[ShapeBox; 4]; ShapeKind::LEN] = {
    const X: bool = true;
    const E: bool = false;
    const EMPTY: [bool; 4] = [E; 4];

    [
        // I
        box_rotations(4, [EMPTY, [X, X, X, X], EMPTY, EMPTY]),
        // O
        box_rotations(2, [[X, X, E, E], [X, X, E, E], EMPTY, EMPTY]),
        // T
        box_rotations(3, [[E, X, E, E], [X, X, X, E], EMPTY, EMPTY]),
        // S
        box_rotations(3, [[E, X, X, E], [X, X, E, E], EMPTY, EMPTY]),
        // Z
        box_rotations(3, [[X, X, E, E], [E, X, X, E], EMPTY, EMPTY]),
        // J
        box_rotations(3, [[X, E, E, E], [X, X, X, E], EMPTY, EMPTY]),
        // L
        box_rotations(3, [[E, E, X, E], [X, X, X, E], EMPTY, EMPTY]),
    ]
};

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_every_shape_state_has_four_cells() {
        for kind in ShapeKind::ALL {
            let mut piece = Piece::spawn(kind, 10, 20);
            for _ in 0..4 {
                let cells = piece.occupied_cells();
                assert_eq!(cells.len(), 4, "{kind:?} {:?}", piece.rotation());
                let unique: BTreeSet<_> = cells.iter().copied().collect();
                assert_eq!(unique.len(), 4, "{kind:?} has overlapping cells");
                piece = piece.rotated_cw();
            }
        }
    }

    #[test]
    fn test_four_cw_rotations_return_to_start() {
        for kind in ShapeKind::ALL {
            let piece = Piece::spawn(kind, 10, 20);
            let rotated = piece.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
            assert_eq!(rotated, piece);
            assert_eq!(rotated.occupied_cells(), piece.occupied_cells());
        }
    }

    #[test]
    fn test_ccw_undoes_cw() {
        for kind in ShapeKind::ALL {
            let piece = Piece::spawn(kind, 10, 20).rotated_cw();
            assert_eq!(piece.rotated_cw().rotated_ccw(), piece);
            assert_eq!(piece.rotated_ccw().rotated_cw(), piece);
        }
    }

    #[test]
    fn test_o_piece_rotation_is_identity() {
        let piece = Piece::spawn(ShapeKind::O, 10, 20);
        let cells: BTreeSet<_> = piece.occupied_cells().into_iter().collect();
        let rotated: BTreeSet<_> = piece.rotated_cw().occupied_cells().into_iter().collect();
        assert_eq!(cells, rotated);
    }

    #[test]
    fn test_translation_shifts_every_cell() {
        let piece = Piece::spawn(ShapeKind::J, 10, 20);
        let moved = piece.translated(2, -3);

        let original = piece.occupied_cells();
        let shifted = moved.occupied_cells();
        for (a, b) in original.iter().zip(shifted.iter()) {
            assert_eq!((a.0 + 2, a.1 - 3), *b);
        }
        // The source piece is untouched.
        assert_eq!(piece.occupied_cells(), original);
    }

    #[test]
    fn test_spawn_is_centered_and_at_top() {
        for kind in ShapeKind::ALL {
            let piece = Piece::spawn(kind, 10, 20);
            assert_eq!(piece.anchor(), (3, 19));
            for (x, y) in piece.occupied_cells() {
                assert!((0..10).contains(&x));
                assert!((16..20).contains(&y), "{kind:?} spawned too low: y={y}");
            }
        }
    }

    #[test]
    fn test_spawn_cells_for_known_shapes() {
        // The I lies flat in the second row of its box.
        let i = Piece::spawn(ShapeKind::I, 10, 20);
        let cells: BTreeSet<_> = i.occupied_cells().into_iter().collect();
        assert_eq!(
            cells,
            BTreeSet::from([(3, 18), (4, 18), (5, 18), (6, 18)])
        );

        // The O fills the top-left 2×2 corner of its box.
        let o = Piece::spawn(ShapeKind::O, 10, 20);
        let cells: BTreeSet<_> = o.occupied_cells().into_iter().collect();
        assert_eq!(cells, BTreeSet::from([(3, 19), (4, 19), (3, 18), (4, 18)]));
    }

    #[test]
    fn test_equality_covers_kind_rotation_and_anchor() {
        let piece = Piece::spawn(ShapeKind::S, 10, 20);
        assert_eq!(piece, Piece::spawn(ShapeKind::S, 10, 20));
        assert_ne!(piece, Piece::spawn(ShapeKind::Z, 10, 20));
        assert_ne!(piece, piece.rotated_cw());
        assert_ne!(piece, piece.translated(0, -1));
    }

    #[test]
    fn test_piece_serialization_round_trip() {
        let piece = Piece::spawn(ShapeKind::S, 10, 20).rotated_cw().translated(1, -2);
        let json = serde_json::to_string(&piece).unwrap();
        assert_eq!(json, "\"S#1@4,17\"");

        let back: Piece = serde_json::from_str(&json).unwrap();
        assert_eq!(back, piece);
    }

    #[test]
    fn test_piece_serialization_negative_anchor() {
        // Candidate anchors may sit left of the grid.
        let piece = Piece::spawn(ShapeKind::J, 10, 20).translated(-4, 0);
        let json = serde_json::to_string(&piece).unwrap();
        assert_eq!(json, "\"J#0@-1,19\"");
        let back: Piece = serde_json::from_str(&json).unwrap();
        assert_eq!(back, piece);
    }

    #[test]
    fn test_piece_deserialization_error_cases() {
        assert!(serde_json::from_str::<Piece>("\"T1@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"T#1#4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"T#1@4\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"X#1@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"T#4@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"T#1@abc,18\"").is_err());
    }

    #[test]
    fn test_shape_kind_char_round_trip() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(ShapeKind::from_char('?'), None);
    }

    #[test]
    fn test_uniform_sampling_stays_in_range() {
        use rand::SeedableRng as _;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let kind: ShapeKind = rng.random();
            assert!(ShapeKind::ALL.contains(&kind));
        }
    }
}
