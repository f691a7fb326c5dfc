use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{SizeError, core::piece::ShapeKind};

/// Smallest accepted grid side. Every tetromino fits a 4×4 box, so anything
/// narrower or shorter cannot host a spawn.
pub const MIN_DIMENSION: usize = 4;
/// Largest accepted grid side. The reference UI offers 10–25; this cap just
/// keeps runaway sizes out of the allocator.
pub const MAX_DIMENSION: usize = 64;

/// Validated grid dimensions.
///
/// Construction is the single place dimension checking happens; everything
/// downstream can assume both sides are within range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSize {
    width: usize,
    height: usize,
}

impl<'de> Deserialize<'de> for GridSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            width: usize,
            height: usize,
        }
        let raw = Raw::deserialize(deserializer)?;
        GridSize::new(raw.width, raw.height).map_err(serde::de::Error::custom)
    }
}

impl GridSize {
    pub fn new(width: usize, height: usize) -> Result<Self, SizeError> {
        for side in [width, height] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&side) {
                return Err(SizeError { rejected: side });
            }
        }
        Ok(Self { width, height })
    }

    #[must_use]
    pub fn width(self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(self) -> usize {
        self.height
    }
}

/// A single grid cell: empty, or frozen with the kind of piece that locked
/// there.
///
/// The kind tag is opaque identity as far as the rules go; only the
/// presentation layer cares which letter maps to which color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(ShapeKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Filled(kind) => kind.as_char(),
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::Empty);
        }
        ShapeKind::from_char(c).map(Cell::Filled)
    }
}

/// The frozen-cell matrix.
///
/// Pure data plus invariant-preserving mutators; no game rules live here.
/// Row 0 is the bottom row and y grows upward. Dimensions are fixed for the
/// grid's lifetime.
///
/// # Coordinate queries
///
/// [`is_occupied`](Self::is_occupied) takes signed coordinates and treats
/// anything outside the grid as occupied, so candidate pieces can be tested
/// without separate bounds logic. The write operations take unsigned
/// coordinates and panic when out of bounds; the orchestrator guarantees
/// validity through its collision checks before ever writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: GridSize,
    cells: Vec<Cell>,
}

impl Grid {
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size.width() * size.height()],
        }
    }

    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.size.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.size.height()
    }

    /// Checks whether a coordinate is blocked.
    ///
    /// Out-of-bounds coordinates always count as blocked, never as empty, so
    /// pieces cannot escape the grid.
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        let Ok(x) = usize::try_from(x) else {
            return true;
        };
        let Ok(y) = usize::try_from(y) else {
            return true;
        };
        if x >= self.width() || y >= self.height() {
            return true;
        }
        !self.cells[y * self.width() + x].is_empty()
    }

    /// Returns the cell at an in-bounds coordinate.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate is out of bounds.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells[self.index(x, y)]
    }

    /// Freezes a cell with the given piece kind.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate is out of bounds. Callers must have
    /// established validity beforehand; silently ignoring a stray write would
    /// hide a rule violation.
    pub fn set_cell(&mut self, x: usize, y: usize, kind: ShapeKind) {
        let index = self.index(x, y);
        self.cells[index] = Cell::Filled(kind);
    }

    /// Empties a cell.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate is out of bounds.
    pub fn clear_cell(&mut self, x: usize, y: usize) {
        let index = self.index(x, y);
        self.cells[index] = Cell::Empty;
    }

    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y).iter().all(|cell| !cell.is_empty())
    }

    /// Removes one row, shifting every row above it down and inserting a
    /// fresh empty row at the top.
    ///
    /// # Panics
    ///
    /// Panics when `y` is out of bounds.
    pub fn remove_row(&mut self, y: usize) {
        assert!(y < self.height(), "row {y} out of bounds");
        let width = self.width();
        self.cells.copy_within((y + 1) * width.., y * width);
        let top = (self.height() - 1) * width;
        self.cells[top..].fill(Cell::Empty);
    }

    /// Returns one row of cells, bottom-origin.
    ///
    /// # Panics
    ///
    /// Panics when `y` is out of bounds.
    #[must_use]
    pub fn row(&self, y: usize) -> &[Cell] {
        assert!(y < self.height(), "row {y} out of bounds");
        &self.cells[y * self.width()..][..self.width()]
    }

    /// Iterates rows from the bottom row upward.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.width())
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width() && y < self.height(),
            "cell ({x}, {y}) out of bounds for {}x{} grid",
            self.width(),
            self.height(),
        );
        y * self.width() + x
    }

    /// Builds a grid from ASCII art for tests.
    ///
    /// Rows are written top to bottom. `.` is empty, a shape letter freezes
    /// that kind, and `#` freezes an anonymous cell (tagged as `I`).
    ///
    /// # Panics
    ///
    /// Panics on ragged rows, unknown characters, or out-of-range dimensions.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let height = lines.len();
        let width = lines.first().map_or(0, |line| line.chars().count());
        let size = GridSize::new(width, height).expect("ascii art dimensions out of range");

        let mut grid = Self::new(size);
        for (row, line) in lines.iter().enumerate() {
            assert_eq!(
                line.chars().count(),
                width,
                "row {row} has a different width than row 0",
            );
            let y = height - 1 - row;
            for (x, c) in line.chars().enumerate() {
                let cell = match c {
                    '#' => Cell::Filled(ShapeKind::I),
                    _ => Cell::from_char(c).unwrap_or_else(|| panic!("unknown cell char {c:?}")),
                };
                grid.cells[y * width + x] = cell;
            }
        }
        grid
    }
}

impl Serialize for Grid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // One string per row, top row first, using the same characters as
        // `from_ascii` (minus the `#` shorthand).
        let rows: Vec<String> = self
            .rows()
            .rev()
            .map(|row| row.iter().map(|cell| cell.as_char()).collect())
            .collect();
        rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        let size = GridSize::new(width, height).map_err(serde::de::Error::custom)?;

        let mut grid = Self::new(size);
        for (i, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(serde::de::Error::custom(format!(
                    "row {i} has {} cells, expected {width}",
                    row.chars().count()
                )));
            }
            let y = height - 1 - i;
            for (x, c) in row.chars().enumerate() {
                let cell = Cell::from_char(c).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid cell char {c:?} at row {i}"))
                })?;
                grid.cells[y * width + x] = cell;
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(width: usize, height: usize) -> GridSize {
        GridSize::new(width, height).unwrap()
    }

    #[test]
    fn test_size_validation() {
        assert!(GridSize::new(10, 20).is_ok());
        assert!(GridSize::new(MIN_DIMENSION, MAX_DIMENSION).is_ok());
        assert!(GridSize::new(MIN_DIMENSION - 1, 20).is_err());
        assert!(GridSize::new(10, MAX_DIMENSION + 1).is_err());
        assert!(GridSize::new(0, 0).is_err());

        let err = GridSize::new(3, 20).unwrap_err();
        assert_eq!(err.rejected, 3);
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(size(10, 20));
        for y in 0..20 {
            for x in 0..10 {
                assert!(grid.cell(x, y).is_empty());
            }
        }
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let grid = Grid::new(size(10, 20));

        assert!(grid.is_occupied(-1, 0));
        assert!(grid.is_occupied(0, -1));
        assert!(grid.is_occupied(10, 0));
        assert!(grid.is_occupied(0, 20));

        // In-bounds empty cells are not blocked.
        assert!(!grid.is_occupied(0, 0));
        assert!(!grid.is_occupied(9, 19));
    }

    #[test]
    fn test_set_and_clear_cell() {
        let mut grid = Grid::new(size(10, 20));

        grid.set_cell(3, 5, ShapeKind::T);
        assert_eq!(grid.cell(3, 5), Cell::Filled(ShapeKind::T));
        assert!(grid.is_occupied(3, 5));

        grid.clear_cell(3, 5);
        assert!(grid.cell(3, 5).is_empty());
        assert!(!grid.is_occupied(3, 5));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_set_cell_out_of_bounds_panics() {
        let mut grid = Grid::new(size(10, 20));
        grid.set_cell(10, 0, ShapeKind::I);
    }

    #[test]
    fn test_is_row_full() {
        let mut grid = Grid::new(size(4, 4));
        assert!(!grid.is_row_full(0));

        for x in 0..3 {
            grid.set_cell(x, 0, ShapeKind::O);
        }
        assert!(!grid.is_row_full(0));

        grid.set_cell(3, 0, ShapeKind::O);
        assert!(grid.is_row_full(0));
    }

    #[test]
    fn test_remove_row_shifts_down() {
        let mut grid = Grid::from_ascii(
            "....
             .LL.
             ZZZZ
             S.S.",
        );

        // Row 1 (the Z row) goes away; the L row lands on top of the S row.
        grid.remove_row(1);

        let expected = Grid::from_ascii(
            "....
             ....
             .LL.
             S.S.",
        );
        assert_eq!(grid, expected);
    }

    #[test]
    fn test_remove_bottom_row() {
        let mut grid = Grid::from_ascii(
            "....
             ....
             .JJ.
             ####",
        );
        grid.remove_row(0);

        let expected = Grid::from_ascii(
            "....
             ....
             ....
             .JJ.",
        );
        assert_eq!(grid, expected);
    }

    #[test]
    fn test_remove_top_row_leaves_empty_top() {
        let mut grid = Grid::from_ascii(
            "####
             ....
             ....
             .T..",
        );
        grid.remove_row(3);
        assert!(grid.row(3).iter().all(|cell| cell.is_empty()));
        assert_eq!(grid.cell(1, 0), Cell::Filled(ShapeKind::T));
    }

    #[test]
    fn test_from_ascii_bottom_origin() {
        let grid = Grid::from_ascii(
            "I...
             ....
             ....
             ...O",
        );
        // Top-left of the art is (0, height-1) in board coordinates.
        assert_eq!(grid.cell(0, 3), Cell::Filled(ShapeKind::I));
        assert_eq!(grid.cell(3, 0), Cell::Filled(ShapeKind::O));
        assert!(grid.cell(0, 0).is_empty());
    }

    #[test]
    fn test_rows_iterates_bottom_up() {
        let grid = Grid::from_ascii(
            "TTTT
             ....
             ....
             OOOO",
        );
        let rows: Vec<&[Cell]> = grid.rows().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].iter().all(|c| *c == Cell::Filled(ShapeKind::O)));
        assert!(rows[3].iter().all(|c| *c == Cell::Filled(ShapeKind::T)));
    }

    #[test]
    fn test_grid_serialization_round_trip() {
        let grid = Grid::from_ascii(
            "....
             .SS.
             JJ..
             LLLL",
        );
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"["....",".SS.","JJ..","LLLL"]"#);

        let back: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_grid_deserialization_errors() {
        // Ragged rows
        assert!(serde_json::from_str::<Grid>(r#"["....","..."]"#).is_err());
        // Unknown cell char
        assert!(serde_json::from_str::<Grid>(r#"["...x","....","....","...."]"#).is_err());
        // Dimensions out of range
        assert!(serde_json::from_str::<Grid>(r#"["..",".."]"#).is_err());
    }
}
