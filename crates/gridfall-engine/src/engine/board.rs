use crate::{
    core::{
        grid::{Grid, GridSize},
        piece::{Piece, ShapeKind},
    },
    engine::{
        progress::Progress,
        shape_source::{GeneratorSeed, ShapeSource, UniformSource},
    },
};

/// Lifecycle state of a board.
///
/// `Paused` stops piece advancement but keeps the query surface valid.
/// `GameOver` is terminal; only `new_game` transitions out of it.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum BoardState {
    Running,
    Paused,
    GameOver,
}

/// Classification of what a command changed, returned synchronously from
/// every command call.
///
/// The driver reads this instead of subscribing to callbacks: after each
/// command it inspects the event, re-reads the query surface, and redraws.
/// `Locked` with `cleared_lines == 0` is distinct from `cleared_lines >= 1`
/// so combo scoring can be computed outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    /// The command was illegal or suppressed (blocked move, blocked rotation,
    /// or any piece command while paused or after game over). Nothing
    /// changed.
    Ignored,
    /// The current piece moved or rotated without locking.
    PieceMoved,
    /// A down-move was blocked: the piece froze into the grid, full rows
    /// were removed, and a new piece spawned successfully.
    Locked {
        /// Rows removed in this single lock event (0-4).
        cleared_lines: usize,
        /// Whether the cleared lines pushed the level over a threshold.
        level_advanced: bool,
    },
    /// The lock completed but the next piece could not spawn; the board is
    /// now terminal.
    GameOver {
        /// Rows removed by the final lock, still relevant for display.
        cleared_lines: usize,
    },
    /// `new_game` rebuilt the board.
    Reset {
        /// Whether the grid dimensions changed in the process.
        resized: bool,
    },
}

/// The board/piece simulation core: one grid, one falling piece, one
/// upcoming shape, driven exclusively through its command surface.
///
/// All mutation goes through the commands below; each returns a
/// [`BoardEvent`] describing the transition. Illegal moves are no-ops, never
/// errors. The board never holds a piece that overlaps frozen cells or
/// leaves the grid - every candidate is validated before it is committed.
///
/// # Example
///
/// ```
/// use gridfall_engine::{Board, BoardEvent, GeneratorSeed, GridSize};
///
/// let size = GridSize::new(10, 20).unwrap();
/// let mut board = Board::with_seed(size, GeneratorSeed::from_u128(7));
///
/// board.move_left();
/// board.rotate_cw();
/// let event = board.hard_drop();
/// assert!(matches!(event, BoardEvent::Locked { .. }));
/// ```
#[derive(Debug)]
pub struct Board {
    grid: Grid,
    current: Piece,
    next: ShapeKind,
    source: Box<dyn ShapeSource>,
    progress: Progress,
    state: BoardState,
}

impl Board {
    /// Creates a running board with an OS-seeded [`UniformSource`] and the
    /// first piece already spawned.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self::with_source(size, Box::new(UniformSource::from_entropy()))
    }

    /// Like [`Self::new`], but with a fixed seed for a reproducible shape
    /// sequence.
    #[must_use]
    pub fn with_seed(size: GridSize, seed: GeneratorSeed) -> Self {
        Self::with_source(size, Box::new(UniformSource::new(seed)))
    }

    /// Like [`Self::new`], but drawing shapes from the given source.
    #[must_use]
    pub fn with_source(size: GridSize, mut source: Box<dyn ShapeSource>) -> Self {
        let grid = Grid::new(size);
        let current = Self::spawn(&grid, source.next_shape());
        let next = source.next_shape();
        Self {
            grid,
            current,
            next,
            source,
            progress: Progress::new(),
            state: BoardState::Running,
        }
    }

    #[must_use]
    pub fn size(&self) -> GridSize {
        self.grid.size()
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The falling piece. Still valid after game over, showing the spawn
    /// that could not be placed.
    #[must_use]
    pub fn current_piece(&self) -> Piece {
        self.current
    }

    /// The shape that will spawn after the current piece locks.
    #[must_use]
    pub fn next_shape(&self) -> ShapeKind {
        self.next
    }

    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    #[must_use]
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Where the current piece would rest after a hard drop. Pure query.
    #[must_use]
    pub fn drop_preview(&self) -> Piece {
        let mut piece = self.current;
        loop {
            let candidate = piece.translated(0, -1);
            if !self.fits(candidate) {
                return piece;
            }
            piece = candidate;
        }
    }

    /// Moves the current piece one column left if nothing blocks it.
    pub fn move_left(&mut self) -> BoardEvent {
        self.try_shift(-1, 0)
    }

    /// Moves the current piece one column right if nothing blocks it.
    pub fn move_right(&mut self) -> BoardEvent {
        self.try_shift(1, 0)
    }

    /// Moves the current piece one row down, or locks it when blocked.
    ///
    /// This is the soft-drop command; a blocked down-move is the lock
    /// trigger that freezes the piece, clears full rows, and spawns the
    /// next piece.
    pub fn move_down(&mut self) -> BoardEvent {
        if !self.state.is_running() {
            return BoardEvent::Ignored;
        }
        let candidate = self.current.translated(0, -1);
        if self.fits(candidate) {
            self.current = candidate;
            BoardEvent::PieceMoved
        } else {
            self.lock_current()
        }
    }

    /// The timer-driven gravity advance; identical to [`Self::move_down`].
    pub fn step(&mut self) -> BoardEvent {
        self.move_down()
    }

    /// Rotates the current piece clockwise if the rotated cells are free.
    ///
    /// Rotation is a fixed per-shape table lookup with no wall kicks; a
    /// blocked rotation is a no-op.
    pub fn rotate_cw(&mut self) -> BoardEvent {
        if !self.state.is_running() {
            return BoardEvent::Ignored;
        }
        let candidate = self.current.rotated_cw();
        if self.fits(candidate) {
            self.current = candidate;
            BoardEvent::PieceMoved
        } else {
            BoardEvent::Ignored
        }
    }

    /// Drops the current piece to its resting row and locks it immediately.
    ///
    /// Ends in exactly the state repeated [`Self::move_down`] calls would
    /// reach, but reports a single event for the whole drop.
    pub fn hard_drop(&mut self) -> BoardEvent {
        if !self.state.is_running() {
            return BoardEvent::Ignored;
        }
        self.current = self.drop_preview();
        self.lock_current()
    }

    /// Pauses or resumes piece advancement. Advisory: the driver stops
    /// issuing `step` while paused anyway, but a paused board also refuses
    /// piece commands. Has no effect after game over.
    pub fn set_paused(&mut self, paused: bool) {
        self.state = match (&self.state, paused) {
            (BoardState::GameOver, _) => BoardState::GameOver,
            (_, true) => BoardState::Paused,
            (_, false) => BoardState::Running,
        };
    }

    /// Resets everything and starts a fresh game. Always legal, including
    /// after game over.
    ///
    /// `size` of `None` keeps the current dimensions; `seed` of `None` draws
    /// a fresh OS seed. Either way the shape source becomes a
    /// [`UniformSource`]; a driver that injected a custom source rebuilds
    /// the board through [`Self::with_source`] instead.
    pub fn new_game(&mut self, size: Option<GridSize>, seed: Option<GeneratorSeed>) -> BoardEvent {
        let new_size = size.unwrap_or_else(|| self.size());
        let resized = new_size != self.size();

        self.grid = Grid::new(new_size);
        self.source = match seed {
            Some(seed) => Box::new(UniformSource::new(seed)),
            None => Box::new(UniformSource::from_entropy()),
        };
        self.current = Self::spawn(&self.grid, self.source.next_shape());
        self.next = self.source.next_shape();
        self.progress = Progress::new();
        self.state = BoardState::Running;

        BoardEvent::Reset { resized }
    }

    fn spawn(grid: &Grid, kind: ShapeKind) -> Piece {
        Piece::spawn(kind, grid.width(), grid.height())
    }

    /// Checks a candidate against bounds and frozen cells. Out-of-bounds
    /// counts as blocked, so this is the whole legality rule.
    fn fits(&self, piece: Piece) -> bool {
        piece
            .occupied_cells()
            .into_iter()
            .all(|(x, y)| !self.grid.is_occupied(x, y))
    }

    fn try_shift(&mut self, dx: i32, dy: i32) -> BoardEvent {
        if !self.state.is_running() {
            return BoardEvent::Ignored;
        }
        let candidate = self.current.translated(dx, dy);
        if self.fits(candidate) {
            self.current = candidate;
            BoardEvent::PieceMoved
        } else {
            BoardEvent::Ignored
        }
    }

    /// Freezes the current piece, clears full rows, spawns the next piece,
    /// and checks for game over.
    fn lock_current(&mut self) -> BoardEvent {
        for (x, y) in self.current.occupied_cells() {
            // fits() held before the lock, so the cells are in bounds.
            let (x, y) = (
                usize::try_from(x).expect("locked cell in bounds"),
                usize::try_from(y).expect("locked cell in bounds"),
            );
            self.grid.set_cell(x, y, self.current.kind());
        }

        let cleared_lines = self.clear_full_rows();
        let level_advanced = self.progress.record_lock(cleared_lines);

        self.current = Self::spawn(&self.grid, self.next);
        self.next = self.source.next_shape();

        if self.fits(self.current) {
            BoardEvent::Locked {
                cleared_lines,
                level_advanced,
            }
        } else {
            // The fresh spawn overlaps frozen cells: terminal. The spawn is
            // never written into the grid.
            self.state = BoardState::GameOver;
            BoardEvent::GameOver { cleared_lines }
        }
    }

    /// Removes every full row in one pass, bottom to top. Removing a row
    /// shifts everything above it down, so the same index is re-checked
    /// until it holds a partial row.
    fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = 0;
        while y < self.grid.height() {
            if self.grid.is_row_full(y) {
                self.grid.remove_row(y);
                cleared += 1;
            } else {
                y += 1;
            }
        }
        cleared
    }
}
