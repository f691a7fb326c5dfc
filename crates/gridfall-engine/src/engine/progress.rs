/// Lines cleared before the level advances, matching the reference game's
/// difficulty step.
pub const LINES_PER_LEVEL: usize = 5;

/// Cleared-line and piece counters for one game.
///
/// Tracks what the presentation layer needs to display and to pace its
/// timer:
///
/// - total cleared lines (monotonically increasing)
/// - completed (locked) pieces
/// - a histogram of 0-4 lines cleared per lock, the basis for combo scoring
///   on the observer side
/// - the level, one step per [`LINES_PER_LEVEL`] cleared lines
///
/// Scoring arithmetic itself is observer-side policy and deliberately absent.
///
/// # Example
///
/// ```
/// use gridfall_engine::Progress;
///
/// let mut progress = Progress::new();
/// progress.record_lock(4);
/// assert_eq!(progress.total_cleared_lines(), 4);
/// assert_eq!(progress.clear_histogram()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    completed_pieces: usize,
    total_cleared_lines: usize,
    clear_histogram: [usize; 5],
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            completed_pieces: 0,
            total_cleared_lines: 0,
            clear_histogram: [0; 5],
        }
    }

    /// Total pieces locked into the grid.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    /// Total lines cleared over the whole game.
    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Locks by simultaneous clear count: `[0]` counts locks that cleared
    /// nothing, `[4]` counts quads.
    #[must_use]
    pub const fn clear_histogram(&self) -> &[usize; 5] {
        &self.clear_histogram
    }

    /// Current level, starting at 0 and advancing every
    /// [`LINES_PER_LEVEL`] cleared lines.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.total_cleared_lines / LINES_PER_LEVEL
    }

    /// Records one lock event. Returns `true` when the level advanced as a
    /// result.
    pub const fn record_lock(&mut self, cleared_lines: usize) -> bool {
        let level_before = self.level();
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if cleared_lines < self.clear_histogram.len() {
            self.clear_histogram[cleared_lines] += 1;
        }
        self.level() > level_before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_progress_is_zeroed() {
        let progress = Progress::new();
        assert_eq!(progress.completed_pieces(), 0);
        assert_eq!(progress.total_cleared_lines(), 0);
        assert_eq!(progress.level(), 0);
        assert_eq!(progress.clear_histogram(), &[0; 5]);
    }

    #[test]
    fn test_record_lock_counts() {
        let mut progress = Progress::new();
        progress.record_lock(0);
        progress.record_lock(2);
        progress.record_lock(4);

        assert_eq!(progress.completed_pieces(), 3);
        assert_eq!(progress.total_cleared_lines(), 6);
        assert_eq!(progress.clear_histogram(), &[1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_level_advances_on_threshold() {
        let mut progress = Progress::new();
        assert!(!progress.record_lock(4));
        assert_eq!(progress.level(), 0);

        // Crossing the 5-line threshold advances the level.
        assert!(progress.record_lock(1));
        assert_eq!(progress.level(), 1);

        assert!(!progress.record_lock(0));
        assert_eq!(progress.level(), 1);

        // A quad can jump past a threshold in one lock.
        progress.record_lock(4);
        assert!(progress.record_lock(4));
        assert_eq!(progress.level(), 2);
    }
}
