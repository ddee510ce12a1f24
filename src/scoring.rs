/*!
Line-clear scoring: T-spin detection, base values, the back-to-back bonus
chain, and level progression.
*/

use crate::board::Board;
use crate::rotation::RotationOutcome;
use crate::{Piece, Tetromino};

/// T-spin classification of a locking piece.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum TSpin {
    /// Not a T-spin.
    #[default]
    None,
    /// The last rotation kicked, but the corner test failed.
    Mini,
    /// At least three of the four corners around the center are blocked.
    Full,
}

/// Scoring result of a lock that cleared at least one line.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Debug)]
pub struct ClearOutcome {
    /// How many rows were removed.
    pub lines: u32,
    /// Points awarded, already multiplied by the level at clear time.
    pub score_delta: u64,
    /// Feedback text for the UI ("Tetris", "T-Spin\nDouble", "3x Tetris", ..).
    pub label: String,
}

/// Classifies the locking piece as a T-spin, a mini T-spin, or neither.
///
/// Only the T piece qualifies, and only when its final action was a
/// rotation that applied a non-zero kick. A full T-spin additionally needs
/// at least 3 of the 4 diagonal neighbors of the piece's center cell
/// occupied or out of bounds; a kick without that corner count is a mini.
pub fn detect_tspin(board: &Board, piece: &Piece, last_rotation: Option<RotationOutcome>) -> TSpin {
    if piece.tetromino != Tetromino::T {
        return TSpin::None;
    }
    let Some(outcome) = last_rotation else {
        return TSpin::None;
    };
    if !outcome.kicked {
        return TSpin::None;
    }
    let (cx, cy) = (piece.x + 1, piece.y + 1);
    let corners = [(cx - 1, cy - 1), (cx + 1, cy - 1), (cx - 1, cy + 1), (cx + 1, cy + 1)];
    let blocked = corners.iter().filter(|&&(x, y)| board.blocked(x, y)).count();
    if blocked >= 3 {
        TSpin::Full
    } else {
        TSpin::Mini
    }
}

/// Score, level and back-to-back bookkeeping for one session.
///
/// `score` resets with each round; `max_high_score` only ever rises, even
/// across [`ScoreKeeper::reset`].
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ScoreKeeper {
    score: u64,
    max_high_score: u64,
    lines_cleared: u32,
    level: u32,
    previous_clear_was_tetris: bool,
    previous_clear_was_tspin: bool,
    back_to_back_count: u32,
}

impl Default for ScoreKeeper {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreKeeper {
    /// A fresh session at level 1.
    pub const fn new() -> Self {
        Self {
            score: 0,
            max_high_score: 0,
            lines_cleared: 0,
            level: 1,
            previous_clear_was_tetris: false,
            previous_clear_was_tspin: false,
            back_to_back_count: 1,
        }
    }

    /// Points scored this round.
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Best score ever reached; survives resets.
    pub const fn max_high_score(&self) -> u64 {
        self.max_high_score
    }

    /// Total rows cleared this round.
    pub const fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    /// Current level (1-based); rises every 10 cleared rows.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Length of the current back-to-back chain (1 = no chain).
    pub const fn back_to_back_count(&self) -> u32 {
        self.back_to_back_count
    }

    /// Whether the previous clear extends a back-to-back chain.
    pub const fn previous_clear_was_tetris(&self) -> bool {
        self.previous_clear_was_tetris
    }

    /// Whether the previous clear was a T-spin.
    pub const fn previous_clear_was_tspin(&self) -> bool {
        self.previous_clear_was_tspin
    }

    /// Awards flat points (soft/hard drop distance) outside the clear
    /// formula.
    pub fn award(&mut self, points: u64) {
        self.score += points;
        self.max_high_score = self.max_high_score.max(self.score);
    }

    /// Removes full rows from the board and scores them.
    ///
    /// Returns `None` when nothing cleared. The level multiplier uses the
    /// level *before* this clear's lines are counted toward progression. A
    /// Tetris or any T-spin clear qualifies for the back-to-back chain;
    /// chained qualifying clears get the base multiplied by 1.5, truncated.
    /// Any non-qualifying clear breaks the chain.
    pub fn clear_lines(&mut self, board: &mut Board, tspin: TSpin) -> Option<ClearOutcome> {
        let (lines, _rows) = board.clear_full_rows();
        if lines == 0 {
            return None;
        }

        let is_tspin = tspin != TSpin::None;
        let base: u64 = match lines {
            1 => match tspin {
                TSpin::Full => 400,
                TSpin::Mini | TSpin::None => 100,
            },
            2 => {
                if tspin == TSpin::Full {
                    700
                } else {
                    300
                }
            }
            3 => 500,
            _ => 800,
        };

        let qualifying = lines == 4 || is_tspin;
        let chained =
            qualifying && (self.previous_clear_was_tetris || self.previous_clear_was_tspin);
        self.back_to_back_count = if chained { self.back_to_back_count + 1 } else { 1 };
        let adjusted = if chained { base * 3 / 2 } else { base };
        let score_delta = adjusted * u64::from(self.level);

        self.score += score_delta;
        self.max_high_score = self.max_high_score.max(self.score);
        self.lines_cleared += lines;
        self.level = 1 + self.lines_cleared / 10;
        self.previous_clear_was_tetris = lines == 4;
        self.previous_clear_was_tspin = is_tspin;

        let label = match (lines, tspin) {
            (1, TSpin::Full) => "T-Spin\nSingle".to_string(),
            (2, TSpin::Full) => "T-Spin\nDouble".to_string(),
            (4, _) if self.back_to_back_count >= 2 => {
                format!("{}x Tetris", self.back_to_back_count)
            }
            (1, _) => "Single".to_string(),
            (2, _) => "Double".to_string(),
            (3, _) => "Triple".to_string(),
            _ => "Tetris".to_string(),
        };

        Some(ClearOutcome { lines, score_delta, label })
    }

    /// Starts a new round; the high score is kept.
    pub fn reset(&mut self) {
        let max_high_score = self.max_high_score;
        *self = Self::new();
        self.max_high_score = max_high_score;
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        &mut self,
        score: u64,
        max_high_score: u64,
        lines_cleared: u32,
        level: u32,
        previous_clear_was_tetris: bool,
        previous_clear_was_tspin: bool,
        back_to_back_count: u32,
    ) {
        self.score = score;
        // A load must never lower the high score already in memory.
        self.max_high_score = self.max_high_score.max(max_high_score).max(score);
        self.lines_cleared = lines_cleared;
        self.level = level.max(1);
        self.previous_clear_was_tetris = previous_clear_was_tetris;
        self.previous_clear_was_tspin = previous_clear_was_tspin;
        self.back_to_back_count = back_to_back_count.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::RotationOutcome;
    use crate::{Board, Rotation};

    fn fill_bottom_rows(board: &mut Board, rows: usize) {
        let tile = Tetromino::J.tile_type_id();
        for y in (Board::HEIGHT - rows)..Board::HEIGHT {
            for x in 0..Board::WIDTH {
                board.set(x, y, Some(tile));
            }
        }
    }

    #[test]
    fn base_values_scale_with_level() {
        for (rows, expected, label) in
            [(1, 100, "Single"), (2, 300, "Double"), (3, 500, "Triple"), (4, 800, "Tetris")]
        {
            let mut board = Board::new();
            fill_bottom_rows(&mut board, rows);
            let mut scores = ScoreKeeper::new();
            let outcome = scores.clear_lines(&mut board, TSpin::None).unwrap();
            assert_eq!(outcome.lines, rows as u32);
            assert_eq!(outcome.score_delta, expected);
            assert_eq!(outcome.label, label);
        }
    }

    #[test]
    fn back_to_back_tetris_gets_the_bonus_and_label() {
        let mut scores = ScoreKeeper::new();
        let mut board = Board::new();
        fill_bottom_rows(&mut board, 4);
        let first = scores.clear_lines(&mut board, TSpin::None).unwrap();
        assert_eq!(first.score_delta, 800);
        assert_eq!(first.label, "Tetris");

        fill_bottom_rows(&mut board, 4);
        let second = scores.clear_lines(&mut board, TSpin::None).unwrap();
        assert_eq!(second.score_delta, 1200);
        assert_eq!(second.label, "2x Tetris");
        assert_eq!(scores.back_to_back_count(), 2);
        assert_eq!(scores.score(), 2000);
    }

    #[test]
    fn a_plain_clear_breaks_the_chain() {
        let mut scores = ScoreKeeper::new();
        let mut board = Board::new();
        fill_bottom_rows(&mut board, 4);
        scores.clear_lines(&mut board, TSpin::None).unwrap();

        fill_bottom_rows(&mut board, 1);
        scores.clear_lines(&mut board, TSpin::None).unwrap();
        assert_eq!(scores.back_to_back_count(), 1);

        // The next Tetris starts a fresh chain, no bonus.
        fill_bottom_rows(&mut board, 4);
        let outcome = scores.clear_lines(&mut board, TSpin::None).unwrap();
        assert_eq!(outcome.score_delta, 800);
        assert_eq!(outcome.label, "Tetris");
    }

    #[test]
    fn tspin_clears_score_and_chain() {
        let mut scores = ScoreKeeper::new();
        let mut board = Board::new();
        fill_bottom_rows(&mut board, 1);
        let single = scores.clear_lines(&mut board, TSpin::Full).unwrap();
        assert_eq!(single.score_delta, 400);
        assert_eq!(single.label, "T-Spin\nSingle");

        fill_bottom_rows(&mut board, 2);
        let double = scores.clear_lines(&mut board, TSpin::Full).unwrap();
        assert_eq!(double.score_delta, 700 * 3 / 2);
        assert_eq!(double.label, "T-Spin\nDouble");
    }

    #[test]
    fn level_rises_every_ten_lines_with_carry() {
        let mut scores = ScoreKeeper::new();
        let mut board = Board::new();
        assert_eq!(scores.level(), 1);
        for _ in 0..3 {
            fill_bottom_rows(&mut board, 4);
            scores.clear_lines(&mut board, TSpin::None).unwrap();
        }
        // 12 lines total: level 2 with 2 lines carried toward level 3.
        assert_eq!(scores.lines_cleared(), 12);
        assert_eq!(scores.level(), 2);
        for _ in 0..2 {
            fill_bottom_rows(&mut board, 4);
            scores.clear_lines(&mut board, TSpin::None).unwrap();
        }
        assert_eq!(scores.level(), 3);
    }

    #[test]
    fn the_multiplier_uses_the_level_before_the_clear() {
        let mut scores = ScoreKeeper::new();
        let mut board = Board::new();
        for _ in 0..2 {
            fill_bottom_rows(&mut board, 4);
            scores.clear_lines(&mut board, TSpin::None).unwrap();
        }
        // 8 lines so far, still level 1. This Tetris crosses into level 2
        // but is paid at level 1.
        fill_bottom_rows(&mut board, 4);
        let outcome = scores.clear_lines(&mut board, TSpin::None).unwrap();
        assert_eq!(outcome.score_delta, 800 * 3 / 2);
        assert_eq!(scores.level(), 2);
    }

    #[test]
    fn reset_keeps_only_the_high_score() {
        let mut scores = ScoreKeeper::new();
        scores.award(5000);
        scores.reset();
        assert_eq!(scores.score(), 0);
        assert_eq!(scores.level(), 1);
        assert_eq!(scores.max_high_score(), 5000);
    }

    #[test]
    fn tspin_detection_needs_t_kick_and_corners() {
        let mut board = Board::new();
        let kicked = Some(RotationOutcome { kicked: true, kicked_up: false });

        // T resting at the bottom-left corner: center (1,18); corners
        // (0,17) and (2,17) are empty, (0,19) and (2,19) filled below.
        let piece =
            Piece { tetromino: Tetromino::T, rotation: Rotation::R0, x: 0, y: 17 };
        let tile = Tetromino::S.tile_type_id();
        board.set(0, 19, Some(tile));
        board.set(2, 19, Some(tile));
        assert_eq!(detect_tspin(&board, &piece, kicked), TSpin::Mini);

        // Filling one upper corner reaches the 3-of-4 threshold.
        board.set(0, 17, Some(tile));
        assert_eq!(detect_tspin(&board, &piece, kicked), TSpin::Full);

        // No kick, or not a T: never a T-spin.
        assert_eq!(
            detect_tspin(&board, &piece, Some(RotationOutcome::default())),
            TSpin::None
        );
        assert_eq!(detect_tspin(&board, &piece, None), TSpin::None);
        let not_t = Piece { tetromino: Tetromino::S, ..piece };
        assert_eq!(detect_tspin(&board, &not_t, kicked), TSpin::None);
    }

    #[test]
    fn out_of_bounds_corners_count_as_blocked() {
        let board = Board::new();
        // Center at (0,19): three corners are outside the board.
        let piece =
            Piece { tetromino: Tetromino::T, rotation: Rotation::R0, x: -1, y: 18 };
        let kicked = Some(RotationOutcome { kicked: true, kicked_up: false });
        assert_eq!(detect_tspin(&board, &piece, kicked), TSpin::Full);
    }
}
