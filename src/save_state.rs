/*!
Session snapshots: a serde-friendly mirror of everything a save file needs
to resume a game, plus capture/restore on [`GameEngine`].

The on-disk format (typically JSON, owned by the host) uses camelCase keys
and serializes scores as numeric strings so no consumer can round them
through a float. Every field defaults safely, so partial or older files
still load.
*/

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::engine::GameEngine;
use crate::queue::PREVIEW_DEPTH;
use crate::rotation::RotationOutcome;
use crate::{Grid, Piece, Rotation, Tetromino, TileTypeID};

/// The current piece as persisted: type index plus pose.
#[derive(Eq, PartialEq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SavedPiece {
    /// Tetromino type index, 0..=6.
    #[serde(rename = "type")]
    pub piece_type: i8,
    /// Rotation index, 0..=3.
    pub rotation: u8,
    /// Column of the 4×4 box.
    pub x: i16,
    /// Row of the 4×4 box; may be negative.
    pub y: i16,
}

impl Default for SavedPiece {
    fn default() -> Self {
        Self::from(&crate::queue::spawn_piece(Tetromino::I))
    }
}

impl From<&Piece> for SavedPiece {
    fn from(piece: &Piece) -> Self {
        Self {
            piece_type: piece.tetromino as i8,
            rotation: piece.rotation.index() as u8,
            x: piece.x,
            y: piece.y,
        }
    }
}

impl SavedPiece {
    fn to_piece(self) -> Option<Piece> {
        Some(Piece {
            tetromino: Tetromino::from_index(self.piece_type)?,
            rotation: Rotation::from_index(self.rotation),
            x: self.x,
            y: self.y,
        })
    }
}

/// Everything a session snapshot persists.
#[derive(Eq, PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavedGame {
    /// Round score, as a numeric string.
    pub score: String,
    /// All-time high score, as a numeric string.
    pub max_high_score: String,
    /// Whether the game was paused when captured.
    pub paused: bool,
    /// Whether the round had already ended.
    pub game_over: bool,
    /// Total rows cleared this round.
    pub lines_cleared: u32,
    /// Level at capture time (1-based).
    pub level: u32,
    /// Whether the current piece already used the hold slot.
    pub has_swapped: bool,
    /// Whether the piece's most recent rotation applied a kick.
    pub last_wall_kick_applied: bool,
    /// Whether the previous clear was a Tetris (back-to-back state).
    pub previous_clear_was_tetris: bool,
    /// Whether the previous clear was a T-spin (back-to-back state).
    #[serde(rename = "previousClearWasTSpin")]
    pub previous_clear_was_tspin: bool,
    /// Length of the back-to-back chain, at least 1.
    pub back_to_back_count: u32,
    /// 20 rows of 10 cells, `0` empty, `1..=7` = type + 1.
    pub board: Vec<Vec<u8>>,
    /// The piece in play.
    pub current: SavedPiece,
    /// Held type index, absent when the hold slot is empty.
    pub hold: Option<i8>,
    /// Nearest upcoming piece's type index.
    pub next: i8,
    /// Second upcoming piece's type index.
    pub next1: i8,
    /// Third upcoming piece's type index.
    pub next2: i8,
}

impl Default for SavedGame {
    fn default() -> Self {
        Self {
            score: "0".to_string(),
            max_high_score: "0".to_string(),
            paused: false,
            game_over: false,
            lines_cleared: 0,
            level: 1,
            has_swapped: false,
            last_wall_kick_applied: false,
            previous_clear_was_tetris: false,
            previous_clear_was_tspin: false,
            back_to_back_count: 1,
            board: vec![vec![0; Board::WIDTH]; Board::HEIGHT],
            current: SavedPiece::default(),
            hold: None,
            next: Tetromino::J as i8,
            next1: Tetromino::L as i8,
            next2: Tetromino::S as i8,
        }
    }
}

impl SavedGame {
    fn to_grid(&self) -> Option<Grid> {
        if self.board.len() != Board::HEIGHT {
            return None;
        }
        let mut grid = Grid::default();
        for (y, row) in self.board.iter().enumerate() {
            if row.len() != Board::WIDTH {
                return None;
            }
            for (x, &cell) in row.iter().enumerate() {
                if cell > 7 {
                    return None;
                }
                grid[y][x] = TileTypeID::new(cell);
            }
        }
        Some(grid)
    }
}

impl GameEngine {
    /// Captures the persistable session state.
    pub fn snapshot(&self) -> SavedGame {
        let mut board = vec![vec![0u8; Board::WIDTH]; Board::HEIGHT];
        for (y, row) in self.board.grid().iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                board[y][x] = cell.map_or(0, TileTypeID::get);
            }
        }
        let preview = self.queue.preview();
        SavedGame {
            score: self.scores.score().to_string(),
            max_high_score: self.scores.max_high_score().to_string(),
            paused: self.paused,
            game_over: self.game_over,
            lines_cleared: self.scores.lines_cleared(),
            level: self.scores.level(),
            has_swapped: self.queue.has_swapped(),
            last_wall_kick_applied: self.last_rotation.is_some_and(|r| r.kicked),
            previous_clear_was_tetris: self.scores.previous_clear_was_tetris(),
            previous_clear_was_tspin: self.scores.previous_clear_was_tspin(),
            back_to_back_count: self.scores.back_to_back_count(),
            board,
            current: SavedPiece::from(self.queue.current()),
            hold: self.queue.hold().map(|t| t as i8),
            next: preview[0] as i8,
            next1: preview[1] as i8,
            next2: preview[2] as i8,
        }
    }

    /// Restores a captured session into this engine.
    ///
    /// Validates everything before touching any state, so a malformed
    /// snapshot leaves the engine untouched and returns `false` (the host
    /// then just keeps its fresh game). The in-memory high score is never
    /// lowered by a restore.
    pub fn restore(&mut self, saved: &SavedGame) -> bool {
        let Ok(score) = saved.score.parse::<u64>() else {
            return false;
        };
        let Ok(max_high_score) = saved.max_high_score.parse::<u64>() else {
            return false;
        };
        let Some(grid) = saved.to_grid() else {
            return false;
        };
        let Some(current) = saved.current.to_piece() else {
            return false;
        };
        // A piece in play always fits its own board; anything off-grid or
        // overlapping the stack would corrupt it or panic at placement.
        let board = Board::from_grid(grid);
        if !board.is_valid(&current) {
            return false;
        }
        let mut preview = [Tetromino::I; PREVIEW_DEPTH];
        for (slot, index) in [saved.next, saved.next1, saved.next2].into_iter().enumerate() {
            match Tetromino::from_index(index) {
                Some(tetromino) => preview[slot] = tetromino,
                None => return false,
            }
        }
        // `-1` is the classic empty-hold sentinel, equivalent to an absent
        // field.
        let hold = match saved.hold {
            None | Some(-1) => None,
            Some(index) => match Tetromino::from_index(index) {
                Some(tetromino) => Some(tetromino),
                None => return false,
            },
        };

        self.board = board;
        self.queue.restore(current, preview, hold, saved.has_swapped);
        self.scores.restore(
            score,
            max_high_score,
            saved.lines_cleared,
            saved.level,
            saved.previous_clear_was_tetris,
            saved.previous_clear_was_tspin,
            saved.back_to_back_count,
        );
        self.last_rotation = saved.last_wall_kick_applied.then_some(RotationOutcome {
            kicked: true,
            kicked_up: false,
        });
        self.timer.reset_for_spawn();
        self.shift.clear();
        self.soft_drop.clear();
        self.soft_drop_rows = 0;
        self.last_clear = None;
        self.paused = saved.paused;
        self.game_over = saved.game_over;
        true
    }
}
