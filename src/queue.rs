/*!
This module handles random generation of [`Tetromino`]s, the fixed-depth
lookahead, spawning, and the hold slot.
*/

use std::collections::VecDeque;

use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha12Rng};

use crate::{rotation, Board, Piece, Rotation, Tetromino};

/// The internal PRNG used by a game.
pub type GameRng = ChaCha12Rng;

/// How many upcoming pieces are visible beyond `current`.
pub const PREVIEW_DEPTH: usize = 3;

/// RNG-driven generator producing the stream of pieces in play.
///
/// Draws are uniformly random over the seven types, with no bag fairness;
/// a fixed seed makes the whole stream reproducible. Holds `current` plus a
/// [`PREVIEW_DEPTH`]-deep lookahead and the single hold slot with its
/// once-per-piece swap gate.
#[derive(Eq, PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PieceQueue {
    rng: GameRng,
    /// Pieces consumed before any RNG draw; lets callers script a sequence.
    scripted: VecDeque<Tetromino>,
    current: Piece,
    preview: [Tetromino; PREVIEW_DEPTH],
    hold: Option<Tetromino>,
    has_swapped: bool,
}

impl PieceQueue {
    /// Creates a queue from a PRNG seed, drawing `current` and the preview.
    pub fn new(seed: u64) -> Self {
        Self::with_script(seed, [])
    }

    /// Creates a queue whose first draws are taken from `script` before the
    /// PRNG takes over. Used by reproducible setups and tests.
    pub fn with_script(seed: u64, script: impl IntoIterator<Item = Tetromino>) -> Self {
        let mut queue = Self {
            rng: GameRng::seed_from_u64(seed),
            scripted: script.into_iter().collect(),
            current: spawn_piece(Tetromino::I),
            preview: [Tetromino::I; PREVIEW_DEPTH],
            hold: None,
            has_swapped: false,
        };
        queue.current = spawn_piece(queue.draw());
        for slot in 0..PREVIEW_DEPTH {
            queue.preview[slot] = queue.draw();
        }
        queue
    }

    fn draw(&mut self) -> Tetromino {
        self.scripted
            .pop_front()
            .unwrap_or_else(|| Tetromino::VARIANTS[self.rng.random_range(0..=6)])
    }

    /// The active piece.
    pub const fn current(&self) -> &Piece {
        &self.current
    }

    /// Mutable access to the active piece, for the engine's move/rotate
    /// operations.
    pub(crate) fn current_mut(&mut self) -> &mut Piece {
        &mut self.current
    }

    /// The upcoming pieces, nearest first.
    pub const fn preview(&self) -> &[Tetromino; PREVIEW_DEPTH] {
        &self.preview
    }

    /// The piece in the hold slot, if any.
    pub const fn hold(&self) -> Option<Tetromino> {
        self.hold
    }

    /// Whether the hold slot has already been used during the current
    /// piece's lifetime.
    pub const fn has_swapped(&self) -> bool {
        self.has_swapped
    }

    /// Shifts the lookahead into `current` and draws a fresh tail piece.
    ///
    /// Returns `false` when the freshly spawned piece is immediately
    /// invalid, which is the caller's game-over signal.
    pub fn spawn_next(&mut self, board: &Board) -> bool {
        self.current = spawn_piece(self.preview[0]);
        self.preview.rotate_left(1);
        self.preview[PREVIEW_DEPTH - 1] = self.draw();
        board.is_valid(&self.current)
    }

    /// Swaps the current piece with the hold slot, or fills an empty hold
    /// slot and spawns from the lookahead instead.
    ///
    /// Both pieces are reset to spawn position and rotation. Only usable
    /// once per piece lifetime; returns `false` (and changes nothing) when
    /// the gate is closed. The caller re-checks the new current piece's
    /// validity, as after any spawn.
    pub fn swap_hold(&mut self, board: &Board) -> bool {
        if self.has_swapped {
            return false;
        }
        self.has_swapped = true;
        match self.hold.take() {
            None => {
                self.hold = Some(self.current.tetromino);
                self.spawn_next(board);
            }
            Some(held) => {
                self.hold = Some(self.current.tetromino);
                self.current = spawn_piece(held);
            }
        }
        true
    }

    /// Starts a new round on the same PRNG stream: empties the hold slot
    /// and redraws `current` and the lookahead.
    pub(crate) fn reset_round(&mut self) {
        self.hold = None;
        self.has_swapped = false;
        self.current = spawn_piece(self.draw());
        for slot in 0..PREVIEW_DEPTH {
            self.preview[slot] = self.draw();
        }
    }

    /// Re-arms the hold gate; called whenever a piece is placed.
    pub fn end_piece(&mut self) {
        self.has_swapped = false;
    }

    /// Restores queue contents from a session snapshot.
    pub(crate) fn restore(
        &mut self,
        current: Piece,
        preview: [Tetromino; PREVIEW_DEPTH],
        hold: Option<Tetromino>,
        has_swapped: bool,
    ) {
        self.current = current;
        self.preview = preview;
        self.hold = hold;
        self.has_swapped = has_swapped;
    }
}

/// Builds a piece at its spawn location: the occupied column span centered
/// over the board, and the bottommost occupied row sitting at board row 0
/// (so taller shapes poke above the visible area with negative `y`).
pub fn spawn_piece(tetromino: Tetromino) -> Piece {
    let mut min_col = 3;
    let mut max_col = 0;
    let mut max_row = 0;
    for row in 0..4 {
        for col in 0..4 {
            if rotation::occupied(tetromino, row, col, Rotation::R0) {
                min_col = min_col.min(col);
                max_col = max_col.max(col);
                max_row = max_row.max(row);
            }
        }
    }
    let span = (max_col - min_col + 1) as i16;
    Piece {
        tetromino,
        rotation: Rotation::R0,
        x: (Board::WIDTH as i16 - span) / 2 - min_col as i16,
        y: -(max_row as i16),
    }
}
