/*!
# Blockfall Engine

`blockfall_engine` is the game-state core of a falling-block puzzle game:
the piece/board model, Super Rotation System wall kicks with a fallback
search, gravity and lock-delay timing, DAS/ARR input shaping, and
line-clear/back-to-back/T-spin scoring.

Rendering, raw input decoding and save-file I/O are external collaborators:
they read the engine's state between ticks and feed it abstract [`Intent`]s
and raw direction press/release signals.

# Examples

```
use blockfall_engine::{GameEngine, Intent, ShiftDirection};
use std::time::Duration;

// Starting up a game with a reproducible piece sequence.
let mut engine = GameEngine::builder().seed(42).build();

// A frame tick: feed elapsed wall time, then read state for rendering.
engine.update(Duration::from_millis(16));

// Abstract input intents from the host's button mapping.
engine.handle(Intent::RotateCw);
engine.press(ShiftDirection::Left);

// ...

engine.release(ShiftDirection::Left);
assert_eq!(engine.lines_cleared(), 0);
```
*/

#![warn(missing_docs)]

mod board;
mod engine;
mod input;
mod queue;
mod rotation;
mod save_state;
mod scoring;
mod shapes;
mod timing;

use std::num::NonZeroU8;

pub use board::Board;
pub use engine::{EngineBuilder, GameEngine, Intent};
pub use input::{DropRepeater, InputShaper, ShiftDirection};
pub use queue::{PieceQueue, PREVIEW_DEPTH};
pub use rotation::{occupied, rotated_index, try_rotate, RotateDirection, RotationOutcome};
pub use save_state::{SavedGame, SavedPiece};
pub use scoring::{detect_tspin, ClearOutcome, ScoreKeeper, TSpin};
pub use timing::{fall_speed, LockTimer};

/// Abstract identifier for which type of tile occupies a cell in the grid.
///
/// The stored value is the owning tetromino's type index plus one, so every
/// board cell is `None` or `1..=7`.
pub type TileTypeID = NonZeroU8;
/// The type of horizontal lines of the playing grid.
pub type Line = [Option<TileTypeID>; Board::WIDTH];
/// The type of the entire two-dimensional playing grid, row 0 at the top.
pub type Grid = [Line; Board::HEIGHT];

/// Represents one of the seven "Tetrominos".
///
/// The discriminants match the classic shape-table order, which is also the
/// order persisted in session snapshots.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Tetromino {
    /// 'I'-Tetromino. Four squares in one straight line.
    I = 0,
    /// 'J'-Tetromino. Four squares in a 'J'-shape.
    J,
    /// 'L'-Tetromino. Four squares in an 'L'-shape.
    L,
    /// 'O'-Tetromino. Four squares as one big square; never rotates.
    O,
    /// 'S'-Tetromino. Four squares in an 'S'-snaking manner.
    S,
    /// 'T'-Tetromino. Four squares in a 'T'-junction shape.
    T,
    /// 'Z'-Tetromino. Four squares in a 'Z'-snaking manner.
    Z,
}

impl Tetromino {
    /// All `Tetromino` enum variants in order.
    ///
    /// Note that `Tetromino::VARIANTS[t as usize] == t` always holds.
    pub const VARIANTS: [Self; 7] = {
        use Tetromino::*;
        [I, J, L, O, S, T, Z]
    };

    /// Returns the convened-on tile id corresponding to the given tetromino.
    pub const fn tile_type_id(&self) -> TileTypeID {
        // SAFETY: `*self as u8 + 1 > 0`.
        unsafe { NonZeroU8::new_unchecked(*self as u8 + 1) }
    }

    /// Looks a tetromino up by its snapshot type index; `None` for anything
    /// outside `0..=6` (snapshots use `-1` as the empty-hold sentinel).
    pub fn from_index(index: i8) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::VARIANTS.get(i).copied())
    }
}

/// Represents the orientation an active piece can be in.
///
/// Note that clockwise player rotation *decrements* this value, matching the
/// transition keying of the wall-kick tables.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Rotation {
    /// Spawn orientation.
    R0 = 0,
    /// One step.
    R1,
    /// Two steps (180°).
    R2,
    /// Three steps.
    R3,
}

impl Rotation {
    /// All `Rotation` enum variants in order.
    ///
    /// Note that `Rotation::VARIANTS[r as usize] == r` always holds.
    pub const VARIANTS: [Self; 4] = {
        use Rotation::*;
        [R0, R1, R2, R3]
    };

    /// This rotation's index into the wall-kick tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Find a new rotation state by turning some number of steps.
    ///
    /// This accepts `i8` to allow for both rotation directions.
    pub fn rotated_by(self, steps: i8) -> Self {
        Self::VARIANTS[(self as i8 + steps).rem_euclid(4) as usize]
    }

    /// Looks a rotation state up by its snapshot index, wrapping modulo 4.
    pub fn from_index(index: u8) -> Self {
        Self::VARIANTS[(index % 4) as usize]
    }
}

/// An active tetromino in play.
///
/// `(x, y)` is the top-left corner of the 4×4 bounding box the shape table
/// is indexed into; `y` grows downward and may be negative while a piece
/// still pokes above the visible board.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Piece {
    /// Type of tetromino the active piece is.
    pub tetromino: Tetromino,
    /// In which way the tetromino is re-oriented.
    pub rotation: Rotation,
    /// Horizontal position of the bounding box on the board.
    pub x: i16,
    /// Vertical position of the bounding box on the board.
    pub y: i16,
}

impl Piece {
    /// Returns the absolute board coordinates of the piece's four filled
    /// cells.
    pub fn cells(&self) -> [(i16, i16); 4] {
        let mut out = [(0, 0); 4];
        let mut n = 0;
        for row in 0..4 {
            for col in 0..4 {
                if occupied(self.tetromino, row, col, self.rotation) {
                    out[n] = (self.x + col as i16, self.y + row as i16);
                    n += 1;
                }
            }
        }
        debug_assert_eq!(n, 4, "a tetromino always fills exactly four cells");
        out
    }

    /// The same piece translated by `(dx, dy)`.
    pub fn offset(&self, dx: i16, dy: i16) -> Piece {
        Piece {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}
