/*!
This module handles rotation of active [`Piece`]s: shape-grid index lookup
and the staged wall-kick search (direct fit → standard SRS kicks → fallback
kicks → full revert).
*/

use crate::{shapes, Board, Piece, Rotation, Tetromino};

/// The direction of a player rotation.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
pub enum RotateDirection {
    /// Rotate the piece by +90°.
    Clockwise,
    /// Rotate the piece by -90°.
    CounterClockwise,
}

/// What the most recent successful rotation did to the piece.
///
/// Consumed by T-spin detection and ground detection at lock time, then
/// discarded when the piece is placed.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Default, Debug)]
pub struct RotationOutcome {
    /// Whether any non-zero wall-kick offset was applied.
    pub kicked: bool,
    /// Whether the applied offset pushed the piece up the board.
    ///
    /// A just-kicked-up piece must not be treated as grounded for one tick.
    pub kicked_up: bool,
}

/// Computes the index into a type's 4×4 shape mask for the cell at
/// `(row, col)` under the given rotation.
///
/// The O piece ignores rotation entirely. The I piece uses four hand-coded
/// index permutations because its nominal rotation center sits between
/// cells. All other pieces rotate around the integer center `(1, 1)`;
/// `None` means the rotated cell falls outside the 4×4 grid and the caller
/// must treat it as empty.
pub fn rotated_index(
    tetromino: Tetromino,
    row: usize,
    col: usize,
    rotation: Rotation,
) -> Option<usize> {
    debug_assert!(row < 4 && col < 4);
    match tetromino {
        Tetromino::I => Some(match rotation {
            Rotation::R0 => row * 4 + col,
            Rotation::R1 => (3 - row) + col * 4,
            Rotation::R2 => (3 - col) + (3 - row) * 4,
            Rotation::R3 => row + (3 - col) * 4,
        }),
        Tetromino::O => Some(row * 4 + col),
        _ => {
            let rel_x = col as i16 - 1;
            let rel_y = row as i16 - 1;
            let (rot_x, rot_y) = match rotation {
                Rotation::R0 => (rel_x, rel_y),
                Rotation::R1 => (-rel_y, rel_x),
                Rotation::R2 => (-rel_x, -rel_y),
                Rotation::R3 => (rel_y, -rel_x),
            };
            let (fin_x, fin_y) = (rot_x + 1, rot_y + 1);
            if !(0..4).contains(&fin_x) || !(0..4).contains(&fin_y) {
                None
            } else {
                Some((fin_y * 4 + fin_x) as usize)
            }
        }
    }
}

/// Whether the cell at `(row, col)` of the 4×4 bounding box is filled for
/// the given type and rotation.
pub fn occupied(tetromino: Tetromino, row: usize, col: usize, rotation: Rotation) -> bool {
    rotated_index(tetromino, row, col, rotation)
        .is_some_and(|idx| shapes::SHAPES[tetromino as usize][idx] != 0)
}

/// Tries to rotate a piece in place against the board.
///
/// Returns `Some(outcome)` on success with the piece already updated, or
/// `None` with the piece byte-for-byte identical to its pre-call state.
///
/// The search is staged:
/// 1. O pieces are a no-op success.
/// 2. The un-kicked new orientation is tried first; accepting it directly
///    avoids the positional drift a plain table walk can introduce.
/// 3. The five standard SRS kicks for the transition. The transition index
///    follows the classic convention of this engine family: a
///    counterclockwise turn is keyed by the previous rotation state, a
///    clockwise turn by the new one.
/// 4. The extended fallback kick list for the piece's family.
pub fn try_rotate(
    piece: &mut Piece,
    board: &Board,
    direction: RotateDirection,
) -> Option<RotationOutcome> {
    if piece.tetromino == Tetromino::O {
        return Some(RotationOutcome::default());
    }

    let steps = match direction {
        RotateDirection::Clockwise => -1,
        RotateDirection::CounterClockwise => 1,
    };
    let previous = *piece;
    piece.rotation = previous.rotation.rotated_by(steps);

    // Direct, un-kicked fit.
    if board.is_valid(piece) {
        return Some(RotationOutcome::default());
    }

    let transition = match direction {
        RotateDirection::Clockwise => piece.rotation.index(),
        RotateDirection::CounterClockwise => previous.rotation.index(),
    };
    let standard = shapes::kick_table(piece.tetromino)[transition].iter();
    let fallback = shapes::fallback_kicks(piece.tetromino).iter();

    for &(dx, dy) in standard.chain(fallback) {
        if (dx, dy) == (0, 0) {
            continue;
        }
        piece.x = previous.x + dx;
        piece.y = previous.y + dy;
        if board.is_valid(piece) {
            return Some(RotationOutcome {
                kicked: true,
                kicked_up: dy < 0,
            });
        }
    }

    *piece = previous;
    None
}
