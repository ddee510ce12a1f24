/*!
Static tetromino data: 4×4 occupancy masks, the SRS wall-kick tables, and the
extended fallback kick sets tried when standard SRS gives up.
*/

use crate::Tetromino;

/// A positional nudge `(dx, dy)` tried during a rotation attempt;
/// `dy > 0` points down the board.
pub type Kick = (i16, i16);

/// Per-type 4×4 occupancy masks in spawn orientation, row-major.
#[rustfmt::skip]
pub const SHAPES: [[u8; 16]; 7] = [
    // I
    [ 0,0,0,0,
      1,1,1,1,
      0,0,0,0,
      0,0,0,0 ],
    // J
    [ 1,0,0,0,
      1,1,1,0,
      0,0,0,0,
      0,0,0,0 ],
    // L
    [ 0,0,1,0,
      1,1,1,0,
      0,0,0,0,
      0,0,0,0 ],
    // O
    [ 1,1,0,0,
      1,1,0,0,
      0,0,0,0,
      0,0,0,0 ],
    // S
    [ 0,1,1,0,
      1,1,0,0,
      0,0,0,0,
      0,0,0,0 ],
    // T
    [ 0,1,0,0,
      1,1,1,0,
      0,0,0,0,
      0,0,0,0 ],
    // Z
    [ 1,1,0,0,
      0,1,1,0,
      0,0,0,0,
      0,0,0,0 ],
];

/// SRS wall kicks for the I piece, indexed by transition.
#[rustfmt::skip]
pub const KICKS_I: [[Kick; 5]; 4] = [
    // 0 -> 1, 1 -> 0
    [ (0, 0), (-2, 0), ( 1, 0), (-2, -1), ( 1,  2) ],
    // 1 -> 2, 2 -> 1
    [ (0, 0), (-1, 0), ( 2, 0), (-1,  2), ( 2, -1) ],
    // 2 -> 3, 3 -> 2
    [ (0, 0), ( 2, 0), (-1, 0), ( 2,  1), (-1, -2) ],
    // 3 -> 0, 0 -> 3
    [ (0, 0), ( 1, 0), (-2, 0), ( 1, -2), (-2,  1) ],
];

/// SRS wall kicks shared by the J, L, S, T and Z pieces, indexed by
/// transition. (O never rotates and never needs a kick.)
#[rustfmt::skip]
pub const KICKS_JLSTZ: [[Kick; 5]; 4] = [
    // 0 -> 1, 1 -> 0
    [ (0, 0), (-1, 0), (-1, -1), (0,  2), (-1,  2) ],
    // 1 -> 2, 2 -> 1
    [ (0, 0), ( 1, 0), ( 1,  1), (0, -2), ( 1, -2) ],
    // 2 -> 3, 3 -> 2
    [ (0, 0), ( 1, 0), ( 1, -1), (0,  2), ( 1,  2) ],
    // 3 -> 0, 0 -> 3
    [ (0, 0), (-1, 0), (-1,  1), (0, -2), (-1, -2) ],
];

/// Last-resort offsets tried after every standard SRS kick failed, to
/// recover rotations flush against walls or the stack. The I piece gets a
/// wider up/down/lateral set because its bounding box is the largest.
#[rustfmt::skip]
pub const FALLBACK_KICKS_I: &[Kick] = &[
    ( 0, -1), ( 0, -2), ( 0, 1), ( 0, 2),
    (-2, -1), ( 2, -1), (-1, -2), ( 1, -2),
    (-2,  1), ( 2,  1),
];

/// Last-resort offsets for the J, L, S, T and Z pieces.
#[rustfmt::skip]
pub const FALLBACK_KICKS_JLSTZ: &[Kick] = &[
    ( 0, -1), ( 0, 1),
    (-1, -1), ( 1, -1), (-1, 1), ( 1, 1),
    ( 0, -2), ( 0, 2),
];

/// The standard kick table for a piece type.
pub const fn kick_table(tetromino: Tetromino) -> &'static [[Kick; 5]; 4] {
    match tetromino {
        Tetromino::I => &KICKS_I,
        _ => &KICKS_JLSTZ,
    }
}

/// The fallback kick list for a piece type.
pub const fn fallback_kicks(tetromino: Tetromino) -> &'static [Kick] {
    match tetromino {
        Tetromino::I => FALLBACK_KICKS_I,
        _ => FALLBACK_KICKS_JLSTZ,
    }
}
