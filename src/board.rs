/*!
The playing grid: collision/validity queries, piece placement and row
clearing.
*/

use crate::{Grid, Line, Piece, TileTypeID};

/// The main playing grid storing empty (`None`) and filled, fixed tiles
/// (`Some(nz_u8)`). Row 0 is the top of the board; `y` grows downward.
#[derive(Eq, PartialEq, Clone, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Board {
    grid: Grid,
}

impl Board {
    /// The game field width.
    pub const WIDTH: usize = 10;
    /// The game field height.
    pub const HEIGHT: usize = 20;

    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board over an already-validated grid, for restores.
    pub(crate) const fn from_grid(grid: Grid) -> Self {
        Self { grid }
    }

    /// Read accessor for the whole grid, for rendering and snapshots.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Read accessor for a single cell; out-of-bounds reads as empty.
    pub fn cell(&self, x: usize, y: usize) -> Option<TileTypeID> {
        self.grid.get(y)?.get(x).copied().flatten()
    }

    /// Write accessor for a single cell, used by the persistence layer when
    /// reconstructing a board; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, tile: Option<TileTypeID>) {
        if let Some(cell) = self.grid.get_mut(y).and_then(|line| line.get_mut(x)) {
            *cell = tile;
        }
    }

    /// Whether `(x, y)` lies outside the board or on a filled cell.
    ///
    /// Used by T-spin corner detection, where walls and floor count as
    /// blocked.
    pub fn blocked(&self, x: i16, y: i16) -> bool {
        if !(0..Self::WIDTH as i16).contains(&x) || !(0..Self::HEIGHT as i16).contains(&y) {
            return true;
        }
        self.grid[y as usize][x as usize].is_some()
    }

    /// Checks whether the piece fits at its current location onto the board.
    ///
    /// Filled cells above the visible board (`y < 0`) are treated as always
    /// free; anything outside `[0, WIDTH)` horizontally or at
    /// `y >= HEIGHT`, or overlapping a filled cell, does not fit. No side
    /// effects.
    pub fn is_valid(&self, piece: &Piece) -> bool {
        piece.cells().iter().all(|&(x, y)| {
            if !(0..Self::WIDTH as i16).contains(&x) || y >= Self::HEIGHT as i16 {
                return false;
            }
            y < 0 || self.grid[y as usize][x as usize].is_none()
        })
    }

    /// Writes the piece's tile id into every in-bounds filled cell.
    ///
    /// Cells that would land at `y < 0` are not written; the return value
    /// reports whether any such cell existed, which is the caller's
    /// game-over trigger.
    pub fn place(&mut self, piece: &Piece) -> bool {
        let tile = piece.tetromino.tile_type_id();
        let mut above_board = false;
        for (x, y) in piece.cells() {
            if y < 0 {
                above_board = true;
            } else {
                self.grid[y as usize][x as usize] = Some(tile);
            }
        }
        above_board
    }

    /// Scans rows top-to-bottom for full ones; each full row is removed by
    /// shifting everything above it down one and zeroing the new top row.
    ///
    /// Returns the number of cleared rows and their (pre-shift) indices.
    /// Shifting per matched row in ascending order closes each gap
    /// immediately, so simultaneous clears need no compaction pass.
    pub fn clear_full_rows(&mut self) -> (u32, Vec<usize>) {
        let mut cleared = Vec::new();
        for y in 0..Self::HEIGHT {
            if self.grid[y].iter().all(|tile| tile.is_some()) {
                // The full row wraps to the top and is blanked.
                self.grid[..=y].rotate_right(1);
                self.grid[0] = Line::default();
                cleared.push(y);
            }
        }
        (cleared.len() as u32, cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rotation, Tetromino};

    fn piece(tetromino: Tetromino, x: i16, y: i16) -> Piece {
        Piece {
            tetromino,
            rotation: Rotation::R0,
            x,
            y,
        }
    }

    fn tile(t: Tetromino) -> Option<TileTypeID> {
        Some(t.tile_type_id())
    }

    fn fill_row(board: &mut Board, y: usize) {
        for x in 0..Board::WIDTH {
            board.set(x, y, tile(Tetromino::Z));
        }
    }

    #[test]
    fn validity_respects_walls_floor_and_stack() {
        let mut board = Board::new();
        assert!(board.is_valid(&piece(Tetromino::O, 4, 10)));
        // Left and right walls.
        assert!(!board.is_valid(&piece(Tetromino::O, -1, 10)));
        assert!(!board.is_valid(&piece(Tetromino::O, 9, 10)));
        // Floor: O fills rows 0..=1 of its box.
        assert!(board.is_valid(&piece(Tetromino::O, 4, 18)));
        assert!(!board.is_valid(&piece(Tetromino::O, 4, 19)));
        // Stack collision.
        board.set(4, 10, tile(Tetromino::I));
        assert!(!board.is_valid(&piece(Tetromino::O, 4, 10)));
    }

    #[test]
    fn cells_above_the_board_are_always_free() {
        let board = Board::new();
        // O sticking out the top: rows -1 and 0.
        assert!(board.is_valid(&piece(Tetromino::O, 4, -1)));
        // Fully above is also fine as far as validity is concerned.
        assert!(board.is_valid(&piece(Tetromino::O, 4, -2)));
    }

    #[test]
    fn place_writes_the_type_keyed_tile_id() {
        let mut board = Board::new();
        assert!(!board.place(&piece(Tetromino::T, 3, 10)));
        // T occupies (1,0),(0,1),(1,1),(2,1) of its box.
        assert_eq!(board.cell(4, 10), tile(Tetromino::T));
        assert_eq!(board.cell(3, 11), tile(Tetromino::T));
        assert_eq!(board.cell(4, 11), tile(Tetromino::T));
        assert_eq!(board.cell(5, 11), tile(Tetromino::T));
        assert_eq!(board.cell(3, 10), None);
    }

    #[test]
    fn place_reports_cells_lost_above_the_board() {
        let mut board = Board::new();
        assert!(board.place(&piece(Tetromino::O, 4, -1)));
        // The in-bounds half is still written.
        assert_eq!(board.cell(4, 0), tile(Tetromino::O));
        assert_eq!(board.cell(5, 0), tile(Tetromino::O));
    }

    #[test]
    fn single_full_row_shifts_everything_above_down() {
        let mut board = Board::new();
        board.set(0, 17, tile(Tetromino::J));
        fill_row(&mut board, 18);
        board.set(3, 19, tile(Tetromino::L));

        let (count, rows) = board.clear_full_rows();
        assert_eq!(count, 1);
        assert_eq!(rows, vec![18]);
        // The marker above moved down one; the row below stayed put.
        assert_eq!(board.cell(0, 18), tile(Tetromino::J));
        assert_eq!(board.cell(0, 17), None);
        assert_eq!(board.cell(3, 19), tile(Tetromino::L));
    }

    #[test]
    fn four_simultaneous_rows_clear_in_one_pass() {
        let mut board = Board::new();
        for y in 16..20 {
            fill_row(&mut board, y);
        }
        board.set(2, 15, tile(Tetromino::S));

        let (count, _) = board.clear_full_rows();
        assert_eq!(count, 4);
        assert_eq!(board.cell(2, 19), tile(Tetromino::S));
        for y in 0..19 {
            for x in 0..Board::WIDTH {
                if (x, y) != (2, 19) {
                    assert_eq!(board.cell(x, y), None);
                }
            }
        }
    }

    #[test]
    fn interleaved_full_rows_clear_correctly() {
        let mut board = Board::new();
        fill_row(&mut board, 17);
        board.set(5, 18, tile(Tetromino::I));
        fill_row(&mut board, 19);

        let (count, rows) = board.clear_full_rows();
        assert_eq!(count, 2);
        assert_eq!(rows, vec![17, 19]);
        // The surviving partial row sinks to the bottom.
        assert_eq!(board.cell(5, 19), tile(Tetromino::I));
        assert_eq!(board.cell(5, 18), None);
    }

    #[test]
    fn placement_never_overwrites_occupied_cells_in_play() {
        // `is_valid` gating is what guarantees this; simulate the engine's
        // probe-then-place discipline.
        let mut board = Board::new();
        board.place(&piece(Tetromino::O, 4, 18));
        let overlapping = piece(Tetromino::O, 4, 17);
        assert!(!board.is_valid(&overlapping));
        assert_eq!(board.cell(4, 18), tile(Tetromino::O));
    }
}
