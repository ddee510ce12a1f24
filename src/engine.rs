/*!
The game engine: one per-tick [`GameEngine::update`] advancing DAS/ARR and
gravity, one intent dispatch applying user actions, and the lock sequence
tying board, queue, timing and scoring together.
*/

use std::time::Duration;

use crate::board::Board;
use crate::input::{DropRepeater, InputShaper, ShiftDirection};
use crate::queue::PieceQueue;
use crate::rotation::{try_rotate, RotateDirection, RotationOutcome};
use crate::scoring::{detect_tspin, ClearOutcome, ScoreKeeper};
use crate::timing::{fall_speed, LockTimer};
use crate::{Piece, Tetromino};

/// A discrete user action, already decoded from raw input.
///
/// Shift keys that should auto-repeat go through [`GameEngine::press`] and
/// [`GameEngine::release`] instead; these intents are edge-triggered.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Intent {
    /// Shift one cell left.
    MoveLeft,
    /// Shift one cell right.
    MoveRight,
    /// Descend one row, or hard drop when already resting.
    SoftDown,
    /// Drop to the floor and lock immediately.
    HardDrop,
    /// Rotate clockwise.
    RotateCw,
    /// Rotate counterclockwise.
    RotateCcw,
    /// Swap with the hold slot.
    Hold,
    /// Toggle pause.
    Pause,
    /// Start a new round.
    Restart,
    /// End the session; the host reacts, the engine does not.
    Quit,
}

/// Configures and creates a [`GameEngine`].
#[derive(Clone, Debug, Default)]
pub struct EngineBuilder {
    seed: Option<u64>,
    script: Vec<Tetromino>,
}

impl EngineBuilder {
    /// Fixes the PRNG seed, making the piece stream reproducible.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Forces the first pieces dealt, before the PRNG takes over.
    #[must_use]
    pub fn first_pieces(mut self, pieces: impl IntoIterator<Item = Tetromino>) -> Self {
        self.script.extend(pieces);
        self
    }

    /// Creates the engine with a freshly spawned piece in play.
    pub fn build(self) -> GameEngine {
        let seed = self.seed.unwrap_or_else(rand::random);
        GameEngine {
            board: Board::new(),
            queue: PieceQueue::with_script(seed, self.script),
            timer: LockTimer::new(),
            shift: InputShaper::new(),
            soft_drop: DropRepeater::new(),
            scores: ScoreKeeper::new(),
            last_rotation: None,
            soft_drop_rows: 0,
            last_clear: None,
            paused: false,
            game_over: false,
        }
    }
}

/// The authoritative game state and its per-tick simulation.
///
/// Single-threaded cooperative: the host calls [`GameEngine::update`] once
/// per frame with the elapsed time, dispatches decoded intents through
/// [`GameEngine::handle`] (or the press/release pair for auto-repeating
/// keys), then renders from the accessors. Nothing here blocks or spawns
/// threads.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub(crate) board: Board,
    pub(crate) queue: PieceQueue,
    pub(crate) timer: LockTimer,
    pub(crate) shift: InputShaper,
    pub(crate) soft_drop: DropRepeater,
    pub(crate) scores: ScoreKeeper,
    /// Outcome of the piece's most recent successful rotation; consumed by
    /// T-spin detection at lock, cleared on placement.
    pub(crate) last_rotation: Option<RotationOutcome>,
    /// Soft-drop rows accumulated by the current piece, paid out at lock.
    pub(crate) soft_drop_rows: u32,
    pub(crate) last_clear: Option<ClearOutcome>,
    pub(crate) paused: bool,
    pub(crate) game_over: bool,
}

impl GameEngine {
    /// Starts building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// An engine with a fixed PRNG seed and default settings.
    pub fn new(seed: u64) -> Self {
        Self::builder().seed(seed).build()
    }

    /// Advances the simulation by `elapsed`: auto-repeat shifts first, then
    /// gravity, then the lock-delay decision. Does nothing while paused or
    /// after game over.
    pub fn update(&mut self, elapsed: Duration) {
        if self.paused || self.game_over {
            return;
        }

        if let Some((direction, shifts)) = self.shift.tick(elapsed) {
            for _ in 0..shifts {
                if !self.move_piece(direction.dx(), 0) {
                    break;
                }
            }
        }
        for _ in 0..self.soft_drop.tick(elapsed) {
            if self.is_on_floor() {
                self.hard_drop();
                break;
            }
            self.move_piece(0, 1);
        }
        if self.game_over {
            return;
        }

        let ground_suppressed = self.timer.tick(elapsed);
        let speed = fall_speed(self.scores.level().saturating_sub(1));
        while self.timer.fall_counter >= speed {
            if self.translate(0, 1) {
                self.timer.fall_counter -= speed;
                self.timer.note_descent();
            } else {
                self.timer.note_grounded();
            }
        }

        if !ground_suppressed && self.is_on_floor() && self.timer.should_lock() {
            self.lock_piece();
        }
    }

    /// Applies one edge-triggered intent.
    pub fn handle(&mut self, intent: Intent) {
        match intent {
            Intent::Pause => {
                if !self.game_over {
                    self.paused = !self.paused;
                }
            }
            Intent::Restart => self.reset(),
            Intent::Quit => {}
            _ if self.paused || self.game_over => {}
            Intent::MoveLeft => {
                self.move_piece(-1, 0);
            }
            Intent::MoveRight => {
                self.move_piece(1, 0);
            }
            Intent::SoftDown => self.soft_step(),
            Intent::HardDrop => self.hard_drop(),
            Intent::RotateCw => {
                self.rotate(RotateDirection::Clockwise);
            }
            Intent::RotateCcw => {
                self.rotate(RotateDirection::CounterClockwise);
            }
            Intent::Hold => {
                self.hold();
            }
        }
    }

    /// Registers a held shift key; the press itself moves one cell,
    /// auto-repeat follows in [`GameEngine::update`].
    pub fn press(&mut self, direction: ShiftDirection) {
        if self.paused || self.game_over {
            return;
        }
        let direction = self.shift.press(direction);
        self.move_piece(direction.dx(), 0);
    }

    /// Registers a shift key release.
    pub fn release(&mut self, direction: ShiftDirection) {
        self.shift.release(direction);
    }

    /// Registers the soft-drop key going down.
    pub fn press_down(&mut self) {
        if self.paused || self.game_over {
            return;
        }
        if self.soft_drop.press() {
            self.soft_step();
        }
    }

    /// Registers the soft-drop key going up.
    pub fn release_down(&mut self) {
        self.soft_drop.release();
    }

    /// Attempts to translate the current piece, reverting on collision.
    ///
    /// Successful downward movement banks a soft-drop point per row;
    /// successful horizontal movement while grounded consumes one
    /// lock-delay credit.
    pub fn move_piece(&mut self, dx: i16, dy: i16) -> bool {
        if self.paused || self.game_over {
            return false;
        }
        if !self.translate(dx, dy) {
            return false;
        }
        if dy > 0 {
            self.soft_drop_rows += dy as u32;
            self.timer.note_descent();
        } else if dx != 0 {
            let grounded = self.is_on_floor();
            self.timer.note_move(grounded);
        }
        true
    }

    /// Attempts a rotation via the kick search; grounded successes consume
    /// a lock-delay credit like moves do.
    pub fn rotate(&mut self, direction: RotateDirection) -> bool {
        if self.paused || self.game_over {
            return false;
        }
        let Some(outcome) = try_rotate(self.queue.current_mut(), &self.board, direction) else {
            return false;
        };
        if outcome.kicked_up {
            self.timer.ground_suppressed = true;
        }
        self.last_rotation = Some(outcome);
        let grounded = self.is_on_floor();
        self.timer.note_move(grounded);
        true
    }

    /// Drops the piece as far as it goes, awards 2 points per row, and
    /// locks immediately, bypassing the lock delay.
    pub fn hard_drop(&mut self) {
        if self.paused || self.game_over {
            return;
        }
        let mut rows: u64 = 0;
        while self.translate(0, 1) {
            rows += 1;
        }
        self.scores.award(rows * 2);
        self.lock_piece();
    }

    /// Swaps the current piece with the hold slot; a no-op when the
    /// once-per-piece gate is closed.
    pub fn hold(&mut self) -> bool {
        if self.paused || self.game_over {
            return false;
        }
        if !self.queue.swap_hold(&self.board) {
            return false;
        }
        self.timer.reset_for_spawn();
        self.last_rotation = None;
        self.soft_drop_rows = 0;
        if !self.board.is_valid(self.queue.current()) {
            self.game_over = true;
        }
        true
    }

    /// Starts a new round: fresh board, empty hold, score back to zero. The
    /// high score and the PRNG stream carry over.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.queue.reset_round();
        self.timer.reset_for_spawn();
        self.shift.clear();
        self.soft_drop.clear();
        self.scores.reset();
        self.last_rotation = None;
        self.soft_drop_rows = 0;
        self.last_clear = None;
        self.paused = false;
        self.game_over = false;
    }

    /// Whether the current piece cannot descend any further.
    pub fn is_on_floor(&self) -> bool {
        !self.board.is_valid(&self.queue.current().offset(0, 1))
    }

    /// The board grid.
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// The piece in play.
    pub const fn current(&self) -> &Piece {
        self.queue.current()
    }

    /// The upcoming pieces, nearest first.
    pub const fn preview(&self) -> &[Tetromino; crate::queue::PREVIEW_DEPTH] {
        self.queue.preview()
    }

    /// The held piece, if any.
    pub const fn hold_piece(&self) -> Option<Tetromino> {
        self.queue.hold()
    }

    /// Points scored this round.
    pub const fn score(&self) -> u64 {
        self.scores.score()
    }

    /// Best score ever reached; survives resets and restores.
    pub const fn high_score(&self) -> u64 {
        self.scores.max_high_score()
    }

    /// Total rows cleared this round.
    pub const fn lines_cleared(&self) -> u32 {
        self.scores.lines_cleared()
    }

    /// Current level (1-based).
    pub const fn level(&self) -> u32 {
        self.scores.level()
    }

    /// Scoring feedback from the most recent lock, when it cleared lines.
    pub const fn last_clear(&self) -> Option<&ClearOutcome> {
        self.last_clear.as_ref()
    }

    /// Whether the simulation is paused.
    pub const fn paused(&self) -> bool {
        self.paused
    }

    /// Whether the round has ended.
    pub const fn game_over(&self) -> bool {
        self.game_over
    }

    /// Moves the piece without any scoring or lock-delay side effects.
    fn translate(&mut self, dx: i16, dy: i16) -> bool {
        let moved = self.queue.current().offset(dx, dy);
        if self.board.is_valid(&moved) {
            *self.queue.current_mut() = moved;
            true
        } else {
            false
        }
    }

    /// One soft-drop step; a piece already resting hard-drops instead.
    fn soft_step(&mut self) {
        if self.is_on_floor() {
            self.hard_drop();
        } else {
            self.move_piece(0, 1);
        }
    }

    /// Makes the current piece permanent: T-spin check, placement,
    /// soft-drop payout, line clears, then the next spawn. Sets `game_over`
    /// when the piece locked above the board or the spawn is blocked.
    fn lock_piece(&mut self) {
        let piece = *self.queue.current();
        let tspin = detect_tspin(&self.board, &piece, self.last_rotation);
        let above_board = self.board.place(&piece);

        self.scores.award(u64::from(self.soft_drop_rows));
        self.soft_drop_rows = 0;
        self.last_clear = self.scores.clear_lines(&mut self.board, tspin);

        self.last_rotation = None;
        self.timer.reset_for_spawn();
        self.soft_drop.clear();

        if above_board {
            self.game_over = true;
            return;
        }
        self.queue.end_piece();
        if !self.queue.spawn_next(&self.board) {
            self.game_over = true;
        }
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rotation;

    fn scripted(pieces: impl IntoIterator<Item = Tetromino>) -> GameEngine {
        GameEngine::builder().seed(7).first_pieces(pieces).build()
    }

    #[test]
    fn moves_revert_at_the_walls() {
        let mut engine = scripted([Tetromino::O]);
        for _ in 0..4 {
            assert!(engine.move_piece(-1, 0));
        }
        assert_eq!(engine.current().x, 0);
        assert!(!engine.move_piece(-1, 0));
        assert_eq!(engine.current().x, 0);
    }

    #[test]
    fn hard_drop_awards_two_points_per_row_and_spawns() {
        let mut engine = scripted([Tetromino::O, Tetromino::T]);
        // O spawns at (4,-1); its bottom row can descend 19 rows.
        engine.hard_drop();
        assert_eq!(engine.score(), 38);
        assert_eq!(engine.current().tetromino, Tetromino::T);
        assert!(!engine.game_over());
        assert!(engine.board().cell(4, 19).is_some());
        assert!(engine.board().cell(5, 18).is_some());
    }

    #[test]
    fn soft_drop_points_are_paid_at_lock() {
        let mut engine = scripted([Tetromino::O, Tetromino::I]);
        for _ in 0..5 {
            assert!(engine.move_piece(0, 1));
        }
        assert_eq!(engine.score(), 0);
        engine.hard_drop();
        // 5 soft rows + 14 hard rows * 2.
        assert_eq!(engine.score(), 5 + 28);
    }

    #[test]
    fn soft_step_on_the_floor_hard_drops() {
        let mut engine = scripted([Tetromino::O, Tetromino::L]);
        while !engine.is_on_floor() {
            engine.move_piece(0, 1);
        }
        engine.handle(Intent::SoftDown);
        assert_eq!(engine.current().tetromino, Tetromino::L);
    }

    #[test]
    fn pause_freezes_updates_and_intents() {
        let mut engine = scripted([Tetromino::T]);
        let before = *engine.current();
        engine.handle(Intent::Pause);
        assert!(engine.paused());
        engine.update(Duration::from_secs(5));
        engine.handle(Intent::MoveLeft);
        engine.handle(Intent::RotateCw);
        assert_eq!(*engine.current(), before);
        engine.handle(Intent::Pause);
        assert!(!engine.paused());
    }

    #[test]
    fn presses_during_a_pause_leave_no_charge_behind() {
        let mut engine = scripted([Tetromino::T]);
        let (x, y) = (engine.current().x, engine.current().y);
        engine.handle(Intent::Pause);
        engine.press(ShiftDirection::Right);
        engine.press_down();
        engine.update(Duration::from_secs(1));
        engine.handle(Intent::Pause);
        // Long enough for a held key's delayed auto-shift to have fired,
        // too short for a gravity step.
        engine.update(Duration::from_millis(400));
        assert_eq!(engine.current().x, x);
        assert_eq!(engine.current().y, y);
    }

    #[test]
    fn hold_gate_allows_one_swap_per_piece() {
        let mut engine = scripted([Tetromino::T, Tetromino::I, Tetromino::S]);
        assert!(engine.hold());
        assert_eq!(engine.hold_piece(), Some(Tetromino::T));
        assert_eq!(engine.current().tetromino, Tetromino::I);
        // Second swap is a no-op until the piece locks.
        assert!(!engine.hold());
        assert_eq!(engine.current().tetromino, Tetromino::I);
        engine.hard_drop();
        assert!(engine.hold());
        assert_eq!(engine.current().tetromino, Tetromino::T);
        assert_eq!(engine.hold_piece(), Some(Tetromino::S));
    }

    #[test]
    fn fixed_seed_games_evolve_identically() {
        let mut a = GameEngine::new(99);
        let mut b = GameEngine::new(99);
        for step in 0..600 {
            if step % 7 == 0 {
                a.handle(Intent::MoveLeft);
                b.handle(Intent::MoveLeft);
            }
            if step % 11 == 0 {
                a.handle(Intent::RotateCw);
                b.handle(Intent::RotateCw);
            }
            if step % 23 == 0 {
                a.handle(Intent::HardDrop);
                b.handle(Intent::HardDrop);
            }
            a.update(Duration::from_millis(16));
            b.update(Duration::from_millis(16));
            assert_eq!(a.current(), b.current());
            assert_eq!(a.score(), b.score());
        }
        assert_eq!(a.board().grid(), b.board().grid());
    }

    #[test]
    fn reset_starts_a_fresh_round_but_keeps_the_high_score() {
        let mut engine = scripted([Tetromino::O]);
        engine.hard_drop();
        let earned = engine.score();
        assert!(earned > 0);
        engine.reset();
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.high_score(), earned);
        assert_eq!(engine.lines_cleared(), 0);
        assert!(engine.hold_piece().is_none());
        assert!(!engine.game_over());
        assert!(engine.board().grid().iter().flatten().all(Option::is_none));
    }

    #[test]
    fn stacking_to_the_top_ends_the_round() {
        let mut engine = GameEngine::builder()
            .seed(3)
            .first_pieces([Tetromino::I; 40])
            .build();
        // Vertical I pieces in one column reach the ceiling quickly.
        for _ in 0..40 {
            if engine.game_over() {
                break;
            }
            engine.rotate(RotateDirection::Clockwise);
            engine.hard_drop();
        }
        assert!(engine.game_over());
        let before = engine.score();
        engine.handle(Intent::HardDrop);
        engine.handle(Intent::RotateCw);
        engine.update(Duration::from_secs(1));
        assert_eq!(engine.score(), before);
        assert_eq!(engine.current().rotation, Rotation::R0);
    }
}
