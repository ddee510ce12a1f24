/*!
Gravity and lock-delay timing: the fall-speed lookup table and the per-piece
state machine deciding when a grounded piece becomes permanent.
*/

use std::time::Duration;

/// Grace period a grounded piece gets before locking permanently.
pub const LOCK_DELAY: Duration = Duration::from_millis(500);

/// How many times a grounded piece may refresh its lock delay by moving or
/// rotating before further resets are denied. Bounds "infinite spin"
/// stalling; per piece, re-armed on spawn.
pub const MAX_LOCK_RESETS: u8 = 15;

/// The classic non-linear gravity curve, in milliseconds per row.
#[rustfmt::skip]
const FALL_SPEEDS_MS: [u64; 30] = [
    800, 717, 633, 550, 467, 383, 300, 217, 133, 100,
     83,  83,  83,  67,  67,  67,  50,  50,  50,  33,
     33,  33,  33,  33,  33,  33,  33,  33,  33,  16,
];

/// The time a piece takes to fall one row at the given level.
///
/// A fixed lookup, clamped to the table bounds; the floor is 16ms.
pub fn fall_speed(level: u32) -> Duration {
    let idx = (level as usize).min(FALL_SPEEDS_MS.len() - 1);
    Duration::from_millis(FALL_SPEEDS_MS[idx])
}

/// Gravity/lock-delay bookkeeping for the piece in play.
///
/// The engine owns the board and piece, so the timer only tracks durations
/// and counters; the engine reports descent attempts and grounded
/// moves/rotations into it and asks [`LockTimer::should_lock`] once per
/// tick.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct LockTimer {
    /// Elapsed-time accumulator driving automatic descent.
    pub fall_counter: Duration,
    /// Elapsed-time accumulator toward the lock deadline while grounded.
    pub lock_delay_counter: Duration,
    /// Grounded lock-delay resets consumed by the current piece.
    pub lock_delay_moves: u8,
    /// Time since the last successful move or rotation.
    pub since_last_move: Duration,
    /// One-tick suppression of ground detection after an upward kick.
    pub ground_suppressed: bool,
}

impl Default for LockTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl LockTimer {
    /// A timer in the fresh-spawn state.
    pub const fn new() -> Self {
        Self {
            fall_counter: Duration::ZERO,
            lock_delay_counter: Duration::ZERO,
            lock_delay_moves: 0,
            since_last_move: Duration::ZERO,
            ground_suppressed: false,
        }
    }

    /// Advances both clocks at the head of a tick and consumes any one-tick
    /// ground suppression left by an upward kick.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.fall_counter += elapsed;
        self.since_last_move += elapsed;
        std::mem::replace(&mut self.ground_suppressed, false)
    }

    /// A gravity step moved the piece down: falling again.
    pub fn note_descent(&mut self) {
        self.lock_delay_counter = Duration::ZERO;
        self.since_last_move = Duration::ZERO;
    }

    /// A gravity step was blocked below; the leftover fall accumulator is
    /// folded into the lock-delay clock.
    pub fn note_grounded(&mut self) {
        self.lock_delay_counter += self.fall_counter;
        self.fall_counter = Duration::ZERO;
    }

    /// A successful horizontal move or rotation.
    ///
    /// Airborne, this only refreshes the move clock. Grounded, it also
    /// resets the lock-delay clock, but only while the piece still has
    /// reset credits; past [`MAX_LOCK_RESETS`] the request is denied so the
    /// piece cannot be stalled indefinitely.
    pub fn note_move(&mut self, grounded: bool) {
        if grounded {
            if self.lock_delay_moves < MAX_LOCK_RESETS {
                self.lock_delay_moves += 1;
                self.lock_delay_counter = Duration::ZERO;
                self.since_last_move = Duration::ZERO;
            }
        } else {
            self.since_last_move = Duration::ZERO;
        }
    }

    /// Whether a grounded piece has exhausted both lock clocks.
    ///
    /// Locking requires the accumulated lock delay *and* the quiet period
    /// since the last move/rotation to each reach [`LOCK_DELAY`].
    pub fn should_lock(&self) -> bool {
        self.lock_delay_counter >= LOCK_DELAY && self.since_last_move >= LOCK_DELAY
    }

    /// Resets all per-piece state; called on spawn and after every lock.
    pub fn reset_for_spawn(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fall_speed_is_clamped_and_monotonic() {
        assert_eq!(fall_speed(0), Duration::from_millis(800));
        assert_eq!(fall_speed(29), Duration::from_millis(16));
        assert_eq!(fall_speed(1000), Duration::from_millis(16));
        for level in 1..40 {
            assert!(fall_speed(level) <= fall_speed(level - 1));
        }
    }

    #[test]
    fn lock_requires_both_clocks() {
        let mut timer = LockTimer::new();
        timer.tick(Duration::from_millis(600));
        timer.note_grounded();
        assert!(timer.should_lock());

        // A grounded move resets both clocks.
        timer.note_move(true);
        assert!(!timer.should_lock());

        // Quiet time alone is not enough without accumulated lock delay.
        let mut quiet = LockTimer::new();
        quiet.tick(Duration::from_millis(600));
        assert!(!quiet.should_lock());
    }

    #[test]
    fn grounded_resets_stop_at_the_cap() {
        let mut timer = LockTimer::new();
        for _ in 0..MAX_LOCK_RESETS {
            timer.tick(Duration::from_millis(600));
            timer.note_grounded();
            timer.note_move(true);
            assert!(!timer.should_lock());
        }
        // Credit 16: denied, the clocks keep running.
        timer.tick(Duration::from_millis(600));
        timer.note_grounded();
        timer.note_move(true);
        assert!(timer.should_lock());
    }

    #[test]
    fn airborne_moves_never_consume_credits() {
        let mut timer = LockTimer::new();
        for _ in 0..100 {
            timer.note_move(false);
        }
        assert_eq!(timer.lock_delay_moves, 0);
    }

    #[test]
    fn ground_suppression_lasts_one_tick() {
        let mut timer = LockTimer::new();
        timer.ground_suppressed = true;
        assert!(timer.tick(Duration::ZERO));
        assert!(!timer.tick(Duration::ZERO));
    }
}
