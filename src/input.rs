/*!
Horizontal input shaping: delayed auto-shift (DAS) and auto-repeat rate
(ARR) turn raw press/release edges into a stream of single-cell shifts.
*/

use std::time::Duration;

/// How long a direction must be held before auto-repeat kicks in.
pub const DAS: Duration = Duration::from_millis(300);

/// Interval between repeated shifts once auto-repeat is active.
pub const ARR: Duration = Duration::from_millis(40);

/// A horizontal shift request.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum ShiftDirection {
    /// Shift one cell toward the left wall.
    Left,
    /// Shift one cell toward the right wall.
    Right,
}

impl ShiftDirection {
    /// The x delta this direction applies.
    pub const fn dx(self) -> i16 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Press/release edge detector with DAS/ARR charge tracking.
///
/// The shaper knows nothing about the board; it only converts held time
/// into shift counts. A press always yields one immediate shift (returned
/// from [`InputShaper::press`]); [`InputShaper::tick`] then yields the
/// auto-repeat shifts accrued by elapsed time. A new press in the opposite
/// direction takes over the charge from zero.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct InputShaper {
    held: Option<ShiftDirection>,
    charge: Duration,
    repeating: bool,
}

impl InputShaper {
    /// A shaper with no direction held.
    pub const fn new() -> Self {
        Self {
            held: None,
            charge: Duration::ZERO,
            repeating: false,
        }
    }

    /// The direction currently held, if any.
    pub const fn held(&self) -> Option<ShiftDirection> {
        self.held
    }

    /// Registers a press edge and returns the direction of the immediate
    /// shift it grants. Re-pressing the already-held direction restarts
    /// its DAS charge.
    pub fn press(&mut self, direction: ShiftDirection) -> ShiftDirection {
        self.held = Some(direction);
        self.charge = Duration::ZERO;
        self.repeating = false;
        direction
    }

    /// Registers a release edge. Releases of a direction that is not the
    /// one held (stale edges after an opposite press) are ignored.
    pub fn release(&mut self, direction: ShiftDirection) {
        if self.held == Some(direction) {
            self.held = None;
            self.charge = Duration::ZERO;
            self.repeating = false;
        }
    }

    /// Advances the charge and returns how many auto-repeat shifts fire
    /// this tick, paired with the held direction.
    pub fn tick(&mut self, elapsed: Duration) -> Option<(ShiftDirection, u32)> {
        let direction = self.held?;
        self.charge += elapsed;
        let mut shifts = 0;
        if !self.repeating {
            if self.charge < DAS {
                return None;
            }
            self.charge -= DAS;
            self.repeating = true;
            shifts += 1;
        }
        while self.charge >= ARR {
            self.charge -= ARR;
            shifts += 1;
        }
        (shifts > 0).then_some((direction, shifts))
    }

    /// Drops any held direction, e.g. when a new piece spawns after a hard
    /// drop so stale charge does not shove it sideways.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// DAS/ARR channel for the soft-drop key.
///
/// Same charge curve as [`InputShaper`], but directionless: the engine
/// decides per shift whether the intent is a soft-drop row or, with the
/// piece already resting, a hard drop.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct DropRepeater {
    held: bool,
    charge: Duration,
    repeating: bool,
}

impl DropRepeater {
    /// A repeater with the key up.
    pub const fn new() -> Self {
        Self {
            held: false,
            charge: Duration::ZERO,
            repeating: false,
        }
    }

    /// Whether the key is currently held.
    pub const fn held(&self) -> bool {
        self.held
    }

    /// Registers a press edge; returns `true` when it grants an immediate
    /// drop step (i.e. the key was not already held).
    pub fn press(&mut self) -> bool {
        if self.held {
            return false;
        }
        self.held = true;
        self.charge = Duration::ZERO;
        self.repeating = false;
        true
    }

    /// Registers a release edge.
    pub fn release(&mut self) {
        *self = Self::new();
    }

    /// Advances the charge and returns how many drop steps fire this tick.
    pub fn tick(&mut self, elapsed: Duration) -> u32 {
        if !self.held {
            return 0;
        }
        self.charge += elapsed;
        let mut steps = 0;
        if !self.repeating {
            if self.charge < DAS {
                return 0;
            }
            self.charge -= DAS;
            self.repeating = true;
            steps += 1;
        }
        while self.charge >= ARR {
            self.charge -= ARR;
            steps += 1;
        }
        steps
    }

    /// Drops any held state, e.g. across a pause or spawn boundary.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
