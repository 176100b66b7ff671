//! Scroll position state with optional smoothing
//!
//! Tracks the displayed (`current`) and raw (`target`) scroll position and
//! produces a per-frame delta. With smoothing enabled the displayed position
//! exponentially approaches the target each frame instead of jumping, which
//! damps per-frame jitter from coarse host scroll events.

/// Remaining gap below which a smoothed position lands exactly on target.
///
/// Without the snap the exponential step never quite arrives and the chain
/// would keep requesting frames for sub-unit corrections.
const SNAP_DISTANCE: f32 = 1.0;

/// Configuration for scroll position smoothing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smoothing {
    /// Whether the displayed position is interpolated at all
    pub enabled: bool,
    /// Fraction of the remaining gap covered per frame, in `(0, 1]`
    pub factor: f32,
}

impl Smoothing {
    /// No interpolation: the displayed position tracks the target exactly.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            factor: 1.0,
        }
    }

    /// Interpolate with the given per-frame factor, clamped to `(0, 1]`.
    pub fn new(factor: f32) -> Self {
        Self {
            enabled: true,
            factor: factor.clamp(0.01, 1.0),
        }
    }

    /// A slow, floaty follow (good for decorative parallax scenes)
    pub fn gentle() -> Self {
        Self::new(0.1)
    }

    /// A tight follow that still rounds off hard scroll steps
    pub fn snappy() -> Self {
        Self::new(0.35)
    }
}

impl Default for Smoothing {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Per-frame scroll position tracker.
///
/// The engine writes `target` from host scroll events and calls [`update`]
/// once per frame tick; trigger evaluation reads `current` and `delta`.
///
/// [`update`]: ScrollState::update
#[derive(Clone, Copy, Debug)]
pub struct ScrollState {
    current: f32,
    target: f32,
    delta: f32,
    smoothing: Smoothing,
}

impl ScrollState {
    pub fn new(initial: f32, smoothing: Smoothing) -> Self {
        Self {
            current: initial,
            target: initial,
            delta: 0.0,
            smoothing,
        }
    }

    /// Displayed scroll position as of the last `update`.
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Raw host-reported scroll position.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Position change produced by the last `update`.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    /// Set the raw position the displayed position should approach.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Whether the displayed position has reached the target.
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Advance one frame.
    ///
    /// No-op when already at the target. With smoothing disabled the
    /// position snaps to the target immediately; otherwise it covers
    /// `factor` of the remaining gap, snapping once the gap falls below
    /// one position unit. Returns `true` when another frame is needed to
    /// finish converging.
    pub fn update(&mut self) -> bool {
        if self.current == self.target {
            self.delta = 0.0;
            return false;
        }

        let previous = self.current;
        if self.smoothing.enabled {
            self.current += (self.target - self.current) * self.smoothing.factor;
            if (self.target - self.current).abs() < SNAP_DISTANCE {
                self.current = self.target;
            }
        } else {
            self.current = self.target;
        }
        self.delta = self.current - previous;

        self.current != self.target
    }
}
