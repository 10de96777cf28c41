//! Edge State Machine — per-direction arm/fire logic
//!
//! One `EdgeStateMachine` tracks a single slope. It arms the sample the
//! signal reaches the far side of the hysteresis band and fires the instant a
//! genuine crossing of the trigger level occurs. `Machines` composes one or
//! two machines according to the configured [`Direction`], with rising taking
//! priority when both slopes would fire on the same sample.
//!
//! Rising: arm when `sample <= level - hysteresis`; fire when armed and
//! `prev < level <= sample`. Falling mirrors both comparisons. The arm check
//! runs before the fire check within a sample, so with zero hysteresis a
//! single sample can arm and fire (the bare-comparator degeneration).
//!
//! ## Example
//!
//! ```rust
//! use fastscope_core::edge_state::EdgeStateMachine;
//! use fastscope_core::threshold_band::ThresholdBand;
//!
//! let band = ThresholdBand::new(50, 10);
//! let mut machine = EdgeStateMachine::rising(&band).unwrap();
//! assert!(!machine.step(None, 20));       // arms (20 <= 40), no prev to fire on
//! assert!(!machine.step(Some(20), 45));   // inside the band, still armed
//! assert!(machine.step(Some(45), 60));    // 45 < 50 <= 60, fires
//! assert!(!machine.armed());
//! ```

use crate::threshold_band::ThresholdBand;
use crate::types::{Direction, Sample, TriggerResult};

/// Which slope a machine watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slope {
    Rising,
    Falling,
}

/// Arm-then-fire state machine for one edge direction.
#[derive(Debug, Clone, Copy)]
pub struct EdgeStateMachine {
    slope: Slope,
    /// Far side of the hysteresis band; reaching it arms the machine.
    arm_threshold: Sample,
    /// The trigger level; crossing it while armed fires.
    fire_threshold: Sample,
    armed: bool,
}

impl EdgeStateMachine {
    /// Create a rising-edge machine from a threshold band.
    pub fn rising(band: &ThresholdBand) -> TriggerResult<Self> {
        Ok(Self {
            slope: Slope::Rising,
            arm_threshold: band.rising_arm_threshold()?,
            fire_threshold: band.fire_threshold(),
            armed: false,
        })
    }

    /// Create a falling-edge machine from a threshold band.
    pub fn falling(band: &ThresholdBand) -> TriggerResult<Self> {
        Ok(Self {
            slope: Slope::Falling,
            arm_threshold: band.falling_arm_threshold()?,
            fire_threshold: band.fire_threshold(),
            armed: false,
        })
    }

    /// Whether the machine is armed and awaiting the fire crossing.
    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Arm threshold for this slope.
    pub fn arm_threshold(&self) -> Sample {
        self.arm_threshold
    }

    /// Return to the unarmed state without firing.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Advance by one sample. Returns `true` when the trigger fires; the
    /// machine disarms itself on fire.
    ///
    /// `prev` is the sample immediately before `sample` in the stream, or
    /// `None` when no sample has been seen yet (a fresh machine cannot fire
    /// on its first sample).
    #[inline]
    pub fn step(&mut self, prev: Option<Sample>, sample: Sample) -> bool {
        match self.slope {
            Slope::Rising => {
                if !self.armed && sample <= self.arm_threshold {
                    self.armed = true;
                }
                if self.armed {
                    if let Some(p) = prev {
                        if p < self.fire_threshold && sample >= self.fire_threshold {
                            self.armed = false;
                            return true;
                        }
                    }
                }
            }
            Slope::Falling => {
                if !self.armed && sample >= self.arm_threshold {
                    self.armed = true;
                }
                if self.armed {
                    if let Some(p) = prev {
                        if p > self.fire_threshold && sample <= self.fire_threshold {
                            self.armed = false;
                            return true;
                        }
                    }
                }
            }
        }
        false
    }
}

/// Direction composition: the per-slope machines a configuration needs.
#[derive(Debug, Clone, Copy)]
pub enum Machines {
    Rising(EdgeStateMachine),
    Falling(EdgeStateMachine),
    Any {
        rising: EdgeStateMachine,
        falling: EdgeStateMachine,
    },
}

impl Machines {
    /// Build the machines for a direction, validating the band as needed.
    pub fn new(direction: Direction, band: &ThresholdBand) -> TriggerResult<Self> {
        Ok(match direction {
            Direction::Rising => Machines::Rising(EdgeStateMachine::rising(band)?),
            Direction::Falling => Machines::Falling(EdgeStateMachine::falling(band)?),
            Direction::Any => Machines::Any {
                rising: EdgeStateMachine::rising(band)?,
                falling: EdgeStateMachine::falling(band)?,
            },
        })
    }

    /// Advance every machine by one sample. Returns `true` on fire.
    ///
    /// For `Any`, rising is evaluated first: if both slopes satisfy their
    /// fire condition on the same sample, the event counts as rising and the
    /// falling machine is not consulted. All machines disarm on any fire.
    #[inline]
    pub fn step(&mut self, prev: Option<Sample>, sample: Sample) -> bool {
        let fired = match self {
            Machines::Rising(m) | Machines::Falling(m) => m.step(prev, sample),
            Machines::Any { rising, falling } => {
                rising.step(prev, sample) || falling.step(prev, sample)
            }
        };
        if fired {
            self.disarm_all();
        }
        fired
    }

    /// Disarm every machine (used on fire and on trigger-state reset).
    pub fn disarm_all(&mut self) {
        match self {
            Machines::Rising(m) | Machines::Falling(m) => m.disarm(),
            Machines::Any { rising, falling } => {
                rising.disarm();
                falling.disarm();
            }
        }
    }
}
