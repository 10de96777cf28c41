//! Threshold Band — vertical trigger configuration
//!
//! Holds the trigger level and hysteresis count in ADC code units and derives
//! the arm and fire thresholds for each edge direction. The arm threshold
//! sits on the far side of the hysteresis band (`level - hysteresis` for
//! rising, `level + hysteresis` for falling); the fire threshold is the level
//! itself. A hysteresis of zero degenerates to a bare comparator.
//!
//! ## Example
//!
//! ```rust
//! use fastscope_core::threshold_band::ThresholdBand;
//!
//! let band = ThresholdBand::new(50, 10);
//! assert_eq!(band.fire_threshold(), 50);
//! assert_eq!(band.rising_arm_threshold().unwrap(), 40);
//! assert_eq!(band.falling_arm_threshold().unwrap(), 60);
//! ```

use crate::types::{Direction, Sample, TriggerError, TriggerResult};

/// Vertical trigger configuration: level and hysteresis in ADC code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdBand {
    /// Trigger level (signed, matches the sample width).
    level: Sample,
    /// Hysteresis band width in code units.
    hysteresis: u8,
}

impl ThresholdBand {
    /// Create a threshold band. Representability of the derived arm
    /// thresholds is checked per direction, not here.
    pub fn new(level: Sample, hysteresis: u8) -> Self {
        Self { level, hysteresis }
    }

    /// Trigger level.
    pub fn level(&self) -> Sample {
        self.level
    }

    /// Hysteresis band width.
    pub fn hysteresis(&self) -> u8 {
        self.hysteresis
    }

    /// Threshold at which the trigger fires, for both directions.
    pub fn fire_threshold(&self) -> Sample {
        self.level
    }

    /// Arm threshold for the rising direction (`level - hysteresis`).
    ///
    /// Fails when the band does not fit the sample's numeric range.
    pub fn rising_arm_threshold(&self) -> TriggerResult<Sample> {
        self.level
            .checked_sub_unsigned(self.hysteresis)
            .ok_or(TriggerError::HysteresisOutOfRange {
                level: self.level,
                hysteresis: self.hysteresis,
            })
    }

    /// Arm threshold for the falling direction (`level + hysteresis`).
    pub fn falling_arm_threshold(&self) -> TriggerResult<Sample> {
        self.level
            .checked_add_unsigned(self.hysteresis)
            .ok_or(TriggerError::HysteresisOutOfRange {
                level: self.level,
                hysteresis: self.hysteresis,
            })
    }

    /// Validate that every arm threshold the given direction needs is
    /// representable.
    pub fn validate(&self, direction: Direction) -> TriggerResult<()> {
        match direction {
            Direction::Rising => {
                self.rising_arm_threshold()?;
            }
            Direction::Falling => {
                self.falling_arm_threshold()?;
            }
            Direction::Any => {
                self.rising_arm_threshold()?;
                self.falling_arm_threshold()?;
            }
        }
        Ok(())
    }
}
