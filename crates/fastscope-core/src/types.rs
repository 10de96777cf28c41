//! Common types for the acquisition core.
//!
//! Samples arrive from the digitizer as signed 8-bit ADC codes, already
//! de-interleaved and decimated by the upstream pipeline. The only output of
//! the trigger engine is a stream of absolute window-end indices.

use serde::{Deserialize, Serialize};

/// A single digitized sample in ADC code units.
pub type Sample = i8;

/// Absolute sample index since engine creation or the last stream restart.
pub type SampleIndex = u64;

/// Result type for trigger-engine operations.
pub type TriggerResult<T> = Result<T, TriggerError>;

/// Edge direction the trigger fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Fire on a rising level crossing.
    Rising,
    /// Fire on a falling level crossing.
    Falling,
    /// Fire on either; rising wins a same-sample tie.
    Any,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Rising
    }
}

/// Errors that can occur when configuring or driving the trigger engine.
///
/// There are no data-dependent mid-stream errors: everything here is either a
/// configuration-time validation failure or a caller-contract violation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TriggerError {
    #[error("window width must be greater than zero")]
    ZeroWindowWidth,

    #[error("trigger position {position} outside window of width {width}")]
    TriggerPositionOutOfRange { position: u64, width: u64 },

    #[error("hysteresis {hysteresis} not representable around level {level}")]
    HysteresisOutOfRange { level: i8, hysteresis: u8 },

    #[error("output buffer exhausted after {capacity} window ends")]
    OutputBufferExhausted { capacity: usize },

    #[error("failed to read config: {0}")]
    ConfigRead(String),

    #[error("failed to parse config: {0}")]
    ConfigParse(String),
}
