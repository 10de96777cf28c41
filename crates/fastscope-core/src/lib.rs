//! # Acquisition Core — trigger detection and capture windowing
//!
//! This crate is the acquisition core of a PCIe/FPGA-attached digital
//! oscilloscope: it turns a continuous, chunk-delivered stream of signed
//! 8-bit samples into the boundaries of fixed-length capture windows
//! anchored to trigger events.
//!
//! ## Signal Flow
//!
//! ```text
//! sample chunks ──▶ EdgeDetector::process ──▶ absolute window-end indices
//!                   │
//!                   ├─ ThresholdBand      level/hysteresis → arm + fire thresholds
//!                   ├─ WindowGeometry     width/position/holdoff → pre + post split
//!                   ├─ EdgeStateMachine   per-direction arm → fire on one sample
//!                   ├─ WindowTracker      post-trigger countdown + holdoff lockout
//!                   └─ StreamCursor       absolute index across chunk boundaries
//! ```
//!
//! The engine detects level-crossing edges with hysteresis (rising, falling,
//! or either), emits one window-end index per completed capture cycle, and
//! enforces a holdoff period so capture windows never overlap. Everything is
//! single-pass and stateful: feeding the same stream one sample at a time or
//! in million-sample blocks produces identical output. Two execution
//! strategies implement the same [`TriggerEngine`] contract — a scalar
//! reference path and a SIMD path that skips non-crossing runs — and are
//! bit-for-bit equivalent by differential testing.
//!
//! Upstream concerns (DMA transport, de-interleaving, decimation) and
//! downstream ones (window extraction, streaming, persistence) live in their
//! own crates; this core performs no I/O and allocates nothing on the hot
//! path.
//!
//! ## Example
//!
//! ```rust
//! use fastscope_core::{Direction, EdgeDetector, TriggerConfig, TriggerEngine};
//!
//! let mut detector = EdgeDetector::new(TriggerConfig {
//!     level: 0,
//!     hysteresis: 10,
//!     direction: Direction::Rising,
//!     window_width: 1000,
//!     trigger_position: 0,
//!     additional_holdoff: 0,
//! })
//! .unwrap();
//!
//! let mut signal = vec![-50i8; 50];
//! signal.extend(std::iter::repeat(100i8).take(1100));
//!
//! let mut window_ends = [0u64; 16];
//! let count = detector.process(&signal, &mut window_ends).unwrap();
//! assert_eq!(&window_ends[..count], &[1050]); // trigger at 50 + 1000 post
//! ```

pub mod config;
pub mod edge_detector;
pub mod edge_state;
pub mod logging;
pub mod simd_scan;
pub mod stream_cursor;
pub mod threshold_band;
pub mod types;
pub mod window_geometry;
pub mod window_tracker;

pub use config::TriggerConfig;
pub use edge_detector::{EdgeDetector, ExecutionStrategy, ScalarTrigger, TriggerEngine};
pub use simd_scan::SimdTrigger;
pub use types::{Direction, Sample, SampleIndex, TriggerError, TriggerResult};

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::config::TriggerConfig;
    pub use crate::edge_detector::{EdgeDetector, ExecutionStrategy, ScalarTrigger, TriggerEngine};
    pub use crate::simd_scan::SimdTrigger;
    pub use crate::threshold_band::ThresholdBand;
    pub use crate::types::{Direction, Sample, SampleIndex, TriggerError, TriggerResult};
    pub use crate::window_geometry::WindowGeometry;
}
