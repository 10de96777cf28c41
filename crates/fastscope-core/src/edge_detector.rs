//! Edge Detector — trigger engine composition root
//!
//! Wires the threshold band, window geometry, edge state machines, window
//! tracker, and stream cursor into the `process` contract, behind the
//! [`TriggerEngine`] trait. Two interchangeable strategies implement the
//! contract: [`ScalarTrigger`], the branch-per-sample reference path that is
//! the source of truth for the semantics, and the SIMD path in
//! [`crate::simd_scan`], which must agree with it on every output.
//!
//! One detector instance is owned exclusively by one logical channel. The
//! `process` hot path performs no I/O, allocates nothing, and never blocks;
//! configuration changes must be serialized against in-flight processing by
//! the caller (the usual stop/reconfigure/start discipline).
//!
//! ## Example
//!
//! ```rust
//! use fastscope_core::{Direction, EdgeDetector, TriggerConfig, TriggerEngine};
//!
//! let config = TriggerConfig {
//!     level: 0,
//!     hysteresis: 5,
//!     direction: Direction::Rising,
//!     window_width: 100,
//!     trigger_position: 10,
//!     additional_holdoff: 0,
//! };
//! let mut detector = EdgeDetector::new(config).unwrap();
//!
//! // 50 samples below the arm threshold, then a step above the level.
//! let mut signal = vec![-20i8; 50];
//! signal.extend(std::iter::repeat(40i8).take(200));
//!
//! let mut ends = [0u64; 4];
//! let count = detector.process(&signal, &mut ends).unwrap();
//! assert_eq!(count, 1);
//! assert_eq!(ends[0], 50 + 90); // trigger at 50, post-trigger = 100 - 10
//! ```

use crate::config::TriggerConfig;
use crate::edge_state::Machines;
use crate::stream_cursor::StreamCursor;
use crate::threshold_band::ThresholdBand;
use crate::types::{Direction, Sample, SampleIndex, TriggerError, TriggerResult};
use crate::window_tracker::{WindowStep, WindowTracker};

/// The public contract both execution strategies implement.
pub trait TriggerEngine {
    /// Set level, hysteresis, and direction. Resets the arm/countdown state
    /// (a parameter change cannot know whether the previous state is still
    /// electrically valid) but keeps the stream position.
    fn set_vertical(
        &mut self,
        level: Sample,
        hysteresis: u8,
        direction: Direction,
    ) -> TriggerResult<()>;

    /// Set window width, trigger position, and additional holdoff. Resets
    /// the arm/countdown state but keeps the stream position.
    fn set_horizontal(
        &mut self,
        window_width: u64,
        trigger_position: u64,
        additional_holdoff: u64,
    ) -> TriggerResult<()>;

    /// Scan one chunk, appending absolute window-end indices to `output`.
    /// Returns the number of indices written. Indices for sample `i` are
    /// always emitted before indices for any later sample, and no index is
    /// ever rewritten. Fails with
    /// [`TriggerError::OutputBufferExhausted`] if `output` fills; the
    /// engine state is unspecified afterwards until reconfigured.
    fn process(&mut self, input: &[Sample], output: &mut [SampleIndex]) -> TriggerResult<usize>;

    /// Restart the stream: position returns to zero and all trigger state
    /// clears. Used when the acquisition pipeline is restarted.
    fn restart_stream(&mut self);

    /// Absolute index of the next sample to be processed.
    fn position(&self) -> SampleIndex;
}

/// Shared engine state: configuration-derived values plus the per-sample
/// mutable state both strategies operate on.
#[derive(Debug, Clone)]
pub(crate) struct TriggerCore {
    config: TriggerConfig,
    pub(crate) band: ThresholdBand,
    pub(crate) machines: Machines,
    pub(crate) tracker: WindowTracker,
    /// Last sample seen, for the crossing check. `None` until the first
    /// sample after creation, reconfiguration, or stream restart.
    pub(crate) prev: Option<Sample>,
    pub(crate) cursor: StreamCursor,
}

impl TriggerCore {
    pub(crate) fn new(config: TriggerConfig) -> TriggerResult<Self> {
        let (band, geometry) = config.validate()?;
        tracing::debug!(
            level = config.level,
            hysteresis = config.hysteresis,
            direction = ?config.direction,
            window_width = config.window_width,
            trigger_position = config.trigger_position,
            additional_holdoff = config.additional_holdoff,
            "trigger engine configured"
        );
        Ok(Self {
            config,
            band,
            machines: Machines::new(config.direction, &band)?,
            tracker: WindowTracker::new(&geometry),
            prev: None,
            cursor: StreamCursor::new(),
        })
    }

    pub(crate) fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub(crate) fn set_vertical(
        &mut self,
        level: Sample,
        hysteresis: u8,
        direction: Direction,
    ) -> TriggerResult<()> {
        let mut config = self.config;
        config.level = level;
        config.hysteresis = hysteresis;
        config.direction = direction;
        self.reconfigure(config)
    }

    pub(crate) fn set_horizontal(
        &mut self,
        window_width: u64,
        trigger_position: u64,
        additional_holdoff: u64,
    ) -> TriggerResult<()> {
        let mut config = self.config;
        config.window_width = window_width;
        config.trigger_position = trigger_position;
        config.additional_holdoff = additional_holdoff;
        self.reconfigure(config)
    }

    /// Apply a new configuration, keeping the stream position. Validation
    /// failures leave the engine untouched.
    fn reconfigure(&mut self, config: TriggerConfig) -> TriggerResult<()> {
        let cursor = self.cursor;
        *self = Self::new(config)?;
        self.cursor = cursor;
        Ok(())
    }

    pub(crate) fn restart_stream(&mut self) {
        self.machines.disarm_all();
        self.tracker.reset();
        self.prev = None;
        self.cursor.restart();
    }

    /// Advance by one sample: the per-sample reference semantics. Countdowns
    /// take precedence over the edge machines, so a sample consumed by a
    /// countdown can neither arm nor fire. Returns a window-end index when
    /// this sample closes a window.
    #[inline]
    pub(crate) fn step(&mut self, sample: Sample, index: SampleIndex) -> Option<SampleIndex> {
        let emitted = match self.tracker.step(index) {
            WindowStep::Emit(end) => Some(end),
            WindowStep::Busy => None,
            WindowStep::Idle => {
                if self.machines.step(self.prev, sample) {
                    self.tracker.fire();
                }
                None
            }
        };
        self.prev = Some(sample);
        emitted
    }
}

/// Branch-per-sample reference implementation of the trigger contract.
///
/// Fully describes the engine's semantics; the SIMD path is verified against
/// it by differential testing.
#[derive(Debug, Clone)]
pub struct ScalarTrigger {
    pub(crate) core: TriggerCore,
}

impl ScalarTrigger {
    /// Create a scalar engine from a validated configuration.
    pub fn new(config: TriggerConfig) -> TriggerResult<Self> {
        Ok(Self {
            core: TriggerCore::new(config)?,
        })
    }

    /// Current configuration.
    pub fn config(&self) -> &TriggerConfig {
        self.core.config()
    }
}

impl TriggerEngine for ScalarTrigger {
    fn set_vertical(
        &mut self,
        level: Sample,
        hysteresis: u8,
        direction: Direction,
    ) -> TriggerResult<()> {
        self.core.set_vertical(level, hysteresis, direction)
    }

    fn set_horizontal(
        &mut self,
        window_width: u64,
        trigger_position: u64,
        additional_holdoff: u64,
    ) -> TriggerResult<()> {
        self.core
            .set_horizontal(window_width, trigger_position, additional_holdoff)
    }

    fn process(&mut self, input: &[Sample], output: &mut [SampleIndex]) -> TriggerResult<usize> {
        let base = self.core.cursor.position();
        let mut emitted = 0usize;
        for (offset, &sample) in input.iter().enumerate() {
            if let Some(end) = self.core.step(sample, base + offset as u64) {
                if emitted == output.len() {
                    return Err(TriggerError::OutputBufferExhausted {
                        capacity: output.len(),
                    });
                }
                output[emitted] = end;
                emitted += 1;
            }
        }
        self.core.cursor.advance(input.len() as u64);
        Ok(emitted)
    }

    fn restart_stream(&mut self) {
        self.core.restart_stream();
    }

    fn position(&self) -> SampleIndex {
        self.core.cursor.position()
    }
}

/// Which execution strategy a detector runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// One comparison branch per sample; the reference path.
    Scalar,
    /// Vectorized scan that skips non-crossing runs; identical output.
    Simd,
}

enum EngineKind {
    Scalar(ScalarTrigger),
    Simd(crate::simd_scan::SimdTrigger),
}

/// Trigger engine for one channel, with a selectable execution strategy.
///
/// The default strategy is SIMD; both strategies produce identical output
/// sequences for every input, chunking, and configuration.
pub struct EdgeDetector {
    kind: EngineKind,
}

impl EdgeDetector {
    /// Create a detector with the default (SIMD) strategy.
    pub fn new(config: TriggerConfig) -> TriggerResult<Self> {
        Self::with_strategy(config, ExecutionStrategy::Simd)
    }

    /// Create a detector with an explicit strategy.
    pub fn with_strategy(config: TriggerConfig, strategy: ExecutionStrategy) -> TriggerResult<Self> {
        let kind = match strategy {
            ExecutionStrategy::Scalar => EngineKind::Scalar(ScalarTrigger::new(config)?),
            ExecutionStrategy::Simd => EngineKind::Simd(crate::simd_scan::SimdTrigger::new(config)?),
        };
        Ok(Self { kind })
    }

    /// The strategy this detector runs.
    pub fn strategy(&self) -> ExecutionStrategy {
        match self.kind {
            EngineKind::Scalar(_) => ExecutionStrategy::Scalar,
            EngineKind::Simd(_) => ExecutionStrategy::Simd,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &TriggerConfig {
        match &self.kind {
            EngineKind::Scalar(e) => e.config(),
            EngineKind::Simd(e) => e.config(),
        }
    }
}

impl TriggerEngine for EdgeDetector {
    fn set_vertical(
        &mut self,
        level: Sample,
        hysteresis: u8,
        direction: Direction,
    ) -> TriggerResult<()> {
        match &mut self.kind {
            EngineKind::Scalar(e) => e.set_vertical(level, hysteresis, direction),
            EngineKind::Simd(e) => e.set_vertical(level, hysteresis, direction),
        }
    }

    fn set_horizontal(
        &mut self,
        window_width: u64,
        trigger_position: u64,
        additional_holdoff: u64,
    ) -> TriggerResult<()> {
        match &mut self.kind {
            EngineKind::Scalar(e) => {
                e.set_horizontal(window_width, trigger_position, additional_holdoff)
            }
            EngineKind::Simd(e) => {
                e.set_horizontal(window_width, trigger_position, additional_holdoff)
            }
        }
    }

    fn process(&mut self, input: &[Sample], output: &mut [SampleIndex]) -> TriggerResult<usize> {
        match &mut self.kind {
            EngineKind::Scalar(e) => e.process(input, output),
            EngineKind::Simd(e) => e.process(input, output),
        }
    }

    fn restart_stream(&mut self) {
        match &mut self.kind {
            EngineKind::Scalar(e) => e.restart_stream(),
            EngineKind::Simd(e) => e.restart_stream(),
        }
    }

    fn position(&self) -> SampleIndex {
        match &self.kind {
            EngineKind::Scalar(e) => e.position(),
            EngineKind::Simd(e) => e.position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(
        level: i8,
        hysteresis: u8,
        direction: Direction,
        width: u64,
        position: u64,
        holdoff: u64,
    ) -> TriggerConfig {
        TriggerConfig {
            level,
            hysteresis,
            direction,
            window_width: width,
            trigger_position: position,
            additional_holdoff: holdoff,
        }
    }

    fn run(engine: &mut ScalarTrigger, input: &[i8]) -> Vec<u64> {
        let mut output = vec![0u64; 1024];
        let count = engine.process(input, &mut output).unwrap();
        output.truncate(count);
        output
    }

    /// Feed `input` in pieces whose sizes cycle through `chunks`.
    fn run_chunked(engine: &mut ScalarTrigger, input: &[i8], chunks: &[usize]) -> Vec<u64> {
        let mut ends = Vec::new();
        let mut output = vec![0u64; 1024];
        let mut offset = 0;
        let mut pick = 0;
        while offset < input.len() {
            let len = chunks[pick % chunks.len()].min(input.len() - offset);
            pick += 1;
            let count = engine.process(&input[offset..offset + len], &mut output).unwrap();
            ends.extend_from_slice(&output[..count]);
            offset += len;
        }
        ends
    }

    fn square_wave(low: i8, high: i8, half_period: usize, total: usize) -> Vec<i8> {
        (0..total)
            .map(|i| if (i / half_period) % 2 == 0 { low } else { high })
            .collect()
    }

    #[test]
    fn test_dc_input_never_triggers() {
        // Property 1: constant input that never reaches the arm threshold.
        let mut engine =
            ScalarTrigger::new(config(0, 10, Direction::Rising, 100, 0, 0)).unwrap();
        let ends = run(&mut engine, &vec![0i8; 100_000]);
        assert!(ends.is_empty());
        assert_eq!(engine.position(), 100_000);
    }

    #[test]
    fn test_single_clean_edge() {
        // Property 2: flat below the arm threshold for k samples, then a
        // step above the level. Exactly one window end at k + post_trigger.
        let k = 137usize;
        let cfg = config(0, 10, Direction::Rising, 1000, 200, 0);
        let mut engine = ScalarTrigger::new(cfg).unwrap();
        let mut signal = vec![-11i8; k];
        signal.extend(std::iter::repeat(64i8).take(2000));
        let ends = run(&mut engine, &signal);
        assert_eq!(ends, vec![k as u64 + 800]); // post_trigger = 1000 - 200
    }

    #[test]
    fn test_non_overlap_and_holdoff() {
        // Property 3: period shorter than window + holdoff. Fewer windows
        // than raw crossings, and window ends at least width + holdoff apart.
        let width = 64u64;
        let holdoff = 10u64;
        let mut engine =
            ScalarTrigger::new(config(0, 5, Direction::Rising, width, 16, holdoff)).unwrap();
        let signal = square_wave(-50, 50, 16, 20_000);
        let ends = run(&mut engine, &signal);
        let crossings = 20_000 / 32; // one rising crossing per period
        assert!(!ends.is_empty());
        assert!(ends.len() < crossings);
        for pair in ends.windows(2) {
            assert!(
                pair[1] - pair[0] >= width + holdoff,
                "windows too close: {} then {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_chunking_invariance() {
        // Property 4: identical output for any chunking of the same stream.
        let cfg = config(10, 8, Direction::Any, 200, 50, 30);
        let signal = square_wave(-40, 60, 70, 30_000);

        let mut whole = ScalarTrigger::new(cfg).unwrap();
        let expected = run(&mut whole, &signal);
        assert!(!expected.is_empty());

        for chunks in [&[1usize][..], &[7][..], &[4096][..], &[1, 7, 4096][..]] {
            let mut engine = ScalarTrigger::new(cfg).unwrap();
            let ends = run_chunked(&mut engine, &signal, chunks);
            assert_eq!(ends, expected, "chunking {:?} diverged", chunks);
        }
    }

    #[test]
    fn test_direction_symmetry() {
        // Property 6: negating the signal and swapping Rising <-> Falling
        // yields the same window ends.
        let signal = square_wave(-60, 40, 23, 10_000);
        let negated: Vec<i8> = signal.iter().map(|&s| -s).collect();

        let mut rising =
            ScalarTrigger::new(config(5, 7, Direction::Rising, 100, 25, 12)).unwrap();
        let mut falling =
            ScalarTrigger::new(config(-5, 7, Direction::Falling, 100, 25, 12)).unwrap();

        let a = run(&mut rising, &signal);
        let b = run(&mut falling, &negated);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_concrete_scenario() {
        // Property 7, with the stimulus actually below the arm threshold:
        // level 0, hysteresis 10, rising, width 1000, position 0, holdoff 0.
        // Hold at -50, step to 100 at sample 50: trigger at 50, window end
        // at 50 + 1000.
        let mut engine =
            ScalarTrigger::new(config(0, 10, Direction::Rising, 1000, 0, 0)).unwrap();
        let mut signal = vec![-50i8; 50];
        signal.extend(std::iter::repeat(100i8).take(1100));
        let ends = run(&mut engine, &signal);
        assert_eq!(ends, vec![1050]);
    }

    #[test]
    fn test_any_direction_counts_both_edges() {
        // Short window: both slopes of a slow square wave produce windows.
        let mut engine = ScalarTrigger::new(config(0, 5, Direction::Any, 4, 0, 0)).unwrap();
        let signal = square_wave(-50, 50, 100, 2000);
        let ends = run(&mut engine, &signal);
        let mut rising_only =
            ScalarTrigger::new(config(0, 5, Direction::Rising, 4, 0, 0)).unwrap();
        let rising_ends = run(&mut rising_only, &signal);
        assert!(ends.len() > rising_ends.len());
    }

    #[test]
    fn test_window_straddles_chunk_boundary() {
        // Trigger near the end of one chunk, emission in the next.
        let cfg = config(0, 10, Direction::Rising, 100, 0, 0);
        let mut engine = ScalarTrigger::new(cfg).unwrap();
        let mut output = vec![0u64; 16];

        let mut first = vec![-20i8; 90];
        first.extend(std::iter::repeat(50i8).take(5)); // trigger at 90
        assert_eq!(engine.process(&first, &mut output).unwrap(), 0);

        let second = vec![50i8; 200];
        let count = engine.process(&second, &mut output).unwrap();
        assert_eq!(&output[..count], &[190]); // 90 + 100
    }

    #[test]
    fn test_output_buffer_exhaustion() {
        let cfg = config(0, 5, Direction::Any, 1, 0, 0);
        let mut engine = ScalarTrigger::new(cfg).unwrap();
        let signal = square_wave(-50, 50, 8, 1000);
        let mut output = vec![0u64; 2];
        assert!(matches!(
            engine.process(&signal, &mut output),
            Err(TriggerError::OutputBufferExhausted { capacity: 2 })
        ));
    }

    #[test]
    fn test_reconfigure_resets_trigger_state_not_cursor() {
        let cfg = config(0, 10, Direction::Rising, 100, 0, 0);
        let mut engine = ScalarTrigger::new(cfg).unwrap();
        // Arm the engine, then fire a trigger so a countdown is in flight.
        let mut signal = vec![-20i8; 10];
        signal.extend(std::iter::repeat(50i8).take(10));
        let mut output = vec![0u64; 16];
        engine.process(&signal, &mut output).unwrap();
        assert_eq!(engine.position(), 20);

        engine.set_vertical(30, 5, Direction::Rising).unwrap();
        assert_eq!(engine.position(), 20, "cursor survives reconfigure");

        // The in-flight countdown was abandoned; a fresh edge under the new
        // level produces the only window.
        let mut signal = vec![0i8; 30]; // below 30 - 5, arms
        signal.extend(std::iter::repeat(90i8).take(200));
        let count = engine.process(&signal, &mut output).unwrap();
        assert_eq!(&output[..count], &[20 + 30 + 100]);
    }

    #[test]
    fn test_restart_stream() {
        let cfg = config(0, 10, Direction::Rising, 100, 0, 0);
        let mut engine = ScalarTrigger::new(cfg).unwrap();
        engine.process(&[0i8; 500], &mut []).unwrap();
        assert_eq!(engine.position(), 500);
        engine.restart_stream();
        assert_eq!(engine.position(), 0);
    }

    #[test]
    fn test_first_sample_after_reconfigure_cannot_fire() {
        // The remembered previous sample is cleared on reconfigure, so a
        // would-be crossing against stale state is ignored.
        let cfg = config(0, 0, Direction::Rising, 10, 0, 0);
        let mut engine = ScalarTrigger::new(cfg).unwrap();
        engine.process(&[-50i8], &mut []).unwrap();
        engine.set_vertical(0, 0, Direction::Rising).unwrap();
        let mut output = vec![0u64; 4];
        // 50 alone cannot fire (no previous sample under the new config).
        let count = engine.process(&[50i8; 20], &mut output).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_edge_detector_strategy_selection() {
        let cfg = TriggerConfig::default();
        let detector = EdgeDetector::new(cfg).unwrap();
        assert_eq!(detector.strategy(), ExecutionStrategy::Simd);
        let detector = EdgeDetector::with_strategy(cfg, ExecutionStrategy::Scalar).unwrap();
        assert_eq!(detector.strategy(), ExecutionStrategy::Scalar);
        assert_eq!(detector.config().window_width, cfg.window_width);
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let cfg = config(0, 10, Direction::Rising, 0, 0, 0);
        assert!(ScalarTrigger::new(cfg).is_err());
        let cfg = config(-125, 10, Direction::Any, 100, 0, 0);
        assert!(EdgeDetector::new(cfg).is_err());
    }
}
