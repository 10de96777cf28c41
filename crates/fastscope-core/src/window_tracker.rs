//! Window Tracker — post-trigger countdown and holdoff lockout
//!
//! After a fire event the tracker counts down the remaining post-trigger
//! samples, emits the absolute index of the sample that closes the window
//! (the exclusive window end, `trigger_index + post_trigger`), then enforces
//! the re-arm lockout. While either countdown is active the engine is "busy"
//! and the edge machines never see a sample, which is what makes overlapping
//! windows impossible by construction rather than by a secondary check.
//!
//! The tracker also supports an O(1) bulk skip: neither countdown depends on
//! sample values, so the SIMD path advances them arithmetically.

use crate::types::SampleIndex;
use crate::window_geometry::WindowGeometry;

/// Outcome of advancing the tracker by one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStep {
    /// This sample closed a capture window; the value is the exclusive
    /// window-end index to hand to the caller.
    Emit(SampleIndex),
    /// A countdown consumed this sample; arming stays suppressed.
    Busy,
    /// No countdown active; the sample belongs to the edge machines.
    Idle,
}

/// Counts down post-trigger samples and the re-arm lockout.
#[derive(Debug, Clone, Copy)]
pub struct WindowTracker {
    /// Samples from the trigger to the exclusive window end.
    post_trigger: u64,
    /// Lockout applied after each emission (holdoff + next pre-trigger).
    rearm_lockout: u64,
    /// Remaining post-trigger samples, when a window is open.
    post_remaining: Option<u64>,
    /// Remaining lockout samples.
    holdoff_remaining: u64,
}

impl WindowTracker {
    /// Create a tracker for the given window geometry.
    pub fn new(geometry: &WindowGeometry) -> Self {
        Self {
            post_trigger: geometry.post_trigger(),
            rearm_lockout: geometry.rearm_lockout(),
            post_remaining: None,
            holdoff_remaining: 0,
        }
    }

    /// Whether neither countdown is active (the edge machines may run).
    pub fn is_idle(&self) -> bool {
        self.post_remaining.is_none() && self.holdoff_remaining == 0
    }

    /// Begin the post-trigger countdown for a fire event on the current
    /// sample. Only legal while idle; the engine guarantees this because
    /// arming is suppressed during any countdown.
    pub fn fire(&mut self) {
        debug_assert!(self.is_idle());
        self.post_remaining = Some(self.post_trigger);
    }

    /// Advance by one sample at absolute index `index`.
    #[inline]
    pub fn step(&mut self, index: SampleIndex) -> WindowStep {
        if let Some(remaining) = self.post_remaining {
            let remaining = remaining - 1;
            if remaining == 0 {
                self.post_remaining = None;
                self.holdoff_remaining = self.rearm_lockout;
                WindowStep::Emit(index)
            } else {
                self.post_remaining = Some(remaining);
                WindowStep::Busy
            }
        } else if self.holdoff_remaining > 0 {
            self.holdoff_remaining -= 1;
            WindowStep::Busy
        } else {
            WindowStep::Idle
        }
    }

    /// Consume up to `available` samples of active countdowns in one step.
    ///
    /// `first_index` is the absolute index of the first available sample.
    /// Returns the number of samples consumed and the window-end index if an
    /// emission fell inside the consumed span. Consumes nothing when idle.
    /// Equivalent to calling [`step`](Self::step) once per consumed sample.
    pub fn skip(&mut self, first_index: SampleIndex, available: u64) -> (u64, Option<SampleIndex>) {
        if let Some(remaining) = self.post_remaining {
            if available >= remaining {
                self.post_remaining = None;
                self.holdoff_remaining = self.rearm_lockout;
                (remaining, Some(first_index + remaining - 1))
            } else {
                self.post_remaining = Some(remaining - available);
                (available, None)
            }
        } else if self.holdoff_remaining > 0 {
            let consumed = self.holdoff_remaining.min(available);
            self.holdoff_remaining -= consumed;
            (consumed, None)
        } else {
            (0, None)
        }
    }

    /// Abandon any in-flight countdown (trigger-state reset).
    pub fn reset(&mut self) {
        self.post_remaining = None;
        self.holdoff_remaining = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(width: u64, position: u64, holdoff: u64) -> WindowTracker {
        WindowTracker::new(&WindowGeometry::new(width, position, holdoff).unwrap())
    }

    #[test]
    fn test_emit_index_is_trigger_plus_post() {
        // Fire at index 100 with post_trigger = 4: the window end is 104.
        let mut t = tracker(10, 6, 0);
        t.fire();
        assert_eq!(t.step(101), WindowStep::Busy);
        assert_eq!(t.step(102), WindowStep::Busy);
        assert_eq!(t.step(103), WindowStep::Busy);
        assert_eq!(t.step(104), WindowStep::Emit(104));
    }

    #[test]
    fn test_post_trigger_of_one() {
        let mut t = tracker(10, 9, 0);
        t.fire();
        assert_eq!(t.step(51), WindowStep::Emit(51));
    }

    #[test]
    fn test_lockout_after_emission() {
        // width 8, position 2, holdoff 3: lockout = 3 + 2 = 5.
        let mut t = tracker(8, 2, 3);
        t.fire();
        for i in 1..6 {
            t.step(i);
        }
        assert_eq!(t.step(6), WindowStep::Emit(6));
        for i in 7..12 {
            assert_eq!(t.step(i), WindowStep::Busy, "locked at {}", i);
        }
        assert_eq!(t.step(12), WindowStep::Idle);
    }

    #[test]
    fn test_skip_matches_step() {
        let mut stepped = tracker(100, 10, 7);
        let mut skipped = stepped;
        stepped.fire();
        skipped.fire();

        // Step one sample at a time.
        let mut step_emit = None;
        for i in 1..=200u64 {
            if let WindowStep::Emit(e) = stepped.step(i) {
                step_emit = Some(e);
            }
            if stepped.is_idle() {
                break;
            }
        }

        // Skip in uneven pieces.
        let mut skip_emit = None;
        let mut index = 1u64;
        for piece in [3u64, 50, 1, 80, 40, 40] {
            let (consumed, emit) = skipped.skip(index, piece);
            if emit.is_some() {
                skip_emit = emit;
            }
            index += consumed;
            if skipped.is_idle() {
                break;
            }
        }

        assert_eq!(step_emit, skip_emit);
        assert_eq!(step_emit, Some(90)); // post_trigger = 90, fired at 0
    }

    #[test]
    fn test_skip_when_idle_consumes_nothing() {
        let mut t = tracker(10, 0, 0);
        assert_eq!(t.skip(0, 100), (0, None));
    }

    #[test]
    fn test_skip_partial_post() {
        let mut t = tracker(100, 0, 0);
        t.fire();
        let (consumed, emit) = t.skip(1, 40);
        assert_eq!((consumed, emit), (40, None));
        let (consumed, emit) = t.skip(41, 1000);
        assert_eq!(consumed, 60);
        assert_eq!(emit, Some(100));
        assert!(t.is_idle());
    }

    #[test]
    fn test_reset_abandons_countdown() {
        let mut t = tracker(100, 0, 50);
        t.fire();
        t.step(1);
        t.reset();
        assert!(t.is_idle());
    }
}
