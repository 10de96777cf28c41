//! Window Geometry — horizontal trigger configuration
//!
//! Holds the capture window width, the trigger sample's position inside the
//! window, and the additional holdoff applied after a window closes. Derives
//! the pre-trigger and post-trigger sample counts and the total re-arm
//! lockout.
//!
//! The lockout is `additional_holdoff + pre_trigger`: the next window extends
//! `pre_trigger` samples back from its own trigger, so arming may not resume
//! until that span clears the previous window's end. This is what makes
//! capture windows structurally non-overlapping and keeps consecutive
//! window-end indices at least `window_width + additional_holdoff` apart.
//!
//! ## Example
//!
//! ```rust
//! use fastscope_core::window_geometry::WindowGeometry;
//!
//! let geometry = WindowGeometry::new(1000, 100, 50).unwrap();
//! assert_eq!(geometry.pre_trigger(), 100);
//! assert_eq!(geometry.post_trigger(), 900);
//! assert_eq!(geometry.rearm_lockout(), 150);
//! ```

use crate::types::{TriggerError, TriggerResult};

/// Horizontal trigger configuration in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    /// Total samples per capture window. Always > 0.
    window_width: u64,
    /// Offset of the trigger sample within the window. Always < width.
    trigger_position: u64,
    /// Extra lockout samples after a window closes.
    additional_holdoff: u64,
}

impl WindowGeometry {
    /// Create a validated window geometry.
    pub fn new(
        window_width: u64,
        trigger_position: u64,
        additional_holdoff: u64,
    ) -> TriggerResult<Self> {
        if window_width == 0 {
            return Err(TriggerError::ZeroWindowWidth);
        }
        if trigger_position >= window_width {
            return Err(TriggerError::TriggerPositionOutOfRange {
                position: trigger_position,
                width: window_width,
            });
        }
        Ok(Self {
            window_width,
            trigger_position,
            additional_holdoff,
        })
    }

    /// Total samples per capture window.
    pub fn window_width(&self) -> u64 {
        self.window_width
    }

    /// Offset of the trigger sample within the window.
    pub fn trigger_position(&self) -> u64 {
        self.trigger_position
    }

    /// Extra lockout after a window closes.
    pub fn additional_holdoff(&self) -> u64 {
        self.additional_holdoff
    }

    /// Samples captured before the trigger sample.
    pub fn pre_trigger(&self) -> u64 {
        self.trigger_position
    }

    /// Samples captured at and after the trigger sample. Always >= 1.
    pub fn post_trigger(&self) -> u64 {
        self.window_width - self.trigger_position
    }

    /// Samples of lockout applied after a window-end emission before arming
    /// may resume: the configured holdoff plus the next window's pre-trigger.
    pub fn rearm_lockout(&self) -> u64 {
        self.additional_holdoff.saturating_add(self.pre_trigger())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_post_split() {
        let g = WindowGeometry::new(1000, 0, 0).unwrap();
        assert_eq!(g.pre_trigger(), 0);
        assert_eq!(g.post_trigger(), 1000);

        let g = WindowGeometry::new(1000, 999, 0).unwrap();
        assert_eq!(g.pre_trigger(), 999);
        assert_eq!(g.post_trigger(), 1);
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(matches!(
            WindowGeometry::new(0, 0, 0),
            Err(TriggerError::ZeroWindowWidth)
        ));
    }

    #[test]
    fn test_position_out_of_range_rejected() {
        assert!(matches!(
            WindowGeometry::new(100, 100, 0),
            Err(TriggerError::TriggerPositionOutOfRange { .. })
        ));
        assert!(WindowGeometry::new(100, 99, 0).is_ok());
    }

    #[test]
    fn test_rearm_lockout() {
        let g = WindowGeometry::new(64, 16, 10).unwrap();
        assert_eq!(g.rearm_lockout(), 26);

        let g = WindowGeometry::new(64, 0, 0).unwrap();
        assert_eq!(g.rearm_lockout(), 0);
    }

    #[test]
    fn test_lockout_saturates() {
        let g = WindowGeometry::new(u64::MAX, u64::MAX - 1, u64::MAX).unwrap();
        assert_eq!(g.rearm_lockout(), u64::MAX);
    }
}
