//! Trigger Configuration
//!
//! Serializable trigger configuration, combining the vertical parameters
//! (level, hysteresis, direction) with the horizontal ones (window width,
//! trigger position, additional holdoff). Instrument profiles store these as
//! YAML; the host software loads one per channel and hands it to the engine.
//!
//! ## Example Configuration
//!
//! ```yaml
//! level: 0
//! hysteresis: 10
//! direction: rising
//! window_width: 16384
//! trigger_position: 4096
//! additional_holdoff: 0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::threshold_band::ThresholdBand;
use crate::types::{Direction, Sample, TriggerError, TriggerResult};
use crate::window_geometry::WindowGeometry;

/// Complete trigger configuration for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Trigger level in ADC code units.
    pub level: Sample,
    /// Hysteresis band width in code units.
    pub hysteresis: u8,
    /// Edge direction to fire on.
    pub direction: Direction,
    /// Total samples per capture window.
    pub window_width: u64,
    /// Offset of the trigger sample within the window.
    pub trigger_position: u64,
    /// Extra lockout samples after a window closes.
    pub additional_holdoff: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            level: 0,
            hysteresis: 5,
            direction: Direction::Rising,
            window_width: 16384,
            trigger_position: 4096,
            additional_holdoff: 0,
        }
    }
}

impl TriggerConfig {
    /// Validate the configuration, returning the derived value objects.
    pub fn validate(&self) -> TriggerResult<(ThresholdBand, WindowGeometry)> {
        let band = ThresholdBand::new(self.level, self.hysteresis);
        band.validate(self.direction)?;
        let geometry = WindowGeometry::new(
            self.window_width,
            self.trigger_position,
            self.additional_holdoff,
        )?;
        Ok((band, geometry))
    }

    /// Load a configuration from a YAML file.
    pub fn load_from(path: &Path) -> TriggerResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TriggerError::ConfigRead(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_yaml(&content)?;
        tracing::info!(path = %path.display(), "loaded trigger config");
        Ok(config)
    }

    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> TriggerResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| TriggerError::ConfigParse(e.to_string()))
    }

    /// Serialize the configuration to YAML.
    pub fn to_yaml(&self) -> TriggerResult<String> {
        serde_yaml::to_string(self).map_err(|e| TriggerError::ConfigParse(e.to_string()))
    }
}
