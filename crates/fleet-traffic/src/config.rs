//! Coordinator tuning knobs.

use std::time::Duration;

use fleet_core::{CoreError, CoreResult};

/// Tuning for [`TrafficCoordinator`](crate::TrafficCoordinator).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrafficConfig {
    /// Seconds a lane window stays open past the expected arrival.
    pub safety_gap_secs: f64,

    /// Enable the time-windowed layer.  With `false` only instantaneous
    /// occupancy is checked.
    pub time_windows: bool,

    /// Run the conflict audit every N ticks.  0 disables it.
    pub audit_interval_ticks: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            safety_gap_secs:      1.0,
            time_windows:         true,
            audit_interval_ticks: 10,
        }
    }
}

impl TrafficConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !self.safety_gap_secs.is_finite() || self.safety_gap_secs < 0.0 {
            return Err(CoreError::Config(format!(
                "safety_gap_secs must be a non-negative number, got {}",
                self.safety_gap_secs
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn safety_gap(&self) -> Duration {
        Duration::try_from_secs_f64(self.safety_gap_secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}
