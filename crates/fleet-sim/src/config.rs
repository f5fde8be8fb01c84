//! Fleet-wide tuning.

use std::time::Duration;

use fleet_robot::RobotParams;
use fleet_traffic::TrafficConfig;

use crate::{FleetError, FleetResult};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetConfig {
    /// Lane fraction each robot covers per tick, in `(0, 1]`.
    pub robot_speed: f32,

    /// Seconds of continuous waiting before a robot replans.
    pub wait_timeout_secs: f64,

    pub traffic: TrafficConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            robot_speed:       fleet_robot::DEFAULT_SPEED,
            wait_timeout_secs: fleet_robot::DEFAULT_WAIT_TIMEOUT.as_secs_f64(),
            traffic:           TrafficConfig::default(),
        }
    }
}

impl FleetConfig {
    pub fn validate(&self) -> FleetResult<()> {
        if !(self.robot_speed > 0.0 && self.robot_speed <= 1.0) {
            return Err(FleetError::Config(format!(
                "robot_speed must be in (0, 1], got {}",
                self.robot_speed
            )));
        }
        if !self.wait_timeout_secs.is_finite() || self.wait_timeout_secs < 0.0 {
            return Err(FleetError::Config(format!(
                "wait_timeout_secs must be a non-negative number, got {}",
                self.wait_timeout_secs
            )));
        }
        self.traffic.validate()?;
        Ok(())
    }

    pub fn robot_params(&self) -> RobotParams {
        RobotParams {
            speed:        self.robot_speed,
            wait_timeout: Duration::try_from_secs_f64(self.wait_timeout_secs).unwrap_or(Duration::MAX),
        }
    }
}
