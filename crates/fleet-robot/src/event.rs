//! State transition events.

use std::fmt;

use fleet_core::{AgentId, RobotState, SimTime, Tick};

/// Why a robot changed (or re-entered) a state.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionReason {
    TaskAssigned,
    /// A lane denied earlier was granted on retry.
    LaneGranted,
    LaneDenied,
    /// Snapped to an intermediate vertex of the plan.
    ReachedVertex,
    /// Snapped to the target.
    Arrived,
    /// Waited past the timeout and took a fresh path.
    StarvationReplan,
    /// Waited past the timeout with no route; still waiting.
    StarvationTimeout,
    Paused,
    Resumed,
    /// The plan named a hop with no lane; the task was dropped.
    LaneMissing,
}

impl TransitionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionReason::TaskAssigned      => "task_assigned",
            TransitionReason::LaneGranted       => "lane_granted",
            TransitionReason::LaneDenied        => "lane_denied",
            TransitionReason::ReachedVertex     => "reached_vertex",
            TransitionReason::Arrived           => "arrived",
            TransitionReason::StarvationReplan  => "starvation_replan",
            TransitionReason::StarvationTimeout => "starvation_timeout",
            TransitionReason::Paused            => "paused",
            TransitionReason::Resumed           => "resumed",
            TransitionReason::LaneMissing       => "lane_missing",
        }
    }
}

impl fmt::Display for TransitionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the transition log.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionEvent {
    pub tick:   Tick,
    pub time:   SimTime,
    pub agent:  AgentId,
    pub from:   RobotState,
    pub to:     RobotState,
    pub reason: TransitionReason,
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {} -> {} ({})",
            self.tick, self.time, self.agent, self.from, self.to, self.reason
        )
    }
}
