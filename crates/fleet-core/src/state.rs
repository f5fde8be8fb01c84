//! Robot state enum shared by the robot, fleet and output crates.

/// Where a robot is in its task lifecycle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RobotState {
    /// No task; parked at a vertex.
    #[default]
    Idle,
    /// Following a plan, either on a lane or about to enter one.
    Moving,
    /// Parked at a vertex because the next lane was denied.
    Waiting,
    /// Paused by an operator.  Left only by an explicit resume.
    Charging,
    /// Reached the target of the last task.
    TaskComplete,
}

impl RobotState {
    /// `true` for states that hold a task in progress; such robots reject
    /// new assignments.
    #[inline]
    pub fn is_busy(self) -> bool {
        matches!(self, RobotState::Moving | RobotState::Waiting)
    }

    /// `true` for states that accept `assign_task`.
    #[inline]
    pub fn accepts_task(self) -> bool {
        matches!(self, RobotState::Idle | RobotState::TaskComplete)
    }

    /// Lower-case label used in logs and CSV columns.
    pub fn as_str(self) -> &'static str {
        match self {
            RobotState::Idle         => "idle",
            RobotState::Moving       => "moving",
            RobotState::Waiting      => "waiting",
            RobotState::Charging     => "charging",
            RobotState::TaskComplete => "task_complete",
        }
    }
}

impl std::fmt::Display for RobotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
