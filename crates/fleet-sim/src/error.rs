use thiserror::Error;

use fleet_core::{AgentId, CoreError, RobotState, VertexId};
use fleet_graph::GraphError;
use fleet_robot::TaskError;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("vertex {0} does not exist")]
    InvalidReference(VertexId),

    #[error("cannot spawn at {vertex}: occupied by {by}")]
    SpawnOccupied { vertex: VertexId, by: AgentId },

    #[error("no robot with id {0}")]
    UnknownAgent(AgentId),

    #[error("identity strategy produced {0}, which is already in use")]
    DuplicateAgent(AgentId),

    #[error("robot {agent} is {state} and cannot take a new task")]
    Busy { agent: AgentId, state: RobotState },

    #[error("fleet configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Task(TaskError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl From<TaskError> for FleetError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::InvalidReference(v) => FleetError::InvalidReference(v),
            TaskError::Busy { agent, state } => FleetError::Busy { agent, state },
            other => FleetError::Task(other),
        }
    }
}

impl From<CoreError> for FleetError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(msg) => FleetError::Config(msg),
            other => FleetError::Config(other.to_string()),
        }
    }
}

pub type FleetResult<T> = Result<T, FleetError>;
