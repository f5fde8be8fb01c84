//! Task assignment errors.

use thiserror::Error;

use fleet_core::{AgentId, RobotState, VertexId};
use fleet_graph::GraphError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TaskError {
    #[error("vertex {0} does not exist")]
    InvalidReference(VertexId),

    #[error("robot {agent} is {state} and cannot take a new task")]
    Busy { agent: AgentId, state: RobotState },

    #[error("vertex {vertex} is already the destination of {by}")]
    DestinationClaimed { vertex: VertexId, by: AgentId },

    #[error("no path to target: {0}")]
    NoPath(#[source] GraphError),

    #[error("robot {0} is not paused")]
    NotPaused(AgentId),
}

pub type TaskResult<T> = Result<T, TaskError>;
