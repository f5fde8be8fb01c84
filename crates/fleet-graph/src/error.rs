//! Graph error types.

use thiserror::Error;

use fleet_core::VertexId;

/// Errors from routing and lookups on a loaded graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("no path from {from} to {to}")]
    NoPath { from: VertexId, to: VertexId },

    #[error("vertex {0} not found in graph")]
    VertexNotFound(VertexId),

    #[error("no lane from {from} to {to}")]
    LaneNotFound { from: VertexId, to: VertexId },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Fatal errors while loading a graph definition.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed graph definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("graph definition contains no levels")]
    NoLevels,

    #[error("level {0:?} not found in graph definition")]
    UnknownLevel(String),

    #[error("lane #{lane} references vertex {vertex}, but only {count} vertices are defined")]
    VertexOutOfRange { lane: usize, vertex: u64, count: usize },

    #[error("lane {from} -> {to} is defined more than once")]
    DuplicateLane { from: VertexId, to: VertexId },
}
