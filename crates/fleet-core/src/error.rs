//! Shared error type.
//!
//! Sub-crates define their own error enums; `CoreError` covers the failures
//! that can be described with core types alone and is wrapped by them.

use thiserror::Error;

use crate::{AgentId, VertexId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("vertex {0} not found")]
    VertexNotFound(VertexId),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
