//! Outcome of a reservation attempt.
//!
//! Losing a contention race is not an error: it is the normal signal that
//! drives a robot into `Waiting`.  Reservation methods therefore return a
//! [`Grant`] rather than a `Result`, and callers branch on it.

use std::fmt;

use crate::{AgentId, LaneId, SimTime, VertexId};

/// A lockable resource of the navigation graph.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Resource {
    Lane(LaneId),
    Vertex(VertexId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Lane(l) => write!(f, "lane {l}"),
            Resource::Vertex(v) => write!(f, "vertex {v}"),
        }
    }
}

/// Why a reservation was refused.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DenyReason {
    /// Another agent currently occupies the resource.
    Occupied { resource: Resource, by: AgentId },
    /// The lane is administratively blocked.
    Blocked(LaneId),
    /// Another agent holds a time-window reservation that is still active.
    Reserved { resource: Resource, by: AgentId, until: SimTime },
    /// The reverse lane is in use or reserved by another agent.
    HeadOn { lane: LaneId, by: AgentId },
    /// The vertex is another agent's destination.
    DestinationClaimed { vertex: VertexId, by: AgentId },
    /// A release was attempted by an agent that does not hold the resource.
    NotOwner(Resource),
    /// The id does not name a vertex or lane of this graph.
    UnknownResource(Resource),
}

impl DenyReason {
    /// The competing agent, when the denial was caused by one.
    pub fn blocking_agent(&self) -> Option<AgentId> {
        match *self {
            DenyReason::Occupied { by, .. }
            | DenyReason::Reserved { by, .. }
            | DenyReason::HeadOn { by, .. }
            | DenyReason::DestinationClaimed { by, .. } => Some(by),
            DenyReason::Blocked(_) | DenyReason::NotOwner(_) | DenyReason::UnknownResource(_) => {
                None
            }
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::Occupied { resource, by } => write!(f, "{resource} occupied by {by}"),
            DenyReason::Blocked(l) => write!(f, "lane {l} is blocked"),
            DenyReason::Reserved { resource, by, until } => {
                write!(f, "{resource} reserved by {by} until {until}")
            }
            DenyReason::HeadOn { lane, by } => write!(f, "head-on with {by} on reverse of {lane}"),
            DenyReason::DestinationClaimed { vertex, by } => {
                write!(f, "vertex {vertex} is the destination of {by}")
            }
            DenyReason::NotOwner(r) => write!(f, "{r} is not held by the caller"),
            DenyReason::UnknownResource(r) => write!(f, "unknown {r}"),
        }
    }
}

/// Result of asking for (or releasing) a resource.
#[must_use]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Grant {
    Granted,
    Denied(DenyReason),
}

impl Grant {
    #[inline]
    pub fn is_granted(self) -> bool {
        matches!(self, Grant::Granted)
    }

    #[inline]
    pub fn is_denied(self) -> bool {
        !self.is_granted()
    }

    /// The denial reason, if any.
    #[inline]
    pub fn denial(self) -> Option<DenyReason> {
        match self {
            Grant::Granted => None,
            Grant::Denied(r) => Some(r),
        }
    }

    /// Convert to a `Result` so grant chains can use `?`.
    #[inline]
    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Grant::Granted => Ok(()),
            Grant::Denied(r) => Err(r),
        }
    }
}

impl From<Result<(), DenyReason>> for Grant {
    fn from(r: Result<(), DenyReason>) -> Self {
        match r {
            Ok(()) => Grant::Granted,
            Err(reason) => Grant::Denied(reason),
        }
    }
}
