//! `fleet-core`: foundational types for the fleet traffic coordinator.
//!
//! This crate is a dependency of every other `fleet-*` crate.  It has no
//! `fleet-*` dependencies and only `thiserror` (plus optional `serde`)
//! externally.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `VertexId`, `LaneId`                       |
//! | [`geo`]         | `Point`, Euclidean distance, interpolation            |
//! | [`time`]        | `Tick`, `SimTime`, `SimClock`                         |
//! | [`grant`]       | `Grant`, `DenyReason`, `Resource`                     |
//! | [`state`]       | `RobotState` enum                                     |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod grant;
pub mod ids;
pub mod state;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::Point;
pub use grant::{DenyReason, Grant, Resource};
pub use ids::{AgentId, LaneId, VertexId};
pub use state::RobotState;
pub use time::{SimClock, SimTime, Tick};
