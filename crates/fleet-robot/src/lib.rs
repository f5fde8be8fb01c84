//! `fleet-robot`: one robot's task lifecycle.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                 |
//! |-----------|----------------------------------------------------------|
//! | [`robot`] | `Robot` state machine, `StepContext`, `Color`            |
//! | [`plan`]  | `Plan`: a path plus a cursor                             |
//! | [`event`] | `TransitionEvent`, `TransitionReason`                    |
//! | [`error`] | `TaskError`, `TaskResult`                                |
//!
//! A robot owns only its plan, progress and state.  Everything shared with
//! other robots (occupancy, destination claims, time windows) is changed
//! through the graph and coordinator handed in via [`StepContext`].

pub mod error;
pub mod event;
pub mod plan;
pub mod robot;

#[cfg(test)]
mod tests;

pub use error::{TaskError, TaskResult};
pub use event::{TransitionEvent, TransitionReason};
pub use plan::Plan;
pub use robot::{Color, Robot, RobotParams, StepContext, DEFAULT_SPEED, DEFAULT_WAIT_TIMEOUT};
