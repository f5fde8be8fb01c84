//! `fleet-graph`: the navigation graph robots drive on.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`graph`]     | `NavGraph` (CSR lanes + R-tree), `NavGraphBuilder`         |
//! | [`occupancy`] | vertex/lane occupancy and destination claims on `NavGraph` |
//! | [`router`]    | `Router` trait, `Path`, `BfsRouter`, `AStarRouter`         |
//! | [`loader`]    | JSON graph definition loading                              |
//! | [`viewport`]  | `Bounds`, world ↔ screen `Viewport`                        |
//! | [`error`]     | `GraphError`, `LoadError`                                  |
//!
//! # Ownership
//!
//! `NavGraph` is the only owner of occupancy and destination-claim state.
//! The fields are private; every mutation goes through a method returning a
//! [`Grant`](fleet_core::Grant), so a single `&mut NavGraph` borrow is the
//! whole concurrency story.

pub mod error;
pub mod graph;
pub mod loader;
pub mod occupancy;
pub mod router;
pub mod viewport;


pub use error::{GraphError, GraphResult, LoadError};
pub use graph::{Lane, NavGraph, NavGraphBuilder, Vertex, DEFAULT_SPEED_LIMIT};
pub use loader::{GraphDefinition, load_graph, load_graph_reader, load_graph_str, load_level};
pub use router::{AStarRouter, BfsRouter, Path, RouteRequest, Router};
pub use viewport::{Bounds, Viewport};
