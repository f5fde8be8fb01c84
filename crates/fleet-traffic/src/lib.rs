//! `fleet-traffic`: decides whether an agent may use a resource right now.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`config`]      | `TrafficConfig`                                         |
//! | [`reservation`] | `Reservation`, `ReservationTable` (time windows + expiry queue) |
//! | [`coordinator`] | `TrafficCoordinator`: admission, release, bookkeeping   |
//! | [`audit`]       | `Conflict`, read-only occupancy audit                   |
//!
//! # Layers
//!
//! The coordinator answers two questions:
//!
//! 1. *Instantaneous*: is the lane or vertex occupied by someone else?  That
//!    state lives in the [`NavGraph`](fleet_graph::NavGraph).
//! 2. *Time-windowed*: has someone else booked the lane for a window that is
//!    still open, or booked the reverse lane at all?  That state lives here.
//!
//! It never reroutes.  Every request is granted or denied and the agent
//! decides what to do next.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                  |
//! |-----------|---------------------------------------------------------|
//! | `fx-hash` | `FxHashMap` for the reservation table                   |
//! | `serde`   | `Serialize`/`Deserialize` on config and reservations    |

pub mod audit;
pub mod config;
pub mod coordinator;
pub mod reservation;


pub use audit::Conflict;
pub use config::TrafficConfig;
pub use coordinator::TrafficCoordinator;
pub use reservation::{Reservation, ReservationTable};
