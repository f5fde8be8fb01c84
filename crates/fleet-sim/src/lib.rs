//! `fleet-sim`: owns the graph, the coordinator and every robot, and drives
//! them tick by tick.
//!
//! # Tick loop
//!
//! ```text
//! tick(delta):
//!   ① clock.advance(delta)                observer.on_tick_start
//!   ② for robot in ascending AgentId:     robot.update(ctx)
//!                                         observer.on_transition per event
//!   ③ traffic.end_tick(now)               expired windows purged
//!   ④ every audit_interval_ticks:         traffic.detect_conflicts
//!                                         observer.on_conflicts
//!   ⑤ observer.on_tick_end(summary)
//! ```
//!
//! Ascending id order decides who wins a contested lane within a tick.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fleet_graph::{load_graph, BfsRouter};
//! use fleet_sim::FleetBuilder;
//!
//! let graph = load_graph("data/nav_graph.json".as_ref())?;
//! let mut fleet = FleetBuilder::new(graph, BfsRouter).build()?;
//! let r = fleet.spawn(VertexId(0))?;
//! fleet.assign_task(r, VertexId(3))?;
//! fleet.run_ticks(100, 0.1);
//! ```

pub mod builder;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fleet;
pub mod identity;
pub mod observer;
pub mod palette;


pub use builder::FleetBuilder;
pub use config::FleetConfig;
pub use dispatch::RandomDispatcher;
pub use error::{FleetError, FleetResult};
pub use fleet::{Fleet, RobotStatus};
pub use identity::{IdentityStrategy, SequentialIds};
pub use observer::{FleetObserver, NoopObserver, TickSummary};
pub use palette::{color_for, PALETTE};
