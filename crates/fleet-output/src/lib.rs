//! `fleet-output`: persistent event log for a fleet run.
//!
//! | File                  | One row per                       |
//! |-----------------------|-----------------------------------|
//! | `events.csv`          | robot state transition            |
//! | `tick_summaries.csv`  | completed tick                    |
//!
//! [`CsvEventWriter`] implements [`EventWriter`] and is driven by
//! [`EventLogObserver`], which implements `fleet_sim::FleetObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fleet_output::{CsvEventWriter, EventLogObserver};
//!
//! let writer = CsvEventWriter::new(Path::new("./output"))?;
//! let mut fleet = FleetBuilder::new(graph, BfsRouter)
//!     .observer(EventLogObserver::new(writer))
//!     .build()?;
//! fleet.run_ticks(500, 0.1);
//! let mut log = fleet.into_observer();
//! log.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvEventWriter;
pub use error::{OutputError, OutputResult};
pub use observer::EventLogObserver;
pub use row::{EventRow, SummaryRow};
pub use writer::EventWriter;
