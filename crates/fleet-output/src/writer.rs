//! The `EventWriter` trait implemented by event-log backends.

use crate::{EventRow, OutputResult, SummaryRow};

/// Sink for transition and tick-summary rows.
///
/// Errors surface through [`EventLogObserver::take_error`][crate::EventLogObserver::take_error]
/// when the writer is driven by the observer.
pub trait EventWriter {
    fn write_event(&mut self, row: &EventRow) -> OutputResult<()>;

    fn write_summary(&mut self, row: &SummaryRow) -> OutputResult<()>;

    /// Flush all underlying handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
