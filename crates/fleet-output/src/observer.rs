//! `EventLogObserver<W>`: bridges `FleetObserver` to an `EventWriter`.

use fleet_core::Tick;
use fleet_robot::TransitionEvent;
use fleet_sim::{FleetObserver, TickSummary};

use crate::writer::EventWriter;
use crate::{EventRow, OutputError, OutputResult, SummaryRow};

/// A [`FleetObserver`] that logs every transition and tick summary to an
/// [`EventWriter`].
///
/// Observer callbacks cannot fail, so the first write error is stored and
/// later retrieved with [`take_error`][Self::take_error] or
/// [`finish`][Self::finish].
pub struct EventLogObserver<W: EventWriter> {
    writer:     W,
    rows:       u64,
    last_error: Option<OutputError>,
}

impl<W: EventWriter> EventLogObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, rows: 0, last_error: None }
    }

    /// Take the stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Rows handed to the writer successfully.
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Flush the writer.  Reports a stored write error first.
    pub fn finish(&mut self) -> OutputResult<()> {
        if let Some(e) = self.last_error.take() {
            return Err(e);
        }
        self.writer.finish()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store(&mut self, result: OutputResult<()>) {
        match result {
            Ok(()) => self.rows += 1,
            Err(e) => {
                // Keep only the first error.
                if self.last_error.is_none() {
                    self.last_error = Some(e);
                }
            }
        }
    }
}

impl<W: EventWriter> FleetObserver for EventLogObserver<W> {
    fn on_transition(&mut self, event: &TransitionEvent) {
        let result = self.writer.write_event(&EventRow::from(event));
        self.store(result);
    }

    fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
        let result = self.writer.write_summary(&SummaryRow::from(summary));
        self.store(result);
    }
}
