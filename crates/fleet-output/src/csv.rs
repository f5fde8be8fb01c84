//! CSV event-log backend.
//!
//! Creates two files in the output directory:
//! - `events.csv`
//! - `tick_summaries.csv`

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;
use tracing::info;

use crate::writer::EventWriter;
use crate::{EventRow, OutputResult, SummaryRow};

pub const EVENTS_FILE: &str = "events.csv";
pub const SUMMARIES_FILE: &str = "tick_summaries.csv";

pub struct CsvEventWriter {
    events:    Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvEventWriter {
    /// Create `dir` if needed, then create both files and write their
    /// headers.  Existing files are truncated.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let mut events = Writer::from_path(dir.join(EVENTS_FILE))?;
        events.write_record(["tick", "time_secs", "agent", "from", "to", "reason"])?;

        let mut summaries = Writer::from_path(dir.join(SUMMARIES_FILE))?;
        summaries.write_record([
            "tick", "time_secs", "moving", "waiting", "idle", "complete", "charging", "conflicts",
        ])?;

        info!(dir = %dir.display(), "event log opened");
        Ok(Self { events, summaries, finished: false })
    }
}

impl EventWriter for CsvEventWriter {
    fn write_event(&mut self, row: &EventRow) -> OutputResult<()> {
        self.events.write_record(&[
            row.tick.to_string(),
            format!("{:.3}", row.time_secs),
            row.agent.to_string(),
            row.from.to_owned(),
            row.to.to_owned(),
            row.reason.to_owned(),
        ])?;
        Ok(())
    }

    fn write_summary(&mut self, row: &SummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            format!("{:.3}", row.time_secs),
            row.moving.to_string(),
            row.waiting.to_string(),
            row.idle.to_string(),
            row.complete.to_string(),
            row.charging.to_string(),
            row.conflicts.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
