//! Integration tests for fleet-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvEventWriter;
    use crate::row::{EventRow, SummaryRow};
    use crate::writer::EventWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn files_and_headers_created() {
        let dir = tmp();
        let mut w = CsvEventWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(headers(dir.path().join("events.csv")), ["tick", "time_secs", "agent", "from", "to", "reason"]);
        assert_eq!(
            headers(dir.path().join("tick_summaries.csv")),
            ["tick", "time_secs", "moving", "waiting", "idle", "complete", "charging", "conflicts"]
        );
    }

    #[test]
    fn output_dir_is_created() {
        let dir = tmp();
        let nested = dir.path().join("a").join("b");
        let _w = CsvEventWriter::new(&nested).unwrap();
        assert!(nested.join("events.csv").exists());
    }

    #[test]
    fn rows_are_written_in_order() {
        let dir = tmp();
        let mut w = CsvEventWriter::new(dir.path()).unwrap();
        let row = |tick| EventRow {
            tick,
            time_secs: tick as f64 * 0.5,
            agent: 3,
            from: "moving",
            to: "waiting",
            reason: "lane_denied",
        };
        w.write_event(&row(1)).unwrap();
        w.write_event(&row(2)).unwrap();
        w.write_summary(&SummaryRow {
            tick: 2,
            time_secs: 1.0,
            moving: 1,
            waiting: 2,
            idle: 0,
            complete: 0,
            charging: 0,
            conflicts: 0,
        })
        .unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("events.csv")).unwrap();
        let recs: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
        assert_eq!(recs.len(), 2);
        assert_eq!(&recs[1][0], "2");
        assert_eq!(&recs[1][1], "1.000");
        assert_eq!(&recs[0][5], "lane_denied");

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let recs: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
        assert_eq!(recs.len(), 1);
        assert_eq!(&recs[0][3], "2");
    }
}

#[cfg(test)]
mod observer_tests {
    use fleet_core::{Point, VertexId};
    use fleet_graph::{BfsRouter, NavGraph, NavGraphBuilder};
    use fleet_sim::{FleetBuilder, FleetConfig};

    use crate::{CsvEventWriter, EventLogObserver, EventRow, EventWriter, OutputError, OutputResult, SummaryRow};

    fn pair() -> NavGraph {
        let mut b = NavGraphBuilder::new();
        let a = b.add_vertex(Point::new(0.0, 0.0), "a", false);
        let c = b.add_vertex(Point::new(1.0, 0.0), "b", false);
        b.add_two_way(a, c, 1.0);
        b.build().unwrap()
    }

    /// Counts rows; fails every write after `limit`.
    #[derive(Default)]
    struct Flaky {
        limit:    usize,
        events:   Vec<EventRow>,
        finishes: usize,
    }

    impl EventWriter for Flaky {
        fn write_event(&mut self, row: &EventRow) -> OutputResult<()> {
            if self.events.len() >= self.limit {
                return Err(OutputError::Io(std::io::Error::other("disk full")));
            }
            self.events.push(*row);
            Ok(())
        }
        fn write_summary(&mut self, _row: &SummaryRow) -> OutputResult<()> {
            Ok(())
        }
        fn finish(&mut self) -> OutputResult<()> {
            self.finishes += 1;
            Ok(())
        }
    }

    #[test]
    fn fleet_run_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvEventWriter::new(dir.path()).unwrap();
        let mut fleet = FleetBuilder::new(pair(), BfsRouter)
            .config(FleetConfig { robot_speed: 0.5, ..FleetConfig::default() })
            .observer(EventLogObserver::new(writer))
            .build()
            .unwrap();
        let r = fleet.spawn(VertexId(0)).unwrap();
        fleet.assign_task(r, VertexId(1)).unwrap();
        fleet.run_ticks(3, 1.0);

        let mut log = fleet.into_observer();
        assert!(log.take_error().is_none());
        // Two transitions plus three summaries.
        assert_eq!(log.rows_written(), 5);
        log.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("events.csv")).unwrap();
        let reasons: Vec<String> = rdr.records().map(|r| r.unwrap()[5].to_owned()).collect();
        assert_eq!(reasons, ["task_assigned", "arrived"]);

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let last = rdr.records().last().unwrap().unwrap();
        assert_eq!(&last[0], "3");
        assert_eq!(&last[5], "1");
    }

    #[test]
    fn first_error_is_kept_and_reported_by_finish() {
        let mut fleet = FleetBuilder::new(pair(), BfsRouter)
            .observer(EventLogObserver::new(Flaky { limit: 0, ..Flaky::default() }))
            .build()
            .unwrap();
        let r = fleet.spawn(VertexId(0)).unwrap();
        fleet.assign_task(r, VertexId(1)).unwrap();

        let mut log = fleet.into_observer();
        assert!(matches!(log.finish(), Err(OutputError::Io(_))));
        // Error consumed; the writer is now flushed.
        log.finish().unwrap();
        assert_eq!(log.into_writer().finishes, 1);
    }
}
