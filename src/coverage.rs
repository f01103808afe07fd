/// Per-edge coverage tracking for the instrumented-JVM fuzzing glue.
///
/// The instrumentation agent writes one CSV of exercised edge indices per
/// run. The tracker's contract: consume a fresh file after every run,
/// remember every edge ever seen, and report whether this run exercised a
/// previously-unseen edge. Launching the JVM, mutating inputs, and corpus
/// bookkeeping all live outside this crate.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

pub struct CoverageTracker {
    edge_file: PathBuf,
    seen: HashSet<u64>,
}

impl CoverageTracker {
    pub fn new(edge_file: impl Into<PathBuf>) -> Self {
        CoverageTracker { edge_file: edge_file.into(), seen: HashSet::new() }
    }

    /// Consume the CSV the last run produced. Returns whether any new edge
    /// index was exercised. The file is removed after reading so a stale
    /// file can never be double-counted against the next run.
    pub fn consume_run(&mut self) -> io::Result<bool> {
        let text = fs::read_to_string(&self.edge_file)?;
        let _ = fs::remove_file(&self.edge_file);

        let mut fresh = false;
        for line in text.lines() {
            // rows are `edge_index[,hit_count]`; tolerate a header row
            let mut fields = line.split(',');
            let Some(index) = fields.next().and_then(|f| f.trim().parse::<u64>().ok()) else {
                continue;
            };
            if let Some(count) = fields.next().and_then(|f| f.trim().parse::<u64>().ok()) {
                if count == 0 {
                    continue;
                }
            }
            if self.seen.insert(index) {
                fresh = true;
            }
        }
        debug!("coverage: {} edges total, new = {fresh}", self.seen.len());
        Ok(fresh)
    }

    pub fn total_edges(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("verdict-cov-{}-{name}", std::process::id()))
    }

    fn write_edges(path: &Path, rows: &str) {
        fs::write(path, rows).unwrap();
    }

    #[test]
    fn new_edges_are_detected_once() {
        let path = scratch("basic.csv");
        let mut tracker = CoverageTracker::new(&path);

        write_edges(&path, "1,3\n2,1\n");
        assert!(tracker.consume_run().unwrap());
        assert_eq!(tracker.total_edges(), 2);

        // same edges again: nothing new
        write_edges(&path, "1,5\n2,2\n");
        assert!(!tracker.consume_run().unwrap());

        // one more edge appears
        write_edges(&path, "2,1\n7,1\n");
        assert!(tracker.consume_run().unwrap());
        assert_eq!(tracker.total_edges(), 3);
    }

    #[test]
    fn zero_hit_rows_and_headers_are_ignored() {
        let path = scratch("header.csv");
        let mut tracker = CoverageTracker::new(&path);
        write_edges(&path, "edge,count\n4,0\n5,2\n");
        assert!(tracker.consume_run().unwrap());
        assert_eq!(tracker.total_edges(), 1);
    }

    #[test]
    fn each_run_needs_a_fresh_file() {
        let path = scratch("fresh.csv");
        let mut tracker = CoverageTracker::new(&path);
        write_edges(&path, "9\n");
        assert!(tracker.consume_run().unwrap());
        // consumed: a second read without a new run fails
        assert!(tracker.consume_run().is_err());
    }
}
