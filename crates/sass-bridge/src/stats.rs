/*
 * stats.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Timing and included-file bookkeeping for a compile job.

use std::time::{SystemTime, UNIX_EPOCH};

use hashlink::LinkedHashSet;
use serde::Serialize;

/// Entry reported for inline source input.
pub const DATA_ENTRY: &str = "data";

/// Statistics returned with every render result.
///
/// Timestamps are milliseconds since the Unix epoch:
/// `duration == end - start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub start: u64,
    pub end: u64,
    pub duration: u64,
    /// `data` for inline input, otherwise the resolved entry path
    pub entry: String,
    /// Every file visited, in first-discovered order, without duplicates
    pub included_files: Vec<String>,
}

/// Mutable stats of a running job.
#[derive(Debug, Clone)]
pub struct StatsRecorder {
    start: u64,
    entry: String,
    included: LinkedHashSet<String>,
    finished: Option<Stats>,
}

impl StatsRecorder {
    /// Start the clock for `entry`.
    pub fn start(entry: impl Into<String>) -> Self {
        StatsRecorder {
            start: now_millis(),
            entry: entry.into(),
            included: LinkedHashSet::new(),
            finished: None,
        }
    }

    /// Record a visited file. Returns false if it was already recorded.
    pub fn include(&mut self, path: impl Into<String>) -> bool {
        self.included.insert(path.into())
    }

    /// Stop the clock. Calling it again returns the first snapshot.
    pub fn finish(&mut self) -> Stats {
        if let Some(stats) = &self.finished {
            return stats.clone();
        }
        let end = now_millis().max(self.start);
        let stats = Stats {
            start: self.start,
            end,
            duration: end - self.start,
            entry: self.entry.clone(),
            included_files: self.included.iter().cloned().collect(),
        };
        self.finished = Some(stats.clone());
        stats
    }

    /// Final stats, once the job has finished.
    pub fn finished(&self) -> Option<&Stats> {
        self.finished.as_ref()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_included_files_dedupe_in_order() {
        let mut stats = StatsRecorder::start("/p/index.scss");
        assert!(stats.include("/p/index.scss"));
        assert!(stats.include("/p/foo.scss"));
        assert!(!stats.include("/p/index.scss"));
        assert!(stats.include("/p/bar.scss"));
        let done = stats.finish();
        assert_eq!(
            done.included_files,
            vec!["/p/index.scss", "/p/foo.scss", "/p/bar.scss"]
        );
        assert_eq!(done.entry, "/p/index.scss");
        assert_eq!(done.duration, done.end - done.start);
    }

    #[test]
    fn test_finish_is_stable() {
        let mut stats = StatsRecorder::start(DATA_ENTRY);
        assert!(stats.finished().is_none());
        let first = stats.finish();
        stats.include("/late.scss");
        assert_eq!(stats.finish(), first);
        assert!(first.included_files.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut stats = StatsRecorder::start(DATA_ENTRY);
        let json = serde_json::to_value(stats.finish()).unwrap();
        assert_eq!(json["entry"], "data");
        assert_eq!(json["includedFiles"], serde_json::json!([]));
    }
}
