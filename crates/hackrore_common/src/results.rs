//! Result aggregator for diagnostic checks.
//!
//! Keeps the latest result per test id plus a newest-first history capped
//! at `HISTORY_LIMIT`, and derives one overall verdict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{HackroreError, Result};
use crate::storage::SharedStore;

pub const RESULTS_KEY: &str = "test_results";
pub const HISTORY_KEY: &str = "test_history";

/// Maximum history entries kept
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pending,
    Pass,
    Fail,
    Warning,
}

impl TestStatus {
    pub const ALL: [TestStatus; 4] = [
        TestStatus::Pending,
        TestStatus::Pass,
        TestStatus::Fail,
        TestStatus::Warning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pending => "pending",
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
            TestStatus::Warning => "warning",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TestStatus {
    type Err = HackroreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TestStatus::Pending),
            "pass" => Ok(TestStatus::Pass),
            "fail" => Ok(TestStatus::Fail),
            "warning" => Ok(TestStatus::Warning),
            other => {
                warn!(status = other, "rejected unknown test status");
                Err(HackroreError::invalid(format!(
                    "unknown status '{}' (expected pending, pass, fail or warning)",
                    other
                )))
            }
        }
    }
}

/// A recorded check outcome. `timestamp` is stamped on insertion and
/// stored as unix milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub name: String,
    pub status: TestStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// What a check reports; the aggregator adds the timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub id: String,
    pub name: String,
    pub status: TestStatus,
    pub details: Option<Value>,
}

impl NewResult {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: TestStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Per-status tallies over the latest results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pass: usize,
    pub fail: usize,
    pub warning: usize,
    pub pending: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pass + self.fail + self.warning + self.pending
    }
}

pub struct ResultAggregator {
    store: SharedStore,
    results: BTreeMap<String, TestResult>,
    history: VecDeque<TestResult>,
    durable: bool,
}

impl fmt::Debug for ResultAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultAggregator")
            .field("results", &self.results.len())
            .field("history", &self.history.len())
            .field("durable", &self.durable)
            .finish()
    }
}

impl ResultAggregator {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            results: BTreeMap::new(),
            history: VecDeque::new(),
            durable: true,
        }
    }

    /// Restore from storage, skipping entries that no longer parse
    pub fn load(store: SharedStore) -> Self {
        let mut agg = Self::new(store);

        if let Some(raw) = agg.read(RESULTS_KEY) {
            match serde_json::from_str::<serde_json::Map<String, Value>>(&raw) {
                Ok(map) => {
                    for (id, value) in map {
                        match serde_json::from_value::<TestResult>(value) {
                            Ok(result) if result.id == id => {
                                agg.results.insert(id, result);
                            }
                            Ok(result) => warn!(key = %id, id = %result.id, "skipping saved result filed under another id"),
                            Err(e) => warn!(id = %id, error = %e, "skipping malformed saved result"),
                        }
                    }
                }
                Err(e) => warn!(error = %e, "ignoring unreadable saved results"),
            }
        }

        if let Some(raw) = agg.read(HISTORY_KEY) {
            match serde_json::from_str::<Vec<Value>>(&raw) {
                Ok(entries) => {
                    agg.history = entries
                        .into_iter()
                        .filter_map(|v| match serde_json::from_value::<TestResult>(v) {
                            Ok(r) => Some(r),
                            Err(e) => {
                                warn!(error = %e, "skipping malformed history entry");
                                None
                            }
                        })
                        .take(HISTORY_LIMIT)
                        .collect();
                }
                Err(e) => warn!(error = %e, "ignoring unreadable saved history"),
            }
        }

        debug!(results = agg.results.len(), history = agg.history.len(), "results loaded");
        agg
    }

    /// Latest result per test id
    pub fn results(&self) -> &BTreeMap<String, TestResult> {
        &self.results
    }

    pub fn get(&self, id: &str) -> Option<&TestResult> {
        self.results.get(id)
    }

    /// Newest first
    pub fn history(&self) -> impl Iterator<Item = &TestResult> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// Record an outcome, overwriting any earlier result for the same id
    pub fn add_result(&mut self, new: NewResult) -> Result<TestResult> {
        if new.id.trim().is_empty() {
            warn!(name = %new.name, "rejected result without id");
            return Err(HackroreError::invalid("result id must not be empty"));
        }

        let result = TestResult {
            id: new.id,
            name: new.name,
            status: new.status,
            timestamp: Utc::now(),
            details: new.details,
        };

        self.results.insert(result.id.clone(), result.clone());
        self.history.push_front(result.clone());
        self.history.truncate(HISTORY_LIMIT);

        debug!(id = %result.id, status = %result.status, "result recorded");
        self.persist();
        Ok(result)
    }

    /// Wipe results and history, including the saved copies
    pub fn clear_results(&mut self) {
        self.results.clear();
        self.history.clear();

        // Try both keys even if the first removal fails
        let results = self.store.remove(RESULTS_KEY);
        let history = self.store.remove(HISTORY_KEY);
        match results.and(history) {
            Ok(()) => self.durable = true,
            Err(e) => {
                warn!(error = %e, "could not remove saved results");
                self.durable = false;
            }
        }
    }

    /// fail > warning > all pass > pending
    pub fn overall_status(&self) -> TestStatus {
        let statuses = || self.results.values().map(|r| r.status);

        if statuses().any(|s| s == TestStatus::Fail) {
            TestStatus::Fail
        } else if statuses().any(|s| s == TestStatus::Warning) {
            TestStatus::Warning
        } else if !self.results.is_empty() && statuses().all(|s| s == TestStatus::Pass) {
            TestStatus::Pass
        } else {
            TestStatus::Pending
        }
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for r in self.results.values() {
            match r.status {
                TestStatus::Pass => counts.pass += 1,
                TestStatus::Fail => counts.fail += 1,
                TestStatus::Warning => counts.warning += 1,
                TestStatus::Pending => counts.pending += 1,
            }
        }
        counts
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            warn!(key, error = %e, "storage read failed");
            None
        })
    }

    fn persist(&mut self) {
        match self.write_all() {
            Ok(()) => self.durable = true,
            Err(e) => {
                if self.durable {
                    warn!(error = %e, "could not save results, continuing in memory");
                }
                self.durable = false;
            }
        }
    }

    fn write_all(&self) -> Result<()> {
        self.store
            .set(RESULTS_KEY, &serde_json::to_string(&self.results)?)?;
        self.store
            .set(HISTORY_KEY, &serde_json::to_string(&self.history)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use serde_json::json;
    use std::sync::Arc;

    /// Store that refuses to remove one key
    struct StuckKeyStore {
        inner: MemoryStore,
        stuck: &'static str,
    }

    impl KeyValueStore for StuckKeyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            if key == self.stuck {
                return Err(HackroreError::Storage(format!("cannot remove {}", key)));
            }
            self.inner.remove(key)
        }
    }

    fn aggregator() -> ResultAggregator {
        ResultAggregator::load(MemoryStore::shared())
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("pass".parse::<TestStatus>().unwrap(), TestStatus::Pass);
        assert_eq!(" Warning ".parse::<TestStatus>().unwrap(), TestStatus::Warning);
        assert!(matches!(
            "passed".parse::<TestStatus>(),
            Err(HackroreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_overwrite_keeps_both_in_history() {
        let mut agg = aggregator();
        agg.add_result(NewResult::new("camera", "Camera Diagnostic", TestStatus::Pass))
            .unwrap();
        agg.add_result(NewResult::new("camera", "Camera Diagnostic", TestStatus::Fail))
            .unwrap();

        assert_eq!(agg.results().len(), 1);
        assert_eq!(agg.get("camera").unwrap().status, TestStatus::Fail);

        let statuses: Vec<_> = agg.history().map(|r| r.status).collect();
        assert_eq!(statuses, vec![TestStatus::Fail, TestStatus::Pass]);
    }

    #[test]
    fn test_latest_timestamp_matches_history_head() {
        let mut agg = aggregator();
        agg.add_result(NewResult::new("mic", "Mic", TestStatus::Pass)).unwrap();
        let second = agg.add_result(NewResult::new("mic", "Mic", TestStatus::Pass)).unwrap();

        assert_eq!(agg.get("mic").unwrap().timestamp, second.timestamp);
        let stamps: Vec<_> = agg.history().map(|r| r.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut agg = aggregator();
        assert!(agg.add_result(NewResult::new("  ", "x", TestStatus::Pass)).is_err());
        assert_eq!(agg.history_len(), 0);
    }

    #[test]
    fn test_overall_precedence() {
        let mut agg = aggregator();
        assert_eq!(agg.overall_status(), TestStatus::Pending);

        agg.add_result(NewResult::new("a", "A", TestStatus::Pass)).unwrap();
        assert_eq!(agg.overall_status(), TestStatus::Pass);

        agg.add_result(NewResult::new("b", "B", TestStatus::Pending)).unwrap();
        assert_eq!(agg.overall_status(), TestStatus::Pending);

        agg.add_result(NewResult::new("c", "C", TestStatus::Warning)).unwrap();
        assert_eq!(agg.overall_status(), TestStatus::Warning);

        agg.add_result(NewResult::new("d", "D", TestStatus::Fail)).unwrap();
        assert_eq!(agg.overall_status(), TestStatus::Fail);

        let counts = agg.counts();
        assert_eq!((counts.pass, counts.pending, counts.warning, counts.fail), (1, 1, 1, 1));
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_clear_is_idempotent_and_removes_saved() {
        let store = MemoryStore::shared();
        let mut agg = ResultAggregator::load(store.clone());
        agg.add_result(NewResult::new("storage", "Storage Benchmark", TestStatus::Fail))
            .unwrap();
        assert!(store.get(RESULTS_KEY).unwrap().is_some());

        agg.clear_results();
        agg.clear_results();
        assert!(agg.results().is_empty());
        assert_eq!(agg.history_len(), 0);
        assert!(store.get(RESULTS_KEY).unwrap().is_none());
        assert!(store.get(HISTORY_KEY).unwrap().is_none());
        assert_eq!(agg.overall_status(), TestStatus::Pending);
    }

    #[test]
    fn test_clear_removes_history_when_results_removal_fails() {
        let store = Arc::new(StuckKeyStore {
            inner: MemoryStore::new(),
            stuck: RESULTS_KEY,
        });
        let mut agg = ResultAggregator::load(store.clone());
        agg.add_result(NewResult::new("camera", "Camera", TestStatus::Pass))
            .unwrap();

        agg.clear_results();
        assert!(!agg.is_durable());
        assert!(agg.results().is_empty());
        assert!(store.get(RESULTS_KEY).unwrap().is_some());
        assert!(store.get(HISTORY_KEY).unwrap().is_none());
    }

    #[test]
    fn test_load_skips_result_under_wrong_key() {
        let store = MemoryStore::shared();
        store
            .set(
                RESULTS_KEY,
                r#"{"camera":{"id":"speaker","name":"Speaker","status":"fail","timestamp":1},
                    "microphone":{"id":"microphone","name":"Mic","status":"pass","timestamp":2}}"#,
            )
            .unwrap();

        let agg = ResultAggregator::load(store);
        assert!(agg.get("camera").is_none());
        assert!(agg.get("speaker").is_none());
        assert_eq!(agg.get("microphone").unwrap().id, "microphone");
        assert_eq!(agg.overall_status(), TestStatus::Pass);
    }

    #[test]
    fn test_details_roundtrip_through_storage() {
        let store = MemoryStore::shared();
        let mut agg = ResultAggregator::load(store.clone());
        agg.add_result(
            NewResult::new("keyboard", "Keyboard Diagnostic", TestStatus::Pass)
                .with_details(json!({ "keys_verified": 52 })),
        )
        .unwrap();

        let reloaded = ResultAggregator::load(store);
        let kb = reloaded.get("keyboard").unwrap();
        assert_eq!(kb.details, Some(json!({ "keys_verified": 52 })));
        assert_eq!(reloaded.history_len(), 1);
    }

    #[test]
    fn test_load_skips_bad_entries() {
        let store = MemoryStore::shared();
        store
            .set(
                RESULTS_KEY,
                r#"{"camera":{"id":"camera","name":"Camera","status":"pass","timestamp":1700000000000},
                    "weird":{"id":"weird","name":"Weird","status":"exploded","timestamp":1}}"#,
            )
            .unwrap();
        store.set(HISTORY_KEY, "not json").unwrap();

        let agg = ResultAggregator::load(store);
        assert_eq!(agg.results().len(), 1);
        assert_eq!(agg.get("camera").unwrap().timestamp.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(agg.history_len(), 0);
    }
}
