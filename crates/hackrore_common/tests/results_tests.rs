//! Tests for result aggregation, history bounds and overall status.

use hackrore_common::{MemoryStore, NewResult, ResultAggregator, TestStatus, HISTORY_LIMIT};

fn fresh() -> ResultAggregator {
    ResultAggregator::load(MemoryStore::shared())
}

#[test]
fn test_history_capped_oldest_evicted_first() {
    let mut agg = fresh();
    for i in 0..(HISTORY_LIMIT + 25) {
        agg.add_result(NewResult::new(format!("check-{}", i), "Check", TestStatus::Pass))
            .unwrap();
        assert!(agg.history_len() <= HISTORY_LIMIT);
    }

    assert_eq!(agg.history_len(), HISTORY_LIMIT);
    let newest = agg.history().next().unwrap();
    assert_eq!(newest.id, format!("check-{}", HISTORY_LIMIT + 24));
    let oldest = agg.history().last().unwrap();
    assert_eq!(oldest.id, "check-25");
    // The map is not capped
    assert_eq!(agg.results().len(), HISTORY_LIMIT + 25);
}

#[test]
fn test_one_fail_beats_nine_passes() {
    let mut agg = fresh();
    for i in 0..9 {
        agg.add_result(NewResult::new(format!("t{}", i), "Test", TestStatus::Pass))
            .unwrap();
    }
    agg.add_result(NewResult::new("network", "Network Test", TestStatus::Fail))
        .unwrap();
    assert_eq!(agg.overall_status(), TestStatus::Fail);
}

#[test]
fn test_rerun_clears_failure() {
    let mut agg = fresh();
    agg.add_result(NewResult::new("storage", "Storage Benchmark", TestStatus::Fail))
        .unwrap();
    agg.add_result(NewResult::new("storage", "Storage Benchmark", TestStatus::Pass))
        .unwrap();
    assert_eq!(agg.overall_status(), TestStatus::Pass);
    assert_eq!(agg.history_len(), 2);
}

#[test]
fn test_history_reload_keeps_order() {
    let store = MemoryStore::shared();
    let mut agg = ResultAggregator::load(store.clone());
    for id in ["camera", "microphone", "speaker"] {
        agg.add_result(NewResult::new(id, id, TestStatus::Pass)).unwrap();
    }

    let reloaded = ResultAggregator::load(store);
    let ids: Vec<_> = reloaded.history().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["speaker", "microphone", "camera"]);
}

#[test]
fn test_serialized_status_is_lowercase() {
    let mut agg = fresh();
    let r = agg
        .add_result(NewResult::new("battery", "Battery", TestStatus::Warning))
        .unwrap();
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["status"], "warning");
    assert!(json["timestamp"].is_i64());
    assert!(json.get("details").is_none());
}
