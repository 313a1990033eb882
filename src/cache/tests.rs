use super::*;
use crate::pipeline::{ChatResult, GateDecision, ResponseKind, RetrievalResult};

fn answer(message: &str) -> ChatResult {
    ChatResult {
        kind: ResponseKind::Answer,
        message: message.to_string(),
        citations: vec!["a citation".to_string()],
        handoff_reason: None,
        retrieval: RetrievalResult::empty(0.0),
        gate: GateDecision::pass("answerable"),
        generation_time_ms: 10.0,
        total_time_ms: 12.0,
        request_id: "req-0".to_string(),
    }
}

#[test]
fn test_get_miss_on_empty_cache() {
    let cache = ResponseCache::new(10, Duration::from_secs(60));
    assert!(cache.get("what is cbct?").is_none());

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 0);
}

#[test]
fn test_set_then_get_round_trip() {
    let cache = ResponseCache::new(10, Duration::from_secs(60));
    cache.set("What is CBCT?", &answer("CBCT is 3D imaging."));

    let hit = cache.get("What is CBCT?").expect("entry should be present");
    assert_eq!(hit.message, "CBCT is 3D imaging.");
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_key_normalization_matches_variants() {
    let cache = ResponseCache::new(10, Duration::from_secs(60));
    cache.set("What is CBCT?", &answer("3D imaging."));

    assert!(cache.get("  what is cbct?  ").is_some());
    assert!(cache.get("WHAT IS CBCT?").is_some());
    assert!(cache.get("what is cbct").is_none());
}

#[test]
fn test_expired_entry_is_removed_on_get() {
    let cache = ResponseCache::new(10, Duration::from_millis(0));
    cache.set("q", &answer("a"));
    assert_eq!(cache.len(), 1);

    // ttl of zero: elapsed >= ttl immediately.
    assert!(cache.get("q").is_none());
    assert_eq!(cache.len(), 0, "expired entry must be physically removed");
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn test_eviction_keeps_max_size_and_drops_oldest() {
    let max_size = 3;
    let cache = ResponseCache::new(max_size, Duration::from_secs(60));

    for i in 0..=max_size {
        cache.set(&format!("query {i}"), &answer(&format!("answer {i}")));
    }

    assert_eq!(cache.len(), max_size);
    assert!(cache.get("query 0").is_none(), "oldest entry must be gone");
    for i in 1..=max_size {
        assert!(cache.get(&format!("query {i}")).is_some());
    }
}

#[test]
fn test_overwrite_same_key_does_not_evict() {
    let cache = ResponseCache::new(2, Duration::from_secs(60));
    cache.set("a", &answer("first"));
    cache.set("b", &answer("second"));
    cache.set("a", &answer("updated"));

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("a").unwrap().message, "updated");
    assert!(cache.get("b").is_some());
}

#[test]
fn test_clone_on_read_isolates_stored_copy() {
    let cache = ResponseCache::new(10, Duration::from_secs(60));
    cache.set("q", &answer("a"));

    let mut first = cache.get("q").unwrap();
    first.request_id = "req-other".to_string();
    first.total_time_ms = 999.0;

    let second = cache.get("q").unwrap();
    assert_eq!(second.request_id, "req-0");
    assert_eq!(second.total_time_ms, 12.0);
}

#[test]
fn test_stats_hit_rate() {
    let cache = ResponseCache::new(10, Duration::from_secs(60));
    cache.set("q", &answer("a"));

    let _ = cache.get("q");
    let _ = cache.get("q");
    let _ = cache.get("missing");

    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate_percent - 66.666).abs() < 0.01);
}
