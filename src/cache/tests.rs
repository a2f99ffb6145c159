use std::sync::Arc;

use super::*;
use crate::hashing::cache_key;
use crate::pipeline::{AskResponse, RerankedSource, SourcePage};

fn response(question: &str, answer: &str) -> AskResponse {
    AskResponse {
        question: question.to_string(),
        answer: answer.to_string(),
        sources: vec![SourcePage { page: 4 }, SourcePage { page: 9 }],
        reranked_sources: vec![RerankedSource {
            page: 9,
            rerank_score: 0.731,
        }],
        latency_seconds: 1.25,
        cache: CacheStatus::Miss,
    }
}

#[test]
fn test_cache_status_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&CacheStatus::Hit).unwrap(), "\"hit\"");
    assert_eq!(serde_json::to_string(&CacheStatus::Miss).unwrap(), "\"miss\"");
    assert_eq!(CacheStatus::Hit.to_string(), "hit");
    assert!(CacheStatus::Hit.is_hit());
    assert!(!CacheStatus::Miss.is_hit());
}

#[test]
fn test_insert_then_get() {
    let cache = MemoryAnswerCache::new();
    assert!(cache.is_empty());

    let key = cache_key("What is S3?");
    cache.insert(key.clone(), Arc::new(response("What is S3?", "object storage")));

    let stored = cache.get(&key).unwrap();
    assert_eq!(stored.answer, "object storage");
    assert_eq!(cache.len(), 1);
    assert!(cache.contains_key(&key));
}

#[test]
fn test_lookup_normalizes_question() {
    let cache = MemoryAnswerCache::new();
    cache.insert(cache_key("Hello"), Arc::new(response("Hello", "hi")));

    assert!(cache.lookup("  hello  ").is_some());
    assert!(cache.lookup("HELLO").is_some());
    assert!(cache.lookup("hello there").is_none());
}

#[test]
fn test_hit_copy_leaves_stored_entry_untouched() {
    let cache = MemoryAnswerCache::new();
    let key = cache_key("q");
    cache.insert(key.clone(), Arc::new(response("q", "a")));

    let hit = cache.get(&key).unwrap().as_hit();
    assert_eq!(hit.cache, CacheStatus::Hit);
    assert_eq!(hit.latency_seconds, 1.25);
    assert_eq!(hit.answer, "a");

    assert_eq!(cache.get(&key).unwrap().cache, CacheStatus::Miss);
}

#[test]
fn test_insert_replaces_whole_entry() {
    let cache = MemoryAnswerCache::new();
    let key = cache_key("q");
    cache.insert(key.clone(), Arc::new(response("q", "first")));
    cache.insert(key.clone(), Arc::new(response("q", "second")));

    assert_eq!(cache.get(&key).unwrap().answer, "second");
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_unbounded_by_default() {
    let cache = MemoryAnswerCache::default();
    assert_eq!(cache.capacity(), None);
    for i in 0..500 {
        let q = format!("question {}", i);
        cache.insert(cache_key(&q), Arc::new(response(&q, "a")));
    }
    assert_eq!(cache.len(), 500);
}

#[test]
fn test_bounded_cache_stays_within_capacity() {
    let cache = MemoryAnswerCache::from_capacity(Some(10));
    assert_eq!(cache.capacity(), Some(10));
    for i in 0..200 {
        let q = format!("question {}", i);
        cache.insert(cache_key(&q), Arc::new(response(&q, "a")));
    }
    assert!(cache.len() <= 10);
}

#[test]
fn test_clear() {
    let cache = MemoryAnswerCache::new();
    cache.insert(cache_key("q"), Arc::new(response("q", "a")));
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_concurrent_writers_leave_a_complete_entry() {
    let cache = Arc::new(MemoryAnswerCache::new());
    let key = cache_key("shared");

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            std::thread::spawn(move || {
                let answer = format!("answer {}", i);
                cache.insert(key, Arc::new(response("shared", &answer)));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stored = cache.get(&key).unwrap();
    assert!(stored.answer.starts_with("answer "));
    assert_eq!(stored.sources.len(), 2);
    assert_eq!(stored.reranked_sources.len(), 1);
    assert_eq!(cache.len(), 1);
}
