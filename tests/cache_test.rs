//! Tests for [`ResponseCache`] eviction and refresh behavior.

use bifrost::config::GenerationConfig;
use bifrost::{GenerateOptions, ResolvedOptions, ResponseCache};

fn opts() -> ResolvedOptions {
    GenerateOptions::new().resolve(&GenerationConfig::default())
}

#[test]
fn evicts_oldest_inserted_first() {
    let cache = ResponseCache::new(3);
    for prompt in ["a", "b", "c", "d"] {
        cache.insert("m", prompt, &opts(), prompt.to_uppercase());
    }

    // "a" was oldest at the moment "d" overflowed the capacity.
    assert!(cache.get("m", "a", &opts()).is_none());
    assert_eq!(cache.get("m", "b", &opts()).as_deref(), Some("B"));
    assert_eq!(cache.get("m", "c", &opts()).as_deref(), Some("C"));
    assert_eq!(cache.get("m", "d", &opts()).as_deref(), Some("D"));
    assert_eq!(cache.len(), 3);
}

#[test]
fn read_refreshes_entry_position() {
    let cache = ResponseCache::new(3);
    for prompt in ["a", "b", "c"] {
        cache.insert("m", prompt, &opts(), prompt.to_uppercase());
    }

    // Reading "a" promotes it, so the next overflow evicts "b" instead.
    assert!(cache.get("m", "a", &opts()).is_some());
    cache.insert("m", "d", &opts(), "D".to_string());

    assert!(cache.get("m", "a", &opts()).is_some());
    assert!(cache.get("m", "b", &opts()).is_none());
    assert!(cache.get("m", "c", &opts()).is_some());
    assert!(cache.get("m", "d", &opts()).is_some());
}

#[test]
fn overwrite_refreshes_entry_position() {
    let cache = ResponseCache::new(3);
    for prompt in ["a", "b", "c"] {
        cache.insert("m", prompt, &opts(), prompt.to_uppercase());
    }

    // Re-inserting "a" refreshes it; "b" becomes oldest and is evicted.
    cache.insert("m", "a", &opts(), "A2".to_string());
    cache.insert("m", "d", &opts(), "D".to_string());

    assert_eq!(cache.get("m", "a", &opts()).as_deref(), Some("A2"));
    assert!(cache.get("m", "b", &opts()).is_none());
}

#[test]
fn capacity_one_keeps_only_latest() {
    let cache = ResponseCache::new(1);
    cache.insert("m", "a", &opts(), "A".to_string());
    cache.insert("m", "b", &opts(), "B".to_string());

    assert!(cache.get("m", "a", &opts()).is_none());
    assert_eq!(cache.get("m", "b", &opts()).as_deref(), Some("B"));
}

#[test]
fn entries_are_keyed_by_model() {
    let cache = ResponseCache::new(4);
    cache.insert("model-a", "p", &opts(), "from a".to_string());

    assert!(cache.get("model-b", "p", &opts()).is_none());
    assert_eq!(cache.get("model-a", "p", &opts()).as_deref(), Some("from a"));
}

#[test]
fn entries_are_keyed_by_options() {
    let cache = ResponseCache::new(4);
    let cold = ResolvedOptions {
        temperature: 0.0,
        ..opts()
    };
    cache.insert("m", "p", &opts(), "default".to_string());

    assert!(cache.get("m", "p", &cold).is_none());
    assert_eq!(cache.get("m", "p", &opts()).as_deref(), Some("default"));
}
