use fhub_cache::{CacheError, CorrelationStore, TtlCache};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_shared_across_threads() {
    let cache = Arc::new(TtlCache::new(1_000, Duration::from_secs(60)));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..50 {
                    cache.set(&format!("{t}-{i}"), &format!("_c/col/{t}-{i}.bin"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.get("3-17").unwrap(), "_c/col/3-17.bin");
    assert_eq!(cache.entry_count(), 400);
}

#[test]
fn test_works_behind_trait_object() {
    let store: Box<dyn CorrelationStore> = Box::new(TtlCache::new(8, Duration::from_secs(60)));
    store.set_with_ttl("id", "_a/b/c.png", Duration::from_secs(5));

    assert_eq!(store.get("id").unwrap(), "_a/b/c.png");
    store.remove("id");
    assert!(matches!(store.get("id"), Err(CacheError::Miss { .. })));
}
