#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use lrukit::cache::LruCache;
use parking_lot::Mutex;

// Fuzz arbitrary try_add / try_get_value / subscribe sequences on LruCache
// against a Vec model ordered from least to most recently used.
fuzz_target!(|data: &[u8]| {
    let Some((&first, rest)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(first % 16) + 1;
    let cache: LruCache<u8, u8> = LruCache::new(capacity);
    let evicted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&evicted);
    cache.subscribe(move |_cache, key| sink.lock().push(*key));

    let mut model: Vec<(u8, u8)> = Vec::new();

    for pair in rest.chunks_exact(2) {
        let op = pair[0] % 4;
        let key = pair[1] % 32;
        match op {
            0 | 1 => {
                let value = pair[0];
                let inserted = cache.try_add(key, value);
                if let Some(pos) = model.iter().position(|(k, _)| *k == key) {
                    assert!(!inserted);
                    let entry = model.remove(pos);
                    model.push(entry);
                } else {
                    assert!(inserted);
                    let mut expected_eviction = None;
                    if model.len() == capacity {
                        expected_eviction = Some(model.remove(0).0);
                    }
                    model.push((key, value));
                    let mut log = evicted.lock();
                    assert_eq!(log.pop(), expected_eviction);
                    assert!(log.is_empty());
                }
            },
            2 => {
                let got = cache.try_get_value(&key).map(|v| *v);
                if let Some(pos) = model.iter().position(|(k, _)| *k == key) {
                    let entry = model.remove(pos);
                    assert_eq!(got, Some(entry.1));
                    model.push(entry);
                } else {
                    assert_eq!(got, None);
                }
            },
            _ => {
                let peeked = cache.peek(&key).map(|v| *v);
                let expected = model.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
                assert_eq!(peeked, expected);
            },
        }

        assert_eq!(cache.count(), model.len());
        assert!(cache.count() <= capacity);
    }

    let keys: Vec<u8> = model.iter().map(|(k, _)| *k).collect();
    assert_eq!(cache.keys_by_recency(), keys);
    assert!(cache.check_invariants().is_ok());
});
