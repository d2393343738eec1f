#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use lrukit::ds::{IntrusiveList, SlotId};

// Fuzz push_back, pop_front, and move_to_back on IntrusiveList against a
// VecDeque of (id, value) pairs, including moves of stale ids.
fuzz_target!(|data: &[u8]| {
    let mut list: IntrusiveList<u32> = IntrusiveList::new();
    let mut model: VecDeque<(SlotId, u32)> = VecDeque::new();
    let mut all_ids: Vec<SlotId> = Vec::new();

    for pair in data.chunks_exact(2) {
        let value = u32::from(pair[1]);
        match pair[0] % 3 {
            0 => {
                let id = list.push_back(value);
                all_ids.push(id);
                model.push_back((id, value));
                assert_eq!(list.back(), Some(&value));
                assert_eq!(list.get(id), Some(&value));
            },
            1 => {
                let popped = list.pop_front();
                assert_eq!(popped, model.pop_front().map(|(_, v)| v));
            },
            _ => {
                if all_ids.is_empty() {
                    continue;
                }
                let id = all_ids[usize::from(pair[1]) % all_ids.len()];
                let live = model.iter().position(|(m, _)| *m == id);
                let moved = list.move_to_back(id);
                // Slot reuse can make an old id point at a newer live node.
                assert_eq!(moved, live.is_some());
                if let Some(pos) = live {
                    if let Some(entry) = model.remove(pos) {
                        model.push_back(entry);
                    }
                }
            },
        }

        assert_eq!(list.len(), model.len());
        let values: Vec<u32> = list.iter().copied().collect();
        let expected: Vec<u32> = model.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, expected);
    }

    assert!(list.check_links().is_ok());
});
