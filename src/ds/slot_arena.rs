//! Slot arena with stable handles.
//!
//! Values live in a `Vec<Option<T>>`; a freed slot goes onto a free list and
//! is handed out again by the next `insert`. A [`SlotId`] stays valid until
//! its slot is removed, so it can be stored elsewhere (for example in a hash
//! index) as an O(1) handle to the value.
//!
//! ```text
//!   slots:     [ Some(a) | None | Some(c) | Some(d) ]
//!   free_list: [ 1 ]
//!   insert(e) -> SlotId(1)
//! ```

/// Stable handle to a value stored in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Returns the raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Arena of optional slots addressed by [`SlotId`].
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Creates an arena with room for `capacity` values before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value`, reusing a freed slot when one is available.
    pub fn insert(&mut self, value: T) -> SlotId {
        let idx = match self.free_list.pop() {
            Some(idx) => {
                debug_assert!(self.slots[idx].is_none());
                self.slots[idx] = Some(value);
                idx
            },
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            },
        };
        self.len += 1;
        SlotId(idx)
    }

    /// Frees the slot and returns its value; `None` if the slot is empty.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.free_list.push(id.0);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
