//! Doubly linked recency list backed by a [`SlotArena`].
//!
//! Nodes live in the arena and link to each other by [`SlotId`], so a node's
//! handle stays stable while it is moved around. The cache keeps the handle in
//! its index and relocates the node in O(1) without scanning.
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬─────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next }                  │
//!   ├────────┼─────────────────────────────────────────────┤
//!   │ id_1   │ { value: A, prev: None, next: Some(id_2) }  │
//!   │ id_2   │ { value: B, prev: Some(id_1), next: id_3 }  │
//!   │ id_3   │ { value: C, prev: Some(id_2), next: None }  │
//!   └────────┴─────────────────────────────────────────────┘
//!
//!   head ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail
//!   (least recent)                   (most recent)
//! ```
//!
//! Only the operations a recency order needs are provided: append at the
//! back, pop from the front, and move an existing node to the back.

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Linked list whose nodes are stored in a `SlotArena` and linked by `SlotId`.
#[derive(Debug)]
pub struct IntrusiveList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty list with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns `true` if `id` is currently a node in this list.
    pub fn contains(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    /// Value at the head of the list.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|id| self.get(id))
    }

    /// Value at the tail of the list.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    /// Appends a node at the tail and returns its handle.
    pub fn push_back(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail.and_then(|tail| self.arena.get_mut(tail)) {
            Some(old_tail) => old_tail.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    /// Unlinks the head node, frees its slot and returns its value.
    pub fn pop_front(&mut self) -> Option<T> {
        let id = self.head?;
        self.detach(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    /// Relinks an existing node at the tail; returns `false` if `id` is stale.
    ///
    /// The node keeps its `SlotId`.
    pub fn move_to_back(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if self.tail == Some(id) {
            return true;
        }
        self.detach(id);
        self.attach_back(id);
        true
    }

    /// Iterates values from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    /// Iterates `(SlotId, &T)` pairs from head to tail.
    pub fn iter_entries(&self) -> EntryIter<'_, T> {
        EntryIter {
            list: self,
            current: self.head,
        }
    }

    /// Walks the list from head to tail and checks every back link, the tail
    /// pointer, and that each arena node is reachable exactly once.
    pub fn check_links(&self) -> Result<(), InvariantError> {
        if self.head.is_none() || self.tail.is_none() {
            if self.head.is_some() || self.tail.is_some() || !self.arena.is_empty() {
                return Err(InvariantError::new(format!(
                    "list ends disagree: head={:?} tail={:?} nodes={}",
                    self.head,
                    self.tail,
                    self.arena.len()
                )));
            }
            return Ok(());
        }

        let mut count = 0usize;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let node = self
                .arena
                .get(id)
                .ok_or_else(|| InvariantError::new(format!("dangling link to {:?}", id)))?;
            if node.prev != prev {
                return Err(InvariantError::new(format!(
                    "node {:?} has prev {:?}, expected {:?}",
                    id, node.prev, prev
                )));
            }
            count += 1;
            if count > self.arena.len() {
                return Err(InvariantError::new("cycle detected in recency list"));
            }
            prev = Some(id);
            current = node.next;
        }

        if prev != self.tail {
            return Err(InvariantError::new(format!(
                "walk ended at {:?} but tail is {:?}",
                prev, self.tail
            )));
        }
        if count != self.arena.len() {
            return Err(InvariantError::new(format!(
                "reached {} nodes, arena holds {}",
                count,
                self.arena.len()
            )));
        }
        Ok(())
    }

    fn detach(&mut self, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let node = self.arena.get(id)?;
            (node.prev, node.next)
        };

        match prev.and_then(|p| self.arena.get_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.arena.get_mut(n)) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }

        let node = self.arena.get_mut(id)?;
        node.prev = None;
        node.next = None;
        Some(())
    }

    fn attach_back(&mut self, id: SlotId) {
        let old_tail = self.tail;
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = old_tail;
            node.next = None;
        } else {
            return;
        }
        match old_tail.and_then(|t| self.arena.get_mut(t)) {
            Some(tail_node) => tail_node.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.arena.get(id)?;
        self.current = node.next;
        Some(&node.value)
    }
}

pub struct EntryIter<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for EntryIter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.arena.get(id)?;
        self.current = node.next;
        Some((id, &node.value))
    }
}
