//! Index-linked doubly linked lists threaded through a slot arena.
//!
//! Nodes live in an [`Arena`] and are addressed by stable [`NodeId`]
//! indices. A list is nothing more than a [`Links`] header (head, tail and
//! length); any number of lists can share one arena, which is what lets the
//! bucket containers move an entry from one bucket to another in O(1)
//! without touching the allocator.
//!
//! ```text
//!   Links { head, tail, len: 3 }
//!      │                   │
//!      ▼                   ▼
//!   ┌──────┐   ┌──────┐   ┌──────┐
//!   │ id 4 │◄─►│ id 0 │◄─►│ id 2 │      slots: [0] [1:free] [2] [3:free] [4]
//!   └──────┘   └──────┘   └──────┘
//!     MRU                   LRU
//! ```
//!
//! **Note**: this module is internal infrastructure. It assumes the caller
//! never links a node into two lists at once and never hands it a `NodeId`
//! from another arena; both conditions are checked with `debug_assert!`.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

/// Stable handle to a node inside an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

impl NodeId {
    /// Raw slot index.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Header of one list threaded through an [`Arena`].
///
/// The header is `Copy`, so callers holding several lists inside another
/// container can copy a header out, relink, and write it back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Links {
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl Links {
    /// An empty list.
    pub(crate) const fn new() -> Self {
        Links {
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently linked node.
    #[inline]
    pub(crate) fn front(&self) -> Option<NodeId> {
        self.head
    }

    /// Least recently linked node.
    #[inline]
    pub(crate) fn back(&self) -> Option<NodeId> {
        self.tail
    }
}

struct Node<T> {
    val: Option<T>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    linked: bool,
}

/// Slot arena that owns every node of the lists threaded through it.
///
/// Vacated slots are recycled through a free list, so a steady-state
/// workload never grows the backing vectors.
pub(crate) struct Arena<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Arena<T> {
    /// Creates an arena with room for `capacity` nodes before reallocating.
    ///
    /// The free list is sized as well so that releasing and reallocating
    /// nodes never allocates.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Arena {
            nodes: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &T {
        match self.nodes.get(id.0).and_then(|node| node.val.as_ref()) {
            Some(val) => val,
            None => unreachable!("arena slot {} is vacant", id.0),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut T {
        match self.nodes.get_mut(id.0).and_then(|node| node.val.as_mut()) {
            Some(val) => val,
            None => unreachable!("arena slot {} is vacant", id.0),
        }
    }

    /// Stores `val` in a fresh or recycled slot. The node is not linked.
    pub(crate) fn alloc(&mut self, val: T) -> NodeId {
        let node = Node {
            val: Some(val),
            prev: None,
            next: None,
            linked: false,
        };
        self.len += 1;
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                NodeId(idx)
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Vacates an unlinked node and hands its value back.
    pub(crate) fn release(&mut self, id: NodeId) -> T {
        let node = &mut self.nodes[id.0];
        debug_assert!(!node.linked, "releasing a linked node");
        let val = match node.val.take() {
            Some(val) => val,
            None => unreachable!("double release of arena slot {}", id.0),
        };
        self.free.push(id.0);
        self.len -= 1;
        val
    }

    /// Allocates `val` and links it at the head of `list`.
    pub(crate) fn push_front(&mut self, list: &mut Links, val: T) -> NodeId {
        let id = self.alloc(val);
        self.link_front(list, id);
        id
    }

    /// Links a detached node at the head of `list`.
    pub(crate) fn link_front(&mut self, list: &mut Links, id: NodeId) {
        debug_assert!(!self.nodes[id.0].linked, "node already linked");
        let old_head = list.head;
        {
            let node = &mut self.nodes[id.0];
            node.prev = None;
            node.next = old_head;
            node.linked = true;
        }
        match old_head {
            Some(head) => self.nodes[head.0].prev = Some(id),
            None => list.tail = Some(id),
        }
        list.head = Some(id);
        list.len += 1;
    }

    /// Links a detached node directly after `after`, which must be in `list`.
    pub(crate) fn link_after(&mut self, list: &mut Links, after: NodeId, id: NodeId) {
        debug_assert!(!self.nodes[id.0].linked, "node already linked");
        let next = self.nodes[after.0].next;
        {
            let node = &mut self.nodes[id.0];
            node.prev = Some(after);
            node.next = next;
            node.linked = true;
        }
        self.nodes[after.0].next = Some(id);
        match next {
            Some(next) => self.nodes[next.0].prev = Some(id),
            None => list.tail = Some(id),
        }
        list.len += 1;
    }

    /// Detaches `id` from `list` without vacating its slot.
    pub(crate) fn unlink(&mut self, list: &mut Links, id: NodeId) {
        let (prev, next) = {
            let node = &mut self.nodes[id.0];
            debug_assert!(node.linked, "unlinking a detached node");
            node.linked = false;
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(prev) => self.nodes[prev.0].next = next,
            None => list.head = next,
        }
        match next {
            Some(next) => self.nodes[next.0].prev = prev,
            None => list.tail = prev,
        }
        list.len -= 1;
    }

    /// Node linked after `id`, towards the tail.
    #[inline]
    pub(crate) fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next
    }

    /// Node linked before `id`, towards the head.
    #[inline]
    pub(crate) fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev
    }

    /// Walks `list` from head to tail.
    pub(crate) fn iter<'a>(&'a self, list: &Links) -> Iter<'a, T> {
        Iter {
            arena: self,
            cursor: list.head,
            remaining: list.len,
        }
    }

    /// Drops every node. Outstanding `NodeId`s become invalid.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.len = 0;
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("len", &self.len)
            .field("slots", &self.nodes.len())
            .field("free", &self.free.len())
            .finish()
    }
}

/// Head-to-tail iterator over one list in an [`Arena`].
pub(crate) struct Iter<'a, T> {
    arena: &'a Arena<T>,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        self.cursor = self.arena.next(id);
        self.remaining = self.remaining.saturating_sub(1);
        Some((id, self.arena.get(id)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::vec;
    use std::vec::Vec;

    fn values(arena: &Arena<u32>, list: &Links) -> Vec<u32> {
        arena.iter(list).map(|(_, v)| *v).collect()
    }

    #[test]
    fn test_push_front_orders_mru_first() {
        let mut arena = Arena::with_capacity(4);
        let mut list = Links::new();
        arena.push_front(&mut list, 1);
        arena.push_front(&mut list, 2);
        arena.push_front(&mut list, 3);

        assert_eq!(values(&arena, &list), vec![3, 2, 1]);
        assert_eq!(list.len(), 3);
        assert_eq!(arena.get(list.back().unwrap()), &1);
        assert_eq!(arena.get(list.front().unwrap()), &3);
    }

    #[test]
    fn test_unlink_head_middle_tail() {
        let mut arena = Arena::with_capacity(4);
        let mut list = Links::new();
        let a = arena.push_front(&mut list, 1);
        let b = arena.push_front(&mut list, 2);
        let c = arena.push_front(&mut list, 3);

        arena.unlink(&mut list, b);
        assert_eq!(values(&arena, &list), vec![3, 1]);
        arena.unlink(&mut list, c);
        assert_eq!(values(&arena, &list), vec![1]);
        arena.unlink(&mut list, a);
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_splice_between_lists_keeps_slot() {
        let mut arena = Arena::with_capacity(4);
        let mut low = Links::new();
        let mut high = Links::new();
        let a = arena.push_front(&mut low, 10);
        arena.push_front(&mut low, 11);
        arena.push_front(&mut high, 20);

        arena.unlink(&mut low, a);
        arena.link_front(&mut high, a);

        assert_eq!(values(&arena, &low), vec![11]);
        assert_eq!(values(&arena, &high), vec![10, 20]);
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.get(a), &10);
    }

    #[test]
    fn test_link_after_tail_updates_tail() {
        let mut arena = Arena::with_capacity(4);
        let mut list = Links::new();
        let first = arena.push_front(&mut list, 1);
        let second = arena.alloc(2);
        arena.link_after(&mut list, first, second);
        let middle = arena.alloc(3);
        arena.link_after(&mut list, first, middle);

        assert_eq!(values(&arena, &list), vec![1, 3, 2]);
        assert_eq!(list.back(), Some(second));
        assert_eq!(arena.prev(second), Some(middle));
        assert_eq!(arena.next(first), Some(middle));
    }

    #[test]
    fn test_release_recycles_slots() {
        let mut arena = Arena::with_capacity(2);
        let mut list = Links::new();
        let a = arena.push_front(&mut list, 1);
        arena.unlink(&mut list, a);
        assert_eq!(arena.release(a), 1);
        assert_eq!(arena.len(), 0);

        let b = arena.push_front(&mut list, 2);
        assert_eq!(a.index(), b.index());
        assert_eq!(arena.get(b), &2);
    }

    #[test]
    fn test_get_mut_overwrites_in_place() {
        let mut arena = Arena::with_capacity(1);
        let mut list = Links::new();
        let a = arena.push_front(&mut list, 5);
        *arena.get_mut(a) = 6;
        assert_eq!(values(&arena, &list), vec![6]);
    }

    #[test]
    fn test_clear_resets() {
        let mut arena = Arena::with_capacity(2);
        let mut list = Links::new();
        arena.push_front(&mut list, 1);
        arena.push_front(&mut list, 2);
        arena.clear();
        assert_eq!(arena.len(), 0);
    }
}
