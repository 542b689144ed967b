#![forbid(unsafe_code)]

//! Slot arena backing the doubly-linked entry chain.
//!
//! Nodes live in a `Vec` of slots and refer to their neighbours through
//! [`NodeId`] handles, so splicing is a handful of index rewrites and no
//! node ever owns another. Freed slots are recycled through a free list.
//!
//! # Invariants
//!
//! 1. `head.is_none() == tail.is_none()`.
//! 2. For every linked node `n`: `n.prev.next == n` and `n.next.prev == n`.
//! 3. `head` has no `prev`; `tail` has no `next`.
//! 4. `len` equals the number of occupied slots, all of which are linked.
//!
//! The arena knows nothing about cursors or notification; the owning
//! [`MoveLog`](crate::MoveLog) handles those.

use crate::node::Entry;

/// Handle to a node in the arena.
///
/// A handle is only meaningful while its node is linked. After removal the
/// slot may be reused, so handles must not be kept across deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) entry: Entry,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    slots: Vec<Option<Node>>,
    free: Vec<NodeId>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl Arena {
    pub(crate) fn head(&self) -> Option<NodeId> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of slots ever allocated, linked or free.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub(crate) fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.get(id).map(|node| &node.entry)
    }

    pub(crate) fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.prev)
    }

    pub(crate) fn next(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.next)
    }

    /// Handle of the `index`-th node counted from the head.
    pub(crate) fn nth(&self, index: usize) -> Option<NodeId> {
        self.ids_from(self.head).nth(index)
    }

    /// Walk forward from `start` (inclusive) to the tail.
    pub(crate) fn ids_from(&self, start: Option<NodeId>) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(start, move |&id| self.next(id))
    }

    /// Walk backward from `start` (inclusive) to the head.
    pub(crate) fn ids_back_from(
        &self,
        start: Option<NodeId>,
    ) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(start, move |&id| self.prev(id))
    }

    /// Create a node holding `entry` and splice it in right before `anchor`,
    /// or at the tail when `anchor` is `None`.
    pub(crate) fn insert_before(&mut self, anchor: Option<NodeId>, entry: Entry) -> NodeId {
        let prev = match anchor {
            Some(anchor) => self.prev(anchor),
            None => self.tail,
        };
        let id = self.alloc(Node {
            entry,
            prev,
            next: anchor,
        });

        match anchor.and_then(|anchor| self.get_mut(anchor)) {
            Some(next) => next.prev = Some(id),
            None => self.tail = Some(id),
        }
        match prev.and_then(|prev| self.get_mut(prev)) {
            Some(prev) => prev.next = Some(id),
            None => self.head = Some(id),
        }
        self.len += 1;
        id
    }

    /// Splice `id` out of the chain and free its slot.
    ///
    /// Returns the removed node, or `None` if `id` was not linked.
    pub(crate) fn unlink(&mut self, id: NodeId) -> Option<Node> {
        let node = self.slots.get_mut(id.index())?.take()?;

        match node.prev.and_then(|prev| self.get_mut(prev)) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|next| self.get_mut(next)) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }
        self.free.push(id);
        self.len -= 1;
        Some(node)
    }

    /// Drop every node and release the slot storage.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(node);
            return id;
        }
        let index = u32::try_from(self.slots.len()).unwrap_or_else(|_| {
            panic!("move log arena exceeded {} nodes", u32::MAX);
        });
        self.slots.push(Some(node));
        NodeId(index)
    }
}
