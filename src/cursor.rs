//! Bound queries and resumable in-order cursors.
//!
//! A [`Cursor`] is the root-to-current ancestor path. Stepping either way
//! only descends into the next subtree or pops back up the path, so a full
//! walk is O(1) amortized per step and never searches from the root again.
//!
//! | query                  | first node yielded         | then walks |
//! |------------------------|----------------------------|------------|
//! | `lower_bound_forward`  | least node `>= key`        | forward    |
//! | `upper_bound_forward`  | least node `> key`         | forward    |
//! | `lower_bound_backward` | greatest node `< key`      | backward   |
//! | `upper_bound_backward` | greatest node `<= key`     | backward   |

use std::cmp::Ordering;
use std::iter::FusedIterator;

use smallvec::SmallVec;

use crate::node::Dir;
use crate::node::NodeId;
use crate::node::Nodes;
use crate::node::child;
use crate::tree::Tree;

/// Inline capacity of the ancestor path. A red-black tree of height 64
/// holds at least 2^32 - 1 nodes; deeper paths spill to the heap.
const INLINE_DEPTH: usize = 64;

/// A resume point for an in-order walk.
///
/// The cursor borrows nothing from the tree; mutating the tree while a
/// cursor over it is still in use leaves the cursor meaningless.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Ancestors of the current node, root first; the last entry is current.
    path: SmallVec<[NodeId; INLINE_DEPTH]>,
}

impl Cursor {
    /// A cursor that is already past the end.
    pub fn exhausted() -> Cursor {
        return Cursor { path: SmallVec::new() };
    }

    #[inline]
    pub fn current(&self) -> Option<NodeId> {
        return self.path.last().copied();
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        return self.path.is_empty();
    }

    /// Move to the next node in sorted order and return it.
    pub fn step_forward<S: Nodes + ?Sized>(&mut self, s: &S) -> Option<NodeId> {
        return self.step(s, Dir::Right);
    }

    /// Move to the previous node in sorted order and return it.
    pub fn step_backward<S: Nodes + ?Sized>(&mut self, s: &S) -> Option<NodeId> {
        return self.step(s, Dir::Left);
    }

    /// Walk from the current node (inclusive) in ascending order.
    pub fn forward<S: Nodes + ?Sized>(self, s: &S) -> Iter<'_, S> {
        return Iter { store: s, cursor: self, dir: Dir::Right };
    }

    /// Walk from the current node (inclusive) in descending order.
    pub fn backward<S: Nodes + ?Sized>(self, s: &S) -> Iter<'_, S> {
        return Iter { store: s, cursor: self, dir: Dir::Left };
    }

    fn step<S: Nodes + ?Sized>(&mut self, s: &S, dir: Dir) -> Option<NodeId> {
        let cur = self.current()?;

        if let Some(next) = child(s, cur, dir) {
            self.path.push(next);
            let mut id = next;
            while let Some(deeper) = child(s, id, dir.flip()) {
                self.path.push(deeper);
                id = deeper;
            }
            return Some(id);
        }

        // Climb until we leave a subtree from the side facing `dir`.
        let mut from = cur;
        self.path.pop();
        while let Some(&up) = self.path.last() {
            if child(s, up, dir.flip()) == Some(from) {
                return Some(up);
            }
            from = up;
            self.path.pop();
        }
        return None;
    }
}

/// Lazy in-order walk yielding `(id, record)` pairs.
pub struct Iter<'a, S: Nodes + ?Sized> {
    store: &'a S,
    cursor: Cursor,
    dir: Dir,
}

impl<'a, S: Nodes + ?Sized> Iter<'a, S> {
    /// The cursor positioned at the node `next` would yield.
    pub fn cursor(&self) -> &Cursor {
        return &self.cursor;
    }
}

impl<'a, S: Nodes + ?Sized> Iterator for Iter<'a, S> {
    type Item = (NodeId, &'a S::Record);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor.current()?;
        self.cursor.step(self.store, self.dir);
        return Some((id, self.store.record(id)));
    }
}

impl<'a, S: Nodes + ?Sized> FusedIterator for Iter<'a, S> {}

impl Tree {
    /// Cursor at the smallest node.
    pub fn cursor_first<S: Nodes + ?Sized>(&self, s: &S) -> Cursor {
        return self.descend(s, |_| true, Dir::Left);
    }

    /// Cursor at the largest node.
    pub fn cursor_last<S: Nodes + ?Sized>(&self, s: &S) -> Cursor {
        return self.descend(s, |_| true, Dir::Right);
    }

    /// All nodes in ascending order.
    pub fn iter<'a, S: Nodes + ?Sized>(&self, s: &'a S) -> Iter<'a, S> {
        return self.cursor_first(s).forward(s);
    }

    /// All nodes in descending order.
    pub fn iter_rev<'a, S: Nodes + ?Sized>(&self, s: &'a S) -> Iter<'a, S> {
        return self.cursor_last(s).backward(s);
    }

    /// The least node `>= key`.
    pub fn lower_bound<S, K, C>(&self, s: &S, key: &K, cmp: C) -> Option<NodeId>
    where
        S: Nodes + ?Sized,
        K: ?Sized,
        C: FnMut(&K, &S::Record) -> Ordering,
    {
        return self.lower_bound_forward(s, key, cmp).current();
    }

    /// The least node `> key`.
    pub fn upper_bound<S, K, C>(&self, s: &S, key: &K, cmp: C) -> Option<NodeId>
    where
        S: Nodes + ?Sized,
        K: ?Sized,
        C: FnMut(&K, &S::Record) -> Ordering,
    {
        return self.upper_bound_forward(s, key, cmp).current();
    }

    /// Cursor at the least node `>= key`, for walking forward.
    pub fn lower_bound_forward<S, K, C>(&self, s: &S, key: &K, mut cmp: C) -> Cursor
    where
        S: Nodes + ?Sized,
        K: ?Sized,
        C: FnMut(&K, &S::Record) -> Ordering,
    {
        return self.descend(s, |id| cmp(key, s.record(id)) != Ordering::Greater, Dir::Left);
    }

    /// Cursor at the greatest node `< key`, for walking backward.
    pub fn lower_bound_backward<S, K, C>(&self, s: &S, key: &K, mut cmp: C) -> Cursor
    where
        S: Nodes + ?Sized,
        K: ?Sized,
        C: FnMut(&K, &S::Record) -> Ordering,
    {
        return self.descend(s, |id| cmp(key, s.record(id)) == Ordering::Greater, Dir::Right);
    }

    /// Cursor at the least node `> key`, for walking forward.
    pub fn upper_bound_forward<S, K, C>(&self, s: &S, key: &K, mut cmp: C) -> Cursor
    where
        S: Nodes + ?Sized,
        K: ?Sized,
        C: FnMut(&K, &S::Record) -> Ordering,
    {
        return self.descend(s, |id| cmp(key, s.record(id)) == Ordering::Less, Dir::Left);
    }

    /// Cursor at the greatest node `<= key`, for walking backward.
    pub fn upper_bound_backward<S, K, C>(&self, s: &S, key: &K, mut cmp: C) -> Cursor
    where
        S: Nodes + ?Sized,
        K: ?Sized,
        C: FnMut(&K, &S::Record) -> Ordering,
    {
        return self.descend(s, |id| cmp(key, s.record(id)) != Ordering::Less, Dir::Right);
    }

    /// Descend from the root, remembering the deepest node satisfying
    /// `qualifies`. Qualifying nodes send the walk toward `toward`, looking
    /// for a tighter candidate; the rest send it the other way.
    fn descend<S, F>(&self, s: &S, mut qualifies: F, toward: Dir) -> Cursor
    where
        S: Nodes + ?Sized,
        F: FnMut(NodeId) -> bool,
    {
        let mut path = SmallVec::new();
        let mut keep = 0;
        let mut cur = self.root;
        while let Some(id) = cur {
            path.push(id);
            if qualifies(id) {
                keep = path.len();
                cur = child(s, id, toward);
            } else {
                cur = child(s, id, toward.flip());
            }
        }
        path.truncate(keep);
        return Cursor { path };
    }
}
