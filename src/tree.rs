//! The red-black balancer.
//!
//! Structure:
//! - [`Tree`] is just the root handle; records and their links live in a
//!   caller-owned [`Nodes`] arena
//! - Duplicate keys are allowed; an equal key descends right on insert
//!
//! Operations:
//! - search: O(log n)
//! - insert: O(log n), at most two rotations
//! - delete: O(log n), at most three rotations
//! - free: O(n), post-order, releases each node exactly once
//!
//! Every mutation leaves the tree balanced and, when a hook is given,
//! every aggregate consistent before it returns.

use std::cmp::Ordering;

use crate::augment::Augment;
use crate::augment::Inert;
use crate::node::Color;
use crate::node::Dir;
use crate::node::Link;
use crate::node::NodeId;
use crate::node::Nodes;
use crate::node::child;
use crate::node::extreme;
use crate::node::is_red;
use crate::node::parent;
use crate::node::set_color;

/// Handle to a red-black tree whose nodes live in a caller-owned arena.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    pub(crate) root: Option<NodeId>,
}

impl Tree {
    pub const fn new() -> Tree {
        return Tree { root: None };
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        return self.root;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        return self.root.is_none();
    }

    /// Find a node comparing equal to `key`.
    ///
    /// `cmp(key, node)` returns how `key` orders relative to `node`.
    pub fn search<S, K, C>(&self, s: &S, key: &K, mut cmp: C) -> Option<NodeId>
    where
        S: Nodes + ?Sized,
        K: ?Sized,
        C: FnMut(&K, &S::Record) -> Ordering,
    {
        let mut cur = self.root;
        while let Some(id) = cur {
            cur = match cmp(key, s.record(id)) {
                Ordering::Less => child(s, id, Dir::Left),
                Ordering::Greater => child(s, id, Dir::Right),
                Ordering::Equal => return Some(id),
            };
        }
        return None;
    }

    /// The smallest node.
    pub fn first<S: Nodes + ?Sized>(&self, s: &S) -> Option<NodeId> {
        return self.root.map(|root| extreme(s, root, Dir::Left));
    }

    /// The largest node.
    pub fn last<S: Nodes + ?Sized>(&self, s: &S) -> Option<NodeId> {
        return self.root.map(|root| extreme(s, root, Dir::Right));
    }

    /// Link `node` into the tree. `cmp(new, existing)` orders the records.
    pub fn insert<S, C>(&mut self, s: &mut S, node: NodeId, cmp: C)
    where
        S: Nodes + ?Sized,
        C: FnMut(&S::Record, &S::Record) -> Ordering,
    {
        self.aug_insert(s, node, cmp, Inert);
    }

    /// Link `node` into the tree, maintaining aggregates through `aug`.
    pub fn aug_insert<S, C, A>(&mut self, s: &mut S, node: NodeId, mut cmp: C, mut aug: A)
    where
        S: Nodes + ?Sized,
        C: FnMut(&S::Record, &S::Record) -> Ordering,
        A: Augment<S>,
    {
        *s.link_mut(node) = Link::new();

        let mut above = None;
        let mut side = Dir::Left;
        let mut cur = self.root;
        while let Some(id) = cur {
            above = Some(id);
            side = match cmp(s.record(node), s.record(id)) {
                Ordering::Less => Dir::Left,
                Ordering::Equal | Ordering::Greater => Dir::Right,
            };
            cur = child(s, id, side);
        }

        s.link_mut(node).set_parent(above);
        match above {
            Some(p) => s.link_mut(p).set_child(side, Some(node)),
            None => self.root = Some(node),
        }

        // Rotations below keep subtree totals intact, so the path can be
        // brought up to date before rebalancing.
        propagate(s, Some(node), &mut aug);
        self.insert_fixup(s, node, &mut aug);
        self.after_mutation(s);
    }

    fn insert_fixup<S, A>(&mut self, s: &mut S, node: NodeId, aug: &mut A)
    where
        S: Nodes + ?Sized,
        A: Augment<S>,
    {
        let mut x = node;
        while let Some(mut p) = parent(s, x) {
            if !s.link(p).is_red() {
                break;
            }
            // A red parent is never the root.
            let Some(g) = parent(s, p) else { break };
            let side = side_of(s, g, p);
            let uncle = child(s, g, side.flip());

            if let Some(u) = uncle.filter(|&u| s.link(u).is_red()) {
                set_color(s, p, Color::Black);
                set_color(s, u, Color::Black);
                set_color(s, g, Color::Red);
                x = g;
                continue;
            }

            if child(s, p, side.flip()) == Some(x) {
                // Zig-zag: turn it into the outer case.
                self.rotate(s, p, side, aug);
                p = present_child(s, g, side);
            }

            set_color(s, p, Color::Black);
            set_color(s, g, Color::Red);
            self.rotate(s, g, side.flip(), aug);
            break;
        }

        if let Some(root) = self.root {
            set_color(s, root, Color::Black);
        }
    }

    /// Remove one node comparing equal to `key`, handing it to `release`
    /// once it is fully unlinked. Returns false if no node matched.
    pub fn delete<S, K, C, R>(&mut self, s: &mut S, key: &K, cmp: C, release: R) -> bool
    where
        S: Nodes + ?Sized,
        K: ?Sized,
        C: FnMut(&K, &S::Record) -> Ordering,
        R: FnMut(&mut S, NodeId),
    {
        return self.aug_delete(s, key, cmp, release, Inert);
    }

    /// [`delete`](Self::delete) that maintains aggregates through `aug`.
    pub fn aug_delete<S, K, C, R, A>(
        &mut self,
        s: &mut S,
        key: &K,
        cmp: C,
        mut release: R,
        aug: A,
    ) -> bool
    where
        S: Nodes + ?Sized,
        K: ?Sized,
        C: FnMut(&K, &S::Record) -> Ordering,
        R: FnMut(&mut S, NodeId),
        A: Augment<S>,
    {
        let Some(node) = self.search(s, key, cmp) else {
            tracing::trace!("delete: no matching node");
            return false;
        };
        self.remove(s, node, aug);
        tracing::trace!(node = node.index(), "delete: releasing node");
        release(s, node);
        return true;
    }

    /// Unlink `node`, which must currently be in this tree. The node's
    /// link is reset; its record is left for the caller to reuse or free.
    pub fn remove<S, A>(&mut self, s: &mut S, node: NodeId, mut aug: A)
    where
        S: Nodes + ?Sized,
        A: Augment<S>,
    {
        let link = s.link(node).clone();
        let (left, right) = (link.left(), link.right());

        // The vacated position: its occupant (possibly absent) and parent.
        let x;
        let x_parent;
        let removed_color;

        match (left, right) {
            (Some(left), Some(right)) => {
                // Put the in-order successor in `node`'s place so that
                // `node` itself is what leaves the tree.
                let y = extreme(s, right, Dir::Left);
                removed_color = s.link(y).color();
                x = child(s, y, Dir::Right);

                if y == right {
                    x_parent = Some(y);
                } else {
                    let yp = parent(s, y);
                    if let Some(yp) = yp {
                        s.link_mut(yp).set_child(Dir::Left, x);
                    }
                    if let Some(x) = x {
                        s.link_mut(x).set_parent(yp);
                    }
                    s.link_mut(y).set_child(Dir::Right, Some(right));
                    s.link_mut(right).set_parent(Some(y));
                    x_parent = yp;
                }

                self.replace_child(s, link.parent(), node, Some(y));
                let y_link = s.link_mut(y);
                y_link.set_parent(link.parent());
                y_link.set_child(Dir::Left, Some(left));
                y_link.set_color(link.color());
                s.link_mut(left).set_parent(Some(y));
            }
            (only, None) | (None, only) => {
                x = only;
                x_parent = link.parent();
                removed_color = link.color();
                self.replace_child(s, link.parent(), node, x);
                if let Some(x) = x {
                    s.link_mut(x).set_parent(link.parent());
                }
            }
        }

        *s.link_mut(node) = Link::new();

        propagate(s, x_parent, &mut aug);
        if removed_color == Color::Black {
            self.remove_fixup(s, x, x_parent, &mut aug);
        }
        self.after_mutation(s);
    }

    fn remove_fixup<S, A>(
        &mut self,
        s: &mut S,
        mut x: Option<NodeId>,
        mut x_parent: Option<NodeId>,
        aug: &mut A,
    ) where
        S: Nodes + ?Sized,
        A: Augment<S>,
    {
        // `x` carries an extra black until it reaches the root or a red node.
        while x != self.root && !is_red(s, x) {
            let Some(p) = x_parent else { break };
            let side = if child(s, p, Dir::Left) == x { Dir::Left } else { Dir::Right };
            let far = side.flip();

            // A doubly black `x` always has a sibling.
            let mut w = present_child(s, p, far);
            if s.link(w).is_red() {
                set_color(s, w, Color::Black);
                set_color(s, p, Color::Red);
                self.rotate(s, p, side, aug);
                w = present_child(s, p, far);
            }

            let near_red = is_red(s, child(s, w, side));
            let far_red = is_red(s, child(s, w, far));
            if !near_red && !far_red {
                set_color(s, w, Color::Red);
                x = Some(p);
                x_parent = parent(s, p);
                continue;
            }

            if !far_red {
                if let Some(near) = child(s, w, side) {
                    set_color(s, near, Color::Black);
                }
                set_color(s, w, Color::Red);
                self.rotate(s, w, far, aug);
                w = present_child(s, p, far);
            }

            let p_color = s.link(p).color();
            set_color(s, w, p_color);
            set_color(s, p, Color::Black);
            if let Some(far_child) = child(s, w, far) {
                set_color(s, far_child, Color::Black);
            }
            self.rotate(s, p, side, aug);
            x = self.root;
            break;
        }

        if let Some(x) = x {
            set_color(s, x, Color::Black);
        }
    }

    /// Recompute aggregates from `node` up to the root, after the caller
    /// changed data that `node`'s own contribution depends on.
    pub fn update_aggregate<S, A>(&self, s: &mut S, node: NodeId, mut aug: A)
    where
        S: Nodes + ?Sized,
        A: Augment<S>,
    {
        propagate(s, Some(node), &mut aug);
    }

    /// Release every node, children before parents. The tree is empty
    /// afterwards.
    pub fn free<S, R>(&mut self, s: &mut S, mut release: R)
    where
        S: Nodes + ?Sized,
        R: FnMut(&mut S, NodeId),
    {
        let mut released = 0usize;
        let mut cur = self.root.take();
        while let Some(id) = cur {
            if let Some(left) = child(s, id, Dir::Left) {
                cur = Some(left);
                continue;
            }
            if let Some(right) = child(s, id, Dir::Right) {
                cur = Some(right);
                continue;
            }

            let above = parent(s, id);
            if let Some(p) = above {
                let side = side_of(s, p, id);
                s.link_mut(p).set_child(side, None);
            }
            *s.link_mut(id) = Link::new();
            release(s, id);
            released += 1;
            cur = above;
        }
        tracing::trace!(released, "free: tree emptied");
    }

    /// Rotate `x` down in direction `dir`; its child on the other side
    /// takes its place.
    fn rotate<S, A>(&mut self, s: &mut S, x: NodeId, dir: Dir, aug: &mut A)
    where
        S: Nodes + ?Sized,
        A: Augment<S>,
    {
        let up = dir.flip();
        let Some(y) = child(s, x, up) else {
            unreachable!("rotation pivot {x:?} has no {up:?} child");
        };

        let inner = child(s, y, dir);
        s.link_mut(x).set_child(up, inner);
        if let Some(inner) = inner {
            s.link_mut(inner).set_parent(Some(x));
        }

        let above = parent(s, x);
        s.link_mut(y).set_parent(above);
        self.replace_child(s, above, x, Some(y));

        s.link_mut(y).set_child(dir, Some(x));
        s.link_mut(x).set_parent(Some(y));

        aug.recompute(s, x);
        aug.recompute(s, y);
    }

    /// Point whatever referenced `old` (a parent slot or the root) at `new`.
    fn replace_child<S>(&mut self, s: &mut S, above: Option<NodeId>, old: NodeId, new: Option<NodeId>)
    where
        S: Nodes + ?Sized,
    {
        match above {
            Some(p) => {
                let side = side_of(s, p, old);
                s.link_mut(p).set_child(side, new);
            }
            None => self.root = new,
        }
    }

    #[cfg(feature = "invariants")]
    fn after_mutation<S: Nodes + ?Sized>(&self, s: &S) {
        if let Err(violation) = crate::check::validate(self, s) {
            tracing::error!(%violation, "red-black invariant broken");
            panic!("red-black invariant broken: {violation}");
        }
    }

    #[cfg(not(feature = "invariants"))]
    #[inline(always)]
    fn after_mutation<S: Nodes + ?Sized>(&self, _s: &S) {}
}

/// Which child of `p` is `c`.
#[inline(always)]
fn side_of<S: Nodes + ?Sized>(s: &S, p: NodeId, c: NodeId) -> Dir {
    if child(s, p, Dir::Left) == Some(c) {
        return Dir::Left;
    }
    return Dir::Right;
}

/// The `dir` child of `p`, which the caller knows is present.
#[inline(always)]
fn present_child<S: Nodes + ?Sized>(s: &S, p: NodeId, dir: Dir) -> NodeId {
    let Some(c) = child(s, p, dir) else {
        unreachable!("{p:?} lost its {dir:?} child during rebalancing");
    };
    return c;
}

/// Recompute `from` and each of its ancestors, bottom-up.
fn propagate<S, A>(s: &mut S, from: Option<NodeId>, aug: &mut A)
where
    S: Nodes + ?Sized,
    A: Augment<S>,
{
    let mut cur = from;
    while let Some(id) = cur {
        aug.recompute(s, id);
        cur = parent(s, id);
    }
}
