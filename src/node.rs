//! Embedded tree links and the arenas that hold them.
//!
//! A record joins a tree by carrying a [`Link`] by value and implementing
//! [`Linked`], the projection from the record to its link. Records live in a
//! caller-owned arena implementing [`Nodes`]; the tree only ever rewrites the
//! links and addresses records by [`NodeId`].

use slab::Slab;

/// Stable handle of a record inside its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline(always)]
    pub fn index(self) -> usize {
        return self.0;
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> NodeId {
        return NodeId(index);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Color {
    #[default]
    Red,
    Black,
}

/// Which child slot of a parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    #[inline(always)]
    pub(crate) fn flip(self) -> Dir {
        return match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        };
    }
}

/// The tree-link fields embedded in every record.
///
/// A fresh link is red and detached. The tree resets a node's link when it
/// is inserted and again once it has been unlinked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Link {
    color: Color,
    parent: Option<NodeId>,
    children: [Option<NodeId>; 2],
}

impl Link {
    pub const fn new() -> Link {
        return Link {
            color: Color::Red,
            parent: None,
            children: [None, None],
        };
    }

    #[inline]
    pub fn color(&self) -> Color {
        return self.color;
    }

    #[inline]
    pub fn is_red(&self) -> bool {
        return self.color == Color::Red;
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        return self.parent;
    }

    #[inline]
    pub fn left(&self) -> Option<NodeId> {
        return self.children[0];
    }

    #[inline]
    pub fn right(&self) -> Option<NodeId> {
        return self.children[1];
    }

    #[inline(always)]
    pub(crate) fn child(&self, dir: Dir) -> Option<NodeId> {
        return self.children[dir as usize];
    }

    #[inline(always)]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Option<NodeId>) {
        self.children[dir as usize] = child;
    }

    #[inline(always)]
    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    #[inline(always)]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// Projection from a record to the link it embeds.
pub trait Linked {
    fn link(&self) -> &Link;
    fn link_mut(&mut self) -> &mut Link;
}

impl Linked for Link {
    fn link(&self) -> &Link {
        return self;
    }

    fn link_mut(&mut self) -> &mut Link {
        return self;
    }
}

/// A caller-owned arena of linked records.
///
/// Resolving an id that does not name a live record panics, the same as
/// indexing past the end of a slice.
pub trait Nodes {
    type Record: Linked;

    fn record(&self, id: NodeId) -> &Self::Record;
    fn record_mut(&mut self, id: NodeId) -> &mut Self::Record;

    #[inline]
    fn link(&self, id: NodeId) -> &Link {
        return self.record(id).link();
    }

    #[inline]
    fn link_mut(&mut self, id: NodeId) -> &mut Link {
        return self.record_mut(id).link_mut();
    }
}

impl<R: Linked> Nodes for [R] {
    type Record = R;

    #[inline]
    fn record(&self, id: NodeId) -> &R {
        return &self[id.index()];
    }

    #[inline]
    fn record_mut(&mut self, id: NodeId) -> &mut R {
        return &mut self[id.index()];
    }
}

impl<R: Linked> Nodes for Vec<R> {
    type Record = R;

    #[inline]
    fn record(&self, id: NodeId) -> &R {
        return &self[id.index()];
    }

    #[inline]
    fn record_mut(&mut self, id: NodeId) -> &mut R {
        return &mut self[id.index()];
    }
}

impl<R: Linked> Nodes for Slab<R> {
    type Record = R;

    #[inline]
    fn record(&self, id: NodeId) -> &R {
        return &self[id.index()];
    }

    #[inline]
    fn record_mut(&mut self, id: NodeId) -> &mut R {
        return &mut self[id.index()];
    }
}

// Small accessors shared by the balancer, cursor and validator.

#[inline(always)]
pub(crate) fn child<S: Nodes + ?Sized>(s: &S, id: NodeId, dir: Dir) -> Option<NodeId> {
    return s.link(id).child(dir);
}

#[inline(always)]
pub(crate) fn parent<S: Nodes + ?Sized>(s: &S, id: NodeId) -> Option<NodeId> {
    return s.link(id).parent();
}

/// Absent children count as black.
#[inline(always)]
pub(crate) fn is_red<S: Nodes + ?Sized>(s: &S, id: Option<NodeId>) -> bool {
    return match id {
        Some(id) => s.link(id).is_red(),
        None => false,
    };
}

#[inline(always)]
pub(crate) fn set_color<S: Nodes + ?Sized>(s: &mut S, id: NodeId, color: Color) {
    s.link_mut(id).set_color(color);
}

/// Walk from `id` as far as possible in direction `dir`.
#[inline]
pub(crate) fn extreme<S: Nodes + ?Sized>(s: &S, mut id: NodeId, dir: Dir) -> NodeId {
    while let Some(next) = child(s, id, dir) {
        id = next;
    }
    return id;
}
