//! Bottom-up subtree augmentation.
//!
//! The balancer calls [`Augment::recompute`] on every node whose subtree
//! changed, always after both children are already up to date. A hook may
//! read its node's children and its own record; it must not touch links.
//!
//! Three kinds of hook are provided:
//! - [`Inert`]: nothing is maintained.
//! - any `FnMut(&mut S, NodeId)`: a hand-written recompute function.
//! - [`Summarize`]: folds an [`Aggregate`] over records implementing
//!   [`Summary`].

use crate::node::Linked;
use crate::node::NodeId;
use crate::node::Nodes;

/// A recompute hook invoked by the balancer.
pub trait Augment<S: Nodes + ?Sized> {
    fn recompute(&mut self, store: &mut S, id: NodeId);
}

/// The hook used when a tree carries no augmentation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inert;

impl<S: Nodes + ?Sized> Augment<S> for Inert {
    #[inline(always)]
    fn recompute(&mut self, _store: &mut S, _id: NodeId) {}
}

impl<S, F> Augment<S> for F
where
    S: Nodes + ?Sized,
    F: FnMut(&mut S, NodeId),
{
    #[inline]
    fn recompute(&mut self, store: &mut S, id: NodeId) {
        self(store, id);
    }
}

/// A value that can be folded over a subtree.
///
/// `combine` must be associative and `Default` must be its identity.
pub trait Aggregate: Clone + Default {
    fn combine(&self, other: &Self) -> Self;
}

/// Counts records; the classic order-statistics augmentation.
///
/// With `local() == Count(1)` a node's summary is its subtree size, which is
/// what lets [`RankMap::nth`](crate::RankMap::nth) and
/// [`RankMap::rank`](crate::RankMap::rank) skip whole left subtrees on the
/// way down instead of walking them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Count(pub usize);

impl Aggregate for Count {
    fn combine(&self, other: &Self) -> Self {
        return Count(self.0 + other.0);
    }
}

/// Sums u64 weights, for records whose share of a subtree is not one each
/// (byte lengths, priorities).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Weight(pub u64);

impl Aggregate for Weight {
    fn combine(&self, other: &Self) -> Self {
        return Weight(self.0 + other.0);
    }
}

/// A record that stores the aggregate of its own subtree.
pub trait Summary: Linked {
    type Agg: Aggregate;

    /// The contribution of this record alone.
    fn local(&self) -> Self::Agg;

    /// The stored aggregate of the subtree rooted here.
    fn summary(&self) -> &Self::Agg;

    fn set_summary(&mut self, agg: Self::Agg);
}

/// Recomputes `summary = left ⊕ local ⊕ right` for [`Summary`] records.
#[derive(Clone, Copy, Debug, Default)]
pub struct Summarize;

impl<S> Augment<S> for Summarize
where
    S: Nodes + ?Sized,
    S::Record: Summary,
{
    fn recompute(&mut self, store: &mut S, id: NodeId) {
        let agg = summarize(store, id);
        store.record_mut(id).set_summary(agg);
    }
}

/// What the stored summary of `id` should be, given its children's summaries.
pub fn summarize<S>(store: &S, id: NodeId) -> <S::Record as Summary>::Agg
where
    S: Nodes + ?Sized,
    S::Record: Summary,
{
    let link = store.link(id);
    let mut agg = store.record(id).local();
    if let Some(left) = link.left() {
        agg = store.record(left).summary().combine(&agg);
    }
    if let Some(right) = link.right() {
        agg = agg.combine(store.record(right).summary());
    }
    return agg;
}
