//! An owning ordered map built on the intrusive tree.
//!
//! Entries live in a [`Slab`]; each one embeds its tree link and the size
//! of its subtree. The size aggregate turns rank queries into a single
//! descent:
//! - get/insert/remove: O(log n)
//! - nth(i): O(log n), the i-th smallest entry
//! - rank(k): O(log n), how many keys sort before `k`

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::mem;

use slab::Slab;

use crate::augment::Count;
use crate::augment::Summarize;
use crate::augment::Summary;
use crate::augment::summarize;
use crate::check;
use crate::check::Violation;
use crate::node::Link;
use crate::node::Linked;
use crate::node::NodeId;
use crate::tree::Tree;

struct Entry<K, V> {
    key: K,
    value: V,
    size: Count,
    rb: Link,
}

impl<K, V> Linked for Entry<K, V> {
    fn link(&self) -> &Link {
        return &self.rb;
    }

    fn link_mut(&mut self) -> &mut Link {
        return &mut self.rb;
    }
}

impl<K, V> Summary for Entry<K, V> {
    type Agg = Count;

    fn local(&self) -> Count {
        return Count(1);
    }

    fn summary(&self) -> &Count {
        return &self.size;
    }

    fn set_summary(&mut self, agg: Count) {
        self.size = agg;
    }
}

/// Ordered map with unique keys and O(log n) rank queries.
pub struct RankMap<K, V> {
    tree: Tree,
    entries: Slab<Entry<K, V>>,
}

fn by_key<K: Ord, V>(a: &Entry<K, V>, b: &Entry<K, V>) -> Ordering {
    return a.key.cmp(&b.key);
}

fn key_cmp<K, V, Q>(key: &Q, entry: &Entry<K, V>) -> Ordering
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    return key.cmp(entry.key.borrow());
}

impl<K: Ord, V> RankMap<K, V> {
    pub fn new() -> RankMap<K, V> {
        return RankMap {
            tree: Tree::new(),
            entries: Slab::new(),
        };
    }

    pub fn with_capacity(capacity: usize) -> RankMap<K, V> {
        return RankMap {
            tree: Tree::new(),
            entries: Slab::with_capacity(capacity),
        };
    }

    #[inline]
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        return self.tree.search(&self.entries, key, key_cmp);
    }

    fn pair(&self, id: NodeId) -> (&K, &V) {
        let entry = &self.entries[id.index()];
        return (&entry.key, &entry.value);
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        return self.find(key).map(|id| &self.entries[id.index()].value);
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        return Some(&mut self.entries[id.index()].value);
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        return self.find(key).is_some();
    }

    /// Insert or replace. Returns the previous value for `key`, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(id) = self.find(&key) {
            return Some(mem::replace(&mut self.entries[id.index()].value, value));
        }
        let slot = self.entries.insert(Entry {
            key,
            value,
            size: Count(1),
            rb: Link::new(),
        });
        self.tree.aug_insert(&mut self.entries, NodeId(slot), by_key, Summarize);
        return None;
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut taken = None;
        self.tree.aug_delete(
            &mut self.entries,
            key,
            key_cmp,
            |entries: &mut Slab<Entry<K, V>>, id: NodeId| {
                taken = Some(entries.remove(id.index()));
            },
            Summarize,
        );
        return taken.map(|entry| entry.value);
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        return self.tree.first(&self.entries).map(|id| self.pair(id));
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        return self.tree.last(&self.entries).map(|id| self.pair(id));
    }

    /// The entry with exactly `rank` smaller keys.
    pub fn nth(&self, mut rank: usize) -> Option<(&K, &V)> {
        let mut cur = self.tree.root();
        while let Some(id) = cur {
            let link = self.entries[id.index()].link();
            let before = self.subtree_len(link.left());
            cur = match rank.cmp(&before) {
                Ordering::Less => link.left(),
                Ordering::Equal => return Some(self.pair(id)),
                Ordering::Greater => {
                    rank -= before + 1;
                    link.right()
                }
            };
        }
        return None;
    }

    /// How many keys sort strictly before `key`.
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut before = 0;
        let mut cur = self.tree.root();
        while let Some(id) = cur {
            let entry = &self.entries[id.index()];
            let left = entry.rb.left();
            cur = match key.cmp(entry.key.borrow()) {
                Ordering::Less => left,
                Ordering::Equal => return before + self.subtree_len(left),
                Ordering::Greater => {
                    before += self.subtree_len(left) + 1;
                    entry.rb.right()
                }
            };
        }
        return before;
    }

    fn subtree_len(&self, id: Option<NodeId>) -> usize {
        return match id {
            Some(id) => self.entries[id.index()].size.0,
            None => 0,
        };
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        return self.tree.iter(&self.entries).map(|(_, e)| (&e.key, &e.value));
    }

    /// Entries in descending key order.
    pub fn iter_rev(&self) -> impl Iterator<Item = (&K, &V)> {
        return self.tree.iter_rev(&self.entries).map(|(_, e)| (&e.key, &e.value));
    }

    /// Entries with keys `>= key`, ascending.
    pub fn range_from<Q>(&self, key: &Q) -> impl Iterator<Item = (&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let cursor = self.tree.lower_bound_forward(&self.entries, key, key_cmp);
        return cursor.forward(&self.entries).map(|(_, e)| (&e.key, &e.value));
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.tree.free(&mut self.entries, |entries: &mut Slab<Entry<K, V>>, id: NodeId| {
            entries.remove(id.index());
        });
    }

    /// Check balance, links and every stored subtree size.
    pub fn validate(&self) -> Result<usize, Violation> {
        return check::validate_with(&self.tree, &self.entries, |entries, id| {
            return summarize(entries, id) == *entries[id.index()].summary();
        });
    }
}

impl<K: Ord, V> Default for RankMap<K, V> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for RankMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_map().entries(self.iter()).finish();
    }
}

impl<K: Ord, V> Extend<(K, V)> for RankMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RankMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RankMap::new();
        map.extend(iter);
        return map;
    }
}
