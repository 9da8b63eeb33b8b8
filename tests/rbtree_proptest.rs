//! Property-based tests: random operation sequences against a `BTreeMap`
//! model, with structural and aggregate checks after every step.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use proptest::prelude::*;
use slab::Slab;

use redblack::Aggregate;
use redblack::Link;
use redblack::Linked;
use redblack::NodeId;
use redblack::RankMap;
use redblack::Summarize;
use redblack::Summary;
use redblack::Tree;
use redblack::Weight;
use redblack::augment::summarize;
use redblack::check;

// =============================================================================
// Test helpers
// =============================================================================

/// A record carrying a weight and the total weight of its subtree.
struct Weighted {
    key: u16,
    weight: u64,
    total: Weight,
    rb: Link,
}

impl Linked for Weighted {
    fn link(&self) -> &Link {
        return &self.rb;
    }

    fn link_mut(&mut self) -> &mut Link {
        return &mut self.rb;
    }
}

impl Summary for Weighted {
    type Agg = Weight;

    fn local(&self) -> Weight {
        return Weight(self.weight);
    }

    fn summary(&self) -> &Weight {
        return &self.total;
    }

    fn set_summary(&mut self, agg: Weight) {
        self.total = agg;
    }
}

type Store = Slab<Weighted>;

fn cmp(key: &u16, node: &Weighted) -> Ordering {
    return key.cmp(&node.key);
}

fn release(store: &mut Store, id: NodeId) {
    store.remove(id.index());
}

fn assert_consistent(tree: &Tree, store: &Store) -> Result<(), TestCaseError> {
    let result = check::validate_with(tree, store, |s, id| {
        return summarize(s, id) == *s[id.index()].summary();
    });
    prop_assert!(result.is_ok(), "{:?}", result);
    return Ok(());
}

#[derive(Clone, Debug)]
enum Op {
    Insert { key: u16, weight: u64 },
    Delete { key: u16 },
    Reweigh { key: u16, weight: u64 },
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u16..256, 0u64..1000).prop_map(|(key, weight)| Op::Insert { key, weight }),
        2 => (0u16..256).prop_map(|key| Op::Delete { key }),
        1 => (0u16..256, 0u64..1000).prop_map(|(key, weight)| Op::Reweigh { key, weight }),
    ]
}

// =============================================================================
// Tree properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any operation sequence keeps the tree balanced, ordered, and its
    /// total weight equal to the model's.
    #[test]
    fn matches_model(ops in prop::collection::vec(arbitrary_op(), 1..200)) {
        let mut store = Store::new();
        let mut tree = Tree::new();
        let mut model: BTreeMap<u16, u64> = BTreeMap::new();

        for op in &ops {
            match *op {
                Op::Insert { key, weight } => {
                    if model.contains_key(&key) {
                        continue;
                    }
                    let id = NodeId(store.insert(Weighted { key, weight, total: Weight(0), rb: Link::new() }));
                    tree.aug_insert(&mut store, id, |a: &Weighted, b: &Weighted| a.key.cmp(&b.key), Summarize);
                    model.insert(key, weight);
                }
                Op::Delete { key } => {
                    let found = tree.aug_delete(&mut store, &key, cmp, release, Summarize);
                    prop_assert_eq!(found, model.remove(&key).is_some());
                }
                Op::Reweigh { key, weight } => {
                    let Some(id) = tree.search(&store, &key, cmp) else { continue };
                    store[id.index()].weight = weight;
                    tree.update_aggregate(&mut store, id, Summarize);
                    model.insert(key, weight);
                }
            }

            assert_consistent(&tree, &store)?;
            let total = tree.root().map_or(Weight(0), |root| store[root.index()].total);
            prop_assert_eq!(total, Weight(model.values().sum()));
            prop_assert_eq!(store.len(), model.len());
        }

        let keys: Vec<u16> = tree.iter(&store).map(|(_, n)| n.key).collect();
        let expected: Vec<u16> = model.keys().copied().collect();
        prop_assert_eq!(&keys, &expected);

        let mut reversed: Vec<u16> = tree.iter_rev(&store).map(|(_, n)| n.key).collect();
        reversed.reverse();
        prop_assert_eq!(&reversed, &expected);

        tree.free(&mut store, release);
        prop_assert!(store.is_empty());
    }

    /// Bound cursors agree with the model's range queries.
    #[test]
    fn bounds_match_model(
        keys in prop::collection::btree_set(0u16..512, 0..100),
        probe in 0u16..512,
    ) {
        let mut store = Store::new();
        let mut tree = Tree::new();
        for &key in &keys {
            let id = NodeId(store.insert(Weighted { key, weight: 1, total: Weight(0), rb: Link::new() }));
            tree.insert(&mut store, id, |a: &Weighted, b: &Weighted| a.key.cmp(&b.key));
        }

        let walk = |cursor: redblack::Cursor, forward: bool| -> Vec<u16> {
            let iter = if forward { cursor.forward(&store) } else { cursor.backward(&store) };
            return iter.map(|(_, n)| n.key).collect();
        };

        let ge: Vec<u16> = keys.range(probe..).copied().collect();
        let gt: Vec<u16> = keys.range(probe + 1..).copied().collect();
        let lt: Vec<u16> = keys.range(..probe).rev().copied().collect();
        let le: Vec<u16> = keys.range(..=probe).rev().copied().collect();

        prop_assert_eq!(walk(tree.lower_bound_forward(&store, &probe, cmp), true), ge);
        prop_assert_eq!(walk(tree.upper_bound_forward(&store, &probe, cmp), true), gt);
        prop_assert_eq!(walk(tree.lower_bound_backward(&store, &probe, cmp), false), lt);
        prop_assert_eq!(walk(tree.upper_bound_backward(&store, &probe, cmp), false), le);
    }

    /// Duplicates are all kept, and each delete removes exactly one.
    #[test]
    fn duplicates_round_trip(keys in prop::collection::vec(0u16..8, 1..64)) {
        let mut store = Store::new();
        let mut tree = Tree::new();
        for &key in &keys {
            let id = NodeId(store.insert(Weighted { key, weight: 1, total: Weight(0), rb: Link::new() }));
            tree.aug_insert(&mut store, id, |a: &Weighted, b: &Weighted| a.key.cmp(&b.key), Summarize);
        }
        let root = tree.root().unwrap();
        prop_assert_eq!(store[root.index()].total, Weight(keys.len() as u64));

        let mut sorted = keys.clone();
        sorted.sort_unstable();
        let walked: Vec<u16> = tree.iter(&store).map(|(_, n)| n.key).collect();
        prop_assert_eq!(walked, sorted);

        for &key in &keys {
            prop_assert!(tree.aug_delete(&mut store, &key, cmp, release, Summarize));
            assert_consistent(&tree, &store)?;
        }
        prop_assert!(tree.is_empty());
    }
}

// =============================================================================
// RankMap properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn rank_map_matches_btree(
        inserts in prop::collection::vec((0u32..300, any::<u8>()), 0..150),
        removes in prop::collection::vec(0u32..300, 0..100),
    ) {
        let mut map = RankMap::new();
        let mut model = BTreeMap::new();
        for &(key, value) in &inserts {
            prop_assert_eq!(map.insert(key, value), model.insert(key, value));
        }
        for key in &removes {
            prop_assert_eq!(map.remove(key), model.remove(key));
        }
        prop_assert!(map.validate().is_ok());
        prop_assert_eq!(map.len(), model.len());

        let ordered: BTreeSet<u32> = model.keys().copied().collect();
        for (i, key) in ordered.iter().enumerate() {
            prop_assert_eq!(map.nth(i).map(|(k, _)| *k), Some(*key));
            prop_assert_eq!(map.rank(key), i);
            prop_assert_eq!(map.get(key), model.get(key));
        }
        prop_assert_eq!(map.nth(model.len()), None);
    }
}

#[test]
fn weight_is_associative() {
    let (a, b, c) = (Weight(3), Weight(5), Weight(11));
    assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
}
