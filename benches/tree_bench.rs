//! Insert, delete and bound-walk throughput for the intrusive tree.

use std::cmp::Ordering;

use criterion::BatchSize;
use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use redblack::Count;
use redblack::Link;
use redblack::Linked;
use redblack::NodeId;
use redblack::RankMap;
use redblack::Summarize;
use redblack::Summary;
use redblack::Tree;

const N: u32 = 10_000;

struct Node {
    key: u32,
    size: Count,
    rb: Link,
}

impl Linked for Node {
    fn link(&self) -> &Link {
        return &self.rb;
    }

    fn link_mut(&mut self) -> &mut Link {
        return &mut self.rb;
    }
}

impl Summary for Node {
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

fn by_key(a: &Node, b: &Node) -> Ordering {
    return a.key.cmp(&b.key);
}

fn cmp(key: &u32, node: &Node) -> Ordering {
    return key.cmp(&node.key);
}

fn shuffled() -> Vec<u32> {
    let mut keys: Vec<u32> = (0..N).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(1));
    return keys;
}

fn store_of(keys: &[u32]) -> Vec<Node> {
    return keys
        .iter()
        .map(|&key| Node { key, size: Count(0), rb: Link::new() })
        .collect();
}

fn built(keys: &[u32]) -> (Tree, Vec<Node>) {
    let mut store = store_of(keys);
    let mut tree = Tree::new();
    for i in 0..store.len() {
        tree.aug_insert(&mut store, NodeId(i), by_key, Summarize);
    }
    return (tree, store);
}

fn bench_insert(c: &mut Criterion) {
    let keys = shuffled();
    c.bench_function("insert 10k random", |b| {
        b.iter_batched(
            || store_of(&keys),
            |mut store| {
                let mut tree = Tree::new();
                for i in 0..store.len() {
                    tree.insert(&mut store, NodeId(i), by_key);
                }
                black_box(tree);
            },
            BatchSize::LargeInput,
        );
    });
    c.bench_function("aug_insert 10k random", |b| {
        b.iter_batched(
            || store_of(&keys),
            |mut store| {
                let mut tree = Tree::new();
                for i in 0..store.len() {
                    tree.aug_insert(&mut store, NodeId(i), by_key, Summarize);
                }
                black_box(tree);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_delete(c: &mut Criterion) {
    let keys = shuffled();
    let mut order = keys.clone();
    order.reverse();
    c.bench_function("aug_delete 10k random", |b| {
        b.iter_batched(
            || built(&keys),
            |(mut tree, mut store)| {
                for key in &order {
                    tree.aug_delete(&mut store, key, cmp, |_: &mut Vec<Node>, _: NodeId| {}, Summarize);
                }
                black_box(tree);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_walk(c: &mut Criterion) {
    let (tree, store) = built(&shuffled());
    c.bench_function("lower_bound walk 1k", |b| {
        b.iter(|| {
            let cursor = tree.lower_bound_forward(&store, black_box(&(N / 2)), cmp);
            let sum: u64 = cursor.forward(&store).take(1000).map(|(_, n)| n.key as u64).sum();
            black_box(sum);
        });
    });
    c.bench_function("search 10k", |b| {
        b.iter(|| {
            for key in 0..N {
                black_box(tree.search(&store, &key, cmp));
            }
        });
    });

    let map: RankMap<u32, ()> = shuffled().into_iter().map(|k| (k, ())).collect();
    c.bench_function("rank_map nth 10k", |b| {
        b.iter(|| {
            for i in 0..N as usize {
                black_box(map.nth(i));
            }
        });
    });
}

criterion_group!(benches, bench_insert, bench_delete, bench_walk);
criterion_main!(benches);
