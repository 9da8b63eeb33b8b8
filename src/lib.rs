//! Redblack - intrusive, augmentable red-black trees.
//!
//! Records embed a [`Link`] and live in an arena the caller owns (a `Vec`,
//! a slice, or a [`slab::Slab`]). A [`Tree`] is only the root handle: it
//! rewrites links, never allocates, and hands removed records back through
//! a release hook once nothing points at them.
//!
//! # Quick Start
//!
//! ```
//! use std::cmp::Ordering;
//! use redblack::{Link, Linked, NodeId, Tree};
//!
//! struct Item {
//!     key: u32,
//!     rb: Link,
//! }
//!
//! impl Linked for Item {
//!     fn link(&self) -> &Link { &self.rb }
//!     fn link_mut(&mut self) -> &mut Link { &mut self.rb }
//! }
//!
//! let mut items: Vec<Item> = [30, 10, 20]
//!     .into_iter()
//!     .map(|key| Item { key, rb: Link::new() })
//!     .collect();
//!
//! let mut tree = Tree::new();
//! for i in 0..items.len() {
//!     tree.insert(&mut items, NodeId(i), |a: &Item, b: &Item| a.key.cmp(&b.key));
//! }
//!
//! let from_15: Vec<u32> = tree
//!     .lower_bound_forward(&items, &15, |k: &u32, n: &Item| k.cmp(&n.key))
//!     .forward(&items)
//!     .map(|(_, item)| item.key)
//!     .collect();
//! assert_eq!(from_15, vec![20, 30]);
//!
//! let cmp = |k: &u32, n: &Item| -> Ordering { k.cmp(&n.key) };
//! assert!(tree.delete(&mut items, &20, cmp, |_: &mut Vec<Item>, _: NodeId| {}));
//! assert!(!tree.delete(&mut items, &20, cmp, |_: &mut Vec<Item>, _: NodeId| {}));
//! ```
//!
//! # Augmentation
//!
//! Pass an [`Augment`] hook to the `aug_*` operations to keep a per-node
//! aggregate of each subtree up to date. [`RankMap`] uses a [`Count`]
//! aggregate this way to answer rank queries in O(log n).
//!
//! # Features
//!
//! - `invariants`: validate the whole tree after every mutation and panic
//!   on the first violation. Slow; meant for debugging.

pub mod augment;
pub mod check;
pub mod cursor;
pub mod map;
pub mod node;
pub mod tree;

pub use augment::Aggregate;
pub use augment::Augment;
pub use augment::Count;
pub use augment::Inert;
pub use augment::Summarize;
pub use augment::Summary;
pub use augment::Weight;
pub use cursor::Cursor;
pub use cursor::Iter;
pub use map::RankMap;
pub use node::Color;
pub use node::Link;
pub use node::Linked;
pub use node::NodeId;
pub use node::Nodes;
pub use tree::Tree;
