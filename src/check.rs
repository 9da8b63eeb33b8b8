//! Structural validation for tests and the `invariants` feature.
//!
//! [`validate`] walks the whole tree with an explicit stack and checks, at
//! every node:
//! - the root is black
//! - a red node has no red child
//! - every path to an absent child crosses the same number of black nodes
//! - each child's parent link points back at its parent
//! - no node is reached twice
//!
//! [`validate_with`] additionally asks the caller whether each node's
//! augmented value is consistent with its children.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::node::NodeId;
use crate::node::Nodes;
use crate::tree::Tree;

/// The first broken invariant found by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The root is red.
    RedRoot(NodeId),
    /// A red node has a red child.
    RedRed { parent: NodeId, child: NodeId },
    /// Two paths from the root cross a different number of black nodes.
    BlackHeight { node: NodeId, expected: usize, found: usize },
    /// A child's parent link does not point back at its parent.
    BrokenParent { node: NodeId, expected: Option<NodeId>, found: Option<NodeId> },
    /// A node is linked from more than one place.
    Revisited(NodeId),
    /// A node's augmented value disagrees with its children.
    Aggregate(NodeId),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Violation::RedRoot(node) => write!(f, "root {} is red", node.index()),
            Violation::RedRed { parent, child } => {
                write!(f, "red node {} has red child {}", parent.index(), child.index())
            }
            Violation::BlackHeight { node, expected, found } => write!(
                f,
                "black height below node {} is {found}, expected {expected}",
                node.index()
            ),
            Violation::BrokenParent { node, expected, found } => write!(
                f,
                "node {} has parent {:?}, expected {:?}",
                node.index(),
                found.map(NodeId::index),
                expected.map(NodeId::index)
            ),
            Violation::Revisited(node) => write!(f, "node {} is linked twice", node.index()),
            Violation::Aggregate(node) => {
                write!(f, "augmented value of node {} is stale", node.index())
            }
        };
    }
}

impl std::error::Error for Violation {}

/// Check the red-black invariants. Returns the tree's black height.
pub fn validate<S: Nodes + ?Sized>(tree: &Tree, s: &S) -> Result<usize, Violation> {
    return validate_with(tree, s, |_, _| true);
}

/// Check the red-black invariants and, through `consistent`, each node's
/// augmented value. Returns the tree's black height.
pub fn validate_with<S, F>(tree: &Tree, s: &S, mut consistent: F) -> Result<usize, Violation>
where
    S: Nodes + ?Sized,
    F: FnMut(&S, NodeId) -> bool,
{
    let Some(root) = tree.root() else {
        return Ok(0);
    };
    if s.link(root).is_red() {
        return Err(Violation::RedRoot(root));
    }
    if s.link(root).parent().is_some() {
        return Err(Violation::BrokenParent {
            node: root,
            expected: None,
            found: s.link(root).parent(),
        });
    }

    let mut seen = FxHashSet::default();
    // The black height of the first absent child reached; every other
    // absent child must match it.
    let mut leaf_height: Option<usize> = None;
    // (node, black nodes strictly above it)
    let mut stack = vec![(root, 0usize)];

    while let Some((id, above)) = stack.pop() {
        if !seen.insert(id) {
            return Err(Violation::Revisited(id));
        }
        let link = s.link(id);
        let blacks = above + usize::from(!link.is_red());

        for c in [link.right(), link.left()] {
            let Some(c) = c else {
                match leaf_height {
                    None => leaf_height = Some(blacks),
                    Some(expected) if expected != blacks => {
                        return Err(Violation::BlackHeight { node: id, expected, found: blacks });
                    }
                    Some(_) => {}
                }
                continue;
            };
            let child_link = s.link(c);
            if child_link.parent() != Some(id) {
                return Err(Violation::BrokenParent {
                    node: c,
                    expected: Some(id),
                    found: child_link.parent(),
                });
            }
            if link.is_red() && child_link.is_red() {
                return Err(Violation::RedRed { parent: id, child: c });
            }
            stack.push((c, blacks));
        }

        if !consistent(s, id) {
            return Err(Violation::Aggregate(id));
        }
    }

    return Ok(leaf_height.unwrap_or(0));
}
