use crate::node::Node;
use crate::style::{StyleCatalog, StyleSlot};

/// Nodes nested deeper than this are not visited
pub const MAX_WALK_DEPTH: usize = 512;

/// Counters reported by a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Nodes whose style references were inspected
    pub visited: usize,
    /// Style values copied into the catalog
    pub absorbed: usize,
    /// Subtrees cut off at `MAX_WALK_DEPTH`
    pub pruned: usize,
}

/// Walk the tree under `root` depth-first in pre-order and fold every style
/// reference's value into `catalog`.
///
/// Uses an explicit stack, so document depth never touches the call stack.
pub fn walk(root: &Node, catalog: &mut StyleCatalog) -> WalkStats {
    let mut stats = WalkStats::default();
    let mut stack: Vec<(&Node, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_WALK_DEPTH {
            stats.pruned += 1;
            continue;
        }
        stats.visited += 1;

        for (key, style_id) in &node.styles {
            let Some(slot) = StyleSlot::from_key(key) else {
                continue;
            };
            if catalog.absorb(slot, style_id, node) {
                stats.absorbed += 1;
            }
        }

        // Reversed so the first child is popped first
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    stats
}
