//! Cycle detection over the package-level edge map.
//!
//! Depth-first traversal with an explicit recursion stack. When a
//! traversal reaches a node already on the stack, every edge along the
//! path from that node's first occurrence to the current node is marked
//! cyclic, plus the back-edge closing the loop. Only membership in the
//! result set is contractual; roots are iterated in sorted order so the
//! outcome is deterministic anyway.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use crate::aggregate::EdgeMap;

/// Canonical key for a directed edge.
pub fn edge_key(from: &str, to: &str) -> String {
    format!("{from}->{to}")
}

/// Every edge participating in at least one cycle, as `"from->to"` keys.
pub fn find_cyclic_edges(edges: &EdgeMap) -> BTreeSet<String> {
    let mut cyclic = BTreeSet::new();
    let mut visited = FxHashSet::default();
    let mut on_stack = FxHashSet::default();
    let mut path = Vec::new();

    for root in edges.keys() {
        if !visited.contains(root.as_str()) {
            dfs(root, edges, &mut visited, &mut on_stack, &mut path, &mut cyclic);
        }
    }

    cyclic
}

fn dfs<'a>(
    node: &'a str,
    edges: &'a EdgeMap,
    visited: &mut FxHashSet<&'a str>,
    on_stack: &mut FxHashSet<&'a str>,
    path: &mut Vec<&'a str>,
    cyclic: &mut BTreeSet<String>,
) {
    on_stack.insert(node);
    path.push(node);

    if let Some(targets) = edges.get(node) {
        for target in targets {
            if on_stack.contains(target.as_str()) {
                mark_cycle(path, target, cyclic);
            } else if !visited.contains(target.as_str()) {
                dfs(target, edges, visited, on_stack, path, cyclic);
            }
            // Edges into already-visited nodes are not re-examined, so a
            // forward edge into a cycle discovered on another path stays
            // unmarked. Each node is traversed at most once.
        }
    }

    path.pop();
    on_stack.remove(node);
    visited.insert(node);
}

/// Mark every edge on the path segment from `entry`'s first occurrence
/// to the path tip, plus the back-edge tip→entry.
fn mark_cycle(path: &[&str], entry: &str, cyclic: &mut BTreeSet<String>) {
    let Some(start) = path.iter().position(|n| *n == entry) else {
        return;
    };
    for window in path[start..].windows(2) {
        cyclic.insert(edge_key(window[0], window[1]));
    }
    if let Some(tip) = path.last() {
        cyclic.insert(edge_key(tip, entry));
    }
}
