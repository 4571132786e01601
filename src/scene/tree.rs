//! Hierarchy queries over the node arena.

use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Pre-order depth-first list of the descendants of `start`, excluding it.
#[must_use]
pub fn descendants(nodes: &SlotMap<NodeHandle, Node>, start: NodeHandle) -> Vec<NodeHandle> {
    let mut order = Vec::new();
    let Some(node) = nodes.get(start) else {
        return order;
    };

    let mut stack: Vec<NodeHandle> = node.children.iter().rev().copied().collect();
    while let Some(handle) = stack.pop() {
        let Some(node) = nodes.get(handle) else {
            continue;
        };
        order.push(handle);
        stack.extend(node.children.iter().rev().copied());
    }
    order
}

/// First descendant of `start` (pre-order, excluding `start`) named exactly `name`.
#[must_use]
pub fn find_node(
    nodes: &SlotMap<NodeHandle, Node>,
    start: NodeHandle,
    name: &str,
) -> Option<NodeHandle> {
    let mut stack: Vec<NodeHandle> = nodes.get(start)?.children.iter().rev().copied().collect();
    while let Some(handle) = stack.pop() {
        let Some(node) = nodes.get(handle) else {
            continue;
        };
        if node.name == name {
            return Some(handle);
        }
        stack.extend(node.children.iter().rev().copied());
    }
    None
}

/// Whether `ancestor` is `handle` itself or one of its ancestors.
#[must_use]
pub fn is_ancestor_or_self(
    nodes: &SlotMap<NodeHandle, Node>,
    ancestor: NodeHandle,
    handle: NodeHandle,
) -> bool {
    let mut current = Some(handle);
    while let Some(h) = current {
        if h == ancestor {
            return true;
        }
        current = nodes.get(h).and_then(|n| n.parent);
    }
    false
}
