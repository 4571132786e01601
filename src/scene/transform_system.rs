//! Transform System
//!
//! World-transform propagation over the node arena. Decoupled from the
//! world manager so only the node map is borrowed.
//!
//! Every node in the subtree is refreshed unconditionally: controllers may
//! have touched any local transform since the previous frame, and cached
//! camera planes and inverse transforms must match the current pose.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::{Node, NodeKind};

/// Recomputes world transforms of `start` and all its descendants.
///
/// `start`'s world becomes `parent_world × local` using the parent's current
/// cached world, or just `local` when it has no parent. Frustum cameras
/// rebuild their world-space planes after their own transform is updated.
///
/// Uses an explicit stack, so arbitrarily deep hierarchies are safe.
pub fn update_node(nodes: &mut SlotMap<NodeHandle, Node>, start: NodeHandle) {
    let Some(node) = nodes.get(start) else {
        return;
    };
    let parent_world = node
        .parent
        .and_then(|p| nodes.get(p))
        .map(|p| *p.world.world_transform());

    // (node, parent world)
    let mut stack: Vec<(NodeHandle, Option<Affine3A>)> = Vec::with_capacity(64);
    stack.push((start, parent_world));

    while let Some((handle, parent_world)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let world = match parent_world {
            Some(parent) => parent * node.transform,
            None => node.transform,
        };
        node.world.set_world_transform(world);

        if let NodeKind::Camera(camera) = &mut node.kind {
            camera.update_planes(node.world.inverse_world_transform());
        }

        // Reverse push keeps children in order.
        for &child in node.children.iter().rev() {
            stack.push((child, Some(world)));
        }
    }
}

/// Recursive form of [`update_node`], kept for shallow trees and tests.
pub fn update_node_recursive(
    nodes: &mut SlotMap<NodeHandle, Node>,
    handle: NodeHandle,
    parent_world: Option<Affine3A>,
) {
    let (world, children) = {
        let Some(node) = nodes.get_mut(handle) else {
            return;
        };
        let world = match parent_world {
            Some(parent) => parent * node.transform,
            None => node.transform,
        };
        node.world.set_world_transform(world);
        if let NodeKind::Camera(camera) = &mut node.kind {
            camera.update_planes(node.world.inverse_world_transform());
        }
        (world, node.children.clone())
    };

    for child in children {
        update_node_recursive(nodes, child, Some(world));
    }
}
