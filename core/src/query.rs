//! # TreeQuery: read-only traversal
//!
//! Everything here is a pure function of the tree it receives. Lookups are
//! pre-order depth-first; on duplicate keys the first match wins.

use crate::error::{MutationError, MutationResult};
use crate::key::NodeKey;
use crate::node::{NavNode, NodeKind, NodeRef, PaneRole, ScreenNode, StackNode};
use std::collections::HashSet;

/// Pre-order depth-first search for `key`.
pub fn find_by_key<'a>(tree: &'a NavNode, key: &NodeKey) -> Option<&'a NavNode> {
    if tree.key() == key {
        return Some(tree);
    }
    tree.children()
        .find_map(|child| find_by_key(child.as_ref(), key))
}

/// Root-to-`key` chain of shared handles, both ends inclusive.
pub fn path_to<'a>(tree: &'a NodeRef, key: &NodeKey) -> Option<Vec<&'a NodeRef>> {
    let mut path = Vec::new();
    if collect_path(tree, key, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn collect_path<'a>(node: &'a NodeRef, key: &NodeKey, path: &mut Vec<&'a NodeRef>) -> bool {
    path.push(node);
    if node.key() == key {
        return true;
    }
    for child in node.children() {
        if collect_path(child, key, path) {
            return true;
        }
    }
    path.pop();
    false
}

/// The container directly holding `key`, or `None` for the root and for
/// unknown keys.
pub fn parent_of<'a>(tree: &'a NodeRef, key: &NodeKey) -> Option<&'a NavNode> {
    let path = path_to(tree, key)?;
    let len = path.len();
    if len < 2 {
        return None;
    }
    Some(path[len - 2].as_ref())
}

/// Follow the active child of every container down to a screen.
///
/// Total over any input: a container with nothing selected yields
/// `InvalidTree` instead of panicking.
pub fn active_leaf(tree: &NavNode) -> MutationResult<&ScreenNode> {
    let mut node = tree;
    loop {
        if let NavNode::Screen(screen) = node {
            return Ok(screen);
        }
        node = node.active_child().ok_or_else(|| {
            MutationError::InvalidTree(format!(
                "{} {} has no active child",
                node.kind(),
                node.key()
            ))
        })?;
    }
}

/// Root-to-leaf handles along the active path.
pub fn active_path(tree: &NodeRef) -> Vec<&NodeRef> {
    let mut path = vec![tree];
    let mut node = tree;
    while let Some(child) = node.active_child() {
        path.push(child);
        node = child;
    }
    path
}

/// Owned copy of [`active_path`] for back-stack compatibility shims.
///
/// A pane container contributes only its active role.
pub fn flatten_active_path(tree: &NodeRef) -> Vec<NodeRef> {
    active_path(tree).into_iter().cloned().collect()
}

/// The deepest stack on the active path: where push/pop/replace land when
/// no explicit target is given.
pub fn active_stack(tree: &NodeRef) -> Option<&StackNode> {
    active_path(tree)
        .into_iter()
        .rev()
        .find_map(|node| node.as_stack())
}

pub fn node_count(tree: &NavNode) -> usize {
    1 + tree
        .children()
        .map(|child| node_count(child.as_ref()))
        .sum::<usize>()
}

/// Check every structural invariant of a complete tree.
///
/// Used on builder output and foreign trees (e.g. deserialized state) before
/// they are accepted, and on every mutation result.
pub fn validate(tree: &NavNode) -> MutationResult<()> {
    if let Some(parent) = tree.parent_key() {
        return Err(MutationError::InvalidTree(format!(
            "root {} has parent {parent}",
            tree.key()
        )));
    }
    let mut seen = HashSet::new();
    validate_node(tree, &mut seen)
}

fn validate_node<'a>(node: &'a NavNode, seen: &mut HashSet<&'a NodeKey>) -> MutationResult<()> {
    if !seen.insert(node.key()) {
        return Err(MutationError::InvalidTree(format!(
            "duplicate key {}",
            node.key()
        )));
    }

    match node {
        NavNode::Screen(_) => {}
        NavNode::Stack(stack) => {
            if stack.children.is_empty() {
                return Err(MutationError::InvalidTree(format!(
                    "stack {} has no children",
                    stack.key
                )));
            }
        }
        NavNode::Tab(tab) => {
            if tab.active_stack_index >= tab.stacks.len() {
                return Err(MutationError::IndexOutOfRange {
                    key: tab.key.clone(),
                    index: tab.active_stack_index,
                    len: tab.stacks.len(),
                });
            }
            if let Some(entry) = tab.stacks.iter().find(|s| s.kind() != NodeKind::Stack) {
                return Err(MutationError::wrong_kind(
                    entry.key(),
                    NodeKind::Stack,
                    entry.kind(),
                ));
            }
        }
        NavNode::Pane(pane) => {
            if !pane.panes.contains_key(&PaneRole::Primary) {
                return Err(MutationError::RoleNotPopulated {
                    key: pane.key.clone(),
                    role: PaneRole::Primary,
                });
            }
            if !pane.panes.contains_key(&pane.active_role) {
                return Err(MutationError::RoleNotPopulated {
                    key: pane.key.clone(),
                    role: pane.active_role,
                });
            }
        }
    }

    for child in node.children() {
        if child.parent_key() != Some(node.key()) {
            return Err(MutationError::InvalidTree(format!(
                "{} points at parent {:?}, but is held by {}",
                child.key(),
                child.parent_key().map(NodeKey::as_str),
                node.key()
            )));
        }
        validate_node(child.as_ref(), seen)?;
    }
    Ok(())
}
