//! # TreeMutator: the tree-mutation algebra
//!
//! Every operation is `(tree, intent) -> Result<tree>`. The input tree is
//! never touched; the result shares all subtrees off the rewritten path.
//! An operation that would leave the tree invalid fails instead of
//! normalising it.

use crate::error::{MutationError, MutationResult};
use crate::key::NodeKey;
use crate::node::{NavNode, NodeKind, NodeRef, PaneRole};
use crate::query;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// A navigation intent as data, so it can be logged, queued or replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    Push {
        target: Option<NodeKey>,
        node: NavNode,
    },
    Pop {
        target: Option<NodeKey>,
    },
    Replace {
        target: Option<NodeKey>,
        node: NavNode,
    },
    SetActiveStackIndex {
        tab: NodeKey,
        index: usize,
    },
    SetActivePaneRole {
        pane: NodeKey,
        role: PaneRole,
    },
    NavigateToKey {
        key: NodeKey,
    },
    RemoveSubtree {
        key: NodeKey,
    },
}

impl Intent {
    /// Short label for logs and spans.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Push { .. } => "push",
            Intent::Pop { .. } => "pop",
            Intent::Replace { .. } => "replace",
            Intent::SetActiveStackIndex { .. } => "set_active_stack_index",
            Intent::SetActivePaneRole { .. } => "set_active_pane_role",
            Intent::NavigateToKey { .. } => "navigate_to_key",
            Intent::RemoveSubtree { .. } => "remove_subtree",
        }
    }
}

/// Dispatch an [`Intent`] to the matching operation.
pub fn apply(tree: &NodeRef, intent: &Intent) -> MutationResult<NodeRef> {
    match intent {
        Intent::Push { target, node } => push(tree, target.as_ref(), node.clone()),
        Intent::Pop { target } => pop(tree, target.as_ref()),
        Intent::Replace { target, node } => replace(tree, target.as_ref(), node.clone()),
        Intent::SetActiveStackIndex { tab, index } => set_active_stack_index(tree, tab, *index),
        Intent::SetActivePaneRole { pane, role } => set_active_pane_role(tree, pane, *role),
        Intent::NavigateToKey { key } => navigate_to_key(tree, key),
        Intent::RemoveSubtree { key } => remove_subtree(tree, key),
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Append `node` to the stack `target`, or to the active stack when `None`.
pub fn push(tree: &NodeRef, target: Option<&NodeKey>, node: NavNode) -> MutationResult<NodeRef> {
    let path = stack_path(tree, target)?;
    let stack = expect_stack(last(&path))?;
    admit(tree, &node, None)?;

    let mut next = stack.clone();
    next.children
        .push(Arc::new(node.with_parent_key(Some(next.key.clone()))));

    finish(rebuild(&path, Arc::new(next.into()), false))
}

/// Remove the top of the stack `target` (or the active stack).
///
/// A stack holding a single entry collapses: the stack itself is removed
/// from its parent, one level per call. The outermost stack cannot be popped.
pub fn pop(tree: &NodeRef, target: Option<&NodeKey>) -> MutationResult<NodeRef> {
    let path = stack_path(tree, target)?;
    let stack = expect_stack(last(&path))?;

    if stack.children.len() > 1 {
        let mut next = stack.clone();
        next.children.pop();
        return finish(rebuild(&path, Arc::new(next.into()), false));
    }

    if path.len() == 1 {
        return Err(MutationError::CannotPopRoot {
            key: stack.key.clone(),
        });
    }
    finish(detach(&path)?)
}

/// Swap the top of the stack `target` (or the active stack) for `node`.
pub fn replace(tree: &NodeRef, target: Option<&NodeKey>, node: NavNode) -> MutationResult<NodeRef> {
    let path = stack_path(tree, target)?;
    let stack = expect_stack(last(&path))?;

    let mut next = stack.clone();
    let top = next.children.last_mut().ok_or_else(|| {
        MutationError::InvalidTree(format!("stack {} has no children", stack.key))
    })?;
    admit(tree, &node, Some(top.key()))?;
    *top = Arc::new(node.with_parent_key(Some(stack.key.clone())));

    finish(rebuild(&path, Arc::new(next.into()), false))
}

pub fn set_active_stack_index(
    tree: &NodeRef,
    tab_key: &NodeKey,
    index: usize,
) -> MutationResult<NodeRef> {
    let path = query::path_to(tree, tab_key).ok_or_else(|| MutationError::not_found(tab_key))?;
    let node = last(&path);
    let tab = node
        .as_tab()
        .ok_or_else(|| MutationError::wrong_kind(tab_key, NodeKind::Tab, node.kind()))?;

    if index >= tab.stacks.len() {
        return Err(MutationError::IndexOutOfRange {
            key: tab_key.clone(),
            index,
            len: tab.stacks.len(),
        });
    }

    let mut next = tab.clone();
    next.active_stack_index = index;
    finish(rebuild(&path, Arc::new(next.into()), false))
}

/// Mark `role` as the active pane. Other roles keep their content.
pub fn set_active_pane_role(
    tree: &NodeRef,
    pane_key: &NodeKey,
    role: PaneRole,
) -> MutationResult<NodeRef> {
    let path = query::path_to(tree, pane_key).ok_or_else(|| MutationError::not_found(pane_key))?;
    let node = last(&path);
    let pane = node
        .as_pane()
        .ok_or_else(|| MutationError::wrong_kind(pane_key, NodeKind::Pane, node.kind()))?;

    let next = pane.clone().with_active_role(role)?;
    finish(rebuild(&path, Arc::new(next.into()), false))
}

/// Select every tab and pane between the root and `key` so that `key` lies
/// on the active path. The node at `key` itself is left as is.
pub fn navigate_to_key(tree: &NodeRef, key: &NodeKey) -> MutationResult<NodeRef> {
    let path = query::path_to(tree, key).ok_or_else(|| MutationError::not_found(key))?;
    let target = Arc::clone(last(&path));
    finish(rebuild(&path, target, true))
}

/// Detach the subtree rooted at `key` from its parent.
///
/// If that leaves the parent stack empty, the parent stack is detached from
/// its own parent instead (same collapse rule as [`pop`]).
pub fn remove_subtree(tree: &NodeRef, key: &NodeKey) -> MutationResult<NodeRef> {
    let path = query::path_to(tree, key).ok_or_else(|| MutationError::not_found(key))?;
    if path.len() == 1 {
        return Err(MutationError::CannotPopRoot { key: key.clone() });
    }

    let parent_path = &path[..path.len() - 1];
    let parent = last(parent_path);
    if let NavNode::Stack(stack) = parent.as_ref() {
        if stack.children.len() == 1 {
            if parent_path.len() == 1 {
                return Err(MutationError::CannotPopRoot {
                    key: stack.key.clone(),
                });
            }
            return finish(detach(parent_path)?);
        }
    }
    finish(detach(&path)?)
}

// ============================================================================
// Path rewriting
// ============================================================================

fn last<'a>(path: &[&'a NodeRef]) -> &'a NodeRef {
    // Paths come from `path_to`/`active_path`, which never return empty.
    path[path.len() - 1]
}

/// Path to the addressed stack, or to the deepest stack on the active path.
fn stack_path<'a>(tree: &'a NodeRef, target: Option<&NodeKey>) -> MutationResult<Vec<&'a NodeRef>> {
    match target {
        Some(key) => query::path_to(tree, key).ok_or_else(|| MutationError::not_found(key)),
        None => {
            let mut path = query::active_path(tree);
            while let Some(node) = path.last() {
                if node.kind() == NodeKind::Stack {
                    return Ok(path);
                }
                path.pop();
            }
            // No stack on the active path.
            Err(MutationError::not_found(tree.key()))
        }
    }
}

fn expect_stack(node: &NodeRef) -> MutationResult<&crate::node::StackNode> {
    node.as_stack()
        .ok_or_else(|| MutationError::wrong_kind(node.key(), NodeKind::Stack, node.kind()))
}

/// Replace `path.last()` with `replacement` and rebuild every ancestor.
///
/// With `select`, each tab/pane ancestor also switches to the branch that
/// leads to the replacement.
fn rebuild(path: &[&NodeRef], replacement: NodeRef, select: bool) -> NodeRef {
    let mut child = replacement;
    let mut old_key = last(path).key().clone();

    for ancestor in path[..path.len() - 1].iter().rev() {
        let next = replace_child(ancestor, &old_key, child, select);
        old_key = ancestor.key().clone();
        child = Arc::new(next);
    }
    child
}

fn replace_child(parent: &NavNode, old_key: &NodeKey, child: NodeRef, select: bool) -> NavNode {
    let mut next = parent.clone();
    match &mut next {
        NavNode::Screen(_) => {}
        NavNode::Stack(stack) => {
            if let Some(slot) = stack.children.iter_mut().find(|c| c.key() == old_key) {
                *slot = child;
            }
        }
        NavNode::Tab(tab) => {
            if let Some(index) = tab.stacks.iter().position(|c| c.key() == old_key) {
                tab.stacks[index] = child;
                if select {
                    tab.active_stack_index = index;
                }
            }
        }
        NavNode::Pane(pane) => {
            if let Some(role) = pane.role_of(old_key) {
                pane.panes.insert(role, child);
                if select {
                    pane.active_role = role;
                }
            }
        }
    }
    next
}

/// Remove `path.last()` from its parent, failing when the parent cannot
/// lose it and stay valid.
fn detach(path: &[&NodeRef]) -> MutationResult<NodeRef> {
    let node = last(path);
    let key = node.key();
    let parent_path = &path[..path.len() - 1];
    let parent = last(parent_path);
    let cannot_pop = || MutationError::CannotPopRoot { key: key.clone() };

    let next: NavNode = match parent.as_ref() {
        NavNode::Screen(screen) => {
            return Err(MutationError::InvalidTree(format!(
                "screen {} cannot hold {key}",
                screen.key
            )));
        }
        NavNode::Stack(stack) => {
            if stack.children.len() < 2 {
                return Err(cannot_pop());
            }
            let mut next = stack.clone();
            next.children.retain(|c| c.key() != key);
            next.into()
        }
        NavNode::Tab(tab) => {
            if tab.stacks.len() < 2 {
                return Err(cannot_pop());
            }
            let index = tab
                .stacks
                .iter()
                .position(|c| c.key() == key)
                .ok_or_else(|| MutationError::not_found(key))?;
            let mut next = tab.clone();
            next.stacks.remove(index);
            // Stay on the same surviving tab; clamp when the active one went away.
            if index < next.active_stack_index {
                next.active_stack_index -= 1;
            }
            next.active_stack_index = next.active_stack_index.min(next.stacks.len() - 1);
            next.into()
        }
        NavNode::Pane(pane) => {
            let role = pane.role_of(key).ok_or_else(|| MutationError::not_found(key))?;
            if role == PaneRole::Primary {
                return Err(cannot_pop());
            }
            let mut next = pane.clone();
            next.panes.remove(&role);
            next.adaptations.remove(&role);
            if next.active_role == role {
                next.active_role = PaneRole::Primary;
            }
            next.into()
        }
    };

    Ok(rebuild(parent_path, Arc::new(next), false))
}

/// Check a caller-supplied subtree before it is grafted into `tree`.
///
/// The subtree must be valid on its own and must not reuse a key already in
/// `tree`. Keys under `replaced` are about to leave the tree and may be reused.
fn admit(tree: &NavNode, node: &NavNode, replaced: Option<&NodeKey>) -> MutationResult<()> {
    query::validate(&node.with_parent_key(None))?;

    let mut incoming = HashSet::new();
    collect_keys(node, &mut incoming);
    match first_clash(tree, &incoming, replaced) {
        Some(key) => Err(MutationError::InvalidTree(format!("duplicate key {key}"))),
        None => Ok(()),
    }
}

fn collect_keys<'a>(node: &'a NavNode, keys: &mut HashSet<&'a NodeKey>) {
    keys.insert(node.key());
    for child in node.children() {
        collect_keys(child.as_ref(), keys);
    }
}

fn first_clash<'a>(
    node: &'a NavNode,
    incoming: &HashSet<&NodeKey>,
    skip: Option<&NodeKey>,
) -> Option<&'a NodeKey> {
    if skip == Some(node.key()) {
        return None;
    }
    if incoming.contains(node.key()) {
        return Some(node.key());
    }
    node.children()
        .find_map(|child| first_clash(child.as_ref(), incoming, skip))
}

fn finish(tree: NodeRef) -> MutationResult<NodeRef> {
    query::validate(&tree)?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::Destination;
    use crate::error::ErrorKind;
    use crate::node::{AdaptStrategy, PaneNode, ScreenNode, StackNode, TabNode};
    use crate::query::{active_leaf, find_by_key};

    fn screen(key: &str, route: &str) -> NavNode {
        ScreenNode::new(key.into(), None, Destination::new(route)).into()
    }

    fn stack(key: &str, children: Vec<NavNode>) -> NavNode {
        StackNode::new(key.into(), None, children).unwrap().into()
    }

    fn tabs(active: usize) -> NavNode {
        TabNode::new(
            "tabs".into(),
            None,
            vec![
                stack("home-stack", vec![screen("home", "Home")]),
                stack("search-stack", vec![screen("search", "Search")]),
                stack("me-stack", vec![screen("me", "Me")]),
            ],
            active,
        )
        .unwrap()
        .into()
    }

    fn route_of(tree: &NodeRef) -> String {
        active_leaf(tree).unwrap().destination().route.clone()
    }

    #[test]
    fn test_push_onto_active_stack() {
        let tree = Arc::new(stack("root", vec![screen("home", "Home")]));
        let next = push(&tree, None, screen("detail", "Detail")).unwrap();

        assert_eq!(route_of(&next), "Detail");
        let detail = find_by_key(&next, &"detail".into()).unwrap();
        assert_eq!(detail.parent_key().map(NodeKey::as_str), Some("root"));
        // Input is untouched.
        assert_eq!(route_of(&tree), "Home");
    }

    #[test]
    fn test_push_defaults_to_stack_inside_active_tab() {
        let tree = Arc::new(stack("root", vec![tabs(1)]));
        let next = push(&tree, None, screen("results", "Results")).unwrap();
        let search = find_by_key(&next, &"search-stack".into()).unwrap();
        assert_eq!(search.as_stack().unwrap().len(), 2);
    }

    #[test]
    fn test_push_shares_untouched_subtrees() {
        let tree = Arc::new(stack("root", vec![tabs(0)]));
        let next = push(&tree, Some(&"home-stack".into()), screen("x", "X")).unwrap();

        let before = tree.as_stack().unwrap().children()[0].as_tab().unwrap().stacks()[1].clone();
        let after = next.as_stack().unwrap().children()[0].as_tab().unwrap().stacks()[1].clone();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_push_errors() {
        let tree = Arc::new(stack("root", vec![tabs(0)]));
        let err = push(&tree, Some(&"missing".into()), screen("x", "X")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NodeNotFound);

        let err = push(&tree, Some(&"tabs".into()), screen("x", "X")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongNodeKind);
    }

    #[test]
    fn test_push_rejects_duplicate_key() {
        let tree = Arc::new(stack("root", vec![screen("home", "Home")]));
        let err = push(&tree, None, screen("home", "Again")).unwrap_err();
        assert_eq!(err, MutationError::InvalidTree("duplicate key home".into()));

        let nested = stack("flow", vec![screen("a", "A"), screen("root", "Clash")]);
        let err = push(&tree, None, nested).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTree);
    }

    #[test]
    fn test_push_rejects_malformed_subtree() {
        let tree = Arc::new(stack("root", vec![screen("home", "Home")]));
        let empty: NavNode =
            serde_json::from_str(r#"{"kind":"Stack","key":"empty","children":[]}"#).unwrap();
        let err = push(&tree, None, empty).unwrap_err();
        assert_eq!(
            err,
            MutationError::InvalidTree("stack empty has no children".into())
        );
    }

    #[test]
    fn test_replace_may_reuse_keys_of_the_swapped_entry() {
        let tree = Arc::new(stack("root", vec![screen("home", "Home"), screen("a", "A")]));
        let next = replace(&tree, None, screen("a", "A2")).unwrap();
        assert_eq!(route_of(&next), "A2");

        let err = replace(&tree, None, screen("home", "Home2")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTree);
    }

    #[test]
    fn test_pop_is_inverse_of_push() {
        let tree = Arc::new(stack("root", vec![tabs(2)]));
        let pushed = push(&tree, Some(&"me-stack".into()), screen("settings", "Settings")).unwrap();
        let popped = pop(&pushed, Some(&"me-stack".into())).unwrap();
        assert_eq!(popped, tree);
    }

    #[test]
    fn test_pop_root_with_single_child_fails() {
        let tree = Arc::new(stack("root", vec![screen("home", "Home")]));
        let err = pop(&tree, None).unwrap_err();
        assert_eq!(err, MutationError::CannotPopRoot { key: "root".into() });
    }

    #[test]
    fn test_pop_collapses_nested_stack_one_level() {
        let inner = stack("flow", vec![screen("step1", "Step1")]);
        let tree = Arc::new(stack("root", vec![screen("home", "Home"), inner]));

        let next = pop(&tree, None).unwrap();
        assert!(find_by_key(&next, &"flow".into()).is_none());
        assert_eq!(route_of(&next), "Home");
    }

    #[test]
    fn test_pop_collapse_removes_tab_and_keeps_selection() {
        let tree = Arc::new(stack("root", vec![tabs(2)]));
        let next = pop(&tree, Some(&"search-stack".into())).unwrap();

        let tab = find_by_key(&next, &"tabs".into()).unwrap().as_tab().unwrap();
        assert_eq!(tab.stacks().len(), 2);
        assert_eq!(tab.active_stack().unwrap().key().as_str(), "me-stack");
    }

    #[test]
    fn test_pop_cannot_collapse_into_empty_parent() {
        let tree = Arc::new(stack("root", vec![stack("only", vec![screen("a", "A")])]));
        let err = pop(&tree, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CannotPopRoot);
    }

    #[test]
    fn test_replace_swaps_top() {
        let tree = Arc::new(stack("root", vec![screen("home", "Home"), screen("a", "A")]));
        let next = replace(&tree, Some(&"root".into()), screen("b", "B")).unwrap();
        let root = next.as_stack().unwrap();
        assert_eq!(root.len(), 2);
        assert_eq!(route_of(&next), "B");
        assert_eq!(root.top().unwrap().parent_key().map(NodeKey::as_str), Some("root"));
    }

    #[test]
    fn test_set_active_stack_index() {
        let tree = Arc::new(stack("root", vec![tabs(0)]));
        let next = set_active_stack_index(&tree, &"tabs".into(), 2).unwrap();
        assert_eq!(route_of(&next), "Me");

        let err = set_active_stack_index(&tree, &"tabs".into(), 3).unwrap_err();
        assert_eq!(
            err,
            MutationError::IndexOutOfRange {
                key: "tabs".into(),
                index: 3,
                len: 3
            }
        );
        let err = set_active_stack_index(&tree, &"root".into(), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongNodeKind);
    }

    #[test]
    fn test_set_active_pane_role() {
        let pane: NavNode = PaneNode::new("pane".into(), None, screen("list", "List"))
            .with_pane(PaneRole::Supporting, screen("detail", "Detail"), AdaptStrategy::Levitate)
            .into();
        let tree = Arc::new(stack("root", vec![pane]));

        let next = set_active_pane_role(&tree, &"pane".into(), PaneRole::Supporting).unwrap();
        assert_eq!(route_of(&next), "Detail");
        // The other role stays populated.
        assert!(find_by_key(&next, &"list".into()).is_some());

        let err = set_active_pane_role(&tree, &"pane".into(), PaneRole::Extra).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RoleNotPopulated);
    }

    #[test]
    fn test_navigate_to_key_flips_tabs_and_panes() {
        let pane: NavNode = PaneNode::new("pane".into(), None, screen("list", "List"))
            .with_pane(PaneRole::Extra, screen("extra", "Extra"), AdaptStrategy::Hide)
            .into();
        let tree = TabNode::new(
            "tabs".into(),
            None,
            vec![
                stack("home-stack", vec![screen("home", "Home")]),
                stack("split-stack", vec![pane]),
            ],
            0,
        )
        .unwrap();
        let tree: NodeRef = Arc::new(tree.into());

        let next = navigate_to_key(&tree, &"extra".into()).unwrap();
        assert_eq!(route_of(&next), "Extra");
        assert_eq!(next.as_tab().unwrap().active_stack_index(), 1);

        let err = navigate_to_key(&tree, &"ghost".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NodeNotFound);
    }

    #[test]
    fn test_remove_subtree_from_middle_of_stack() {
        let tree = Arc::new(stack(
            "root",
            vec![screen("a", "A"), screen("b", "B"), screen("c", "C")],
        ));
        let next = remove_subtree(&tree, &"b".into()).unwrap();
        let keys: Vec<&str> = next
            .as_stack()
            .unwrap()
            .children()
            .iter()
            .map(|c| c.key().as_str())
            .collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_remove_subtree_collapses_emptied_stack() {
        let tree = Arc::new(stack("root", vec![tabs(0)]));
        let next = remove_subtree(&tree, &"search".into()).unwrap();
        assert!(find_by_key(&next, &"search-stack".into()).is_none());
        assert_eq!(route_of(&next), "Home");
    }

    #[test]
    fn test_remove_primary_pane_fails() {
        let pane: NavNode = PaneNode::new("pane".into(), None, stack("primary", vec![screen("list", "List")]))
            .into();
        let tree = Arc::new(stack("root", vec![screen("home", "Home"), pane]));
        let err = remove_subtree(&tree, &"primary".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CannotPopRoot);

        let err = remove_subtree(&tree, &"root".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CannotPopRoot);
    }

    #[test]
    fn test_collapsing_supporting_pane_falls_back_to_primary() {
        let pane = || -> NavNode {
            PaneNode::new("pane".into(), None, stack("list-stack", vec![screen("list", "List")]))
                .with_pane(
                    PaneRole::Supporting,
                    stack("detail-stack", vec![screen("detail", "Detail")]),
                    AdaptStrategy::Levitate,
                )
                .into()
        };
        let tree = Arc::new(stack("root", vec![screen("home", "Home"), pane()]));
        let tree = set_active_pane_role(&tree, &"pane".into(), PaneRole::Supporting).unwrap();
        assert_eq!(route_of(&tree), "Detail");

        for next in [
            pop(&tree, None).unwrap(),
            remove_subtree(&tree, &"detail".into()).unwrap(),
        ] {
            let pane = find_by_key(&next, &"pane".into()).unwrap().as_pane().unwrap();
            assert_eq!(pane.active_role(), PaneRole::Primary);
            assert!(find_by_key(&next, &"detail-stack".into()).is_none());
            assert_eq!(route_of(&next), "List");
        }
    }

    #[test]
    fn test_apply_dispatches_intents() {
        let tree = Arc::new(stack("root", vec![tabs(0)]));
        let intent = Intent::SetActiveStackIndex {
            tab: "tabs".into(),
            index: 1,
        };
        assert_eq!(intent.name(), "set_active_stack_index");
        let next = apply(&tree, &intent).unwrap();
        assert_eq!(route_of(&next), "Search");
    }
}
