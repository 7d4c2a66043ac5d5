//! Container chain between the root and a deep-linked screen.
//!
//! Each segment carries the declaration data needed to rebuild siblings the
//! user never visited, so back navigation works after a deep-link entry.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use waymark_core::{
    AdaptStrategy, Destination, MutationResult, NavNode, NodeKey, PaneNode, PaneRole, StackNode,
    TabNode,
};

/// One declared pane of a [`PathSegment::Pane`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneDecl {
    pub role: PaneRole,
    pub start: Destination,
    #[serde(default)]
    pub strategy: AdaptStrategy,
}

impl PaneDecl {
    pub fn new(role: PaneRole, start: Destination, strategy: AdaptStrategy) -> Self {
        Self {
            role,
            start,
            strategy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    /// A stack, optionally seeded with its start screen below the target.
    Stack { start: Option<Destination> },
    /// Tab `index` of a tab container; `tabs[i]` is the start screen of tab `i`.
    TabAt { index: usize, tabs: Vec<Destination> },
    /// Role `role` of a pane container declaring `panes`.
    Pane { role: PaneRole, panes: Vec<PaneDecl> },
}

impl PathSegment {
    pub fn stack() -> Self {
        PathSegment::Stack { start: None }
    }

    pub fn stack_from(start: Destination) -> Self {
        PathSegment::Stack { start: Some(start) }
    }

    pub fn tab_at(index: usize, tabs: impl IntoIterator<Item = Destination>) -> Self {
        PathSegment::TabAt {
            index,
            tabs: tabs.into_iter().collect(),
        }
    }

    pub fn pane(role: PaneRole, panes: impl IntoIterator<Item = PaneDecl>) -> Self {
        PathSegment::Pane {
            role,
            panes: panes.into_iter().collect(),
        }
    }

    /// Declaration problems caught at registration time.
    pub(crate) fn check(&self) -> Result<(), String> {
        match self {
            PathSegment::Stack { .. } => Ok(()),
            PathSegment::TabAt { index, tabs } => {
                if *index >= tabs.len() {
                    return Err(format!(
                        "tab index {index} out of range for {} declared tabs",
                        tabs.len()
                    ));
                }
                Ok(())
            }
            PathSegment::Pane { role, panes } => {
                if !panes.iter().any(|p| p.role == PaneRole::Primary) {
                    return Err("pane declaration has no Primary role".to_string());
                }
                if !panes.iter().any(|p| p.role == *role) {
                    return Err(format!("pane role {role:?} is not declared"));
                }
                let mut seen = HashSet::new();
                if let Some(dup) = panes.iter().find(|p| !seen.insert(p.role)) {
                    return Err(format!("pane role {:?} is declared twice", dup.role));
                }
                Ok(())
            }
        }
    }

    /// Wrap `child` in the container this segment describes.
    fn wrap(&self, child: NavNode) -> MutationResult<NavNode> {
        match self {
            PathSegment::Stack { start } => {
                let seed = start.as_ref().filter(|start| {
                    child
                        .as_screen()
                        .is_none_or(|screen| screen.destination() != *start)
                });
                let mut children = Vec::with_capacity(2);
                if let Some(start) = seed {
                    children.push(NavNode::screen(start.clone()));
                }
                children.push(child);
                Ok(StackNode::new(NodeKey::generate("stack"), None, children)?.into())
            }
            PathSegment::TabAt { index, tabs } => {
                let mut active = Some(into_stack(child)?);
                let mut stacks = Vec::with_capacity(tabs.len());
                for (i, start) in tabs.iter().enumerate() {
                    let entry = match active.take_if(|_| i == *index) {
                        Some(stack) => stack,
                        None => seeded_stack(start)?,
                    };
                    stacks.push(entry);
                }
                Ok(TabNode::new(NodeKey::generate("tabs"), None, stacks, *index)?.into())
            }
            PathSegment::Pane { role, panes } => {
                let mut child = Some(child);
                let mut content = Vec::with_capacity(panes.len());
                for decl in panes {
                    let node = match child.take_if(|_| decl.role == *role) {
                        Some(node) => node,
                        None => seeded_stack(&decl.start)?,
                    };
                    content.push((decl, node));
                }

                let mut primary = None;
                let mut others = Vec::new();
                for (decl, node) in content {
                    if decl.role == PaneRole::Primary && primary.is_none() {
                        primary = Some((decl.strategy, node));
                    } else {
                        others.push((decl, node));
                    }
                }
                let Some((strategy, primary)) = primary else {
                    return Err(waymark_core::MutationError::InvalidTree(
                        "pane declaration has no Primary role".to_string(),
                    ));
                };

                let mut pane = PaneNode::new(NodeKey::generate("pane"), None, primary)
                    .with_adaptation(PaneRole::Primary, strategy);
                for (decl, node) in others {
                    pane = pane.with_pane(decl.role, node, decl.strategy);
                }
                Ok(pane.with_active_role(*role)?.into())
            }
        }
    }
}

fn into_stack(node: NavNode) -> MutationResult<NavNode> {
    if node.as_stack().is_some() {
        return Ok(node);
    }
    Ok(StackNode::new(NodeKey::generate("stack"), None, [node])?.into())
}

fn seeded_stack(start: &Destination) -> MutationResult<NavNode> {
    Ok(StackNode::new(
        NodeKey::generate("stack"),
        None,
        [NavNode::screen(start.clone())],
    )?
    .into())
}

/// Build a complete tree with `leaf` as the active screen.
///
/// Segments are root-first; wrapping happens innermost-first. Without
/// segments the result is a root stack holding only the leaf.
pub fn reconstruct(segments: &[PathSegment], leaf: Destination) -> MutationResult<NavNode> {
    let mut node = NavNode::screen(leaf);
    for segment in segments.iter().rev() {
        node = segment.wrap(node)?;
    }
    if segments.is_empty() {
        node = into_stack(node)?;
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::query::{active_leaf, validate};

    fn dest(route: &str) -> Destination {
        Destination::new(route)
    }

    #[test]
    fn test_empty_chain_is_single_screen_stack() {
        let tree = reconstruct(&[], dest("Home")).unwrap();
        let stack = tree.as_stack().unwrap();
        assert_eq!(stack.len(), 1);
        assert!(validate(&tree).is_ok());
    }

    #[test]
    fn test_stack_start_is_seeded_below_target() {
        let tree = reconstruct(&[PathSegment::stack_from(dest("Home"))], dest("Detail")).unwrap();
        let routes: Vec<&str> = tree
            .as_stack()
            .unwrap()
            .children()
            .iter()
            .map(|c| c.as_screen().unwrap().destination().route.as_str())
            .collect();
        assert_eq!(routes, vec!["Home", "Detail"]);

        // Target equal to start is not duplicated.
        let tree = reconstruct(&[PathSegment::stack_from(dest("Home"))], dest("Home")).unwrap();
        assert_eq!(tree.as_stack().unwrap().len(), 1);
    }

    #[test]
    fn test_tab_siblings_are_seeded() {
        let segments = [
            PathSegment::tab_at(2, [dest("Home"), dest("Search"), dest("Settings")]),
            PathSegment::stack_from(dest("Settings")),
        ];
        let tree = reconstruct(&segments, dest("About")).unwrap();
        assert!(validate(&tree).is_ok());

        let tab = tree.as_tab().unwrap();
        assert_eq!(tab.active_stack_index(), 2);
        assert_eq!(tab.stacks().len(), 3);
        for stack in &tab.stacks()[..2] {
            assert!(!stack.as_stack().unwrap().is_empty());
        }
        assert_eq!(tab.stacks()[2].as_stack().unwrap().len(), 2);
        assert_eq!(active_leaf(&tree).unwrap().destination().route, "About");
    }

    #[test]
    fn test_pane_target_role_is_active() {
        let segments = [
            PathSegment::stack(),
            PathSegment::pane(
                PaneRole::Supporting,
                [
                    PaneDecl::new(PaneRole::Primary, dest("List"), AdaptStrategy::Hide),
                    PaneDecl::new(PaneRole::Supporting, dest("Detail"), AdaptStrategy::Levitate),
                ],
            ),
        ];
        let tree = reconstruct(&segments, dest("Detail")).unwrap();
        assert!(validate(&tree).is_ok());

        let pane = tree.as_stack().unwrap().top().unwrap().as_pane().unwrap();
        assert_eq!(pane.active_role(), PaneRole::Supporting);
        assert_eq!(pane.adaptation(PaneRole::Supporting), AdaptStrategy::Levitate);
        let primary = pane.pane(PaneRole::Primary).unwrap();
        assert_eq!(
            active_leaf(primary).unwrap().destination().route,
            "List"
        );
        assert_eq!(active_leaf(&tree).unwrap().destination().route, "Detail");
    }

    #[test]
    fn test_check_rejects_bad_declarations() {
        assert!(PathSegment::tab_at(3, [dest("A"), dest("B")]).check().is_err());
        let no_primary = PathSegment::pane(
            PaneRole::Supporting,
            [PaneDecl::new(PaneRole::Supporting, dest("D"), AdaptStrategy::Hide)],
        );
        assert!(no_primary.check().is_err());
    }
}
