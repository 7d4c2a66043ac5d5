//! # NavNode: the navigation tree data model
//!
//! Four variants, one payload type each:
//!
//! * [`ScreenNode`]: leaf pointing at a [`Destination`]
//! * [`StackNode`]: linear history, last child is visible
//! * [`TabNode`]: sibling stacks with one active index
//! * [`PaneNode`]: role-keyed subtrees for adaptive layouts
//!
//! Children are held behind [`NodeRef`] (`Arc<NavNode>`). Nodes are never
//! mutated after construction; the mutator rebuilds the path from the changed
//! node to the root and shares every other subtree.

use crate::destination::Destination;
use crate::error::{MutationError, MutationResult};
use crate::key::NodeKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared handle to an immutable node.
pub type NodeRef = Arc<NavNode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Screen,
    Stack,
    Tab,
    Pane,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Screen => "screen",
            NodeKind::Stack => "stack",
            NodeKind::Tab => "tab container",
            NodeKind::Pane => "pane container",
        };
        f.write_str(name)
    }
}

/// Slot of an adaptive multi-pane layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaneRole {
    Primary,
    Supporting,
    Extra,
}

impl PaneRole {
    pub const ALL: [PaneRole; 3] = [PaneRole::Primary, PaneRole::Supporting, PaneRole::Extra];
}

/// What a pane does when the window has no room for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AdaptStrategy {
    #[default]
    Hide,
    Levitate,
    Reflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NavNode {
    Screen(ScreenNode),
    Stack(StackNode),
    Tab(TabNode),
    Pane(PaneNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenNode {
    pub(crate) key: NodeKey,
    pub(crate) parent_key: Option<NodeKey>,
    pub(crate) destination: Destination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackNode {
    pub(crate) key: NodeKey,
    pub(crate) parent_key: Option<NodeKey>,
    pub(crate) children: Vec<NodeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabNode {
    pub(crate) key: NodeKey,
    pub(crate) parent_key: Option<NodeKey>,
    pub(crate) stacks: Vec<NodeRef>,
    pub(crate) active_stack_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneNode {
    pub(crate) key: NodeKey,
    pub(crate) parent_key: Option<NodeKey>,
    pub(crate) panes: BTreeMap<PaneRole, NodeRef>,
    pub(crate) adaptations: BTreeMap<PaneRole, AdaptStrategy>,
    pub(crate) active_role: PaneRole,
}

// ============================================================================
// Constructors
// ============================================================================

impl ScreenNode {
    pub fn new(key: NodeKey, parent_key: Option<NodeKey>, destination: Destination) -> Self {
        Self {
            key,
            parent_key,
            destination,
        }
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn parent_key(&self) -> Option<&NodeKey> {
        self.parent_key.as_ref()
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }
}

impl StackNode {
    /// Build a stack; children are re-parented onto `key`.
    pub fn new(
        key: NodeKey,
        parent_key: Option<NodeKey>,
        children: impl IntoIterator<Item = NavNode>,
    ) -> MutationResult<Self> {
        let children: Vec<NodeRef> = children
            .into_iter()
            .map(|child| Arc::new(child.with_parent_key(Some(key.clone()))))
            .collect();
        if children.is_empty() {
            return Err(MutationError::InvalidTree(format!("stack {key} has no children")));
        }
        Ok(Self {
            key,
            parent_key,
            children,
        })
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn parent_key(&self) -> Option<&NodeKey> {
        self.parent_key.as_ref()
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// The visible entry.
    pub fn top(&self) -> Option<&NodeRef> {
        self.children.last()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl TabNode {
    /// Build a tab container; every entry must be a stack.
    pub fn new(
        key: NodeKey,
        parent_key: Option<NodeKey>,
        stacks: impl IntoIterator<Item = NavNode>,
        active_stack_index: usize,
    ) -> MutationResult<Self> {
        let mut entries = Vec::new();
        for stack in stacks {
            if stack.kind() != NodeKind::Stack {
                return Err(MutationError::wrong_kind(
                    stack.key(),
                    NodeKind::Stack,
                    stack.kind(),
                ));
            }
            entries.push(Arc::new(stack.with_parent_key(Some(key.clone()))));
        }
        if entries.is_empty() {
            return Err(MutationError::InvalidTree(format!("tab container {key} has no stacks")));
        }
        if active_stack_index >= entries.len() {
            return Err(MutationError::IndexOutOfRange {
                key,
                index: active_stack_index,
                len: entries.len(),
            });
        }
        Ok(Self {
            key,
            parent_key,
            stacks: entries,
            active_stack_index,
        })
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn parent_key(&self) -> Option<&NodeKey> {
        self.parent_key.as_ref()
    }

    pub fn stacks(&self) -> &[NodeRef] {
        &self.stacks
    }

    pub fn active_stack_index(&self) -> usize {
        self.active_stack_index
    }

    pub fn active_stack(&self) -> Option<&NodeRef> {
        self.stacks.get(self.active_stack_index)
    }
}

impl PaneNode {
    /// Build a pane container around its mandatory primary subtree.
    pub fn new(key: NodeKey, parent_key: Option<NodeKey>, primary: NavNode) -> Self {
        let mut panes = BTreeMap::new();
        panes.insert(
            PaneRole::Primary,
            Arc::new(primary.with_parent_key(Some(key.clone()))),
        );
        let mut adaptations = BTreeMap::new();
        adaptations.insert(PaneRole::Primary, AdaptStrategy::default());
        Self {
            key,
            parent_key,
            panes,
            adaptations,
            active_role: PaneRole::Primary,
        }
    }

    /// Populate (or replace) a role.
    pub fn with_pane(mut self, role: PaneRole, content: NavNode, strategy: AdaptStrategy) -> Self {
        let content = Arc::new(content.with_parent_key(Some(self.key.clone())));
        self.panes.insert(role, content);
        self.adaptations.insert(role, strategy);
        self
    }

    /// Set the adaptation of an already populated role; unknown roles are ignored.
    pub fn with_adaptation(mut self, role: PaneRole, strategy: AdaptStrategy) -> Self {
        if self.panes.contains_key(&role) {
            self.adaptations.insert(role, strategy);
        }
        self
    }

    pub fn with_active_role(mut self, role: PaneRole) -> MutationResult<Self> {
        if !self.panes.contains_key(&role) {
            return Err(MutationError::RoleNotPopulated {
                key: self.key.clone(),
                role,
            });
        }
        self.active_role = role;
        Ok(self)
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn parent_key(&self) -> Option<&NodeKey> {
        self.parent_key.as_ref()
    }

    pub fn pane(&self, role: PaneRole) -> Option<&NodeRef> {
        self.panes.get(&role)
    }

    pub fn panes(&self) -> impl Iterator<Item = (PaneRole, &NodeRef)> + '_ {
        self.panes.iter().map(|(role, node)| (*role, node))
    }

    pub fn adaptation(&self, role: PaneRole) -> AdaptStrategy {
        self.adaptations.get(&role).copied().unwrap_or_default()
    }

    pub fn active_role(&self) -> PaneRole {
        self.active_role
    }

    /// The subtree of the active role, falling back to Primary and then to
    /// the first populated role.
    pub fn active_pane(&self) -> Option<&NodeRef> {
        self.panes
            .get(&self.active_role)
            .or_else(|| self.panes.get(&PaneRole::Primary))
            .or_else(|| self.panes.values().next())
    }

    pub(crate) fn role_of(&self, key: &NodeKey) -> Option<PaneRole> {
        self.panes
            .iter()
            .find(|(_, node)| node.key() == key)
            .map(|(role, _)| *role)
    }
}

// ============================================================================
// NavNode
// ============================================================================

impl NavNode {
    /// A screen with a freshly generated key and no parent yet.
    pub fn screen(destination: Destination) -> Self {
        NavNode::Screen(ScreenNode::new(
            NodeKey::generate("screen"),
            None,
            destination,
        ))
    }

    pub fn key(&self) -> &NodeKey {
        match self {
            NavNode::Screen(n) => &n.key,
            NavNode::Stack(n) => &n.key,
            NavNode::Tab(n) => &n.key,
            NavNode::Pane(n) => &n.key,
        }
    }

    pub fn parent_key(&self) -> Option<&NodeKey> {
        match self {
            NavNode::Screen(n) => n.parent_key.as_ref(),
            NavNode::Stack(n) => n.parent_key.as_ref(),
            NavNode::Tab(n) => n.parent_key.as_ref(),
            NavNode::Pane(n) => n.parent_key.as_ref(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NavNode::Screen(_) => NodeKind::Screen,
            NavNode::Stack(_) => NodeKind::Stack,
            NavNode::Tab(_) => NodeKind::Tab,
            NavNode::Pane(_) => NodeKind::Pane,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NavNode::Screen(_))
    }

    /// The child on the active path, if this node is a container.
    pub fn active_child(&self) -> Option<&NodeRef> {
        match self {
            NavNode::Screen(_) => None,
            NavNode::Stack(n) => n.top(),
            NavNode::Tab(n) => n.active_stack(),
            NavNode::Pane(n) => n.active_pane(),
        }
    }

    pub fn active_child_key(&self) -> Option<&NodeKey> {
        self.active_child().map(|child| child.key())
    }

    /// Direct children in declaration order (pane children in role order).
    pub fn children(&self) -> Box<dyn Iterator<Item = &NodeRef> + '_> {
        match self {
            NavNode::Screen(_) => Box::new(std::iter::empty()),
            NavNode::Stack(n) => Box::new(n.children.iter()),
            NavNode::Tab(n) => Box::new(n.stacks.iter()),
            NavNode::Pane(n) => Box::new(n.panes.values()),
        }
    }

    pub fn as_screen(&self) -> Option<&ScreenNode> {
        match self {
            NavNode::Screen(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_stack(&self) -> Option<&StackNode> {
        match self {
            NavNode::Stack(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_tab(&self) -> Option<&TabNode> {
        match self {
            NavNode::Tab(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_pane(&self) -> Option<&PaneNode> {
        match self {
            NavNode::Pane(n) => Some(n),
            _ => None,
        }
    }

    /// Shallow copy with a different back-reference. Children are shared.
    pub fn with_parent_key(&self, parent_key: Option<NodeKey>) -> NavNode {
        let mut node = self.clone();
        match &mut node {
            NavNode::Screen(n) => n.parent_key = parent_key,
            NavNode::Stack(n) => n.parent_key = parent_key,
            NavNode::Tab(n) => n.parent_key = parent_key,
            NavNode::Pane(n) => n.parent_key = parent_key,
        }
        node
    }
}

impl From<ScreenNode> for NavNode {
    fn from(node: ScreenNode) -> Self {
        NavNode::Screen(node)
    }
}

impl From<StackNode> for NavNode {
    fn from(node: StackNode) -> Self {
        NavNode::Stack(node)
    }
}

impl From<TabNode> for NavNode {
    fn from(node: TabNode) -> Self {
        NavNode::Tab(node)
    }
}

impl From<PaneNode> for NavNode {
    fn from(node: PaneNode) -> Self {
        NavNode::Pane(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(key: &str, route: &str) -> NavNode {
        ScreenNode::new(key.into(), None, Destination::new(route)).into()
    }

    #[test]
    fn test_stack_reparents_children() {
        let stack = StackNode::new("root".into(), None, vec![screen("a", "Home")]).unwrap();
        assert_eq!(stack.children()[0].parent_key(), Some(&NodeKey::new("root")));
    }

    #[test]
    fn test_empty_stack_is_rejected() {
        let err = StackNode::new("root".into(), None, Vec::new()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidTree);
    }

    #[test]
    fn test_tab_rejects_non_stack_entries() {
        let err = TabNode::new("tabs".into(), None, vec![screen("a", "Home")], 0).unwrap_err();
        assert!(matches!(err, MutationError::WrongNodeKind { .. }));
    }

    #[test]
    fn test_tab_rejects_out_of_range_index() {
        let stack: NavNode = StackNode::new("s0".into(), None, vec![screen("a", "Home")])
            .unwrap()
            .into();
        let err = TabNode::new("tabs".into(), None, vec![stack], 1).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn test_active_child_key_per_variant() {
        let stack: NavNode =
            StackNode::new("s".into(), None, vec![screen("a", "A"), screen("b", "B")])
                .unwrap()
                .into();
        assert_eq!(stack.active_child_key().map(NodeKey::as_str), Some("b"));
        assert!(!stack.is_leaf());

        let pane: NavNode = PaneNode::new("p".into(), None, screen("list", "List"))
            .with_pane(PaneRole::Supporting, screen("detail", "Detail"), AdaptStrategy::Levitate)
            .into();
        assert_eq!(pane.active_child_key().map(NodeKey::as_str), Some("list"));
        assert!(screen("x", "X").is_leaf());
    }

    #[test]
    fn test_pane_active_role_must_be_populated() {
        let pane = PaneNode::new("p".into(), None, screen("list", "List"));
        let err = pane.with_active_role(PaneRole::Extra).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RoleNotPopulated);
    }
}
