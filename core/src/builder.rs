use crate::error::MutationResult;
use crate::key::NodeKey;
use crate::node::{NavNode, NodeRef};
use crate::query;
use std::sync::Arc;

/// Produces the initial tree of a navigation graph.
///
/// Generated code implements this as a plain closure receiving the root key
/// and the (absent) parent key.
pub trait TreeBuilder {
    fn build(&self, key: NodeKey, parent_key: Option<NodeKey>) -> NavNode;
}

impl<F> TreeBuilder for F
where
    F: Fn(NodeKey, Option<NodeKey>) -> NavNode,
{
    fn build(&self, key: NodeKey, parent_key: Option<NodeKey>) -> NavNode {
        self(key, parent_key)
    }
}

/// Run `builder` for a root and reject the output unless it is a valid tree.
pub fn build_root<B: TreeBuilder + ?Sized>(builder: &B) -> MutationResult<NodeRef> {
    let root = builder.build(NodeKey::generate("root"), None);
    query::validate(&root)?;
    Ok(Arc::new(root))
}
