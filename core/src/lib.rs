//! Pure navigation-state model: node tree, mutation algebra and queries.
//!
//! Nothing in this crate performs I/O or holds state; every operation takes
//! a tree and returns a new one.

pub mod builder;
pub mod destination;
pub mod error;
pub mod key;
pub mod mutate;
pub mod node;
pub mod query;

pub use builder::{TreeBuilder, build_root};
pub use destination::{Destination, ParamValue};
pub use error::{ErrorKind, MutationError, MutationResult};
pub use key::NodeKey;
pub use mutate::{Intent, apply};
pub use node::{
    AdaptStrategy, NavNode, NodeKind, NodeRef, PaneNode, PaneRole, ScreenNode, StackNode, TabNode,
};

pub mod prelude {
    pub use crate::builder::TreeBuilder;
    pub use crate::destination::{Destination, ParamValue};
    pub use crate::error::{ErrorKind, MutationError};
    pub use crate::key::NodeKey;
    pub use crate::mutate::Intent;
    pub use crate::node::{
        AdaptStrategy, NavNode, NodeKind, NodeRef, PaneNode, PaneRole, ScreenNode, StackNode,
        TabNode,
    };
    pub use crate::query::{active_leaf, find_by_key};
}
