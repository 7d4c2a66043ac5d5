use crate::key::NodeKey;
use crate::node::{NodeKind, PaneRole};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat error taxonomy shared by every waymark crate.
///
/// `NoMatchingRoute` is the only kind a UI should treat as a normal outcome
/// ("link not handled"); every other kind points at a caller bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NodeNotFound,
    WrongNodeKind,
    IndexOutOfRange,
    RoleNotPopulated,
    CannotPopRoot,
    InvalidTree,
    InvalidParameterType,
    MissingRequiredParameter,
    NoMatchingRoute,
    NoRouteForDestination,
    InvalidPattern,
    Config,
}

impl ErrorKind {
    pub fn is_user_facing(&self) -> bool {
        matches!(self, ErrorKind::NoMatchingRoute)
    }
}

pub type MutationResult<T> = Result<T, MutationError>;

/// Failure of a tree mutation or query. The input tree is never modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("node not found: {key}")]
    NodeNotFound { key: NodeKey },

    #[error("node {key} is a {found}, expected a {expected}")]
    WrongNodeKind {
        key: NodeKey,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("index {index} out of range for {key} ({len} entries)")]
    IndexOutOfRange {
        key: NodeKey,
        index: usize,
        len: usize,
    },

    #[error("pane role {role:?} is not populated in {key}")]
    RoleNotPopulated { key: NodeKey, role: PaneRole },

    #[error("cannot pop {key}: no node to fall back to")]
    CannotPopRoot { key: NodeKey },

    #[error("invalid tree: {0}")]
    InvalidTree(String),
}

impl MutationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MutationError::NodeNotFound { .. } => ErrorKind::NodeNotFound,
            MutationError::WrongNodeKind { .. } => ErrorKind::WrongNodeKind,
            MutationError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            MutationError::RoleNotPopulated { .. } => ErrorKind::RoleNotPopulated,
            MutationError::CannotPopRoot { .. } => ErrorKind::CannotPopRoot,
            MutationError::InvalidTree(_) => ErrorKind::InvalidTree,
        }
    }

    pub(crate) fn not_found(key: &NodeKey) -> Self {
        MutationError::NodeNotFound { key: key.clone() }
    }

    pub(crate) fn wrong_kind(key: &NodeKey, expected: NodeKind, found: NodeKind) -> Self {
        MutationError::WrongNodeKind {
            key: key.clone(),
            expected,
            found,
        }
    }
}
