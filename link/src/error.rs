use thiserror::Error;
use waymark_core::{ErrorKind, MutationError};

pub type DeepLinkResult<T> = Result<T, DeepLinkError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeepLinkError {
    #[error("parameter `{name}` expects {expected}, got {value:?}")]
    InvalidParameterType {
        name: String,
        expected: String,
        value: String,
    },

    #[error("route {route} requires parameter `{name}`")]
    MissingRequiredParameter { route: String, name: String },

    /// The link is not handled by any registered route. Not a bug.
    #[error("no route matches {uri}")]
    NoMatchingRoute { uri: String },

    #[error("no URI pattern registered for {route}")]
    NoRouteForDestination { route: String },

    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error(transparent)]
    Tree(#[from] MutationError),
}

impl DeepLinkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeepLinkError::InvalidParameterType { .. } => ErrorKind::InvalidParameterType,
            DeepLinkError::MissingRequiredParameter { .. } => ErrorKind::MissingRequiredParameter,
            DeepLinkError::NoMatchingRoute { .. } => ErrorKind::NoMatchingRoute,
            DeepLinkError::NoRouteForDestination { .. } => ErrorKind::NoRouteForDestination,
            DeepLinkError::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            DeepLinkError::Tree(err) => err.kind(),
        }
    }

    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        DeepLinkError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}
