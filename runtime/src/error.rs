use thiserror::Error;
use waymark_core::{ErrorKind, MutationError};
use waymark_link::DeepLinkError;

pub type NavigatorResult<T> = Result<T, NavigatorError>;

#[derive(Error, Debug)]
pub enum NavigatorError {
    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    DeepLink(#[from] DeepLinkError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl NavigatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NavigatorError::Mutation(err) => err.kind(),
            NavigatorError::DeepLink(err) => err.kind(),
            NavigatorError::Config(_) => ErrorKind::Config,
        }
    }
}
