//! Deep-link resolution for Waymark.
//!
//! A [`DeepLinkRegistry`] turns `scheme://path?query` URIs into complete
//! navigation trees and renders destinations back into URIs.

pub mod error;
pub mod param;
pub mod pattern;
pub mod registry;
pub mod segment;
pub mod uri;

pub use error::{DeepLinkError, DeepLinkResult};
pub use param::{ParamSpec, SerializerKind};
pub use pattern::RoutePattern;
pub use registry::{DeepLinkRegistry, DeepLinkRoute};
pub use segment::{PaneDecl, PathSegment, reconstruct};
pub use uri::DeepLinkUri;

pub mod prelude {
    pub use crate::error::DeepLinkError;
    pub use crate::param::{ParamSpec, SerializerKind};
    pub use crate::registry::{DeepLinkRegistry, DeepLinkRoute};
    pub use crate::segment::{PaneDecl, PathSegment};
}
