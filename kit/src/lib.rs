//! Waymark facade crate.
//!
//! This crate re-exports core, link, runtime and (optionally) observe with a
//! single entry point. The core stays usable on its own for callers that
//! only need the pure tree algebra.

pub use waymark_core as core;
pub use waymark_link as link;
#[cfg(feature = "observe")]
pub use waymark_observe as observe;
pub use waymark_runtime as runtime;

pub use waymark_core::{Destination, Intent, NavNode, NodeKey, NodeRef};
pub use waymark_link::{DeepLinkRegistry, DeepLinkRoute};
pub use waymark_runtime::Navigator;

pub mod prelude {
    pub use waymark_core::prelude::*;
    pub use waymark_link::prelude::*;
    pub use waymark_runtime::prelude::*;
}
