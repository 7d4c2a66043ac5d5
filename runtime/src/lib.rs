//! Stateful side of Waymark: the [`Navigator`] façade and its configuration.

pub mod config;
pub mod error;
pub mod navigator;

pub use config::NavigatorConfig;
pub use error::{NavigatorError, NavigatorResult};
pub use navigator::Navigator;

pub mod prelude {
    pub use crate::config::NavigatorConfig;
    pub use crate::error::NavigatorError;
    pub use crate::navigator::Navigator;
}
