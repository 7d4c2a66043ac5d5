use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Stable identity of a node in the navigation tree.
///
/// Keys are the join key between a container and its children and the only
/// way mutations address nodes. Cloning is cheap (`Arc<str>`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(Arc<str>);

impl NodeKey {
    /// Wrap an explicit key (generated builders and tests pass their own).
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// Generate a process-unique key, e.g. `stack-4c1f0e...`.
    pub fn generate(prefix: &str) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self::new(format!("{prefix}-{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeKey {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl Borrow<str> for NodeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
