//! # Navigator: the stateful façade
//!
//! Holds the current tree, serialises writers, and publishes every
//! committed tree on a `watch` channel. All tree logic is delegated to
//! `waymark_core::mutate` and `waymark_link::DeepLinkRegistry`; this type
//! only owns the "current" pointer.

use crate::config::NavigatorConfig;
use crate::error::NavigatorResult;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::watch;
use waymark_core::mutate::{self, Intent};
use waymark_core::query;
use waymark_core::{Destination, NavNode, NodeKey, NodeRef, PaneRole, TreeBuilder, build_root};
use waymark_link::{DeepLinkRegistry, DeepLinkRoute};

pub struct Navigator {
    state: watch::Sender<NodeRef>,
    /// Single-writer guard. Held across read-current, mutate, publish.
    write: Mutex<()>,
    registry: RwLock<DeepLinkRegistry>,
    config: NavigatorConfig,
}

impl Navigator {
    /// Start from an existing tree. The tree is validated first.
    pub fn new(root: impl Into<NodeRef>) -> NavigatorResult<Self> {
        Self::with_config(root, NavigatorConfig::default())
    }

    pub fn with_config(root: impl Into<NodeRef>, config: NavigatorConfig) -> NavigatorResult<Self> {
        let root = root.into();
        query::validate(&root)?;

        let registry = DeepLinkRegistry::new().with_allowed_schemes(&config.allowed_schemes);
        let (state, _) = watch::channel(root);
        Ok(Self {
            state,
            write: Mutex::new(()),
            registry: RwLock::new(registry),
            config,
        })
    }

    /// Start from a generated builder.
    pub fn from_builder<B: TreeBuilder + ?Sized>(builder: &B) -> NavigatorResult<Self> {
        Self::new(build_root(builder)?)
    }

    pub fn from_builder_with_config<B: TreeBuilder + ?Sized>(
        builder: &B,
        config: NavigatorConfig,
    ) -> NavigatorResult<Self> {
        Self::with_config(build_root(builder)?, config)
    }

    /// Replace the deep-link registry. A configured scheme allow-list wins
    /// over the registry's own.
    pub fn with_registry(self, mut registry: DeepLinkRegistry) -> Self {
        if !self.config.allowed_schemes.is_empty() {
            registry.set_allowed_schemes(&self.config.allowed_schemes);
        }
        *self.registry.write() = registry;
        self
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Snapshot of the current tree.
    pub fn current(&self) -> NodeRef {
        self.state.borrow().clone()
    }

    pub fn active_destination(&self) -> NavigatorResult<Destination> {
        let tree = self.current();
        let leaf = query::active_leaf(&tree)?;
        Ok(leaf.destination().clone())
    }

    /// Observe committed trees. The receiver starts at the current tree.
    pub fn subscribe(&self) -> watch::Receiver<NodeRef> {
        self.state.subscribe()
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    /// Apply an arbitrary [`Intent`].
    pub fn dispatch(&self, intent: &Intent) -> NavigatorResult<NodeRef> {
        self.commit(intent.name(), |tree| Ok(mutate::apply(tree, intent)?))
    }

    /// Push a new screen onto the active stack.
    pub fn push(&self, destination: Destination) -> NavigatorResult<NodeRef> {
        self.dispatch(&Intent::Push {
            target: None,
            node: NavNode::screen(destination),
        })
    }

    pub fn push_to(&self, stack: &NodeKey, node: NavNode) -> NavigatorResult<NodeRef> {
        self.dispatch(&Intent::Push {
            target: Some(stack.clone()),
            node,
        })
    }

    pub fn pop(&self) -> NavigatorResult<NodeRef> {
        self.dispatch(&Intent::Pop { target: None })
    }

    pub fn pop_from(&self, stack: &NodeKey) -> NavigatorResult<NodeRef> {
        self.dispatch(&Intent::Pop {
            target: Some(stack.clone()),
        })
    }

    pub fn replace(&self, destination: Destination) -> NavigatorResult<NodeRef> {
        self.dispatch(&Intent::Replace {
            target: None,
            node: NavNode::screen(destination),
        })
    }

    pub fn switch_tab(&self, tab: &NodeKey, index: usize) -> NavigatorResult<NodeRef> {
        self.dispatch(&Intent::SetActiveStackIndex {
            tab: tab.clone(),
            index,
        })
    }

    pub fn switch_pane(&self, pane: &NodeKey, role: PaneRole) -> NavigatorResult<NodeRef> {
        self.dispatch(&Intent::SetActivePaneRole {
            pane: pane.clone(),
            role,
        })
    }

    pub fn navigate_to(&self, key: &NodeKey) -> NavigatorResult<NodeRef> {
        self.dispatch(&Intent::NavigateToKey { key: key.clone() })
    }

    pub fn remove(&self, key: &NodeKey) -> NavigatorResult<NodeRef> {
        self.dispatch(&Intent::RemoveSubtree { key: key.clone() })
    }

    /// Replace the whole tree with the one reconstructed from `uri`.
    pub fn handle_deep_link(&self, uri: &str) -> NavigatorResult<NodeRef> {
        self.commit("handle_deep_link", |_| {
            let registry = self.registry.read();
            Ok(registry.resolve(uri)?)
        })
    }

    pub fn register_route(&self, route: DeepLinkRoute) -> NavigatorResult<()> {
        self.registry.write().register(route)?;
        Ok(())
    }

    /// URI for `destination`, using the configured default scheme when
    /// `scheme` is `None`.
    pub fn uri_for(&self, destination: &Destination, scheme: Option<&str>) -> NavigatorResult<String> {
        let scheme = scheme.unwrap_or(self.config.default_scheme.as_str());
        Ok(self.registry.read().try_create_uri(destination, scheme)?)
    }

    fn commit<F>(&self, intent: &str, apply: F) -> NavigatorResult<NodeRef>
    where
        F: FnOnce(&NodeRef) -> NavigatorResult<NodeRef>,
    {
        let span = tracing::info_span!("Intent", waymark.intent = %intent);
        let _entered = span.enter();

        let _guard = self.write.lock();
        let current = self.state.borrow().clone();

        match apply(&current) {
            Ok(next) => {
                tracing::debug!(
                    root = %next.key(),
                    nodes = query::node_count(&next),
                    leaf = ?query::active_leaf(&next).ok().map(|s| s.destination().to_string()),
                    "Intent committed"
                );
                if self.config.snapshot_logging {
                    match serde_json::to_string(next.as_ref()) {
                        Ok(json) => tracing::trace!(tree = %json, "Tree snapshot"),
                        Err(e) => tracing::trace!(error = %e, "Tree snapshot failed"),
                    }
                }
                self.state.send_replace(Arc::clone(&next));
                Ok(next)
            }
            Err(err) => {
                if err.kind().is_user_facing() {
                    tracing::debug!(error = %err, "Intent not handled");
                } else {
                    tracing::warn!(error = %err, kind = ?err.kind(), "Intent rejected");
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("root", self.state.borrow().key())
            .field("routes", &self.registry.read().len())
            .field("config", &self.config)
            .finish()
    }
}
