//! # Hello Nav - Minimal Navigator Example
//!
//! Builds a two-tab app, issues a few intents, follows a deep link into the
//! second tab and prints the resulting trees.
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin hello-nav
//! ```

use waymark::core::query::{active_leaf, flatten_active_path};
use waymark::prelude::*;

// ============================================================================
// 1. Initial tree (what a generated builder would emit)
// ============================================================================

fn app(key: NodeKey, parent: Option<NodeKey>) -> NavNode {
    let stack_of = |route: &str| -> NavNode {
        StackNode::new(
            NodeKey::generate("stack"),
            None,
            [NavNode::screen(Destination::new(route))],
        )
        .map(NavNode::from)
        .unwrap_or_else(|_| NavNode::screen(Destination::new(route)))
    };

    let tabs = TabNode::new(
        "tabs".into(),
        None,
        [stack_of("Home"), stack_of("Mail")],
        0,
    );
    match tabs.and_then(|tabs| StackNode::new(key, parent, [NavNode::from(tabs)])) {
        Ok(root) => root.into(),
        Err(_) => NavNode::screen(Destination::new("Home")),
    }
}

// ============================================================================
// 2. Deep-link routes
// ============================================================================

fn routes() -> anyhow::Result<DeepLinkRegistry> {
    let tabs = [Destination::new("Home"), Destination::new("Mail")];
    let mut registry = DeepLinkRegistry::new();
    registry.register(
        DeepLinkRoute::new("home", "Home")
            .segment(PathSegment::tab_at(0, tabs.clone()))
            .segment(PathSegment::stack_from(Destination::new("Home"))),
    )?;
    registry.register(
        DeepLinkRoute::new("mail/{threadId}", "Thread")
            .param(ParamSpec::required("threadId", SerializerKind::Long))
            .param(ParamSpec::optional("highlight", SerializerKind::Boolean).with_default(false))
            .segment(PathSegment::tab_at(1, tabs))
            .segment(PathSegment::stack_from(Destination::new("Mail"))),
    )?;
    Ok(registry)
}

fn describe(label: &str, tree: &NodeRef) -> anyhow::Result<()> {
    let leaf = active_leaf(tree)?;
    let path: Vec<String> = flatten_active_path(tree)
        .iter()
        .map(|node| format!("{}:{}", node.kind(), node.key()))
        .collect();
    println!("{label}: {}", leaf.destination());
    println!("  path: {}", path.join(" > "));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    waymark::observe::init_stdout_tracing();

    let config = NavigatorConfig::from_env()?;
    let nav = Navigator::from_builder_with_config(&app, config)?.with_registry(routes()?);
    describe("start", &nav.current())?;

    nav.push(Destination::new("Compose").with_arg("draft", true))?;
    describe("after push", &nav.current())?;

    nav.switch_tab(&"tabs".into(), 1)?;
    describe("after switch_tab", &nav.current())?;

    nav.handle_deep_link("app://mail/42?highlight=true")?;
    describe("after deep link", &nav.current())?;

    if let Err(err) = nav.handle_deep_link("app://nowhere") {
        println!("unhandled link ({:?}): {err}", err.kind());
    }

    let uri = nav.uri_for(&nav.active_destination()?, None)?;
    println!("current uri: {uri}");

    nav.pop()?;
    describe("after pop", &nav.current())?;

    println!("{}", serde_json::to_string_pretty(nav.current().as_ref())?);
    Ok(())
}
