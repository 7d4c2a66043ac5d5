use proptest::prelude::*;
use std::sync::Arc;
use waymark_core::mutate::{self, Intent};
use waymark_core::query::{self, active_leaf, find_by_key};
use waymark_core::{
    AdaptStrategy, Destination, NavNode, NodeKey, NodeRef, PaneNode, PaneRole, ScreenNode,
    StackNode, TabNode,
};

fn screen(key: &str, route: &str) -> NavNode {
    ScreenNode::new(key.into(), None, Destination::new(route)).into()
}

fn stack(key: &str, children: Vec<NavNode>) -> NavNode {
    StackNode::new(key.into(), None, children).unwrap().into()
}

/// root stack -> tabs(home | search | split) ; split holds a pane.
fn seed() -> NodeRef {
    let pane = PaneNode::new("pane".into(), None, stack("list-stack", vec![screen("list", "List")]))
        .with_pane(
            PaneRole::Supporting,
            stack("detail-stack", vec![screen("detail", "Detail")]),
            AdaptStrategy::Levitate,
        );
    let tabs = TabNode::new(
        "tabs".into(),
        None,
        vec![
            stack("home-stack", vec![screen("home", "Home")]),
            stack("search-stack", vec![screen("search", "Search")]),
            stack("split-stack", vec![pane.into()]),
        ],
        0,
    )
    .unwrap();
    Arc::new(stack("root", vec![tabs.into()]))
}

const KEYS: [&str; 12] = [
    "root",
    "tabs",
    "home-stack",
    "search-stack",
    "split-stack",
    "pane",
    "list-stack",
    "detail-stack",
    "home",
    "detail",
    "missing",
    "pushed-0",
];

fn key_strategy() -> impl Strategy<Value = NodeKey> {
    prop::sample::select(KEYS.to_vec()).prop_map(NodeKey::from)
}

fn role_strategy() -> impl Strategy<Value = PaneRole> {
    prop::sample::select(PaneRole::ALL.to_vec())
}

fn intent_strategy() -> impl Strategy<Value = Intent> {
    prop_oneof![
        (prop::option::of(key_strategy()), 0u8..4).prop_map(|(target, n)| Intent::Push {
            target,
            node: NavNode::screen(Destination::new(format!("Pushed{n}"))),
        }),
        (prop::option::of(key_strategy()), key_strategy()).prop_map(|(target, key)| Intent::Push {
            target,
            node: ScreenNode::new(key, None, Destination::new("Keyed")).into(),
        }),
        prop::option::of(key_strategy()).prop_map(|target| Intent::Pop { target }),
        prop::option::of(key_strategy()).prop_map(|target| Intent::Replace {
            target,
            node: NavNode::screen(Destination::new("Replaced")),
        }),
        (key_strategy(), 0usize..4).prop_map(|(tab, index)| Intent::SetActiveStackIndex { tab, index }),
        (key_strategy(), role_strategy()).prop_map(|(pane, role)| Intent::SetActivePaneRole { pane, role }),
        key_strategy().prop_map(|key| Intent::NavigateToKey { key }),
        key_strategy().prop_map(|key| Intent::RemoveSubtree { key }),
    ]
}

proptest! {
    #[test]
    fn mutations_preserve_invariants(intents in prop::collection::vec(intent_strategy(), 1..40)) {
        let mut tree = seed();
        for intent in &intents {
            match mutate::apply(&tree, intent) {
                Ok(next) => {
                    prop_assert!(query::validate(&next).is_ok(), "{:?} broke the tree", intent);
                    prop_assert!(active_leaf(&next).is_ok());
                    tree = next;
                }
                Err(_) => {
                    // A rejected intent never corrupts the tree it was given.
                    prop_assert!(query::validate(&tree).is_ok());
                }
            }
        }
    }

    #[test]
    fn pushing_an_existing_key_is_rejected(key in prop::sample::select(vec!["root", "tabs", "home", "pane", "detail-stack"])) {
        let tree = seed();
        let node: NavNode = ScreenNode::new(key.into(), None, Destination::new("Again")).into();
        let err = mutate::push(&tree, None, node).unwrap_err();
        prop_assert_eq!(err.kind(), waymark_core::ErrorKind::InvalidTree);
    }

    #[test]
    fn pop_undoes_push(target in prop::sample::select(vec!["home-stack", "search-stack", "list-stack", "detail-stack"])) {
        let tree = seed();
        let target = NodeKey::from(target);
        let pushed = mutate::push(&tree, Some(&target), NavNode::screen(Destination::new("X"))).unwrap();
        let popped = mutate::pop(&pushed, Some(&target)).unwrap();
        prop_assert_eq!(popped, tree);
    }

    #[test]
    fn navigate_to_key_puts_key_on_active_path(key in prop::sample::select(vec!["home", "search", "list", "detail"])) {
        let tree = seed();
        let key = NodeKey::from(key);
        let next = mutate::navigate_to_key(&tree, &key).unwrap();
        prop_assert_eq!(active_leaf(&next).unwrap().key(), &key);
        prop_assert!(find_by_key(&next, &key).is_some());
    }
}
