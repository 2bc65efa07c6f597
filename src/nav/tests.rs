// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use crossterm::event::KeyCode;
use proptest::prelude::*;
use rstest::{fixture, rstest};
use serde_json::{json, Map, Value};

use super::{FocusWindow, KeyDispatch, KeyMap, NavAction, Navigator};
use crate::model::CallId;
use crate::ops::PatchMode;
use crate::store::CallTree;

const ROOT: &str = "01GQZ6C2XKJ1T8E9W3M4N5P6R7";

fn id(raw: &str) -> CallId {
    CallId::new(raw).unwrap()
}

fn call_line(parent: &str, child: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(format!("{parent}.children.{child}"), Value::Bool(true));
    map.insert(child.to_owned(), json!({"parent": parent, "name": child}));
    map
}

fn build(edges: &[(&str, &str)]) -> CallTree {
    let mut tree = CallTree::new(id(ROOT));
    let lines = edges.iter().map(|(parent, child)| call_line(parent, child));
    tree.apply_records(lines, PatchMode::Strict);
    tree
}

/// ```text
/// root
/// └─ main
///    ├─ a
///    │  ├─ b
///    │  │  └─ c
///    │  └─ d
///    └─ e
/// ```
#[fixture]
fn tree() -> CallTree {
    build(&[(ROOT, "main"), ("main", "a"), ("a", "b"), ("b", "c"), ("a", "d"), ("main", "e")])
}

fn nav_at(selected: &str, expanded: &[&str]) -> Navigator {
    let mut nav = Navigator::new();
    nav.select(id(selected));
    for raw in expanded {
        nav.set_expanded(&id(raw), true);
    }
    nav
}

fn selected(nav: &Navigator) -> &str {
    nav.selected().map(CallId::as_str).unwrap_or("")
}

#[rstest]
fn nothing_selected_focuses_everything(tree: CallTree) {
    let focus = Navigator::new().focus(&tree);
    assert_eq!(focus, FocusWindow::everything());
    assert!(focus.contains(&id("c")));
    assert_eq!(focus.len(), None);
}

#[rstest]
#[case("c", "a", &["a", "b", "d", "c"])]
#[case("b", "main", &["main", "a", "e", "b", "d"])]
#[case("a", ROOT, &[ROOT, "main", "a", "e"])]
#[case("main", ROOT, &[ROOT, "main", "a", "e"])]
fn focus_window_spans_two_levels_below_the_grandparent(
    tree: CallTree,
    #[case] selection: &str,
    #[case] root: &str,
    #[case] members: &[&str],
) {
    let focus = nav_at(selection, &[]).focus(&tree);
    assert_eq!(focus.root(), Some(&id(root)));
    assert_eq!(focus.len(), Some(members.len()));
    for member in members {
        assert!(focus.contains(&id(member)), "{member} should be focused");
    }
}

#[rstest]
fn focus_excludes_nodes_outside_the_window(tree: CallTree) {
    let focus = nav_at("a", &[]).focus(&tree);
    assert!(!focus.contains(&id("b")));
    assert!(!focus.contains(&id("c")));
}

#[rstest]
fn unknown_selection_focuses_everything(tree: CallTree) {
    let focus = nav_at("ghost", &[]).focus(&tree);
    assert!(focus.contains(&id("c")));
}

#[rstest]
#[case("b", &["a", "b"], "c")]
#[case("b", &["a"], "d")]
#[case("c", &["a", "b"], "d")]
#[case("d", &["a"], "e")]
#[case("a", &[], "e")]
fn down_walks_visible_preorder(
    tree: CallTree,
    #[case] from: &str,
    #[case] expanded: &[&str],
    #[case] to: &str,
) {
    let mut nav = nav_at(from, expanded);
    assert!(nav.apply(&tree, NavAction::Down));
    assert_eq!(selected(&nav), to);
}

#[rstest]
#[case("e", &["a", "b"], "d")]
#[case("d", &["a", "b"], "c")]
#[case("e", &[], "a")]
#[case("d", &["a"], "b")]
#[case("b", &["a"], "a")]
#[case("a", &[], "main")]
fn up_walks_visible_preorder_backwards(
    tree: CallTree,
    #[case] from: &str,
    #[case] expanded: &[&str],
    #[case] to: &str,
) {
    let mut nav = nav_at(from, expanded);
    assert!(nav.apply(&tree, NavAction::Up));
    assert_eq!(selected(&nav), to);
}

#[rstest]
fn moves_without_a_target_keep_the_selection(tree: CallTree) {
    let mut nav = nav_at("main", &[]);
    assert!(!nav.apply(&tree, NavAction::Up));
    assert!(!nav.apply(&tree, NavAction::Down));
    assert!(!nav.apply(&tree, NavAction::Left));
    assert_eq!(selected(&nav), "main");

    let mut nav = nav_at("e", &[]);
    assert!(!nav.apply(&tree, NavAction::Down));
    assert_eq!(selected(&nav), "e");
}

#[rstest]
fn left_collapses_before_it_climbs(tree: CallTree) {
    let mut nav = nav_at("a", &["a"]);
    assert!(nav.apply(&tree, NavAction::Left));
    assert_eq!(selected(&nav), "a");
    assert!(!nav.is_expanded(&id("a")));

    assert!(nav.apply(&tree, NavAction::Left));
    assert_eq!(selected(&nav), "main");
}

#[rstest]
fn right_expands_only_nodes_with_children(tree: CallTree) {
    let mut nav = nav_at("b", &[]);
    assert!(nav.apply(&tree, NavAction::Right));
    assert!(nav.is_expanded(&id("b")));
    assert_eq!(selected(&nav), "b");

    let mut leaf = nav_at("c", &[]);
    assert!(!leaf.apply(&tree, NavAction::Right));
    assert!(!leaf.is_expanded(&id("c")));
}

#[rstest]
fn expand_and_collapse_are_idempotent(tree: CallTree) {
    let mut nav = nav_at("a", &["a"]);
    let before = nav.clone();
    assert!(!nav.apply(&tree, NavAction::Right));
    assert_eq!(nav, before);

    nav.set_expanded(&id("b"), false);
    assert_eq!(nav, before);
    nav.set_expanded(&id("a"), true);
    assert_eq!(nav, before);
}

#[test]
fn auto_select_waits_for_root_and_child_then_fires_once() {
    let mut tree = CallTree::new(id(ROOT));
    let mut nav = Navigator::new();

    tree.apply_records([call_line(ROOT, "main")], PatchMode::Strict);
    assert!(!nav.auto_select(&tree));
    assert_eq!(nav.selected(), None);

    tree.apply_records(
        [call_line("main", "first"), call_line("main", "second")],
        PatchMode::Strict,
    );
    assert!(nav.auto_select(&tree));
    assert_eq!(selected(&nav), "first");

    nav.select(id("second"));
    tree.apply_records([call_line("main", "third")], PatchMode::Strict);
    assert!(!nav.auto_select(&tree));
    assert_eq!(selected(&nav), "second");
}

#[test]
fn explicit_selection_disables_auto_select() {
    let tree = build(&[(ROOT, "main"), ("main", "a")]);
    let mut nav = Navigator::new();
    nav.select(id("main"));
    assert!(!nav.auto_select(&tree));
    assert_eq!(selected(&nav), "main");
}

#[test]
fn key_map_covers_arrows_and_letters() {
    let keys = KeyMap::standard();
    for (arrow, letter, action) in [
        (KeyCode::Left, 'h', NavAction::Left),
        (KeyCode::Down, 'j', NavAction::Down),
        (KeyCode::Up, 'k', NavAction::Up),
        (KeyCode::Right, 'l', NavAction::Right),
    ] {
        assert_eq!(keys.lookup(arrow), Some(action));
        assert_eq!(keys.lookup(KeyCode::Char(letter)), Some(action));
    }
    assert_eq!(keys.lookup(KeyCode::Char('x')), None);
    assert_eq!(keys.lookup(KeyCode::Enter), None);
}

#[rstest]
fn dispatch_needs_a_selection_and_a_binding(tree: CallTree) {
    let keys = KeyMap::standard();
    let mut nav = Navigator::new();
    assert_eq!(keys.dispatch(&mut nav, &tree, KeyCode::Down), KeyDispatch::Ignored);

    nav.select(id("a"));
    assert_eq!(keys.dispatch(&mut nav, &tree, KeyCode::Char('q')), KeyDispatch::Ignored);
    assert_eq!(
        keys.dispatch(&mut nav, &tree, KeyCode::Char('j')),
        KeyDispatch::Handled { action: NavAction::Down, changed: true }
    );
    assert_eq!(selected(&nav), "e");
    assert_eq!(
        keys.dispatch(&mut nav, &tree, KeyCode::Down),
        KeyDispatch::Handled { action: NavAction::Down, changed: false }
    );
}

/// Random tree with consistent parent/children links plus a random expanded set.
fn arb_tree() -> impl Strategy<Value = (Vec<usize>, Vec<bool>)> {
    (2usize..20).prop_flat_map(|size| {
        let parents = (1..size).map(|n| (0..n).boxed()).collect::<Vec<_>>();
        (parents, prop::collection::vec(any::<bool>(), size))
    })
}

fn node(n: usize) -> String {
    if n == 0 {
        ROOT.to_owned()
    } else {
        format!("n{n}")
    }
}

fn visible(tree: &CallTree, nav: &Navigator) -> Vec<CallId> {
    fn walk(
        tree: &CallTree,
        nav: &Navigator,
        id: &CallId,
        out: &mut Vec<CallId>,
        seen: &mut HashSet<CallId>,
    ) {
        for child in tree.children_of(id) {
            if !seen.insert(child.clone()) {
                continue;
            }
            out.push(child.clone());
            if nav.is_expanded(child) {
                walk(tree, nav, child, out, seen);
            }
        }
    }
    let mut out = Vec::new();
    walk(tree, nav, tree.root(), &mut out, &mut HashSet::new());
    out
}

proptest! {
    #[test]
    fn down_then_up_returns_to_the_start((parents, expanded) in arb_tree()) {
        let names: Vec<String> = (0..=parents.len()).map(node).collect();
        let edges: Vec<(&str, &str)> = parents
            .iter()
            .enumerate()
            .map(|(n, parent)| (names[*parent].as_str(), names[n + 1].as_str()))
            .collect();
        let tree = build(&edges);

        let mut base = Navigator::new();
        for (name, open) in names.iter().zip(&expanded) {
            base.set_expanded(&id(name), *open);
        }

        for start in visible(&tree, &base) {
            let mut nav = base.clone();
            nav.select(start.clone());
            if nav.apply(&tree, NavAction::Down) {
                prop_assert!(nav.apply(&tree, NavAction::Up));
                prop_assert_eq!(nav.selected(), Some(&start));
            }
        }
    }
}
