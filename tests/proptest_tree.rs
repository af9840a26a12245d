//! Property-based tests with proptest.
//!
//! Generate random trees the grammar can place, render them, and check
//! both round-trip laws: parsing the rendered text gives the tree back,
//! and rendering a parsed tree against its own text reproduces the text.

use keepalived_lens::{Node, Tree, parse, render};
use proptest::prelude::*;

// -- Leaf strategies --

fn word() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_]{1,8}".prop_map(|s| s)
}

fn number() -> impl Strategy<Value = String> {
    (0u32..10_000).prop_map(|n| n.to_string())
}

fn ipv4() -> impl Strategy<Value = String> {
    any::<[u8; 4]>().prop_map(|[a, b, c, d]| format!("{a}.{b}.{c}.{d}"))
}

/// Comment text: no leading or trailing blanks.
fn comment_text() -> impl Strategy<Value = String> {
    "[a-z]([a-z0-9 ]{0,12}[a-z0-9])?".prop_map(|s| s)
}

fn comment() -> impl Strategy<Value = Node> {
    comment_text().prop_map(|t| Node::comment(&t))
}

fn with_trailing_comment(node: impl Strategy<Value = Node>) -> impl Strategy<Value = Node> {
    (node, prop::option::of(comment_text())).prop_map(|(node, text)| match text {
        Some(text) => node.with_child(Node::comment(&text)),
        None => node,
    })
}

fn ipaddr() -> impl Strategy<Value = Node> {
    (
        ipv4(),
        prop::option::of(0u8..=32),
        prop::option::of("eth[0-9]"),
    )
        .prop_map(|(addr, len, dev)| Node::ipaddr(&addr, len, dev.as_deref()))
}

// -- Block strategies --

fn instance_entry() -> impl Strategy<Value = Node> {
    prop_oneof![
        with_trailing_comment(word().prop_map(|v| Node::field("state", &v))),
        with_trailing_comment(word().prop_map(|v| Node::field("interface", &v))),
        with_trailing_comment(number().prop_map(|v| Node::field("priority", &v))),
        with_trailing_comment(number().prop_map(|v| Node::field("advert_int", &v))),
        Just(Node::flag("nopreempt")),
        comment(),
        prop::collection::vec(ipaddr(), 0..=3).prop_map(|addrs| Node::block("virtual_ipaddress", addrs)),
    ]
}

fn vrrp_instance() -> impl Strategy<Value = Node> {
    (word(), prop::collection::vec(instance_entry(), 0..=6))
        .prop_map(|(name, body)| Node::named_block("vrrp_instance", &name, body))
}

fn global_defs() -> impl Strategy<Value = Node> {
    let entry = prop_oneof![
        with_trailing_comment(word().prop_map(|v| Node::field("router_id", &v))),
        with_trailing_comment(word().prop_map(|v| Node::field("lvs_id", &v))),
        Just(Node::flag("enable_traps")),
        comment(),
    ];
    prop::collection::vec(entry, 0..=4).prop_map(|body| Node::block("global_defs", body))
}

fn virtual_server() -> impl Strategy<Value = Node> {
    let real = (ipv4(), any::<u16>(), 0u32..100)
        .prop_map(|(ip, port, weight)| Node::real_server(&ip, port, weight));
    let entry = prop_oneof![
        word().prop_map(|v| Node::field("lb_algo", &v)),
        number().prop_map(|v| Node::field("delay_loop", &v)),
        comment(),
        real,
    ];
    (ipv4(), any::<u16>(), prop::collection::vec(entry, 0..=4))
        .prop_map(|(ip, port, body)| Node::virtual_server(&ip, port).with_children(body))
}

fn tree() -> impl Strategy<Value = Tree> {
    let top = prop_oneof![comment(), global_defs(), vrrp_instance(), virtual_server()];
    prop::collection::vec(top, 0..=5).prop_map(Tree::from)
}

// -- Edits --

/// Fields the grammar lets carry an end-of-line comment.
const COMMENTABLE: &[&str] = &["state", "interface", "priority", "advert_int", "router_id", "lvs_id"];

/// Move end-of-line comments onto their own line after their field, or
/// attach own-line comments to the field right before them.
fn relocate_comments(block: &mut Node, to_own_line: bool) {
    let len = block.children().len();
    for i in (0..len).rev() {
        if to_own_line {
            let field = &mut block.children_mut()[i];
            if COMMENTABLE.contains(&field.label()) {
                if let Some(comment) = field.remove(0) {
                    block.insert(i + 1, comment);
                }
            }
        } else if i + 1 < block.children().len() {
            let children = block.children();
            let takes_comment = COMMENTABLE.contains(&children[i].label())
                && children[i].children().is_empty()
                && children[i + 1].is_comment();
            if takes_comment {
                if let Some(comment) = block.remove(i + 1) {
                    block.children_mut()[i].push(comment);
                }
            }
        }
    }
}

/// Reorder and move nodes: comments between nesting levels, children
/// within their block, top-level nodes around the file.
fn shuffle(tree: &mut Tree, to_own_line: bool, rotate: usize) {
    for node in tree.nodes_mut() {
        if node.label() == "vrrp_instance" || node.label() == "global_defs" {
            relocate_comments(node, to_own_line);
            let len = node.children().len();
            if len > 1 {
                node.move_child(0, len - 1);
            }
        }
    }

    let top_comment = tree.nodes().iter().rposition(Node::is_comment);
    let first_block = tree.nodes().iter().position(|n| !n.is_comment());
    if let (Some(c), Some(b)) = (top_comment, first_block) {
        if let Some(comment) = tree.remove(c) {
            let b = if c < b { b - 1 } else { b };
            tree.nodes_mut()[b].push(comment);
        }
    }

    let nested = tree
        .nodes()
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, n)| n.children().iter().position(Node::is_comment).map(|k| (i, k)));
    if let Some((i, k)) = nested {
        if let Some(comment) = tree.nodes_mut()[i].remove(k) {
            tree.insert(0, comment);
        }
    }

    let len = tree.len();
    for _ in 0..rotate {
        if len > 1 {
            tree.move_node(0, len - 1);
        }
    }
}

proptest! {
    #[test]
    fn rendered_tree_parses_back(tree in tree()) {
        let text = render(&tree, None).expect("render");
        let parsed = parse(&text).expect("parse rendered text");
        prop_assert_eq!(parsed, tree);
    }

    #[test]
    fn parsed_text_renders_unchanged(tree in tree(), indent in "( {1,4}|\t)") {
        let style = keepalived_lens::Style::new().with_indent(&indent);
        let text = keepalived_lens::render_with(&tree, None, &style).expect("render");
        let parsed = parse(&text).expect("parse");
        prop_assert_eq!(render(&parsed, Some(&text)).expect("re-render"), text);
    }

    #[test]
    fn edits_survive_the_round_trip(tree in tree(), priority in number()) {
        let text = render(&tree, None).expect("render");
        let mut edited = parse(&text).expect("parse");
        for node in edited.nodes_mut() {
            if let Some(field) = node.child_mut("priority") {
                field.set_value(&priority);
            }
            if node.label() != "virtual_server" {
                let last = node.children().len().checked_sub(1);
                if let Some(last) = last {
                    node.remove(last);
                }
            }
        }
        let out = render(&edited, Some(&text)).expect("render edited");
        prop_assert_eq!(parse(&out).expect("parse edited"), edited);
    }

    #[test]
    fn moved_nodes_survive_the_round_trip(
        tree in tree(),
        to_own_line in any::<bool>(),
        rotate in 0usize..4,
        final_newline in any::<bool>(),
    ) {
        let mut text = render(&tree, None).expect("render");
        if !final_newline {
            text.pop();
        }
        let mut edited = parse(&text).expect("parse");
        shuffle(&mut edited, to_own_line, rotate);
        let out = render(&edited, Some(&text)).expect("render edited");
        let reparsed = parse(&out).expect("parse edited");
        prop_assert_eq!(reparsed, edited, "rendered:\n{}", out);
    }
}
