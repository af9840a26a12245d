//! Structural patterns: the line and block shapes of brace-delimited
//! configuration dialects, built from lens combinators.
//!
//! Every pattern produces exactly one node and keeps its indentation and
//! line terminator inside that node, so an unchanged node can be copied
//! from the original text as a whole.

use crate::lens::{Lens, Rx};
use crate::tree::COMMENT;

const WORD: &str = r"[A-Za-z0-9_.:/-]+";
const COMMENT_TEXT: &str = r"[^ \t\r\n](?:[^\r\n]*[^ \t\r\n])?";

/// The five structural shapes. Each variant compiles to a lens that
/// drives both get and put.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// `keyword value [# comment]`
    Field { keyword: Rx, value: Lens },
    /// `keyword [# comment]`
    Flag { keyword: Rx },
    /// `keyword { body }`
    Block { keyword: Rx, body: Lens },
    /// `keyword name { body }`, the name stored as the node's value.
    NamedBlock { keyword: Rx, body: Lens },
    /// `keyword name arg { body }`, name and arg stored as child nodes.
    NamedBlockArg {
        keyword: Rx,
        name: String,
        arg: String,
        body: Lens,
    },
}

impl Pattern {
    #[must_use]
    pub fn lens(self) -> Lens {
        match self {
            Self::Field { keyword, value } => Lens::subtree(Lens::seq([
                Lens::indent(),
                Lens::key(keyword),
                sep(),
                value,
                comment_or_eol(),
            ])),
            Self::Flag { keyword } => Lens::subtree(Lens::seq([
                Lens::indent(),
                Lens::key(keyword),
                comment_or_eol(),
            ])),
            Self::Block { keyword, body } => braced(Lens::key(keyword), body),
            Self::NamedBlock { keyword, body } => braced(
                Lens::seq([Lens::key(keyword), sep(), Lens::store(word())]),
                body,
            ),
            Self::NamedBlockArg {
                keyword,
                name,
                arg,
                body,
            } => braced(
                Lens::seq([
                    Lens::key(keyword),
                    sep(),
                    positional(&name),
                    sep(),
                    positional(&arg),
                ]),
                body,
            ),
        }
    }
}

/// `indent title { EOL (body | empty | comment)* indent } EOL`
fn braced(title: Lens, body: Lens) -> Lens {
    Lens::subtree(Lens::seq([
        Lens::indent(),
        title,
        Lens::del(Rx::new("'{'", r"[ \t]*\{"), " {"),
        brace_eol(),
        Lens::star(Lens::alt([body, empty(), comment()])),
        Lens::indent(),
        Lens::del_str("}"),
        brace_eol(),
    ]))
}

/// A bare word stored as a child node labeled `label`.
#[must_use]
pub fn positional(label: &str) -> Lens {
    Lens::subtree(Lens::seq([Lens::label(label), Lens::store(word())]))
}

/// A line of the form `keyword value [# comment]`.
#[must_use]
pub fn field(keyword: &str, value: Lens) -> Lens {
    Pattern::Field {
        keyword: Rx::literal(keyword),
        value,
    }
    .lens()
}

/// A bare `keyword` line, for boolean toggles.
#[must_use]
pub fn flag(keyword: &str) -> Lens {
    Pattern::Flag {
        keyword: Rx::literal(keyword),
    }
    .lens()
}

/// `keyword { ... }`
#[must_use]
pub fn block(keyword: &str, body: Lens) -> Lens {
    Pattern::Block {
        keyword: Rx::literal(keyword),
        body,
    }
    .lens()
}

/// `keyword name { ... }`
#[must_use]
pub fn named_block(keyword: &str, body: Lens) -> Lens {
    Pattern::NamedBlock {
        keyword: Rx::literal(keyword),
        body,
    }
    .lens()
}

/// `keyword name arg { ... }` with `name` and `arg` as child labels.
#[must_use]
pub fn named_block_arg(keyword: &str, name: &str, arg: &str, body: Lens) -> Lens {
    Pattern::NamedBlockArg {
        keyword: Rx::literal(keyword),
        name: name.to_string(),
        arg: arg.to_string(),
        body,
    }
    .lens()
}

/// A bare word token: names, interfaces, addresses.
#[must_use]
pub fn word() -> Rx {
    Rx::new("word", WORD)
}

/// Leading whitespace of a line.
#[must_use]
pub const fn indent() -> Lens {
    Lens::indent()
}

/// Separator between tokens on one line.
#[must_use]
pub fn sep() -> Lens {
    Lens::del(Rx::new("whitespace", r"[ \t]+"), " ")
}

/// End of line, also accepting end of input.
#[must_use]
pub fn eol() -> Lens {
    Lens::del(Rx::new("end of line", r"[ \t]*\r?(?:\n|\z)"), "\n")
}

/// End of a line holding a brace. A trailing comment here is kept as
/// layout rather than as a node.
fn brace_eol() -> Lens {
    Lens::del(
        Rx::new("end of line", r"[ \t]*(?:[#!][^\r\n]*)?\r?(?:\n|\z)"),
        "\n",
    )
}

/// A blank line, or one holding only a comment marker.
#[must_use]
pub fn empty() -> Lens {
    Lens::del(
        Rx::new("blank line", r"[ \t]*[#!]?[ \t]*\r?(?:\n|\z)"),
        "\n",
    )
}

/// A full-line comment, stored as a `#comment` node.
#[must_use]
pub fn comment() -> Lens {
    Lens::subtree(Lens::seq([
        Lens::indent(),
        Lens::label(COMMENT),
        Lens::del(Rx::new("comment", r"[#!][ \t]*"), "# "),
        Lens::store(Rx::new("comment text", COMMENT_TEXT)),
        eol(),
    ]))
}

/// Line end with an optional trailing comment stored as a `#comment` child.
#[must_use]
pub fn comment_or_eol() -> Lens {
    let trailing = Lens::subtree(Lens::seq([
        Lens::label(COMMENT),
        Lens::del(Rx::new("comment", r"[ \t]*[#!][ \t]*"), " # "),
        Lens::store(Rx::new("comment text", COMMENT_TEXT)),
    ]));
    Lens::alt([Lens::seq([trailing, eol()]), eol()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get::get;
    use crate::put::put;
    use crate::tree::{Node, Tree};

    fn number() -> Lens {
        Lens::store(Rx::new("number", "[0-9]+"))
    }

    fn file(entry: Lens) -> Lens {
        Lens::star(Lens::alt([empty(), comment(), entry]))
    }

    #[test]
    fn field_with_trailing_comment() {
        let lens = file(field("priority", number()));
        let tree = get("priority 100   # highest\n", &lens).expect("parse");
        let node = &tree.nodes()[0];
        assert_eq!(node.value(), Some("100"));
        assert_eq!(node.children()[0].label(), COMMENT);
        assert_eq!(node.children()[0].value(), Some("highest"));
    }

    #[test]
    fn flag_has_no_value() {
        let lens = file(flag("nopreempt"));
        let tree = get("  nopreempt\n", &lens).expect("parse");
        assert_eq!(tree.nodes()[0].label(), "nopreempt");
        assert_eq!(tree.nodes()[0].value(), None);
    }

    #[test]
    fn empty_block_has_no_children() {
        let lens = file(block("global_defs", field("lvs_id", Lens::store(word()))));
        let tree = get("global_defs {\n}\n", &lens).expect("parse");
        assert_eq!(tree.nodes()[0].label(), "global_defs");
        assert!(tree.nodes()[0].children().is_empty());
    }

    #[test]
    fn named_block_stores_name() {
        let lens = file(named_block("vrrp_instance", field("priority", number())));
        let tree = get("vrrp_instance VI_1 {\n  priority 1\n}\n", &lens).expect("parse");
        assert_eq!(tree.nodes()[0].value(), Some("VI_1"));
        assert_eq!(tree.nodes()[0].child_value("priority"), Some("1"));
    }

    #[test]
    fn named_block_arg_children_come_first() {
        let lens = file(named_block_arg(
            "real_server",
            "ip",
            "port",
            field("weight", number()),
        ));
        let tree = get("real_server 10.0.0.2 80 {\n  weight 1\n}\n", &lens).expect("parse");
        let labels: Vec<_> = tree.nodes()[0].children().iter().map(Node::label).collect();
        assert_eq!(labels, vec!["ip", "port", "weight"]);
    }

    #[test]
    fn bang_comment_and_marker_only_line() {
        let text = "! managed file\n#\n";
        let lens = file(flag("nopreempt"));
        let tree = get(text, &lens).expect("parse");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.nodes()[0].value(), Some("managed file"));
        assert_eq!(put(&tree, Some(text), &lens).expect("put"), text);
    }

    #[test]
    fn synthesized_block_uses_default_layout() {
        let lens = file(block("authentication", field("auth_type", Lens::store(word()))));
        let tree = Tree::from(vec![Node::new("authentication")
            .with_child(Node::new("auth_type").with_value("PASS"))
            .with_child(Node::comment("rotate monthly"))]);
        let out = put(&tree, None, &lens).expect("put");
        assert_eq!(
            out,
            "authentication {\n  auth_type PASS\n  # rotate monthly\n}\n"
        );
        assert_eq!(get(&out, &lens).expect("reparse"), tree);
    }

    #[test]
    fn brace_line_comment_is_layout() {
        let text = "authentication { # creds\n} # end\n";
        let lens = file(block("authentication", field("auth_type", Lens::store(word()))));
        let tree = get(text, &lens).expect("parse");
        assert!(tree.nodes()[0].children().is_empty());
        assert_eq!(put(&tree, Some(text), &lens).expect("put"), text);
    }
}
