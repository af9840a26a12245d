//! Bidirectional lens parser and serializer for keepalived.conf.
//!
//! One grammar, written with lens combinators, drives both directions:
//! [`get`] turns configuration text into a [`Tree`], and [`put`] turns a
//! (possibly edited) tree back into text. Unchanged parts of the original
//! file are reproduced byte for byte, including comments, blank lines and
//! indentation.
//!
//! # Quick start
//!
//! ## Parse, edit, and write back
//!
//! ```
//! use keepalived_lens::{parse, render};
//!
//! let input = "vrrp_instance VI_1 {\n    state MASTER\n    priority 100  # primary\n}\n";
//! let mut tree = parse(input).unwrap();
//! tree.nodes_mut()[0]
//!     .child_mut("priority")
//!     .unwrap()
//!     .set_value("150");
//!
//! let output = render(&tree, Some(input)).unwrap();
//! assert_eq!(output, "vrrp_instance VI_1 {\n    state MASTER\n    priority 150  # primary\n}\n");
//! ```
//!
//! ## Build a configuration programmatically
//!
//! ```
//! use keepalived_lens::{Node, Tree, render};
//!
//! let tree = Tree::new().with(
//!     Node::virtual_server("10.0.0.1", 80)
//!         .with_child(Node::field("lb_algo", "rr"))
//!         .with_child(Node::real_server("10.0.0.2", 80, 1)),
//! );
//!
//! let output = render(&tree, None).unwrap();
//! assert!(output.starts_with("virtual_server 10.0.0.1 80 {\n  lb_algo rr\n"));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod builder;
pub mod get;
pub mod keepalived;
pub mod lens;
pub mod pattern;
mod provenance;
pub mod put;
pub mod span;
pub mod tree;

pub use get::{ParseError, ParseErrorKind, get};
pub use lens::{Lens, Rx};
pub use pattern::Pattern;
pub use put::{StructuralError, StructuralErrorKind, Style, put, put_with};
pub use span::Span;
pub use tree::{COMMENT, Node, NodeId, Tree};

/// Unified error type covering both directions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The text (or the original text given to put) did not parse.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// The tree does not fit the grammar.
    #[error("{0}")]
    Structure(#[from] StructuralError),
}

/// Parse keepalived.conf text with the built-in grammar.
pub fn parse(text: &str) -> Result<Tree, ParseError> {
    get(text, keepalived::lens())
}

/// Render `tree` with the built-in grammar. New lines are indented the
/// way `original` is, or with two spaces when there is no original.
pub fn render(tree: &Tree, original: Option<&str>) -> Result<String, Error> {
    let style = original.map_or_else(Style::default, Style::detect);
    put_with(tree, original, keepalived::lens(), &style)
}

/// Render `tree` with the built-in grammar and an explicit style.
pub fn render_with(tree: &Tree, original: Option<&str>, style: &Style) -> Result<String, Error> {
    put_with(tree, original, keepalived::lens(), style)
}
