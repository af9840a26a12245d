//! The put direction: tree (plus original text) to text.
//!
//! Put walks the same lens as get, driven by the node sequence instead of
//! the input. Nodes that came from the original text and are unchanged are
//! copied from their original span. Changed nodes replay their recorded
//! skeleton so untouched whitespace and comment markers survive. New nodes
//! are rendered from each primitive's default text.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use tracing::{debug, trace};

use crate::Error;
use crate::get::get_with_provenance;
use crate::lens::Lens;
use crate::provenance::{Provenance, Skel};
use crate::tree::{Node, NodeId, Tree};

/// Layout used when synthesizing text for new or changed nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    indent: String,
}

impl Style {
    /// Default style: two-space indentation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }

    /// Use `unit` for each nesting level.
    #[must_use]
    pub fn with_indent(mut self, unit: &str) -> Self {
        unit.clone_into(&mut self.indent);
        self
    }

    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Infer the indentation unit from the first indented line of `text`,
    /// falling back to the default.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        text.lines()
            .map(|line| {
                let width = line.len() - line.trim_start_matches([' ', '\t']).len();
                (&line[..width], line[width..].is_empty())
            })
            .find(|(ws, blank)| !ws.is_empty() && !blank)
            .map_or_else(Self::new, |(ws, _)| Self::new().with_indent(ws))
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies a structural error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralErrorKind {
    /// A node appears where the grammar has no place for it.
    UnexpectedNode { label: String },
    /// The grammar requires a node that is missing.
    MissingNode { expected: String },
    /// The grammar stores a value here but the node has none.
    MissingValue { label: String },
    /// The node has a value but its lens stores none.
    UnexpectedValue { label: String },
}

impl fmt::Display for StructuralErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedNode { label } => write!(f, "unexpected node '{label}'"),
            Self::MissingNode { expected } => write!(f, "missing node: expected {expected}"),
            Self::MissingValue { label } => write!(f, "node '{label}' requires a value"),
            Self::UnexpectedValue { label } => write!(f, "node '{label}' cannot have a value"),
        }
    }
}

/// Error produced by put when the tree does not fit the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at '{path}'")]
pub struct StructuralError {
    pub kind: StructuralErrorKind,
    /// Label path of the node being rendered, `/`-separated.
    pub path: String,
}

/// Render `tree` with `lens`, reusing layout from `original` when given.
///
/// # Errors
///
/// Returns `Error::Parse` if `original` does not parse with `lens`, and
/// `Error::Structure` if the tree cannot be rendered by `lens`.
pub fn put(tree: &Tree, original: Option<&str>, lens: &Lens) -> Result<String, Error> {
    put_with(tree, original, lens, &Style::default())
}

/// Like [`put`], with an explicit [`Style`] for synthesized text.
///
/// # Errors
///
/// See [`put`].
pub fn put_with(
    tree: &Tree,
    original: Option<&str>,
    lens: &Lens,
    style: &Style,
) -> Result<String, Error> {
    let parsed = original
        .map(|text| get_with_provenance(text, lens).map(|(t, p)| (text, t, p)))
        .transpose()?;

    let empty = Tree::new();
    let mut putter = match &parsed {
        Some((text, old_tree, provenance)) => Putter::new(text, Some(provenance), old_tree, style),
        None => Putter::new("", None, &empty, style),
    };

    if let Some((text, _, provenance)) = &parsed {
        putter.out.push_str(&text[provenance.prefix.clone()]);
    }
    let root = parsed.as_ref().map(|(_, _, p)| &p.root);

    let mut nodes = tree.nodes();
    putter.put(lens, None, &mut nodes, root)?;
    if let Some(extra) = nodes.first() {
        return Err(putter.fail(StructuralErrorKind::UnexpectedNode {
            label: extra.label().to_string(),
        }).into());
    }

    debug!(
        reused = putter.reused,
        rendered = putter.rendered,
        bytes = putter.out.len(),
        "rendered configuration"
    );
    Ok(putter.out)
}

struct Putter<'a> {
    original: &'a str,
    provenance: Option<&'a Provenance>,
    /// Nodes of the re-parsed original, by id.
    originals: HashMap<NodeId, &'a Node>,
    style: &'a Style,
    out: String,
    /// The last copied text ended the original without a line break.
    line_open: bool,
    depth: usize,
    path: Vec<String>,
    reused: usize,
    rendered: usize,
}

impl<'a> Putter<'a> {
    fn new(
        original: &'a str,
        provenance: Option<&'a Provenance>,
        old_tree: &'a Tree,
        style: &'a Style,
    ) -> Self {
        let mut originals = HashMap::new();
        index_nodes(old_tree.nodes(), &mut originals);
        Self {
            original,
            provenance,
            originals,
            style,
            out: String::with_capacity(original.len()),
            line_open: false,
            depth: 0,
            path: Vec::new(),
            reused: 0,
            rendered: 0,
        }
    }

    fn put<'n>(
        &mut self,
        lens: &Lens,
        owner: Option<&'n Node>,
        nodes: &mut &'n [Node],
        skel: Option<&Skel>,
    ) -> Result<(), StructuralError> {
        match lens {
            Lens::Del(text) => self.emit(text),
            Lens::DelRx { default, .. } => match self.recorded(skel) {
                Some(range) => self.copy(range),
                None => self.emit(default),
            },
            Lens::Indent => match self.recorded(skel) {
                Some(range) => self.copy(range),
                None => {
                    let indent = self.style.indent.repeat(self.depth.saturating_sub(1));
                    self.emit(&indent);
                }
            },
            Lens::Store(_) => {
                let value = owner.and_then(Node::value).ok_or_else(|| {
                    self.fail(StructuralErrorKind::MissingValue {
                        label: owner.map_or_else(String::new, |n| n.label().to_string()),
                    })
                })?;
                self.emit(value);
            }
            Lens::Key(_) => {
                if let Some(node) = owner {
                    self.emit(node.label());
                }
            }
            Lens::Label(_) => {}
            Lens::Seq(parts) => {
                let recorded = match skel {
                    Some(Skel::Seq(skels)) if skels.len() == parts.len() => Some(skels),
                    _ => None,
                };
                for (index, part) in parts.iter().enumerate() {
                    let part_skel = recorded.and_then(|s| s.get(index));
                    self.put(part, owner, nodes, part_skel)?;
                }
            }
            Lens::Alt(alternatives) => self.put_alt(alternatives, owner, nodes, skel)?,
            Lens::Opt(inner) => {
                let recorded = match skel {
                    Some(Skel::Opt(Some(inner_skel))) => Some(&**inner_skel),
                    _ => None,
                };
                let present = if !inner.is_nodeless() {
                    nodes.first().is_some_and(|n| inner.accepts(n))
                } else if inner.stores_value() {
                    owner.and_then(Node::value).is_some()
                } else {
                    recorded.is_some()
                };
                if present {
                    self.put(inner, owner, nodes, recorded)?;
                }
            }
            Lens::Star(inner) => self.put_star(inner, owner, nodes, skel)?,
            Lens::Subtree(body) => self.put_subtree(lens, body, nodes)?,
        }
        Ok(())
    }

    /// Pick the alternative that accepts the next node, preferring the one
    /// recorded in the skeleton. With no acceptable node, fall back to a
    /// nullable alternative.
    fn put_alt<'n>(
        &mut self,
        alternatives: &[Lens],
        owner: Option<&'n Node>,
        nodes: &mut &'n [Node],
        skel: Option<&Skel>,
    ) -> Result<(), StructuralError> {
        let recorded = match skel {
            Some(Skel::Alt(index, inner)) if *index < alternatives.len() => {
                Some((*index, &**inner))
            }
            _ => None,
        };
        let fits = |index: usize| recorded.is_some_and(|(r, _)| r == index);

        let chosen = match nodes.first() {
            Some(next) if alternatives.iter().any(|a| a.accepts(next)) => {
                if recorded.is_some_and(|(r, _)| alternatives[r].accepts(next)) {
                    recorded.map(|(r, _)| r)
                } else {
                    alternatives.iter().position(|a| a.accepts(next))
                }
            }
            _ => {
                if recorded.is_some_and(|(r, _)| alternatives[r].nullable()) {
                    recorded.map(|(r, _)| r)
                } else {
                    alternatives.iter().position(Lens::nullable)
                }
            }
        };

        let Some(index) = chosen else {
            return Err(self.fail(match nodes.first() {
                Some(next) => StructuralErrorKind::UnexpectedNode {
                    label: next.label().to_string(),
                },
                None => StructuralErrorKind::MissingNode {
                    expected: alternatives
                        .iter()
                        .map(Lens::describe)
                        .collect::<Vec<_>>()
                        .join(" | "),
                },
            }));
        };
        let inner_skel = if fits(index) {
            recorded.map(|(_, s)| s)
        } else {
            None
        };
        self.put(&alternatives[index], owner, nodes, inner_skel)
    }

    /// One iteration per accepted node. Node-less iterations recorded in
    /// the skeleton (blank lines) are replayed before the node they
    /// originally preceded; trailing ones after the last node.
    fn put_star<'n>(
        &mut self,
        inner: &Lens,
        owner: Option<&'n Node>,
        nodes: &mut &'n [Node],
        skel: Option<&Skel>,
    ) -> Result<(), StructuralError> {
        let items: &[Skel] = match skel {
            Some(Skel::Star(items)) => items,
            _ => &[],
        };
        let anchors: Vec<Option<NodeId>> = items.iter().map(Skel::first_node).collect();
        let mut used = vec![false; items.len()];

        while let Some(next) = nodes.first() {
            if !inner.accepts(next) {
                break;
            }
            let found = next
                .origin()
                .and_then(|id| anchors.iter().position(|a| *a == Some(id)))
                .filter(|&k| !used[k]);

            let mut item_skel = None;
            if let Some(k) = found {
                let mut first_gap = k;
                while first_gap > 0 && anchors[first_gap - 1].is_none() && !used[first_gap - 1] {
                    first_gap -= 1;
                }
                for gap in first_gap..k {
                    self.replay_gap(inner, owner, &items[gap])?;
                    used[gap] = true;
                }
                used[k] = true;
                item_skel = Some(&items[k]);
            }

            let before = nodes.len();
            self.put(inner, owner, nodes, item_skel)?;
            if nodes.len() == before {
                break;
            }
        }

        let tail = anchors.iter().rposition(Option::is_some).map_or(0, |k| k + 1);
        for k in tail..items.len() {
            if !used[k] {
                self.replay_gap(inner, owner, &items[k])?;
            }
        }
        Ok(())
    }

    fn replay_gap(
        &mut self,
        inner: &Lens,
        owner: Option<&Node>,
        gap: &Skel,
    ) -> Result<(), StructuralError> {
        let mut none: &[Node] = &[];
        self.put(inner, owner, &mut none, Some(gap))
    }

    fn put_subtree<'n>(
        &mut self,
        lens: &Lens,
        body: &Lens,
        nodes: &mut &'n [Node],
    ) -> Result<(), StructuralError> {
        let Some((node, rest)) = nodes.split_first() else {
            return Err(self.fail(StructuralErrorKind::MissingNode {
                expected: lens.describe(),
            }));
        };
        if !lens.accepts(node) {
            return Err(self.fail(StructuralErrorKind::MissingNode {
                expected: lens.describe(),
            }));
        }
        *nodes = rest;
        self.path.push(node.label().to_string());

        // Original text is only valid where the same subtree lens produced it.
        let origin = node
            .origin()
            .and_then(|id| Some((id, self.provenance?.origin(id)?)))
            .filter(|(_, origin)| origin.made_by(body));
        if let Some((id, origin)) = origin {
            if self.originals.get(&id).is_some_and(|old| *old == node) {
                trace!(label = node.label(), "reusing original text");
                self.copy(origin.span.clone());
                self.reused += 1;
                self.path.pop();
                return Ok(());
            }
        }

        if node.value().is_some() && !body.stores_value() {
            return Err(self.fail(StructuralErrorKind::UnexpectedValue {
                label: node.label().to_string(),
            }));
        }

        let body_skel = origin.map(|(_, o)| &o.body);
        trace!(
            label = node.label(),
            replay = body_skel.is_some(),
            "rendering node"
        );

        self.depth += 1;
        let mut children = node.children();
        self.put(body, Some(node), &mut children, body_skel)?;
        self.depth -= 1;

        if let Some(extra) = children.first() {
            self.path.push(extra.label().to_string());
            return Err(self.fail(StructuralErrorKind::UnexpectedNode {
                label: extra.label().to_string(),
            }));
        }
        self.rendered += 1;
        self.path.pop();
        Ok(())
    }

    fn recorded(&self, skel: Option<&Skel>) -> Option<Range<usize>> {
        match skel {
            Some(Skel::Text(range)) if self.original.get(range.clone()).is_some() => {
                Some(range.clone())
            }
            _ => None,
        }
    }

    /// Write text, first closing a line left open at the end of the original.
    fn emit(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.line_open {
            self.out.push('\n');
            self.line_open = false;
        }
        self.out.push_str(text);
    }

    /// Copy a range of the original text.
    fn copy(&mut self, range: Range<usize>) {
        let original = self.original;
        let at_end = range.end == original.len() && !original.is_empty();
        self.emit(&original[range]);
        if at_end && !original.ends_with('\n') {
            self.line_open = true;
        }
    }

    fn fail(&self, kind: StructuralErrorKind) -> StructuralError {
        StructuralError {
            kind,
            path: self.path.join("/"),
        }
    }
}

fn index_nodes<'a>(nodes: &'a [Node], index: &mut HashMap<NodeId, &'a Node>) {
    for node in nodes {
        if let Some(id) = node.origin() {
            index.insert(id, node);
        }
        index_nodes(node.children(), index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get::get;
    use crate::lens::Rx;

    fn eol() -> Lens {
        Lens::del(Rx::new("end of line", "[ \t]*\n"), "\n")
    }

    fn entry() -> Lens {
        Lens::subtree(Lens::seq([
            Lens::indent(),
            Lens::key(Rx::new("word", "[a-z]+")),
            Lens::del(Rx::new("space", "[ \t]+"), " "),
            Lens::store(Rx::new("number", "[0-9]+")),
            eol(),
        ]))
    }

    fn blank() -> Lens {
        Lens::del(Rx::new("blank line", "[ \t]*\n"), "\n")
    }

    fn grammar() -> Lens {
        Lens::star(Lens::alt([blank(), entry()]))
    }

    #[test]
    fn unchanged_tree_reproduces_text() {
        let text = "a   1\n\n  b 2 \n";
        let tree = get(text, &grammar()).expect("parse");
        assert_eq!(put(&tree, Some(text), &grammar()).expect("put"), text);
    }

    #[test]
    fn changed_value_keeps_layout() {
        let text = "a   1\n\n  b 2 \n";
        let mut tree = get(text, &grammar()).expect("parse");
        tree.nodes_mut()[1].set_value("20");
        let out = put(&tree, Some(text), &grammar()).expect("put");
        assert_eq!(out, "a   1\n\n  b 20 \n");
    }

    #[test]
    fn removed_node_drops_its_leading_blank_line() {
        let text = "a 1\n\nb 2\nc 3\n";
        let mut tree = get(text, &grammar()).expect("parse");
        tree.remove(1);
        let out = put(&tree, Some(text), &grammar()).expect("put");
        assert_eq!(out, "a 1\nc 3\n");
    }

    #[test]
    fn inserted_node_uses_defaults() {
        let text = "a 1\n";
        let mut tree = get(text, &grammar()).expect("parse");
        tree.push(Node::new("z").with_value("9"));
        let out = put(&tree, Some(text), &grammar()).expect("put");
        assert_eq!(out, "a 1\nz 9\n");
    }

    #[test]
    fn trailing_blank_lines_survive_edits() {
        let text = "a 1\n\n\n";
        let mut tree = get(text, &grammar()).expect("parse");
        tree.nodes_mut()[0].set_value("2");
        assert_eq!(put(&tree, Some(text), &grammar()).expect("put"), "a 2\n\n\n");
    }

    #[test]
    fn missing_value_is_structural_error() {
        let tree = Tree::from(vec![Node::new("a")]);
        let err = put(&tree, None, &grammar()).expect_err("should fail");
        assert!(matches!(
            err,
            Error::Structure(StructuralError {
                kind: StructuralErrorKind::MissingValue { .. },
                ..
            })
        ));
    }

    #[test]
    fn unknown_label_is_structural_error() {
        let tree = Tree::from(vec![Node::new("A1").with_value("1")]);
        let err = put(&tree, None, &grammar()).expect_err("should fail");
        assert_eq!(err.to_string(), "unexpected node 'A1' at ''");
    }

    #[test]
    fn detect_indent_unit() {
        assert_eq!(Style::detect("a {\n\tb 1\n}\n").indent(), "\t");
        assert_eq!(Style::detect("a {\n    b 1\n}\n").indent(), "    ");
        assert_eq!(Style::detect("a 1\n").indent(), "  ");
    }
}
