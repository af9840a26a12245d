//! The get direction: text to tree.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::lens::Lens;
use crate::provenance::{Origin, Provenance, Skel};
use crate::span::{Span, token_at};
use crate::tree::{Node, NodeId, Tree};

/// Classifies a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The innermost lenses tried at the furthest position reached did
    /// not match the text found there.
    Expected {
        expected: Vec<String>,
        found: String,
    },
    /// Input ended while the grammar still required something.
    UnexpectedEnd { expected: Vec<String> },
}

impl ParseErrorKind {
    /// Names of the lenses that failed, innermost first.
    #[must_use]
    pub fn expected(&self) -> &[String] {
        match self {
            Self::Expected { expected, .. } | Self::UnexpectedEnd { expected } => expected,
        }
    }
}

fn write_expected(f: &mut fmt::Formatter<'_>, expected: &[String]) -> fmt::Result {
    match expected {
        [] => write!(f, "expected end of input"),
        [one] => write!(f, "expected {one}"),
        many => write!(f, "expected one of {}", many.join(", ")),
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected { expected, found } => {
                write_expected(f, expected)?;
                write!(f, ", got '{found}'")
            }
            Self::UnexpectedEnd { expected } => {
                write_expected(f, expected)?;
                write!(f, ", got end of input")
            }
        }
    }
}

/// Error produced by get.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Parse `text` with `lens` into a tree.
///
/// # Errors
///
/// Returns `ParseError` if the lens does not match the whole input. No
/// partial tree is produced.
pub fn get(text: &str, lens: &Lens) -> Result<Tree, ParseError> {
    get_with_provenance(text, lens).map(|(tree, _)| tree)
}

pub(crate) fn get_with_provenance(
    text: &str,
    lens: &Lens,
) -> Result<(Tree, Provenance), ParseError> {
    let start = if text.starts_with('\u{FEFF}') { 3 } else { 0 };
    let mut getter = Getter::new(text, start);
    let mut root = Frame::default();

    let outcome = getter.get(lens, &mut root);
    let root_skel = match outcome {
        Ok(skel) if getter.pos == text.len() => skel,
        _ => {
            let err = getter.error();
            debug!(
                line = err.span.line,
                column = err.span.column,
                "configuration did not parse"
            );
            return Err(err);
        }
    };

    let tree = Tree::from_nodes(root.children);
    debug!(
        bytes = text.len(),
        nodes = tree.node_count(),
        "parsed configuration"
    );
    Ok((
        tree,
        Provenance {
            prefix: 0..start,
            root: root_skel,
            origins: getter.origins,
        },
    ))
}

/// Marker for a failed match; details live in `Getter::furthest`.
struct Miss;

/// The node under construction by the innermost subtree.
#[derive(Default)]
struct Frame {
    label: Option<String>,
    value: Option<String>,
    children: Vec<Node>,
}

/// Everything needed to undo a failed attempt.
struct Mark {
    pos: usize,
    next_id: usize,
    children: usize,
    label: Option<String>,
    value: Option<String>,
}

struct Failure {
    pos: usize,
    expected: Vec<String>,
}

struct Getter<'t> {
    text: &'t str,
    pos: usize,
    /// Set once a key matched inside the current alternative.
    committed: bool,
    next_id: usize,
    origins: HashMap<NodeId, Origin>,
    furthest: Option<Failure>,
}

impl<'t> Getter<'t> {
    fn new(text: &'t str, start: usize) -> Self {
        Self {
            text,
            pos: start,
            committed: false,
            next_id: 0,
            origins: HashMap::new(),
            furthest: None,
        }
    }

    fn get(&mut self, lens: &Lens, frame: &mut Frame) -> Result<Skel, Miss> {
        match lens {
            Lens::Del(literal) => {
                if self.text[self.pos..].starts_with(literal.as_str()) {
                    self.pos += literal.len();
                    Ok(Skel::Leaf)
                } else {
                    self.miss(lens)
                }
            }
            Lens::DelRx { rx, .. } => match rx.match_at(self.text, self.pos) {
                Some(end) => {
                    let span = self.pos..end;
                    self.pos = end;
                    Ok(Skel::Text(span))
                }
                None => self.miss(lens),
            },
            Lens::Indent => {
                let start = self.pos;
                let width = self.text.as_bytes()[start..]
                    .iter()
                    .take_while(|&&b| b == b' ' || b == b'\t')
                    .count();
                self.pos += width;
                Ok(Skel::Text(start..self.pos))
            }
            Lens::Store(rx) => match rx.match_at(self.text, self.pos) {
                Some(end) => {
                    frame.value = Some(self.text[self.pos..end].to_string());
                    self.pos = end;
                    Ok(Skel::Leaf)
                }
                None => self.miss(lens),
            },
            Lens::Key(rx) => match rx.match_at(self.text, self.pos) {
                Some(end) if end > self.pos && self.at_boundary(end) => {
                    frame.label = Some(self.text[self.pos..end].to_string());
                    self.pos = end;
                    self.committed = true;
                    Ok(Skel::Leaf)
                }
                _ => self.miss(lens),
            },
            Lens::Label(name) => {
                frame.label = Some(name.clone());
                Ok(Skel::Leaf)
            }
            Lens::Seq(parts) => {
                let mut skels = Vec::with_capacity(parts.len());
                for part in parts {
                    skels.push(self.get(part, frame)?);
                }
                Ok(Skel::Seq(skels))
            }
            Lens::Alt(alternatives) => self.get_alt(alternatives, frame),
            Lens::Opt(inner) => {
                let mark = self.mark(frame);
                let outer = self.committed;
                self.committed = false;
                match self.get(inner, frame) {
                    Ok(skel) => {
                        self.committed = outer;
                        Ok(Skel::Opt(Some(Box::new(skel))))
                    }
                    Err(miss) if self.committed => Err(miss),
                    Err(_) => {
                        self.reset(frame, &mark);
                        self.committed = outer;
                        Ok(Skel::Opt(None))
                    }
                }
            }
            Lens::Star(inner) => self.get_star(inner, frame),
            Lens::Subtree(body) => self.get_subtree(body, frame),
        }
    }

    fn get_alt(&mut self, alternatives: &[Lens], frame: &mut Frame) -> Result<Skel, Miss> {
        let mark = self.mark(frame);
        let outer = self.committed;
        for (index, alternative) in alternatives.iter().enumerate() {
            self.committed = false;
            match self.get(alternative, frame) {
                Ok(skel) => {
                    self.committed |= outer;
                    return Ok(Skel::Alt(index, Box::new(skel)));
                }
                // Committed: a key matched, so later alternatives are not tried.
                Err(miss) if self.committed => return Err(miss),
                Err(_) => self.reset(frame, &mark),
            }
        }
        self.committed = outer;
        Err(Miss)
    }

    fn get_star(&mut self, inner: &Lens, frame: &mut Frame) -> Result<Skel, Miss> {
        let mut items = Vec::new();
        let outer = self.committed;
        loop {
            let mark = self.mark(frame);
            self.committed = false;
            match self.get(inner, frame) {
                Ok(_) if self.pos == mark.pos => {
                    self.reset(frame, &mark);
                    break;
                }
                Ok(skel) => items.push(skel),
                Err(miss) if self.committed => return Err(miss),
                Err(_) => {
                    self.reset(frame, &mark);
                    break;
                }
            }
        }
        self.committed = outer;
        Ok(Skel::Star(items))
    }

    fn get_subtree(&mut self, body: &Lens, frame: &mut Frame) -> Result<Skel, Miss> {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let start = self.pos;

        let mut inner = Frame::default();
        let skel = self.get(body, &mut inner)?;

        let node = Node::parsed(
            inner.label.unwrap_or_default(),
            inner.value,
            inner.children,
            id,
        );
        self.origins.insert(
            id,
            Origin {
                span: start..self.pos,
                body: skel,
                lens: body,
            },
        );
        frame.children.push(node);
        Ok(Skel::Node(id))
    }

    /// A key must not stop in the middle of a word.
    fn at_boundary(&self, end: usize) -> bool {
        self.text.as_bytes().get(end).is_none_or(|&b| {
            !(b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        })
    }

    fn mark(&self, frame: &Frame) -> Mark {
        Mark {
            pos: self.pos,
            next_id: self.next_id,
            children: frame.children.len(),
            label: frame.label.clone(),
            value: frame.value.clone(),
        }
    }

    fn reset(&mut self, frame: &mut Frame, mark: &Mark) {
        self.pos = mark.pos;
        // Ids handed out inside the failed attempt are reused.
        for id in mark.next_id..self.next_id {
            self.origins.remove(&NodeId(id));
        }
        self.next_id = mark.next_id;
        frame.children.truncate(mark.children);
        frame.label.clone_from(&mark.label);
        frame.value.clone_from(&mark.value);
    }

    /// Record a failed primitive, keeping only the furthest position.
    fn miss(&mut self, lens: &Lens) -> Result<Skel, Miss> {
        let expected = lens.describe();
        match &mut self.furthest {
            Some(failure) if failure.pos > self.pos => {}
            Some(failure) if failure.pos == self.pos => {
                if !failure.expected.contains(&expected) {
                    failure.expected.push(expected);
                }
            }
            _ => {
                self.furthest = Some(Failure {
                    pos: self.pos,
                    expected: vec![expected],
                });
            }
        }
        Err(Miss)
    }

    fn error(&self) -> ParseError {
        let (pos, expected) = match &self.furthest {
            Some(failure) if failure.pos >= self.pos => (failure.pos, failure.expected.clone()),
            _ => (self.pos, Vec::new()),
        };
        let kind = match token_at(self.text, pos) {
            Some(found) => ParseErrorKind::Expected { expected, found },
            None => ParseErrorKind::UnexpectedEnd { expected },
        };
        ParseError {
            kind,
            span: Span::locate(self.text, pos),
        }
    }
}
