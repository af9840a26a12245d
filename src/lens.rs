//! Bidirectional grammar combinators.
//!
//! A [`Lens`] is pure data: a tree of primitives and combinators that the
//! get direction walks against text and the put direction walks against a
//! node sequence. Nothing in here holds per-call state, so one lens value
//! can serve any number of concurrent parses.
//!
//! Node construction follows the subtree model: [`Lens::subtree`] opens a
//! node, and the [`Lens::key`], [`Lens::label`] and [`Lens::store`]
//! primitives inside it (but outside any nested subtree) fill in that
//! node's label and value. Nested subtrees become its children.

use regex::Regex;

use crate::tree::Node;

/// A named, anchored regular expression used by lens primitives.
#[derive(Debug, Clone)]
pub struct Rx {
    name: String,
    anchored: Regex,
    whole: Regex,
}

impl Rx {
    /// Compile `pattern`; `name` is what error messages call it.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression. Grammars are
    /// built from constant patterns, so this is a programming error.
    #[must_use]
    pub fn new(name: &str, pattern: &str) -> Self {
        let compile = |p: String| {
            Regex::new(&p).unwrap_or_else(|e| panic!("invalid lens pattern {name:?}: {e}"))
        };
        Self {
            name: name.to_string(),
            anchored: compile(format!("^(?:{pattern})")),
            whole: compile(format!("^(?:{pattern})$")),
        }
    }

    /// A pattern matching exactly `literal`.
    #[must_use]
    pub fn literal(literal: &str) -> Self {
        Self::new(literal, &regex::escape(literal))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// End offset of the match starting exactly at `pos`, if any.
    pub(crate) fn match_at(&self, text: &str, pos: usize) -> Option<usize> {
        let rest = text.get(pos..)?;
        self.anchored.find(rest).map(|m| pos + m.end())
    }

    /// Whether `s` matches the pattern in full.
    #[must_use]
    pub fn matches(&self, s: &str) -> bool {
        self.whole.is_match(s)
    }
}

/// A bidirectional grammar combinator.
#[derive(Debug, Clone)]
pub enum Lens {
    /// Consume an exact string; put always writes it back.
    Del(String),
    /// Consume text matching a pattern; put replays the original text or
    /// writes the default.
    DelRx { rx: Rx, default: String },
    /// Leading whitespace of a line. Put replays the original or
    /// synthesizes indentation for the current nesting depth.
    Indent,
    /// Consume a token and store it as the current node's value.
    Store(Rx),
    /// Consume a token and use it as the current node's label. A key match
    /// commits the enclosing alternative.
    Key(Rx),
    /// Set the current node's label without consuming text.
    Label(String),
    /// Run every part in order.
    Seq(Vec<Self>),
    /// Ordered alternation; see [`Lens::alt`].
    Alt(Vec<Self>),
    /// Zero or one occurrence.
    Opt(Box<Self>),
    /// Zero or more occurrences.
    Star(Box<Self>),
    /// Produce one node from whatever the body contributes.
    Subtree(Box<Self>),
}

impl Lens {
    #[must_use]
    pub fn del_str(text: &str) -> Self {
        Self::Del(text.to_string())
    }

    #[must_use]
    pub fn del(rx: Rx, default: &str) -> Self {
        Self::DelRx {
            rx,
            default: default.to_string(),
        }
    }

    #[must_use]
    pub const fn indent() -> Self {
        Self::Indent
    }

    #[must_use]
    pub const fn store(rx: Rx) -> Self {
        Self::Store(rx)
    }

    #[must_use]
    pub const fn key(rx: Rx) -> Self {
        Self::Key(rx)
    }

    /// Key on one fixed keyword.
    #[must_use]
    pub fn key_str(keyword: &str) -> Self {
        Self::Key(Rx::literal(keyword))
    }

    #[must_use]
    pub fn label(name: &str) -> Self {
        Self::Label(name.to_string())
    }

    #[must_use]
    pub fn seq(parts: impl IntoIterator<Item = Self>) -> Self {
        Self::Seq(parts.into_iter().collect())
    }

    /// Ordered alternation.
    ///
    /// Get tries the alternatives strictly in the order given and keeps the
    /// first that matches. An alternative that fails before matching a key
    /// is rolled back and the next one is tried; once an alternative has
    /// matched a key it is committed, and a later failure inside it fails
    /// the whole alternation. Put picks the alternative that accepts the
    /// next node's label, so the listed order is the only tie-break in
    /// either direction.
    #[must_use]
    pub fn alt(alternatives: impl IntoIterator<Item = Self>) -> Self {
        Self::Alt(alternatives.into_iter().collect())
    }

    #[must_use]
    pub fn opt(inner: Self) -> Self {
        Self::Opt(Box::new(inner))
    }

    /// Zero or more repetitions.
    ///
    /// Get stops at the first failing iteration, and also at the first
    /// iteration that consumes no input; that iteration is discarded.
    #[must_use]
    pub fn star(inner: Self) -> Self {
        Self::Star(Box::new(inner))
    }

    /// Wrap `body` so that it produces one node.
    ///
    /// # Panics
    ///
    /// Panics if `body` never assigns a label through [`Lens::key`] or
    /// [`Lens::label`].
    #[must_use]
    pub fn subtree(body: Self) -> Self {
        assert!(
            body.has_label_source(),
            "subtree body must assign a label: {}",
            body.describe()
        );
        Self::Subtree(Box::new(body))
    }

    /// Human-readable name used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Del(text) => format!("'{}'", text.escape_default()),
            Self::DelRx { rx, .. } | Self::Store(rx) | Self::Key(rx) => rx.name().to_string(),
            Self::Indent => "indentation".to_string(),
            Self::Label(name) => name.clone(),
            Self::Seq(parts) => parts
                .iter()
                .find(|p| !matches!(p, Self::Indent))
                .map_or_else(String::new, Self::describe),
            Self::Alt(alts) => alts
                .iter()
                .map(Self::describe)
                .collect::<Vec<_>>()
                .join(" | "),
            Self::Opt(inner) | Self::Star(inner) | Self::Subtree(inner) => inner.describe(),
        }
    }

    /// Never produces nodes in either direction.
    pub(crate) fn is_nodeless(&self) -> bool {
        match self {
            Self::Subtree(_) => false,
            Self::Seq(parts) | Self::Alt(parts) => parts.iter().all(Self::is_nodeless),
            Self::Opt(inner) | Self::Star(inner) => inner.is_nodeless(),
            _ => true,
        }
    }

    /// Put can succeed without consuming any node.
    pub(crate) fn nullable(&self) -> bool {
        match self {
            Self::Subtree(_) => false,
            Self::Seq(parts) => parts.iter().all(Self::nullable),
            Self::Alt(alts) => alts.iter().any(Self::nullable),
            _ => true,
        }
    }

    /// Whether put of this lens can begin by consuming `node`.
    pub(crate) fn accepts(&self, node: &Node) -> bool {
        match self {
            Self::Subtree(body) => body.accepts_label(node.label()) == Some(true),
            Self::Seq(parts) => {
                for part in parts {
                    if part.is_nodeless() {
                        continue;
                    }
                    if part.accepts(node) {
                        return true;
                    }
                    if !part.nullable() {
                        return false;
                    }
                }
                false
            }
            Self::Alt(alts) => alts.iter().any(|a| a.accepts(node)),
            Self::Opt(inner) | Self::Star(inner) => inner.accepts(node),
            _ => false,
        }
    }

    /// Whether this subtree body would label its node `label`. `None` when
    /// the body assigns no label at this level.
    pub(crate) fn accepts_label(&self, label: &str) -> Option<bool> {
        match self {
            Self::Key(rx) => Some(rx.matches(label)),
            Self::Label(name) => Some(name == label),
            Self::Seq(parts) => parts.iter().find_map(|p| p.accepts_label(label)),
            Self::Alt(alts) => {
                let verdicts: Vec<bool> = alts.iter().filter_map(|a| a.accepts_label(label)).collect();
                (!verdicts.is_empty()).then(|| verdicts.contains(&true))
            }
            Self::Opt(inner) | Self::Star(inner) => inner.accepts_label(label),
            _ => None,
        }
    }

    fn has_label_source(&self) -> bool {
        match self {
            Self::Key(_) | Self::Label(_) => true,
            Self::Seq(parts) | Self::Alt(parts) => parts.iter().any(Self::has_label_source),
            Self::Opt(inner) | Self::Star(inner) => inner.has_label_source(),
            _ => false,
        }
    }

    /// Whether this body stores a value into its node.
    pub(crate) fn stores_value(&self) -> bool {
        match self {
            Self::Store(_) => true,
            Self::Seq(parts) | Self::Alt(parts) => parts.iter().any(Self::stores_value),
            Self::Opt(inner) | Self::Star(inner) => inner.stores_value(),
            _ => false,
        }
    }
}
