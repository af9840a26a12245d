//! The structured tree produced by get and consumed by put.
//!
//! A [`Tree`] is an ordered forest of [`Node`]s. Nodes produced by parsing
//! remember a [`NodeId`] that links them to the provenance side table, so
//! put can reuse their original text. Nodes built by callers carry no id
//! and are rendered from the grammar's defaults.

use std::fmt;

/// Label given to comment nodes.
pub const COMMENT: &str = "#comment";

/// Stable identifier of a parsed node, numbered from zero in pre-order during get.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// One element of the tree: a label, an optional value, ordered children.
///
/// Equality compares label, value, and children only. The parse origin is
/// ignored so that a tree re-parsed from rendered text compares equal to
/// the tree it was rendered from.
#[derive(Debug, Clone)]
pub struct Node {
    label: String,
    value: Option<String>,
    children: Vec<Self>,
    origin: Option<NodeId>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.value == other.value && self.children == other.children
    }
}

impl Eq for Node {}

impl Node {
    /// Create a node with the given label, no value, no children.
    #[must_use]
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: None,
            children: Vec::new(),
            origin: None,
        }
    }

    pub(crate) const fn parsed(
        label: String,
        value: Option<String>,
        children: Vec<Self>,
        origin: NodeId,
    ) -> Self {
        Self {
            label,
            value,
            children,
            origin: Some(origin),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: &str) {
        label.clone_into(&mut self.label);
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = Some(value.to_string());
    }

    /// Remove the value, returning the old one.
    pub const fn clear_value(&mut self) -> Option<String> {
        self.value.take()
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Mutable access to the child list for arbitrary edits.
    pub const fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }

    /// The id this node was parsed with, if it came from get.
    #[must_use]
    pub const fn origin(&self) -> Option<NodeId> {
        self.origin
    }

    /// Forget the parse origin so put renders this node from scratch.
    pub fn detach(&mut self) {
        self.origin = None;
        for child in &mut self.children {
            child.detach();
        }
    }

    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.label == COMMENT
    }

    /// First child with the given label.
    #[must_use]
    pub fn child(&self, label: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.label == label)
    }

    /// First child with the given label, mutably.
    pub fn child_mut(&mut self, label: &str) -> Option<&mut Self> {
        self.children.iter_mut().find(|c| c.label == label)
    }

    /// All children with the given label, in order.
    pub fn children_labeled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Self> {
        self.children.iter().filter(move |c| c.label == label)
    }

    /// Value of the first child with the given label.
    #[must_use]
    pub fn child_value(&self, label: &str) -> Option<&str> {
        self.child(label).and_then(Self::value)
    }

    /// Index of the first child with the given label.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.children.iter().position(|c| c.label == label)
    }

    pub fn push(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Insert a child at `index`, clamped to the child count.
    pub fn insert(&mut self, index: usize, child: Self) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    /// Remove and return the child at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Self> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Remove every child with the given label, returning how many went.
    pub fn remove_labeled(&mut self, label: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|c| c.label != label);
        before - self.children.len()
    }

    /// Move the child at `from` so it ends up at index `to`.
    pub fn move_child(&mut self, from: usize, to: usize) -> bool {
        move_within(&mut self.children, from, to)
    }

    /// Nodes matching a `/`-separated path below this node.
    ///
    /// Each segment is `label` or `label[value]`.
    #[must_use]
    pub fn select(&self, path: &str) -> Vec<&Self> {
        select_in(&self.children, path)
    }

    /// First node matching `path` below this node.
    #[must_use]
    pub fn first(&self, path: &str) -> Option<&Self> {
        self.select(path).into_iter().next()
    }

    pub(crate) fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

impl fmt::Display for Node {
    /// Debug-friendly outline: one node per line, children indented.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_outline(f, self, 0)
    }
}

fn write_outline(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
    write!(f, "{:width$}{}", "", node.label, width = depth * 2)?;
    if let Some(value) = &node.value {
        write!(f, " = {value:?}")?;
    }
    writeln!(f)?;
    for child in &node.children {
        write_outline(f, child, depth + 1)?;
    }
    Ok(())
}

/// An ordered forest of nodes: the whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub(crate) const fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Top-level nodes in order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub const fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First top-level node with the given label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.label == label)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.label == label)
    }

    /// All top-level nodes with the given label.
    pub fn all<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Node> {
        self.nodes.iter().filter(move |n| n.label == label)
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Insert a node at `index`, clamped to the node count.
    pub fn insert(&mut self, index: usize, node: Node) {
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
    }

    pub fn remove(&mut self, index: usize) -> Option<Node> {
        (index < self.nodes.len()).then(|| self.nodes.remove(index))
    }

    pub fn move_node(&mut self, from: usize, to: usize) -> bool {
        move_within(&mut self.nodes, from, to)
    }

    /// Nodes matching a `/`-separated path from the top level.
    ///
    /// ```
    /// use keepalived_lens::parse;
    ///
    /// let tree = parse("vrrp_instance VI_1 {\n  state MASTER\n}\n").unwrap();
    /// let state = tree.first("vrrp_instance[VI_1]/state").unwrap();
    /// assert_eq!(state.value(), Some("MASTER"));
    /// ```
    #[must_use]
    pub fn select(&self, path: &str) -> Vec<&Node> {
        select_in(&self.nodes, path)
    }

    #[must_use]
    pub fn first(&self, path: &str) -> Option<&Node> {
        self.select(path).into_iter().next()
    }

    /// Forget every parse origin in the tree.
    pub fn detach(&mut self) {
        for node in &mut self.nodes {
            node.detach();
        }
    }

    /// Total number of nodes at every depth.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(Node::count).sum()
    }
}

impl From<Vec<Node>> for Tree {
    fn from(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write_outline(f, node, 0)?;
        }
        Ok(())
    }
}

fn move_within(nodes: &mut Vec<Node>, from: usize, to: usize) -> bool {
    if from >= nodes.len() || to >= nodes.len() {
        return false;
    }
    let node = nodes.remove(from);
    nodes.insert(to, node);
    true
}

fn select_in<'a>(nodes: &'a [Node], path: &str) -> Vec<&'a Node> {
    let mut current: Vec<&Node> = Vec::new();
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let Some(first) = segments.next() else {
        return current;
    };
    let (label, value) = split_segment(first);
    current.extend(nodes.iter().filter(|n| n.matches(label, value)));
    for segment in segments {
        let (label, value) = split_segment(segment);
        current = current
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter(|n| n.matches(label, value))
            .collect();
    }
    current
}

fn split_segment(segment: &str) -> (&str, Option<&str>) {
    match segment.split_once('[') {
        Some((label, rest)) if rest.ends_with(']') => (label, Some(&rest[..rest.len() - 1])),
        _ => (segment, None),
    }
}

impl Node {
    fn matches(&self, label: &str, value: Option<&str>) -> bool {
        (label == "*" || self.label == label) && value.is_none_or(|v| self.value() == Some(v))
    }
}
