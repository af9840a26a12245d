//! Side table linking parsed nodes to the text they came from.
//!
//! Get records, for every node it creates, the byte span the node covered
//! and a skeleton: the lens-shaped record of which alternatives fired and
//! what text each delete primitive consumed. Spans are byte ranges into
//! the original text, never references, so the table and the tree stay
//! independent of each other and of the text buffer.

use std::collections::HashMap;
use std::ops::Range;

use crate::lens::Lens;
use crate::tree::NodeId;

/// Layout recorded by get, mirroring the shape of the lens that ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Skel {
    /// Text consumed by a delete primitive.
    Text(Range<usize>),
    /// A primitive whose text lives in the node (key, store) or that has
    /// no variable text (literal delete, label).
    Leaf,
    Seq(Vec<Self>),
    Alt(usize, Box<Self>),
    Opt(Option<Box<Self>>),
    Star(Vec<Self>),
    /// A nested node; its own skeleton is in the table.
    Node(NodeId),
}

impl Skel {
    /// The first node this skeleton produced, if any.
    pub(crate) fn first_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            Self::Seq(parts) | Self::Star(parts) => parts.iter().find_map(Self::first_node),
            Self::Alt(_, inner) => inner.first_node(),
            Self::Opt(inner) => inner.as_deref().and_then(Self::first_node),
            Self::Text(_) | Self::Leaf => None,
        }
    }
}

/// Where one parsed node came from.
#[derive(Debug, Clone)]
pub(crate) struct Origin {
    /// Bytes of the original text the whole subtree covered.
    pub(crate) span: Range<usize>,
    /// Skeleton of the subtree body.
    pub(crate) body: Skel,
    /// The subtree body that produced the node. Only compared by address.
    pub(crate) lens: *const Lens,
}

impl Origin {
    /// Whether the node was produced by `body`, at this place in the grammar.
    pub(crate) fn made_by(&self, body: &Lens) -> bool {
        std::ptr::eq(self.lens, body)
    }
}

/// Provenance of one get call.
#[derive(Debug, Clone)]
pub(crate) struct Provenance {
    /// Leading bytes skipped before the grammar ran (a UTF-8 byte order mark).
    pub(crate) prefix: Range<usize>,
    /// Skeleton of the top-level lens.
    pub(crate) root: Skel,
    pub(crate) origins: HashMap<NodeId, Origin>,
}

impl Provenance {
    pub(crate) fn origin(&self, id: NodeId) -> Option<&Origin> {
        self.origins.get(&id)
    }
}
