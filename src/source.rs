//! Generic source tree handed to the adapter.
//!
//! The tree knows nothing about the CI schema: every node exposes its
//! structural kind, an optional tag, and either a literal (scalars) or an
//! ordered list of children. Mapping children are stored flat, alternating
//! key and value. The [`frontend`](crate::frontend) module builds these from
//! YAML text; callers with their own tokenizer can build them by hand.

use std::rc::Rc;

use crate::location::Location;

const MAX_ALIAS_HOPS: usize = 64;

/// Structural kind of a [`SourceNode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Scalar,
    Mapping,
    Sequence,
    Alias,
    Document,
    Stream,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SourceBody {
    Scalar {
        value: String,
        /// True for any non-plain style (quoted or block scalars).
        quoted: bool,
    },
    /// Flat `key, value, key, value, ...` children.
    ///
    /// Collection children are shared, so an anchored collection and every
    /// alias to it point at the same allocation.
    Mapping(Rc<[SourceNode]>),
    Sequence(Rc<[SourceNode]>),
    /// Reference to an anchored node. `target` is `None` when the anchor is unknown.
    Alias {
        anchor: usize,
        target: Option<Rc<SourceNode>>,
    },
    /// One document; `None` for an empty document.
    Document(Option<Box<SourceNode>>),
    /// Documents in order.
    Stream(Rc<[SourceNode]>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceNode {
    pub tag: Option<String>,
    pub location: Location,
    pub body: SourceBody,
}

impl SourceNode {
    fn new(body: SourceBody) -> Self {
        Self {
            tag: None,
            location: Location::UNKNOWN,
            body,
        }
    }

    /// Plain (unquoted) scalar.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::new(SourceBody::Scalar {
            value: value.into(),
            quoted: false,
        })
    }

    /// Quoted scalar; never subject to implicit typing.
    pub fn quoted(value: impl Into<String>) -> Self {
        Self::new(SourceBody::Scalar {
            value: value.into(),
            quoted: true,
        })
    }

    /// Mapping from ordered key/value pairs.
    pub fn mapping<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (SourceNode, SourceNode)>,
    {
        let children: Vec<_> = pairs
            .into_iter()
            .flat_map(|(key, value)| [key, value])
            .collect();
        Self::flat_mapping(children)
    }

    /// Mapping from flat, alternating key/value children.
    pub fn flat_mapping(children: Vec<SourceNode>) -> Self {
        Self::new(SourceBody::Mapping(children.into()))
    }

    pub fn sequence(children: Vec<SourceNode>) -> Self {
        Self::new(SourceBody::Sequence(children.into()))
    }

    pub fn alias(anchor: usize, target: Option<Rc<SourceNode>>) -> Self {
        Self::new(SourceBody::Alias { anchor, target })
    }

    pub fn document(root: Option<SourceNode>) -> Self {
        Self::new(SourceBody::Document(root.map(Box::new)))
    }

    pub fn stream(documents: Vec<SourceNode>) -> Self {
        Self::new(SourceBody::Stream(documents.into()))
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn kind(&self) -> SourceKind {
        match self.body {
            SourceBody::Scalar { .. } => SourceKind::Scalar,
            SourceBody::Mapping(_) => SourceKind::Mapping,
            SourceBody::Sequence(_) => SourceKind::Sequence,
            SourceBody::Alias { .. } => SourceKind::Alias,
            SourceBody::Document(_) => SourceKind::Document,
            SourceBody::Stream(_) => SourceKind::Stream,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Literal text of a scalar, `None` for anything else.
    pub fn literal(&self) -> Option<&str> {
        match &self.body {
            SourceBody::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_quoted(&self) -> bool {
        matches!(self.body, SourceBody::Scalar { quoted: true, .. })
    }

    /// Ordered children of a mapping (flat), sequence or stream.
    pub fn children(&self) -> &[SourceNode] {
        match &self.body {
            SourceBody::Mapping(children)
            | SourceBody::Sequence(children)
            | SourceBody::Stream(children) => &children[..],
            _ => &[],
        }
    }

    /// First document of a stream, or the node itself when it is not a stream.
    pub fn first_document(&self) -> Option<&SourceNode> {
        match &self.body {
            SourceBody::Stream(documents) => documents.first(),
            _ => Some(self),
        }
    }

    /// Shared child list of a collection or stream.
    pub fn shared_children(&self) -> Option<&Rc<[SourceNode]>> {
        match &self.body {
            SourceBody::Mapping(children)
            | SourceBody::Sequence(children)
            | SourceBody::Stream(children) => Some(children),
            _ => None,
        }
    }

    /// The node an alias points at, following alias chains. Unknown anchors
    /// and anything that is not an alias resolve to the node itself.
    pub fn resolved(&self) -> &SourceNode {
        let mut node = self;
        for _ in 0..MAX_ALIAS_HOPS {
            match &node.body {
                SourceBody::Alias {
                    target: Some(target),
                    ..
                } => node = &**target,
                _ => break,
            }
        }
        node
    }

    /// Short description used in diagnostics.
    pub fn describe(&self) -> String {
        match &self.body {
            SourceBody::Scalar { value, .. } => format!("{value:?}"),
            SourceBody::Mapping(_) => "mapping".to_owned(),
            SourceBody::Sequence(_) => "sequence".to_owned(),
            SourceBody::Alias { anchor, .. } => format!("alias #{anchor}"),
            SourceBody::Document(_) => "document".to_owned(),
            SourceBody::Stream(_) => "stream".to_owned(),
        }
    }
}

/// Keys of a mapping (even positions), in order.
///
/// A set, or a mapping reinterpreted as a sequence, only keeps its keys.
pub fn mapping_keys(children: &[SourceNode]) -> Vec<&SourceNode> {
    children.iter().step_by(2).collect()
}

/// Key/value pairs of a flat mapping, in order. A dangling key without a
/// value is ignored.
pub fn mapping_pairs(children: &[SourceNode]) -> impl Iterator<Item = (&SourceNode, &SourceNode)> {
    children.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
}

/// Items of a sequence or documents of a stream, in order.
pub fn sequence_items(node: &SourceNode) -> Vec<&SourceNode> {
    node.children().iter().collect()
}
