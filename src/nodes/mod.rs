//! Typed configuration nodes.
//!
//! Every node type implements [`Visit`], the construction half of the double
//! dispatch with [`Adapter`]: the adapter classifies a source node and calls
//! the matching `visit_*` handler, and the handler calls back into the adapter
//! to build its own children according to its schema.
//!
//! Handlers a node type does not override record a structural mismatch as an
//! error on the node. Errors never stop the walk; they are demoted to warnings
//! on the parent when the parent verifies and prunes the node.

pub mod mapping;
pub mod root;
pub mod scalar;
pub mod schema;
pub mod sequence;

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::adapter::Adapter;
use crate::location::Location;
use crate::source::SourceNode;
use crate::tags::ScalarKind;
use crate::value::Value;

pub use mapping::Mapping;
pub use root::{ROOT, Root, STAGE, STAGE_NAMES};
pub use scalar::Scalar;
pub use schema::{FieldSpec, MappingSchema, NodeType, SEQUENCE, SequenceSchema};
pub use sequence::Sequence;

/// Warnings and errors recorded on one node, in order.
///
/// A message may carry the input position it was found at; the first known
/// position of a message is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    warnings: Vec<String>,
    errors: Vec<String>,
    locations: HashMap<String, Location>,
}

impl Diagnostics {
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn warning_at(&mut self, message: impl Into<String>, location: Location) {
        let message = message.into();
        self.locate(&message, location);
        self.warnings.push(message);
    }

    /// Record an error. The same message is kept once per node.
    pub fn error(&mut self, message: impl Into<String>) {
        self.error_at(message, Location::UNKNOWN);
    }

    pub fn error_at(&mut self, message: impl Into<String>, location: Location) {
        let message = message.into();
        self.locate(&message, location);
        if !self.errors.contains(&message) {
            self.errors.push(message);
        }
    }

    fn locate(&mut self, message: &str, location: Location) {
        if location.is_known() && !self.locations.contains_key(message) {
            self.locations.insert(message.to_owned(), location);
        }
    }

    /// Where in the input `message` was found, if it was recorded with a position.
    pub fn location_of(&self, message: &str) -> Location {
        self.locations
            .get(message)
            .copied()
            .unwrap_or(Location::UNKNOWN)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Turn every error into a warning.
    pub(crate) fn demote_errors(&mut self) {
        let errors = std::mem::take(&mut self.errors);
        self.warnings.extend(errors);
    }

    /// Drop warnings whose exact text was already seen, keeping first occurrences.
    pub(crate) fn dedup_warnings(&mut self) {
        let mut seen = HashSet::with_capacity(self.warnings.len());
        self.warnings.retain(|w| seen.insert(w.clone()));
    }
}

/// A flattened warning: the path of the node that recorded it and, when
/// known, where in the input it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub path: Vec<String>,
    pub message: String,
    pub location: Location,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() {
            write!(f, "{}: ", self.path.join("."))?;
        }
        f.write_str(&self.message)?;
        if self.location.is_known() {
            write!(f, " at {}", self.location)?;
        }
        Ok(())
    }
}

/// Receives each warning of a subtree with its node path and input position.
pub(crate) type WarningSink<'a> = dyn FnMut(&[String], &str, Location) + 'a;

/// Construction handlers of a typed node.
pub trait Visit {
    fn diagnostics(&self) -> &Diagnostics;
    fn diagnostics_mut(&mut self) -> &mut Diagnostics;

    /// What this node expects, for mismatch messages ("a mapping", "a list").
    fn expected(&self) -> &'static str;

    fn visit_scalar(&mut self, _adapter: &mut Adapter, kind: ScalarKind, source: &SourceNode) {
        if kind != ScalarKind::Null {
            let expected = self.expected();
            self.diagnostics_mut().error_at(
                format!(
                    "unexpected {kind} scalar {}, expected {expected}",
                    source.describe()
                ),
                source.location,
            );
        }
    }

    fn visit_mapping(&mut self, _adapter: &mut Adapter, source: &SourceNode) {
        let expected = self.expected();
        self.diagnostics_mut()
            .error_at(format!("unexpected mapping, expected {expected}"), source.location);
    }

    /// `items` are the elements of `source`, or its keys when `source` is a
    /// mapping read as a set.
    fn visit_sequence(
        &mut self,
        _adapter: &mut Adapter,
        source: &SourceNode,
        _items: &[&SourceNode],
    ) {
        let expected = self.expected();
        self.diagnostics_mut()
            .error_at(format!("unexpected sequence, expected {expected}"), source.location);
    }

    fn visit_pair(&mut self, _adapter: &mut Adapter, key: &SourceNode, _value: &SourceNode) {
        let expected = self.expected();
        self.diagnostics_mut().error_at(
            format!("unexpected pair with key {}, expected {expected}", key.describe()),
            key.location,
        );
    }

    fn visit_child(&mut self, _adapter: &mut Adapter, source: &SourceNode) {
        let expected = self.expected();
        self.diagnostics_mut().error_at(
            format!("unexpected child {}, expected {expected}", source.describe()),
            source.location,
        );
    }

    fn visit_unexpected(&mut self, _adapter: &mut Adapter, source: &SourceNode, message: String) {
        self.diagnostics_mut().error_at(message, source.location);
    }

    /// Shallow verification: prune children carrying errors.
    fn verify(&mut self) {}

    /// Whole-tree verification for checks needing sibling context.
    fn deep_verify(&mut self) {
        self.verify();
    }
}

/// A node of the typed tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Mapping(Mapping),
    Sequence(Sequence),
}

impl Node {
    pub fn new(ty: NodeType) -> Self {
        match ty {
            NodeType::Scalar => Node::Scalar(Scalar::new()),
            NodeType::Mapping(schema) => Node::Mapping(Mapping::new(schema)),
            NodeType::Sequence(schema) => Node::Sequence(Sequence::new(schema)),
        }
    }

    fn visit(&self) -> &dyn Visit {
        match self {
            Node::Scalar(n) => n,
            Node::Mapping(n) => n,
            Node::Sequence(n) => n,
        }
    }

    fn visit_mut(&mut self) -> &mut dyn Visit {
        match self {
            Node::Scalar(n) => n,
            Node::Mapping(n) => n,
            Node::Sequence(n) => n,
        }
    }

    pub fn warnings(&self) -> &[String] {
        self.visit().diagnostics().warnings()
    }

    pub fn errors(&self) -> &[String] {
        self.visit().diagnostics().errors()
    }

    pub fn has_errors(&self) -> bool {
        self.visit().diagnostics().has_errors()
    }

    /// Own warnings followed by every descendant's, depth first.
    pub fn nested_warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_warnings(&mut Vec::new(), &mut |_, w, _| out.push(w.to_owned()));
        out
    }

    /// Same order as [`nested_warnings`](Self::nested_warnings), each message
    /// paired with the path of the node that recorded it.
    pub fn nested_warnings_with_path(&self) -> Vec<(Vec<String>, String)> {
        let mut out = Vec::new();
        self.collect_warnings(&mut Vec::new(), &mut |path, w, _| {
            out.push((path.to_vec(), w.to_owned()))
        });
        out
    }

    pub(crate) fn collect_warnings(&self, path: &mut Vec<String>, sink: &mut WarningSink) {
        let diagnostics = self.diagnostics();
        for warning in diagnostics.warnings() {
            sink(path, warning, diagnostics.location_of(warning));
        }
        match self {
            Node::Scalar(_) => {}
            Node::Mapping(m) => m.collect_child_warnings(path, sink),
            Node::Sequence(s) => s.collect_child_warnings(path, sink),
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Node::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Value of a scalar node.
    pub fn value(&self) -> Option<&Value> {
        self.as_scalar().map(Scalar::value)
    }

    /// String value of a scalar node.
    pub fn as_str(&self) -> Option<&str> {
        self.value().and_then(Value::as_str)
    }
}

impl Visit for Node {
    fn diagnostics(&self) -> &Diagnostics {
        self.visit().diagnostics()
    }

    fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        self.visit_mut().diagnostics_mut()
    }

    fn expected(&self) -> &'static str {
        self.visit().expected()
    }

    fn visit_scalar(&mut self, adapter: &mut Adapter, kind: ScalarKind, source: &SourceNode) {
        self.visit_mut().visit_scalar(adapter, kind, source)
    }

    fn visit_mapping(&mut self, adapter: &mut Adapter, source: &SourceNode) {
        self.visit_mut().visit_mapping(adapter, source)
    }

    fn visit_sequence(
        &mut self,
        adapter: &mut Adapter,
        source: &SourceNode,
        items: &[&SourceNode],
    ) {
        self.visit_mut().visit_sequence(adapter, source, items)
    }

    fn visit_pair(&mut self, adapter: &mut Adapter, key: &SourceNode, value: &SourceNode) {
        self.visit_mut().visit_pair(adapter, key, value)
    }

    fn visit_child(&mut self, adapter: &mut Adapter, source: &SourceNode) {
        self.visit_mut().visit_child(adapter, source)
    }

    fn visit_unexpected(&mut self, adapter: &mut Adapter, source: &SourceNode, message: String) {
        self.visit_mut().visit_unexpected(adapter, source, message)
    }

    fn verify(&mut self) {
        self.visit_mut().verify()
    }

    fn deep_verify(&mut self) {
        self.visit_mut().deep_verify()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(s) => s.serialize(serializer),
            Node::Mapping(m) => m.serialize(serializer),
            Node::Sequence(s) => s.serialize(serializer),
        }
    }
}

/// Drop every child carrying errors, re-recording the errors as warnings in
/// `diagnostics`. Children are consumed and the survivors returned, so the
/// list is never mutated while it is being walked.
pub(crate) fn prune<T>(
    children: Vec<T>,
    diagnostics: &mut Diagnostics,
    node: impl Fn(&T) -> &Node,
) -> Vec<T> {
    let mut kept = Vec::with_capacity(children.len());
    for child in children {
        let found = node(&child).diagnostics();
        if !found.has_errors() {
            kept.push(child);
        } else {
            tracing::debug!(errors = ?found.errors(), "pruning invalid node");
            for message in found.errors() {
                diagnostics.warning_at(message.clone(), found.location_of(message));
            }
        }
    }
    kept
}
