//! The classification half of the double dispatch.
//!
//! [`Adapter::accept`] classifies a source node by structural kind and tag and
//! calls the matching [`Visit`] handler on the typed node. Handlers call back
//! into [`Adapter::apply_mapping`], [`Adapter::apply_sequence`] and
//! [`Adapter::accept`] to build their children. Every accepted node is
//! verified before `accept` returns.
//!
//! Nesting and the number of visited nodes are bounded by [`Options`];
//! aliases count towards both, so alias fan-out cannot run away.

use tracing::trace;

use crate::nodes::Visit;
use crate::options::Options;
use crate::parse_scalars::{parse_binary, parse_float, parse_int, parse_timestamp, parse_yaml11_bool};
use crate::source::{SourceBody, SourceNode, mapping_keys, mapping_pairs, sequence_items};
use crate::tags::{
    MappingKind, ScalarKind, SequenceKind, TAG_DECRYPTED, classify_mapping, classify_scalar,
    classify_sequence, is_string_tagged,
};
use crate::value::{SecureValue, Value};

pub struct Adapter<'o> {
    options: &'o Options,
    depth: usize,
    visited: usize,
}

impl<'o> Adapter<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            depth: 0,
            visited: 0,
        }
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    /// Build `node` from `source`, then verify it.
    pub fn accept(&mut self, node: &mut dyn Visit, source: &SourceNode) {
        if self.enter(node, source) {
            trace!(kind = ?source.kind(), tag = ?source.tag(), depth = self.depth, "accept");
            match &source.body {
                SourceBody::Scalar { .. } => self.accept_scalar(node, source),
                SourceBody::Mapping(_) => self.accept_mapping(node, source),
                SourceBody::Sequence(_) | SourceBody::Stream(_) => {
                    self.accept_sequence(node, source)
                }
                SourceBody::Alias { anchor, target } => match target {
                    Some(target) => self.accept(node, target),
                    None => node.visit_unexpected(
                        self,
                        source,
                        format!("alias references unknown anchor #{anchor}"),
                    ),
                },
                SourceBody::Document(Some(root)) => self.accept(node, root),
                SourceBody::Document(None) => node.visit_scalar(self, ScalarKind::Null, source),
            }
        }
        node.verify();
        self.depth -= 1;
    }

    /// Hand an already classified scalar to `node`, with the same depth and
    /// node accounting as [`accept`](Self::accept).
    pub fn accept_classified_scalar(
        &mut self,
        node: &mut dyn Visit,
        kind: ScalarKind,
        source: &SourceNode,
    ) {
        if self.enter(node, source) {
            node.visit_scalar(self, kind, source);
        }
        node.verify();
        self.depth -= 1;
    }

    /// Count one more level and node; on breach mark `node` instead.
    /// Returns whether the node may be visited.
    fn enter(&mut self, node: &mut dyn Visit, source: &SourceNode) -> bool {
        self.depth += 1;
        self.visited += 1;
        if self.depth > self.options.max_depth {
            let message = format!("nesting deeper than {} levels", self.options.max_depth);
            node.visit_unexpected(self, source, message);
            return false;
        }
        if self.visited > self.options.max_nodes {
            let message = format!("document has more than {} nodes", self.options.max_nodes);
            node.visit_unexpected(self, source, message);
            return false;
        }
        true
    }

    fn accept_scalar(&mut self, node: &mut dyn Visit, source: &SourceNode) {
        match classify_scalar(source) {
            Ok(kind) => node.visit_scalar(self, kind, source),
            Err(message) => node.visit_unexpected(self, source, message),
        }
    }

    fn accept_mapping(&mut self, node: &mut dyn Visit, source: &SourceNode) {
        match classify_mapping(source) {
            MappingKind::Map | MappingKind::Omap | MappingKind::Pairs => {
                node.visit_mapping(self, source)
            }
            MappingKind::Set | MappingKind::Seq => {
                node.visit_sequence(self, source, &mapping_keys(source.children()))
            }
            MappingKind::Secure => {
                if let [_, payload] = source.children() {
                    node.visit_scalar(self, ScalarKind::Secure, payload);
                }
            }
            MappingKind::Unexpected(message) => node.visit_unexpected(self, source, message),
        }
    }

    fn accept_sequence(&mut self, node: &mut dyn Visit, source: &SourceNode) {
        match classify_sequence(source) {
            SequenceKind::Seq | SequenceKind::Set => {
                node.visit_sequence(self, source, &sequence_items(source))
            }
            SequenceKind::Unexpected(message) => node.visit_unexpected(self, source, message),
        }
    }

    /// Coerce the literal of `source` into a value of `kind`.
    pub fn cast(&self, kind: ScalarKind, source: &SourceNode) -> Result<Value, String> {
        let source = source.resolved();
        if kind == ScalarKind::Null {
            return Ok(Value::Null);
        }
        let Some(literal) = source.literal() else {
            return Err(format!(
                "expected a scalar for {kind}, got {}",
                source.describe()
            ));
        };
        match kind {
            ScalarKind::Str => Ok(Value::Str(literal.to_owned())),
            ScalarKind::Binary => parse_binary(literal).map(Value::Binary),
            ScalarKind::Bool => Ok(Value::Bool(parse_yaml11_bool(literal))),
            ScalarKind::Float => parse_float(literal).map(Value::Float),
            ScalarKind::Int => parse_int(literal).map(Value::Int),
            ScalarKind::Time => parse_timestamp(literal).map(Value::Time),
            ScalarKind::Secure => Ok(Value::Secure(SecureValue::new(
                literal,
                source.tag() != Some(TAG_DECRYPTED),
            ))),
            ScalarKind::Null => Ok(Value::Null),
            ScalarKind::Unexpected => Err(format!("unexpected scalar {}", source.describe())),
        }
    }

    /// Feed every key/value pair of a source mapping to `node`.
    pub fn apply_mapping(&mut self, node: &mut dyn Visit, source: &SourceNode) {
        for (key, value) in mapping_pairs(source.children()) {
            node.visit_pair(self, key, value);
        }
    }

    /// Feed every item to `node`, in order.
    pub fn apply_sequence(&mut self, node: &mut dyn Visit, items: &[&SourceNode]) {
        for item in items {
            node.visit_child(self, item);
        }
    }

    /// Field name for a mapping key.
    ///
    /// Plain or `!!str` scalars give their text, minus a leading `:` marker.
    /// Anything else is reported as a warning on `node` and yields `None`.
    pub fn generate_key(&mut self, node: &mut dyn Visit, key: &SourceNode) -> Option<String> {
        let location = key.location;
        let key = key.resolved();
        match key.literal() {
            Some(text) if is_string_tagged(key.tag()) => {
                Some(text.strip_prefix(':').unwrap_or(text).to_owned())
            }
            _ => {
                node.diagnostics_mut().warning_at(
                    format!("unexpected key {}, expected a string, dropping", key.describe()),
                    location,
                );
                None
            }
        }
    }
}
