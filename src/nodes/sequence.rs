use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::adapter::Adapter;
use crate::nodes::{Diagnostics, Node, SequenceSchema, Visit, WarningSink, prune};
use crate::source::SourceNode;
use crate::tags::ScalarKind;

/// Ordered list of children, all of the schema's element type.
///
/// A lone scalar or mapping where a list is expected becomes a one-element
/// list, so `script: rake` and `script: [rake]` build the same tree.
#[derive(Clone, Debug)]
pub struct Sequence {
    schema: &'static SequenceSchema,
    children: Vec<Node>,
    diagnostics: Diagnostics,
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema)
            && self.children == other.children
            && self.diagnostics == other.diagnostics
    }
}

impl Sequence {
    pub fn new(schema: &'static SequenceSchema) -> Self {
        Self {
            schema,
            children: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn schema(&self) -> &'static SequenceSchema {
        self.schema
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.children.iter()
    }

    /// String values of scalar children, skipping anything else.
    pub fn strings(&self) -> Vec<&str> {
        self.children.iter().filter_map(Node::as_str).collect()
    }

    pub fn warnings(&self) -> &[String] {
        self.diagnostics.warnings()
    }

    pub(crate) fn collect_child_warnings(
        &self,
        path: &mut Vec<String>,
        sink: &mut WarningSink,
    ) {
        for (index, child) in self.children.iter().enumerate() {
            path.push(index.to_string());
            child.collect_warnings(path, sink);
            path.pop();
        }
    }
}

impl Visit for Sequence {
    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    fn expected(&self) -> &'static str {
        "a list"
    }

    fn visit_sequence(
        &mut self,
        adapter: &mut Adapter,
        _source: &SourceNode,
        items: &[&SourceNode],
    ) {
        adapter.apply_sequence(self, items);
    }

    /// A single non-null scalar becomes the only element. The classified kind
    /// is handed straight to the element so `{secure: ...}` stays secure.
    fn visit_scalar(&mut self, adapter: &mut Adapter, kind: ScalarKind, source: &SourceNode) {
        if kind == ScalarKind::Null {
            return;
        }
        let mut child = Node::new(self.schema.element_type());
        adapter.accept_classified_scalar(&mut child, kind, source);
        self.children.push(child);
    }

    fn visit_mapping(&mut self, adapter: &mut Adapter, source: &SourceNode) {
        self.visit_child(adapter, source);
    }

    fn visit_child(&mut self, adapter: &mut Adapter, source: &SourceNode) {
        let mut child = Node::new(self.schema.element_type());
        adapter.accept(&mut child, source);
        self.children.push(child);
    }

    fn verify(&mut self) {
        let children = std::mem::take(&mut self.children);
        self.children = prune(children, &mut self.diagnostics, |c| c);
    }

    fn deep_verify(&mut self) {
        for child in &mut self.children {
            child.deep_verify();
        }
        self.verify();
    }
}

impl Serialize for Sequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.children.len()))?;
        for child in &self.children {
            seq.serialize_element(child)?;
        }
        seq.end()
    }
}
