//! The whole build configuration document.

use std::collections::HashSet;
use std::ops::Deref;

use serde::{Serialize, Serializer};

use crate::adapter::Adapter;
use crate::nodes::schema::SEQUENCE;
use crate::nodes::{
    Diagnostics, FieldSpec, Mapping, MappingSchema, Node, NodeType, Sequence, SequenceSchema,
    Visit, Warning, WarningSink,
};
use crate::source::SourceNode;
use crate::tags::ScalarKind;

/// One build-lifecycle phase: an ordered list of commands.
pub static STAGE: SequenceSchema = SequenceSchema {
    name: "stage",
    element: None,
    parent: Some(&SEQUENCE),
};

/// Lifecycle phases, in the order they run.
pub const STAGE_NAMES: [&str; 10] = [
    "before_install",
    "install",
    "before_script",
    "script",
    "after_result",
    "after_script",
    "after_success",
    "after_failure",
    "before_deploy",
    "after_deploy",
];

pub static ROOT: MappingSchema = MappingSchema {
    name: "root",
    fields: &[
        FieldSpec::new(&["language"], "language").required(),
        FieldSpec::new(&["deploy"], "deploy"),
        FieldSpec::new(&["ruby", "rvm"], "ruby"),
        FieldSpec::new(&["before_install"], "before_install").of(NodeType::Sequence(&STAGE)),
        FieldSpec::new(&["install"], "install").of(NodeType::Sequence(&STAGE)),
        FieldSpec::new(&["before_script"], "before_script").of(NodeType::Sequence(&STAGE)),
        FieldSpec::new(&["script"], "script").of(NodeType::Sequence(&STAGE)),
        FieldSpec::new(&["after_result"], "after_result").of(NodeType::Sequence(&STAGE)),
        FieldSpec::new(&["after_script"], "after_script").of(NodeType::Sequence(&STAGE)),
        FieldSpec::new(&["after_success"], "after_success").of(NodeType::Sequence(&STAGE)),
        FieldSpec::new(&["after_failure"], "after_failure").of(NodeType::Sequence(&STAGE)),
        FieldSpec::new(&["before_deploy"], "before_deploy").of(NodeType::Sequence(&STAGE)),
        FieldSpec::new(&["after_deploy"], "after_deploy").of(NodeType::Sequence(&STAGE)),
    ],
    required_together: &[],
};

/// Typed root of a build configuration.
///
/// Behaves as a [`Mapping`] over [`ROOT`], except that its warnings are
/// de-duplicated and its own errors end up as warnings after
/// [`deep_verify`](Visit::deep_verify), so a parsed `Root` is always usable.
#[derive(Clone, Debug, PartialEq)]
pub struct Root {
    mapping: Mapping,
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

impl Root {
    pub fn new() -> Self {
        Self {
            mapping: Mapping::new(&ROOT),
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.mapping.get("language").and_then(Node::as_str)
    }

    pub fn ruby(&self) -> Option<&str> {
        self.mapping.get("ruby").and_then(Node::as_str)
    }

    pub fn deploy(&self) -> Option<&Node> {
        self.mapping.get("deploy")
    }

    /// Lifecycle phase by name, e.g. `"script"`.
    pub fn stage(&self, name: &str) -> Option<&Sequence> {
        self.mapping.get(name).and_then(Node::as_sequence)
    }

    /// Every given lifecycle phase, in run order.
    pub fn stages(&self) -> impl Iterator<Item = (&'static str, &Sequence)> {
        STAGE_NAMES
            .iter()
            .filter_map(|name| Some((*name, self.stage(name)?)))
    }

    /// Own warnings followed by every descendant's, without repeats.
    pub fn nested_warnings(&self) -> Vec<String> {
        self.located_warnings()
            .into_iter()
            .map(|w| w.message)
            .collect()
    }

    /// Like [`nested_warnings`](Self::nested_warnings), with the path of the
    /// node that recorded each message.
    pub fn nested_warnings_with_path(&self) -> Vec<(Vec<String>, String)> {
        self.located_warnings()
            .into_iter()
            .map(|w| (w.path, w.message))
            .collect()
    }

    /// Every distinct warning with its node path and, when the tree was read
    /// from text, the position of the first occurrence.
    pub fn located_warnings(&self) -> Vec<Warning> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect(&mut |path, message, location| {
            if seen.insert(message.to_owned()) {
                out.push(Warning {
                    path: path.to_vec(),
                    message: message.to_owned(),
                    location,
                });
            }
        });
        out
    }

    fn collect(&self, sink: &mut WarningSink) {
        let mut path = Vec::new();
        let diagnostics = self.mapping.diagnostics();
        for warning in diagnostics.warnings() {
            sink(&path, warning, diagnostics.location_of(warning));
        }
        self.mapping.collect_child_warnings(&mut path, sink);
    }
}

impl Deref for Root {
    type Target = Mapping;

    fn deref(&self) -> &Mapping {
        &self.mapping
    }
}

impl Visit for Root {
    fn diagnostics(&self) -> &Diagnostics {
        self.mapping.diagnostics()
    }

    fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        self.mapping.diagnostics_mut()
    }

    fn expected(&self) -> &'static str {
        self.mapping.expected()
    }

    fn visit_scalar(&mut self, adapter: &mut Adapter, kind: ScalarKind, source: &SourceNode) {
        self.mapping.visit_scalar(adapter, kind, source);
    }

    fn visit_mapping(&mut self, adapter: &mut Adapter, source: &SourceNode) {
        self.mapping.visit_mapping(adapter, source);
    }

    fn visit_sequence(
        &mut self,
        adapter: &mut Adapter,
        source: &SourceNode,
        items: &[&SourceNode],
    ) {
        self.mapping.visit_sequence(adapter, source, items);
    }

    fn visit_pair(&mut self, adapter: &mut Adapter, key: &SourceNode, value: &SourceNode) {
        self.mapping.visit_pair(adapter, key, value);
    }

    fn visit_child(&mut self, adapter: &mut Adapter, source: &SourceNode) {
        self.mapping.visit_child(adapter, source);
    }

    fn visit_unexpected(&mut self, adapter: &mut Adapter, source: &SourceNode, message: String) {
        self.mapping.visit_unexpected(adapter, source, message);
    }

    fn verify(&mut self) {
        self.mapping.verify();
        self.mapping.diagnostics_mut().dedup_warnings();
    }

    fn deep_verify(&mut self) {
        self.mapping.deep_verify();
        let diagnostics = self.mapping.diagnostics_mut();
        diagnostics.demote_errors();
        diagnostics.dedup_warnings();
    }
}

impl Serialize for Root {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.mapping.serialize(serializer)
    }
}
