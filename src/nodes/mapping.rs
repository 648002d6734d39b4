use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::adapter::Adapter;
use crate::nodes::{Diagnostics, MappingSchema, Node, Visit, WarningSink, prune};
use crate::options::DuplicateFieldPolicy;
use crate::source::SourceNode;

#[derive(Clone, Debug, PartialEq)]
struct Field {
    name: &'static str,
    /// Source key that populated the field (may be a legacy alias).
    key: String,
    node: Node,
}

/// Node with named fields declared by a [`MappingSchema`].
///
/// Fields keep source key order; a field given through an alias sits under
/// its canonical name.
#[derive(Clone, Debug)]
pub struct Mapping {
    schema: &'static MappingSchema,
    fields: Vec<Field>,
    diagnostics: Diagnostics,
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema)
            && self.fields == other.fields
            && self.diagnostics == other.diagnostics
    }
}

impl Mapping {
    pub fn new(schema: &'static MappingSchema) -> Self {
        Self {
            schema,
            fields: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn schema(&self) -> &'static MappingSchema {
        self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.node)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Source key the field was read from.
    pub fn source_key(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.key.as_str())
    }

    /// Canonical field names, in order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Node)> {
        self.fields.iter().map(|f| (f.name, &f.node))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn warnings(&self) -> &[String] {
        self.diagnostics.warnings()
    }

    pub fn errors(&self) -> &[String] {
        self.diagnostics.errors()
    }

    fn insert(&mut self, policy: DuplicateFieldPolicy, name: &'static str, key: String, node: Node) {
        let Some(existing) = self.fields.iter_mut().find(|f| f.name == name) else {
            self.fields.push(Field { name, key, node });
            return;
        };
        if policy == DuplicateFieldPolicy::Warn {
            self.diagnostics.warning(format!(
                "{name:?} given more than once (as {:?} and {key:?}), using {key:?}",
                existing.key
            ));
        }
        existing.key = key;
        existing.node = node;
    }

    fn check_required(&mut self) {
        let schema = self.schema;
        for field in schema.required_fields() {
            if !self.contains(field.to) {
                self.diagnostics.error(format!("missing key {:?}", field.to));
            }
        }
        for group in schema.required_together {
            let (present, missing): (Vec<&str>, Vec<&str>) =
                group.iter().copied().partition(|name| self.contains(name));
            if !present.is_empty() && !missing.is_empty() {
                self.diagnostics.error(format!(
                    "{} required together with {}",
                    quoted_list(&missing),
                    quoted_list(&present)
                ));
            }
        }
    }

    pub(crate) fn collect_child_warnings(
        &self,
        path: &mut Vec<String>,
        sink: &mut WarningSink,
    ) {
        for field in &self.fields {
            path.push(field.name.to_owned());
            field.node.collect_warnings(path, sink);
            path.pop();
        }
    }
}

fn quoted_list(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!("{n:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Visit for Mapping {
    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    fn expected(&self) -> &'static str {
        "a mapping"
    }

    fn visit_mapping(&mut self, adapter: &mut Adapter, source: &SourceNode) {
        adapter.apply_mapping(self, source);
    }

    fn visit_pair(&mut self, adapter: &mut Adapter, source: &SourceNode, value: &SourceNode) {
        let Some(key) = adapter.generate_key(self, source) else {
            return;
        };
        let Some(field) = self.schema.field(&key) else {
            debug!(
                mapping = self.schema.name,
                key = %key,
                location = %source.location,
                "unknown key"
            );
            self.diagnostics
                .warning_at(format!("unexpected key {key:?}, dropping"), source.location);
            return;
        };
        let mut child = Node::new(field.ty);
        adapter.accept(&mut child, value);
        self.insert(adapter.options().duplicate_fields, field.to, key, child);
    }

    fn verify(&mut self) {
        let fields = std::mem::take(&mut self.fields);
        self.fields = prune(fields, &mut self.diagnostics, |f| &f.node);
    }

    fn deep_verify(&mut self) {
        for field in &mut self.fields {
            field.node.deep_verify();
        }
        self.verify();
        self.check_required();
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(field.name, &field.node)?;
        }
        map.end()
    }
}
