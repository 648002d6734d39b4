use serde::{Serialize, Serializer};

use crate::adapter::Adapter;
use crate::nodes::{Diagnostics, Visit};
use crate::source::SourceNode;
use crate::tags::ScalarKind;
use crate::value::Value;

/// Leaf node holding one coerced value.
#[derive(Clone, Debug, PartialEq)]
pub struct Scalar {
    kind: ScalarKind,
    value: Value,
    diagnostics: Diagnostics,
}

impl Default for Scalar {
    fn default() -> Self {
        Self::new()
    }
}

impl Scalar {
    pub fn new() -> Self {
        Self {
            kind: ScalarKind::Null,
            value: Value::Null,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Visit for Scalar {
    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    fn expected(&self) -> &'static str {
        "a scalar"
    }

    fn visit_scalar(&mut self, adapter: &mut Adapter, kind: ScalarKind, source: &SourceNode) {
        self.kind = kind;
        match adapter.cast(kind, source) {
            Ok(value) => self.value = value,
            Err(message) => self.diagnostics.error_at(message, source.location),
        }
    }

    fn visit_unexpected(&mut self, _adapter: &mut Adapter, source: &SourceNode, message: String) {
        self.kind = ScalarKind::Unexpected;
        self.value = Value::Null;
        self.diagnostics.error_at(message, source.location);
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}
