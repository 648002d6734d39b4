//! Declarative schemas attached to node types.
//!
//! Schemas are `'static` data declared once per node type, never per instance.
//! The adapter looks fields up by source key when it builds a mapping.

/// Type of a child node.
#[derive(Clone, Copy, Debug)]
pub enum NodeType {
    Scalar,
    Mapping(&'static MappingSchema),
    Sequence(&'static SequenceSchema),
}

impl NodeType {
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Scalar => "scalar",
            NodeType::Mapping(schema) => schema.name,
            NodeType::Sequence(schema) => schema.name,
        }
    }
}

/// One field of a mapping type.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    /// Accepted source key names; more than one when legacy names alias the field.
    pub keys: &'static [&'static str],
    /// Canonical field name in the typed tree.
    pub to: &'static str,
    pub ty: NodeType,
    pub required: bool,
}

impl FieldSpec {
    /// Optional scalar field read from any of `keys`.
    pub const fn new(keys: &'static [&'static str], to: &'static str) -> Self {
        Self {
            keys,
            to,
            ty: NodeType::Scalar,
            required: false,
        }
    }

    pub const fn of(self, ty: NodeType) -> Self {
        Self {
            keys: self.keys,
            to: self.to,
            ty,
            required: self.required,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            keys: self.keys,
            to: self.to,
            ty: self.ty,
            required: true,
        }
    }

    pub fn accepts(&self, key: &str) -> bool {
        self.keys.contains(&key)
    }
}

#[derive(Debug)]
pub struct MappingSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
    /// Groups of canonical field names that must be given together or not at all.
    pub required_together: &'static [&'static [&'static str]],
}

impl MappingSchema {
    /// Field accepting the source key `key`.
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.accepts(key))
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

#[derive(Debug)]
pub struct SequenceSchema {
    pub name: &'static str,
    /// Element type; `None` inherits it from `parent`.
    pub element: Option<NodeType>,
    pub parent: Option<&'static SequenceSchema>,
}

impl SequenceSchema {
    /// Declared element type, inherited through `parent`, defaulting to Scalar.
    pub fn element_type(&self) -> NodeType {
        let mut schema = self;
        loop {
            if let Some(ty) = schema.element {
                return ty;
            }
            match schema.parent {
                Some(parent) => schema = parent,
                None => return NodeType::Scalar,
            }
        }
    }
}

/// Plain sequence of scalars; the base other sequence types inherit from.
pub static SEQUENCE: SequenceSchema = SequenceSchema {
    name: "sequence",
    element: None,
    parent: None,
};
