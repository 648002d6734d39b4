//! Tag classification.
//!
//! Decides the concrete scalar or collection kind of a source node from its
//! explicit tag, falling back to the YAML core-schema rules for untagged
//! nodes. All tables here are read-only constants.

use std::fmt;

use serde::Serialize;

use crate::parse_scalars::{is_bool, is_float, is_int, is_null, is_timestamp};
use crate::source::{SourceBody, SourceNode};

pub(crate) const CORE_PREFIX: &str = "tag:yaml.org,2002:";

pub(crate) const TAG_SECURE: &str = "!secure";
pub(crate) const TAG_ENCRYPTED: &str = "!encrypted";
pub(crate) const TAG_DECRYPTED: &str = "!decrypted";

/// Concrete kind of a scalar leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Str,
    Int,
    Float,
    Bool,
    Null,
    Time,
    Binary,
    Secure,
    Unexpected,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Str => "str",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::Null => "null",
            ScalarKind::Time => "time",
            ScalarKind::Binary => "binary",
            ScalarKind::Secure => "secure",
            ScalarKind::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a source mapping should be consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MappingKind {
    Map,
    Omap,
    Pairs,
    /// `!!set`: only the keys are used, as sequence items.
    Set,
    /// `!!seq` on a mapping: only the keys are used, as sequence items.
    Seq,
    /// Untagged `{secure: ...}`: a secure scalar wrapping the value.
    Secure,
    Unexpected(String),
}

/// How a source sequence should be consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequenceKind {
    Seq,
    Set,
    Unexpected(String),
}

/// Explicit scalar tags, tested in this order.
const SCALAR_TAGS: &[(&str, ScalarKind)] = &[
    ("binary", ScalarKind::Binary),
    ("bool", ScalarKind::Bool),
    ("float", ScalarKind::Float),
    ("int", ScalarKind::Int),
    ("null", ScalarKind::Null),
    ("str", ScalarKind::Str),
    ("timestamp", ScalarKind::Time),
];

const SECURE_TAGS: &[&str] = &[TAG_ENCRYPTED, TAG_SECURE, TAG_DECRYPTED];

/// Untagged plain scalars are tested against these patterns, in this order.
/// The order decides ties between overlapping patterns.
const IMPLICIT_SCALARS: &[(fn(&str) -> bool, ScalarKind)] = &[
    (is_bool, ScalarKind::Bool),
    (is_float, ScalarKind::Float),
    (is_null, ScalarKind::Null),
    (is_timestamp, ScalarKind::Time),
    (is_int, ScalarKind::Int),
];

/// Name of a core-schema tag in any of its spellings: `!!int`, `!int`,
/// `tag:yaml.org,2002:int` or `tag:yaml.org,2002:!int`.
pub(crate) fn core_tag_name(tag: &str) -> Option<&str> {
    let name = if let Some(rest) = tag.strip_prefix(CORE_PREFIX) {
        rest.strip_prefix('!').unwrap_or(rest)
    } else if let Some(rest) = tag.strip_prefix("!!") {
        rest
    } else {
        tag.strip_prefix('!')?
    };
    (!name.is_empty()).then_some(name)
}

pub(crate) fn is_core_tag(tag: &str, name: &str) -> bool {
    core_tag_name(tag) == Some(name)
}

pub(crate) fn is_secure_tag(tag: &str) -> bool {
    SECURE_TAGS.contains(&tag)
}

/// True when a scalar carries no tag or an explicit string tag.
pub(crate) fn is_string_tagged(tag: Option<&str>) -> bool {
    match tag {
        None => true,
        Some(t) => is_core_tag(t, "str"),
    }
}

fn explicit_scalar_kind(tag: &str) -> Option<ScalarKind> {
    if let Some(name) = core_tag_name(tag) {
        if let Some((_, kind)) = SCALAR_TAGS.iter().find(|(n, _)| *n == name) {
            return Some(*kind);
        }
    }
    is_secure_tag(tag).then_some(ScalarKind::Secure)
}

/// Classify a scalar source node.
///
/// Returns the kind, or an `Err` diagnostic naming an unrecognised tag.
pub fn classify_scalar(node: &SourceNode) -> Result<ScalarKind, String> {
    let literal = node.literal().unwrap_or_default();
    if let Some(tag) = node.tag() {
        return explicit_scalar_kind(tag)
            .ok_or_else(|| format!("unexpected tag {tag:?} for scalar {literal:?}"));
    }
    if node.is_quoted() {
        return Ok(ScalarKind::Str);
    }
    Ok(implicit_scalar_kind(literal))
}

/// Core-schema kind of an untagged, plain literal.
pub fn implicit_scalar_kind(literal: &str) -> ScalarKind {
    IMPLICIT_SCALARS
        .iter()
        .find(|(matches, _)| matches(literal))
        .map(|(_, kind)| *kind)
        .unwrap_or(ScalarKind::Str)
}

/// Classify a mapping source node.
pub fn classify_mapping(node: &SourceNode) -> MappingKind {
    let Some(tag) = node.tag() else {
        return if is_secure_pair(node) {
            MappingKind::Secure
        } else {
            MappingKind::Map
        };
    };
    match core_tag_name(tag) {
        Some("map") => MappingKind::Map,
        Some("omap") => MappingKind::Omap,
        Some("pairs") => MappingKind::Pairs,
        Some("set") => MappingKind::Set,
        Some("seq") => MappingKind::Seq,
        _ => MappingKind::Unexpected(format!("unexpected tag {tag:?} for mapping")),
    }
}

/// Classify a sequence (or stream) source node.
pub fn classify_sequence(node: &SourceNode) -> SequenceKind {
    let Some(tag) = node.tag() else {
        return SequenceKind::Seq;
    };
    match core_tag_name(tag) {
        Some("seq") => SequenceKind::Seq,
        Some("set") => SequenceKind::Set,
        _ => SequenceKind::Unexpected(format!("unexpected tag {tag:?} for sequence")),
    }
}

/// `{secure: value}` with nothing else in the mapping.
fn is_secure_pair(node: &SourceNode) -> bool {
    match &node.body {
        SourceBody::Mapping(children) => {
            children.len() == 2 && children[0].literal() == Some("secure")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_tag_spellings() {
        for tag in ["!!int", "!int", "tag:yaml.org,2002:int", "tag:yaml.org,2002:!int"] {
            assert_eq!(core_tag_name(tag), Some("int"), "{tag}");
        }
        assert_eq!(core_tag_name("int"), None);
        assert_eq!(core_tag_name("!"), None);
    }

    #[test]
    fn explicit_scalar_tags() {
        let cases = [
            ("!!binary", ScalarKind::Binary),
            ("!!bool", ScalarKind::Bool),
            ("!!float", ScalarKind::Float),
            ("!!int", ScalarKind::Int),
            ("!!null", ScalarKind::Null),
            ("!!str", ScalarKind::Str),
            ("!!timestamp", ScalarKind::Time),
            ("!secure", ScalarKind::Secure),
            ("!encrypted", ScalarKind::Secure),
            ("!decrypted", ScalarKind::Secure),
        ];
        for (tag, kind) in cases {
            let node = SourceNode::scalar("1").with_tag(tag);
            assert_eq!(classify_scalar(&node), Ok(kind), "{tag}");
        }
    }

    #[test]
    fn unknown_scalar_tag_names_the_tag() {
        let node = SourceNode::scalar("x").with_tag("!custom");
        let err = classify_scalar(&node).unwrap_err();
        assert!(err.contains("!custom"), "{err}");
    }

    #[test]
    fn quoted_scalars_are_strings() {
        for text in ["true", "1", "1.5", "~", "2001-12-14 21:59:43"] {
            assert_eq!(classify_scalar(&SourceNode::quoted(text)), Ok(ScalarKind::Str));
        }
    }

    #[test]
    fn implicit_scalar_kinds() {
        let cases = [
            ("yes", ScalarKind::Bool),
            ("Off", ScalarKind::Bool),
            ("2.7", ScalarKind::Float),
            (".inf", ScalarKind::Float),
            ("", ScalarKind::Null),
            ("~", ScalarKind::Null),
            ("2001-12-14t21:59:43.10-05:00", ScalarKind::Time),
            ("42", ScalarKind::Int),
            ("0x1F", ScalarKind::Int),
            ("ruby", ScalarKind::Str),
            ("2001-12-14", ScalarKind::Str),
        ];
        for (text, kind) in cases {
            assert_eq!(implicit_scalar_kind(text), kind, "{text:?}");
        }
    }

    #[test]
    fn secure_pair_mapping() {
        let node = SourceNode::mapping([(SourceNode::scalar("secure"), SourceNode::quoted("abc"))]);
        assert_eq!(classify_mapping(&node), MappingKind::Secure);

        let tagged = node.clone().with_tag("!!map");
        assert_eq!(classify_mapping(&tagged), MappingKind::Map);

        let two_fields = SourceNode::mapping([
            (SourceNode::scalar("secure"), SourceNode::quoted("abc")),
            (SourceNode::scalar("other"), SourceNode::quoted("def")),
        ]);
        assert_eq!(classify_mapping(&two_fields), MappingKind::Map);
    }

    #[test]
    fn mapping_and_sequence_tags() {
        let map = SourceNode::mapping([]);
        assert_eq!(classify_mapping(&map.clone().with_tag("!!omap")), MappingKind::Omap);
        assert_eq!(classify_mapping(&map.clone().with_tag("!!pairs")), MappingKind::Pairs);
        assert_eq!(classify_mapping(&map.clone().with_tag("!!set")), MappingKind::Set);
        assert_eq!(classify_mapping(&map.clone().with_tag("!!seq")), MappingKind::Seq);
        assert!(matches!(classify_mapping(&map.with_tag("!foo")), MappingKind::Unexpected(_)));

        let seq = SourceNode::sequence(vec![]);
        assert_eq!(classify_sequence(&seq), SequenceKind::Seq);
        assert_eq!(classify_sequence(&seq.clone().with_tag("!!set")), SequenceKind::Set);
        assert!(matches!(classify_sequence(&seq.with_tag("!!map")), SequenceKind::Unexpected(_)));
    }
}
