use serde::{Deserialize, Serialize};

use crate::budget::Budget;

/// What to do when one mapping field is given more than once, either as a
/// repeated key or through several of its aliases (`ruby` and `rvm`).
///
/// In every case the last occurrence overwrites the earlier ones and the field
/// keeps the position of its first occurrence.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicateFieldPolicy {
    /// Last occurrence wins and a warning naming both keys is recorded.
    #[default]
    Warn,
    /// Last occurrence wins silently.
    LastWins,
}

/// Parser configuration options.
///
/// ```rust
/// use ci_yaml::options::DuplicateFieldPolicy;
///
/// let options = ci_yaml::options! {
///     duplicate_fields: DuplicateFieldPolicy::LastWins,
/// };
///
/// let root = ci_yaml::parse_with_options("language: ruby\nruby: '3.2'\nrvm: '2.7'\n", options).unwrap();
/// assert!(root.nested_warnings().is_empty());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Options {
    /// Optional YAML budget enforced on raw parser events while reading text.
    pub budget: Option<Budget>,
    /// Policy for fields given more than once.
    pub duplicate_fields: DuplicateFieldPolicy,
    /// Maximum nesting the adapter follows before rejecting a subtree.
    /// Alias expansion counts towards the depth.
    pub max_depth: usize,
    /// Maximum number of source nodes the adapter visits for one document.
    /// Guards against alias fan-out that the raw event budget cannot see.
    pub max_nodes: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            budget: Some(Budget::default()),
            duplicate_fields: DuplicateFieldPolicy::default(),
            max_depth: 128,
            max_nodes: 100_000,
        }
    }
}
