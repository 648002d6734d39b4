#![forbid(unsafe_code)]
//! Typed, schema-validated CI build configuration from YAML.
//!
//! A document is read into a generic [`SourceNode`] tree, then walked by an
//! [`Adapter`] that classifies every node by structure and tag and builds the
//! typed [`Root`] of a build configuration. Whatever does not fit the schema
//! is pruned and reported as a warning; only unreadable YAML fails.
//!
//! ```rust
//! let root = ci_yaml::parse("language: ruby\nrvm: '3.2'\nscript: rake\n").unwrap();
//! assert_eq!(root.language(), Some("ruby"));
//! assert_eq!(root.ruby(), Some("3.2"));
//! assert_eq!(root.stage("script").unwrap().strings(), ["rake"]);
//! assert!(root.nested_warnings().is_empty());
//! ```

pub mod adapter;
pub mod budget;
pub mod error;
pub mod frontend;
pub mod location;
#[macro_use]
mod macros;
pub mod nodes;
pub mod options;
pub mod parse_scalars;
pub mod source;
pub mod tags;
pub mod value;

use tracing::debug;

pub use adapter::Adapter;
pub use budget::Budget;
pub use error::{Error, Location};
pub use nodes::{Mapping, Node, Root, Scalar, Sequence, Visit, Warning};
pub use options::Options;
pub use source::{SourceBody, SourceKind, SourceNode};
pub use tags::ScalarKind;
pub use value::{SecureValue, Value};

/// Parse YAML text into a verified [`Root`] with default [`Options`].
pub fn parse(input: &str) -> Result<Root, Error> {
    parse_with_options(input, Options::default())
}

/// Parse YAML text into a verified [`Root`].
///
/// Only the first document is used; an empty stream gives an empty `Root`.
/// Fails only when the text cannot be scanned or breaches the budget.
pub fn parse_with_options(input: &str, options: Options) -> Result<Root, Error> {
    let stream = frontend::read_stream(input, &options)?;
    if stream.children().len() > 1 {
        debug!(
            documents = stream.children().len(),
            "ignoring documents after the first"
        );
    }
    Ok(parse_source_with_options(&stream, &options))
}

/// Build a verified [`Root`] from a hand-built source tree.
pub fn parse_source(source: &SourceNode) -> Root {
    parse_source_with_options(source, &Options::default())
}

/// Build a verified [`Root`] from a source tree.
///
/// A stream contributes its first document. The returned root has had
/// [`deep_verify`](Visit::deep_verify) applied, so it carries no errors.
pub fn parse_source_with_options(source: &SourceNode, options: &Options) -> Root {
    let mut root = Root::new();
    let mut adapter = Adapter::new(options);
    match source.first_document() {
        Some(document) => adapter.accept(&mut root, document),
        None => root.verify(),
    }
    root.deep_verify();
    root
}
