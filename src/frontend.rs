//! YAML text to [`SourceNode`] trees.
//!
//! Drives `saphyr_parser::Parser` and folds its event stream into one
//! [`SourceBody::Stream`] node holding every document. Scalars keep their
//! literal text, tag and quoting; collections keep their tag; anchored nodes
//! are remembered per document so aliases can point at them.
//!
//! Every raw event passes the configured [`Budget`](crate::Budget) first, so
//! hostile input fails here before any tree is built for it.

use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;

use saphyr_parser::{Event, Parser, ScalarStyle, Tag};
use tracing::{debug, trace};

use crate::budget::BudgetEnforcer;
use crate::error::{Error, budget_error};
use crate::location::{Location, location_from_span};
use crate::options::Options;
use crate::source::{SourceBody, SourceNode};

/// A container still waiting for its end event.
#[derive(Debug)]
enum Frame {
    Stream(Vec<SourceNode>),
    Document {
        location: Location,
        root: Option<SourceNode>,
    },
    Sequence {
        open: Open,
        items: Vec<SourceNode>,
    },
    Mapping {
        open: Open,
        children: Vec<SourceNode>,
    },
}

/// What a collection start event said about the collection.
#[derive(Debug)]
struct Open {
    anchor: usize,
    tag: Option<String>,
    location: Location,
}

struct Builder {
    stack: Vec<Frame>,
    /// Anchored nodes of the current document.
    anchors: HashMap<usize, Rc<SourceNode>>,
    stream: Option<SourceNode>,
    last_location: Location,
}

/// Parse YAML text into a stream node.
///
/// Only scanner errors and budget breaches fail; everything else is left for
/// the adapter to judge.
pub fn read_stream(input: &str, options: &Options) -> Result<SourceNode, Error> {
    let mut parser = Parser::new_from_str(input);
    let mut budget = options.budget.clone().map(BudgetEnforcer::new);
    let mut builder = Builder::new();

    while let Some(item) = parser.next() {
        let (event, span) = item.map_err(Error::from_scan_error)?;
        let location = location_from_span(&span);

        if let Some(budget) = budget.as_mut() {
            budget
                .observe(&event)
                .map_err(|breach| budget_error(breach).with_location(location))?;
        }

        builder.last_location = location;
        builder.event(event, location)?;
    }

    if let Some(budget) = budget {
        let report = budget.into_report();
        debug!(
            events = report.events,
            nodes = report.nodes,
            documents = report.documents,
            "yaml budget report"
        );
    }

    builder.finish()
}

impl Builder {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            anchors: HashMap::new(),
            stream: None,
            last_location: Location::UNKNOWN,
        }
    }

    fn event(&mut self, event: Event<'_>, location: Location) -> Result<(), Error> {
        trace!(?event, %location, "yaml event");
        match event {
            Event::Nothing => {}
            Event::StreamStart => self.stack.push(Frame::Stream(Vec::new())),
            Event::StreamEnd => match self.stack.pop() {
                Some(Frame::Stream(documents)) => {
                    self.stream = Some(SourceNode::stream(documents));
                }
                _ => return Err(Error::ContainerEndMismatch { location }),
            },
            Event::DocumentStart(_explicit) => {
                self.anchors.clear();
                self.stack.push(Frame::Document {
                    location,
                    root: None,
                });
            }
            Event::DocumentEnd => match self.stack.pop() {
                Some(Frame::Document { location, root }) => {
                    self.push(SourceNode::document(root).with_location(location))?;
                }
                _ => return Err(Error::ContainerEndMismatch { location }),
            },
            Event::Scalar(value, style, anchor, tag) => {
                let node = SourceNode {
                    tag: tag.as_deref().map(tag_text),
                    location,
                    body: SourceBody::Scalar {
                        value: match value {
                            Cow::Borrowed(v) => v.to_owned(),
                            Cow::Owned(v) => v,
                        },
                        quoted: !matches!(style, ScalarStyle::Plain),
                    },
                };
                self.complete(anchor, node)?;
            }
            Event::SequenceStart(anchor, tag) => self.stack.push(Frame::Sequence {
                open: Open {
                    anchor,
                    tag: tag.as_deref().map(tag_text),
                    location,
                },
                items: Vec::new(),
            }),
            Event::SequenceEnd => match self.stack.pop() {
                Some(Frame::Sequence { open, items }) => {
                    let node = finish_collection(SourceNode::sequence(items), &open);
                    self.complete(open.anchor, node)?;
                }
                _ => return Err(Error::ContainerEndMismatch { location }),
            },
            Event::MappingStart(anchor, tag) => self.stack.push(Frame::Mapping {
                open: Open {
                    anchor,
                    tag: tag.as_deref().map(tag_text),
                    location,
                },
                children: Vec::new(),
            }),
            Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Mapping { open, children }) => {
                    let node = finish_collection(SourceNode::flat_mapping(children), &open);
                    self.complete(open.anchor, node)?;
                }
                _ => return Err(Error::ContainerEndMismatch { location }),
            },
            Event::Alias(anchor) => {
                let target = self.anchors.get(&anchor).cloned();
                if target.is_none() {
                    debug!(anchor, %location, "alias to unknown anchor");
                }
                self.push(SourceNode::alias(anchor, target).with_location(location))?;
            }
        }
        Ok(())
    }

    /// Remember an anchored node, then hand it to the enclosing container.
    /// The copy kept for aliases shares the node's children.
    fn complete(&mut self, anchor: usize, node: SourceNode) -> Result<(), Error> {
        if anchor != 0 {
            self.anchors.insert(anchor, Rc::new(node.clone()));
        }
        self.push(node)
    }

    fn push(&mut self, node: SourceNode) -> Result<(), Error> {
        match self.stack.last_mut() {
            Some(Frame::Stream(documents)) => documents.push(node),
            Some(Frame::Document { root, .. }) => *root = Some(node),
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping { children, .. }) => children.push(node),
            None => {
                return Err(Error::msg("node outside of any document").with_location(node.location));
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<SourceNode, Error> {
        if !self.stack.is_empty() {
            return Err(Error::msg("unexpected end of input").with_location(self.last_location));
        }
        Ok(self.stream.unwrap_or_else(|| SourceNode::stream(Vec::new())))
    }
}

/// Tag as written, with core tags resolved to `tag:yaml.org,2002:`.
///
/// The non-specific `!` and verbatim `!<...>` tags arrive with an empty
/// handle; they are kept as their bare suffix.
fn tag_text(tag: &Tag) -> String {
    if tag.handle.is_empty() {
        tag.suffix.clone()
    } else {
        tag.to_string()
    }
}

fn finish_collection(node: SourceNode, open: &Open) -> SourceNode {
    let node = node.with_location(open.location);
    match &open.tag {
        Some(tag) => node.with_tag(tag.clone()),
        None => node,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;

    fn parse(input: &str) -> SourceNode {
        read_stream(input, &Options::default()).expect("parse")
    }

    fn root(stream: &SourceNode) -> &SourceNode {
        match &stream.first_document().expect("document").body {
            SourceBody::Document(Some(root)) => root,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scalars_keep_quoting_and_location() {
        let stream = parse("a: 'quoted'\nb: plain\n");
        let map = root(&stream);
        assert_eq!(map.kind(), SourceKind::Mapping);
        let children = map.children();
        assert_eq!(children.len(), 4);
        assert!(children[1].is_quoted());
        assert!(!children[3].is_quoted());
        assert_eq!(children[3].literal(), Some("plain"));
        assert_eq!(children[2].location.line(), 2);
    }

    #[test]
    fn aliases_point_at_anchored_nodes() {
        let stream = parse("a: &x [1, 2]\nb: *x\n");
        let children = root(&stream).children();
        assert_eq!(children[3].kind(), SourceKind::Alias);
        assert_eq!(children[3].resolved().children().len(), 2);
    }

    #[test]
    fn anchored_lists_share_children_with_their_aliases() {
        let stream = parse("outer: &o [&i [rake, rspec]]\ninner: *i\nagain: *o\n");
        let children = root(&stream).children();
        let inner = &children[1].children()[0];
        let shares = |alias: &SourceNode, node: &SourceNode| {
            match (alias.resolved().shared_children(), node.shared_children()) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            }
        };
        assert!(shares(&children[3], inner));
        assert!(shares(&children[5], &children[1]));
    }

    #[test]
    fn non_specific_tag_keeps_its_spelling() {
        let stream = parse("a: ! foo\nb: !<tag:yaml.org,2002:str> bar\nc: !secure x\n");
        let children = root(&stream).children();
        assert_eq!(children[1].tag(), Some("!"));
        assert_eq!(children[3].tag(), Some("tag:yaml.org,2002:str"));
        assert_eq!(children[5].tag(), Some("!secure"));
    }

    #[test]
    fn every_document_is_kept() {
        let stream = parse("a: 1\n---\nb: 2\n");
        assert_eq!(stream.kind(), SourceKind::Stream);
        assert_eq!(stream.children().len(), 2);
    }

    #[test]
    fn empty_input_is_an_empty_stream() {
        let stream = parse("");
        assert_eq!(stream.first_document(), None);
    }

    #[test]
    fn scanner_errors_carry_a_location() {
        let err = read_stream("a: [1, 2\n", &Options::default()).unwrap_err();
        assert!(err.location().is_some(), "{err}");
    }
}
