//! Resource limits on the raw YAML event stream.
//!
//! A build configuration is small; anything that needs millions of events,
//! thousands of anchors or hundreds of nesting levels is rejected before a
//! source tree is built for it.

use std::collections::HashSet;
use std::fmt;

use saphyr_parser::{Event, Parser, ScanError};
use serde::{Deserialize, Serialize};

/// Limits checked against every parser event while a document is read.
///
/// ```rust
/// let options = ci_yaml::options! {
///     budget: Some(ci_yaml::budget! {
///         max_documents: 1,
///     }),
/// };
///
/// let root = ci_yaml::parse_with_options("language: ruby\n", options).unwrap();
/// assert!(root.nested_warnings().is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Parser events of any kind. Default 1,000,000.
    pub max_events: usize,
    /// `*alias` references. Default 10,000.
    pub max_aliases: usize,
    /// Distinct `&anchor` definitions. Default 10,000.
    pub max_anchors: usize,
    /// Open sequences and mappings at any one time. Default 512.
    pub max_depth: usize,
    /// Documents in the stream. Default 64.
    pub max_documents: usize,
    /// Scalars, sequences and mappings together. Default 250,000.
    pub max_nodes: usize,
    /// Bytes of scalar text, summed. Default 16 MiB.
    pub max_total_scalar_bytes: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_events: 1_000_000,
            max_aliases: 10_000,
            max_anchors: 10_000,
            max_depth: 512,
            max_documents: 64,
            max_nodes: 250_000,
            max_total_scalar_bytes: 16 * 1024 * 1024,
        }
    }
}

/// The first limit a stream went over, with the count that broke it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BudgetBreach {
    Events { events: usize },
    Aliases { aliases: usize },
    Anchors { anchors: usize },
    Depth { depth: usize },
    Documents { documents: usize },
    Nodes { nodes: usize },
    ScalarBytes { total_scalar_bytes: usize },
    /// An end event without its start.
    Unbalanced,
}

impl fmt::Display for BudgetBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetBreach::Events { events } => write!(f, "too many parser events ({events})"),
            BudgetBreach::Aliases { aliases } => write!(f, "too many aliases ({aliases})"),
            BudgetBreach::Anchors { anchors } => write!(f, "too many anchors ({anchors})"),
            BudgetBreach::Depth { depth } => write!(f, "nesting too deep ({depth})"),
            BudgetBreach::Documents { documents } => {
                write!(f, "too many documents ({documents})")
            }
            BudgetBreach::Nodes { nodes } => write!(f, "too many nodes ({nodes})"),
            BudgetBreach::ScalarBytes { total_scalar_bytes } => {
                write!(f, "scalar content too large ({total_scalar_bytes} bytes)")
            }
            BudgetBreach::Unbalanced => f.write_str("unbalanced collection events"),
        }
    }
}

/// Counters gathered while reading, and the breach that stopped it if any.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BudgetReport {
    pub breached: Option<BudgetBreach>,
    pub events: usize,
    pub aliases: usize,
    pub anchors: usize,
    pub documents: usize,
    pub nodes: usize,
    /// Deepest nesting seen.
    pub max_depth: usize,
    pub total_scalar_bytes: usize,
}

/// Applies a [`Budget`] to parser [`Event`]s one at a time.
#[derive(Debug)]
pub struct BudgetEnforcer {
    budget: Budget,
    report: BudgetReport,
    open: usize,
    anchors: HashSet<usize>,
}

/// `Err` built by `breach` once `count` is past `limit`.
fn within(
    count: usize,
    limit: usize,
    breach: fn(usize) -> BudgetBreach,
) -> Result<(), BudgetBreach> {
    if count > limit { Err(breach(count)) } else { Ok(()) }
}

impl BudgetEnforcer {
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            report: BudgetReport::default(),
            open: 0,
            anchors: HashSet::new(),
        }
    }

    /// Count one event. Fails on the first limit it breaks.
    pub fn observe(&mut self, event: &Event) -> Result<(), BudgetBreach> {
        let report = &mut self.report;
        report.events += 1;
        within(report.events, self.budget.max_events, |events| {
            BudgetBreach::Events { events }
        })?;

        match event {
            Event::DocumentStart(_) => {
                self.report.documents += 1;
                within(
                    self.report.documents,
                    self.budget.max_documents,
                    |documents| BudgetBreach::Documents { documents },
                )
            }
            Event::Alias(_) => {
                self.report.aliases += 1;
                within(self.report.aliases, self.budget.max_aliases, |aliases| {
                    BudgetBreach::Aliases { aliases }
                })
            }
            Event::Scalar(text, _, anchor, _) => {
                self.node(*anchor)?;
                self.report.total_scalar_bytes =
                    self.report.total_scalar_bytes.saturating_add(text.len());
                within(
                    self.report.total_scalar_bytes,
                    self.budget.max_total_scalar_bytes,
                    |total_scalar_bytes| BudgetBreach::ScalarBytes { total_scalar_bytes },
                )
            }
            Event::SequenceStart(anchor, _) | Event::MappingStart(anchor, _) => {
                self.node(*anchor)?;
                self.open += 1;
                self.report.max_depth = self.report.max_depth.max(self.open);
                within(self.open, self.budget.max_depth, |depth| {
                    BudgetBreach::Depth { depth }
                })
            }
            Event::SequenceEnd | Event::MappingEnd => {
                self.open = self.open.checked_sub(1).ok_or(BudgetBreach::Unbalanced)?;
                Ok(())
            }
            Event::StreamStart | Event::StreamEnd | Event::DocumentEnd | Event::Nothing => Ok(()),
        }
    }

    /// Count a scalar or collection, and its anchor if it has one.
    fn node(&mut self, anchor: usize) -> Result<(), BudgetBreach> {
        self.report.nodes += 1;
        within(self.report.nodes, self.budget.max_nodes, |nodes| {
            BudgetBreach::Nodes { nodes }
        })?;
        if anchor != 0 {
            self.anchors.insert(anchor);
            self.report.anchors = self.anchors.len();
            within(self.report.anchors, self.budget.max_anchors, |anchors| {
                BudgetBreach::Anchors { anchors }
            })?;
        }
        Ok(())
    }

    pub fn into_report(self) -> BudgetReport {
        self.report
    }
}

/// Measure `input` against `budget` without building anything.
///
/// A breach is reported in [`BudgetReport::breached`]; only a scanner error
/// is an `Err`.
pub fn check_yaml_budget(input: &str, budget: &Budget) -> Result<BudgetReport, ScanError> {
    let mut enforcer = BudgetEnforcer::new(budget.clone());
    for item in Parser::new_from_str(input) {
        let (event, _) = item?;
        if let Err(breach) = enforcer.observe(&event) {
            let mut report = enforcer.into_report();
            report.breached = Some(breach);
            return Ok(report);
        }
    }
    Ok(enforcer.into_report())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(yaml: &str, budget: Budget) -> BudgetReport {
        check_yaml_budget(yaml, &budget).expect("scan")
    }

    #[test]
    fn typical_config_fits() {
        let r = report("language: ruby\nscript: [rake, rspec]\n", Budget::default());
        assert_eq!(r.breached, None);
        assert_eq!(r.documents, 1);
        assert_eq!(r.max_depth, 2);
        assert_eq!(r.nodes, 7);
    }

    #[test]
    fn shared_stage_lists_count_aliases() {
        let yaml = "base: &A [rake]\ninstall: *A\nscript: *A\nbefore_script: *A\n";
        let r = report(yaml, Budget { max_aliases: 2, ..Budget::default() });
        assert_eq!(r.breached, Some(BudgetBreach::Aliases { aliases: 3 }));
    }

    #[test]
    fn nesting_is_limited() {
        let yaml = format!("{}{}", "[".repeat(100), "]".repeat(100));
        let r = report(&yaml, Budget { max_depth: 50, ..Budget::default() });
        assert_eq!(r.breached, Some(BudgetBreach::Depth { depth: 51 }));
    }

    #[test]
    fn anchors_are_limited() {
        let yaml = "a: &A 1\nb: &B 2\nc: &C 3\n";
        let r = report(yaml, Budget { max_anchors: 2, ..Budget::default() });
        assert_eq!(r.breached, Some(BudgetBreach::Anchors { anchors: 3 }));
    }

    #[test]
    fn documents_are_limited() {
        let yaml = "---\nlanguage: ruby\n---\nlanguage: go\n";
        let r = report(yaml, Budget { max_documents: 1, ..Budget::default() });
        assert_eq!(r.breached, Some(BudgetBreach::Documents { documents: 2 }));
    }

    #[test]
    fn scalar_bytes_are_limited() {
        let yaml = "script: [aaaaaaaaaa, bbbbbbbbbb]\n";
        let r = report(yaml, Budget { max_total_scalar_bytes: 15, ..Budget::default() });
        assert_eq!(
            r.breached,
            Some(BudgetBreach::ScalarBytes { total_scalar_bytes: 16 })
        );
    }
}
