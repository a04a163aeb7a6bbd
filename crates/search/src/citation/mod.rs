//! Citation graph search
//!
//! Expands papers through their citing and referenced neighbors and reports
//! every paper that appears in the editor roster.

mod findings;
mod graph;
mod source;
mod traversal;

pub use findings::{check_papers, render_summary, Findings, MatchReporter};
pub use graph::CitationGraph;
pub use source::NeighborSource;
pub use traversal::{CancellationFlag, CitationTraversal, StopReason, TraversalOutcome};
