//! editorscout Citation Search
//!
//! Breadth-first search over the citation graph starting from bibliography
//! seeds:
//! - Neighbor sources (remote graph service or in-memory graph)
//! - Bounded BFS with deduplication and provenance tracking
//! - Editor matching and console reporting

pub mod citation;

pub use citation::{
    check_papers, CancellationFlag, CitationGraph, CitationTraversal, Findings, MatchReporter,
    NeighborSource, StopReason, TraversalOutcome,
};
