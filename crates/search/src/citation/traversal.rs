//! Bounded breadth-first traversal of the citation graph
//!
//! Seeds form depth 0. Each dequeued paper is expanded through its citing and
//! referenced neighbors; neighbors not seen before are linked to the paper,
//! queued, and matched against the roster. The first dequeued paper deeper
//! than the configured depth ends the whole traversal.

use super::findings::{check_papers, Findings, MatchReporter};
use super::NeighborSource;
use editorscout_common::errors::Result;
use editorscout_common::metrics;
use editorscout_common::{Neighbors, Paper, PaperId, Roster};
use std::collections::{HashSet, VecDeque};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cooperative stop request, checked once per dequeued paper
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why the traversal loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Frontier ran empty
    Exhausted,
    /// A dequeued paper was deeper than the limit
    DepthExceeded,
    /// Cancellation was requested
    Interrupted,
}

/// Result of a traversal
#[derive(Debug, Clone)]
pub struct TraversalOutcome {
    /// Distinct papers discovered, seeds included
    pub visited: usize,
    /// Papers whose neighbors were fetched
    pub expanded: usize,
    /// Editor matches
    pub findings: Findings,
    pub stop_reason: StopReason,
}

/// Breadth-first search from seed papers
pub struct CitationTraversal<'a, S: ?Sized, W> {
    source: &'a S,
    roster: &'a Roster,
    max_depth: usize,
    reporter: &'a mut MatchReporter<W>,
    cancel: CancellationFlag,
    frontier: VecDeque<Arc<Paper>>,
    visited: HashSet<PaperId>,
    findings: Findings,
}

impl<'a, S, W> CitationTraversal<'a, S, W>
where
    S: NeighborSource + ?Sized,
    W: Write,
{
    pub fn new(
        source: &'a S,
        roster: &'a Roster,
        max_depth: usize,
        reporter: &'a mut MatchReporter<W>,
    ) -> Self {
        Self {
            source,
            roster,
            max_depth,
            reporter,
            cancel: CancellationFlag::new(),
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            findings: Findings::new(),
        }
    }

    /// Stop at the next dequeue once `flag` is cancelled
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = flag;
        self
    }

    /// Run the search to completion, depth cutoff, or cancellation
    pub async fn run(mut self, seeds: Vec<Paper>) -> Result<TraversalOutcome> {
        let seeds: Vec<Arc<Paper>> = seeds
            .into_iter()
            .filter(|seed| {
                let fresh = self.visited.insert(seed.id().clone());
                if !fresh {
                    debug!(paper_id = %seed.id(), "Duplicate seed skipped");
                }
                fresh
            })
            .map(Arc::new)
            .collect();

        metrics::record_papers_visited(seeds.len());
        info!(
            seeds = seeds.len(),
            max_depth = self.max_depth,
            editors = self.roster.len(),
            "Beginning BFS"
        );

        check_papers(&seeds, self.roster, &mut self.findings, self.reporter)?;
        self.frontier.extend(seeds);

        let mut expanded = 0usize;
        let stop_reason = loop {
            if self.cancel.is_cancelled() {
                warn!("Interrupted, stopping BFS");
                break StopReason::Interrupted;
            }

            let Some(paper) = self.frontier.pop_front() else {
                break StopReason::Exhausted;
            };

            let depth = paper.path_depth();
            if depth > self.max_depth {
                debug!(paper_id = %paper.id(), depth, "Depth limit reached");
                break StopReason::DepthExceeded;
            }

            let neighbors = self.source.neighbors_of(paper.id()).await?;
            let batch = self.admit(&paper, neighbors)?;
            expanded += 1;

            debug!(
                paper_id = %paper.id(),
                depth,
                discovered = batch.len(),
                visited = self.visited.len(),
                frontier = self.frontier.len(),
                "Expanded paper"
            );

            metrics::record_papers_visited(batch.len());
            self.frontier.extend(batch.iter().cloned());
            check_papers(&batch, self.roster, &mut self.findings, self.reporter)?;
        };

        info!(
            visited = self.visited.len(),
            expanded,
            matches = self.findings.match_count(),
            stop_reason = ?stop_reason,
            "BFS finished"
        );

        Ok(TraversalOutcome {
            visited: self.visited.len(),
            expanded,
            findings: self.findings,
            stop_reason,
        })
    }

    /// Link unseen neighbors to `parent`: citing papers first, then
    /// referenced papers. Every admitted id is marked visited here.
    fn admit(&mut self, parent: &Arc<Paper>, neighbors: Neighbors) -> Result<Vec<Arc<Paper>>> {
        let mut batch = Vec::new();

        for citing in neighbors.citing {
            if self.visited.insert(citing.id().clone()) {
                batch.push(Arc::new(citing.with_cited_by(parent.clone())?));
            }
        }

        for referenced in neighbors.referenced {
            if self.visited.insert(referenced.id().clone()) {
                batch.push(Arc::new(referenced.with_referenced_by(parent.clone())?));
            }
        }

        Ok(batch)
    }
}
