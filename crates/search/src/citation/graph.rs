//! In-memory citation graph
//!
//! A [`NeighborSource`] backed by a local adjacency list. Traversal tests use
//! it in place of the remote graph service; it also counts lookups.

use super::NeighborSource;
use async_trait::async_trait;
use editorscout_common::errors::Result;
use editorscout_common::{Neighbors, Paper, PaperId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory citation graph
#[derive(Debug, Default)]
pub struct CitationGraph {
    /// Adjacency list: paper_id -> list of papers it cites
    outgoing: HashMap<PaperId, Vec<PaperId>>,

    /// Reverse adjacency: paper_id -> list of papers citing it
    incoming: HashMap<PaperId, Vec<PaperId>>,

    /// All nodes (paper IDs)
    nodes: HashSet<PaperId>,

    /// Paper titles for display
    titles: HashMap<PaperId, String>,

    /// Neighbor lookups served
    lookups: AtomicUsize,
}

impl CitationGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a paper with its display title
    pub fn add_paper(&mut self, id: impl Into<PaperId>, title: impl Into<String>) {
        let id = id.into();
        self.nodes.insert(id.clone());
        self.titles.insert(id, title.into());
    }

    /// Add an edge: `citing` cites `cited`
    pub fn add_edge(&mut self, citing: impl Into<PaperId>, cited: impl Into<PaperId>) {
        let citing = citing.into();
        let cited = cited.into();

        self.nodes.insert(citing.clone());
        self.nodes.insert(cited.clone());

        self.outgoing.entry(citing.clone()).or_default().push(cited.clone());
        self.incoming.entry(cited).or_default().push(citing);
    }

    /// Get papers cited by this paper
    pub fn get_references(&self, paper_id: &PaperId) -> &[PaperId] {
        self.outgoing.get(paper_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get papers citing this paper
    pub fn get_citations(&self, paper_id: &PaperId) -> &[PaperId] {
        self.incoming.get(paper_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get paper title (the id when no title was added)
    pub fn get_title<'a>(&'a self, paper_id: &'a PaperId) -> &'a str {
        self.titles
            .get(paper_id)
            .map(String::as_str)
            .unwrap_or_else(|| paper_id.as_str())
    }

    /// Number of neighbor lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    fn papers(&self, ids: &[PaperId]) -> Vec<Paper> {
        ids.iter()
            .map(|id| Paper::new(id.clone(), self.get_title(id)))
            .collect()
    }
}

#[async_trait]
impl NeighborSource for CitationGraph {
    async fn neighbors_of(&self, paper_id: &PaperId) -> Result<Neighbors> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(Neighbors {
            citing: self.papers(self.get_citations(paper_id)),
            referenced: self.papers(self.get_references(paper_id)),
        })
    }
}
