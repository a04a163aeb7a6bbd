//! Paper record with single-parent provenance
//!
//! A paper discovered by the traversal remembers exactly one edge back toward
//! the bibliography: the paper it cited, or the paper that referenced it.
//! Seeds carry no edge.

use crate::errors::{Result, ScoutError};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Graph-native paper identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperId(String);

impl PaperId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PaperId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PaperId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PaperId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// How a paper was reached from its parent
#[derive(Debug, Clone)]
pub enum Provenance {
    /// Seed paper, or a neighbor not yet linked into the traversal
    Root,
    /// This paper cited the parent
    Cited(Arc<Paper>),
    /// This paper was referenced by the parent
    ReferencedBy(Arc<Paper>),
}

impl Provenance {
    /// The parent paper, if any
    pub fn parent(&self) -> Option<&Arc<Paper>> {
        match self {
            Provenance::Root => None,
            Provenance::Cited(parent) | Provenance::ReferencedBy(parent) => Some(parent),
        }
    }

    /// Phrase used when rendering this hop of a discovery path
    pub fn relation(&self) -> Option<&'static str> {
        match self {
            Provenance::Root => None,
            Provenance::Cited(_) => Some("which cited"),
            Provenance::ReferencedBy(_) => Some("which was referenced by"),
        }
    }
}

/// A paper in the citation graph
#[derive(Debug, Clone)]
pub struct Paper {
    id: PaperId,
    title: String,
    provenance: Provenance,
}

impl Paper {
    /// Create an unlinked paper
    pub fn new(id: impl Into<PaperId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            provenance: Provenance::Root,
        }
    }

    pub fn id(&self) -> &PaperId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Link this paper as one that cited `parent`
    pub fn with_cited_by(self, parent: Arc<Paper>) -> Result<Self> {
        self.link(Provenance::Cited(parent))
    }

    /// Link this paper as one referenced by `parent`
    pub fn with_referenced_by(self, parent: Arc<Paper>) -> Result<Self> {
        self.link(Provenance::ReferencedBy(parent))
    }

    fn link(mut self, provenance: Provenance) -> Result<Self> {
        if !matches!(self.provenance, Provenance::Root) {
            return Err(ScoutError::ProvenanceAlreadySet {
                id: self.id.to_string(),
            });
        }
        self.provenance = provenance;
        Ok(self)
    }

    /// Walk the provenance chain toward the seed, parent first
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: self.provenance.parent().map(Arc::as_ref),
        }
    }

    /// Number of provenance hops to a seed (0 for seeds)
    pub fn path_depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Human-readable discovery chain from this paper back to its seed
    pub fn path_description(&self) -> String {
        let mut out = format!("\"{}\"", self.title);
        let mut current = self;
        while let (Some(relation), Some(parent)) =
            (current.provenance.relation(), current.provenance.parent())
        {
            out.push_str("\n    ");
            out.push_str(relation);
            out.push_str(" \"");
            out.push_str(&parent.title);
            out.push('"');
            current = parent.as_ref();
        }
        out
    }
}

impl fmt::Display for Paper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Paper(id={}, title='{}')", self.id, self.title)
    }
}

/// Unlinked neighbors of one paper in the citation graph
#[derive(Debug, Clone, Default)]
pub struct Neighbors {
    /// Papers citing the paper
    pub citing: Vec<Paper>,
    /// Papers the paper references
    pub referenced: Vec<Paper>,
}

impl Neighbors {
    pub fn is_empty(&self) -> bool {
        self.citing.is_empty() && self.referenced.is_empty()
    }
}

/// Iterator over a paper's provenance ancestors
pub struct Ancestors<'a> {
    next: Option<&'a Paper>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Paper;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.provenance.parent().map(Arc::as_ref);
        Some(current)
    }
}
