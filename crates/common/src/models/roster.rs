//! Editor roster: who authored which papers

use super::PaperId;
use std::collections::{BTreeMap, HashSet};

/// Mapping from editor name to the graph ids of papers they authored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    editors: BTreeMap<String, HashSet<PaperId>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an editor's papers. Editors without any paper are not kept.
    pub fn insert<I>(&mut self, editor: impl Into<String>, papers: I) -> bool
    where
        I: IntoIterator<Item = PaperId>,
    {
        let papers: HashSet<PaperId> = papers.into_iter().collect();
        if papers.is_empty() {
            return false;
        }
        self.editors.entry(editor.into()).or_default().extend(papers);
        true
    }

    /// Editors and their paper ids, ordered by editor name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashSet<PaperId>)> {
        self.editors.iter().map(|(name, ids)| (name.as_str(), ids))
    }

    pub fn papers_of(&self, editor: &str) -> Option<&HashSet<PaperId>> {
        self.editors.get(editor)
    }

    /// Number of editors
    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }

    /// Total paper ids across all editors
    pub fn paper_count(&self) -> usize {
        self.editors.values().map(HashSet::len).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<PaperId>)> for Roster {
    fn from_iter<T: IntoIterator<Item = (S, Vec<PaperId>)>>(iter: T) -> Self {
        let mut roster = Roster::new();
        for (editor, papers) in iter {
            roster.insert(editor, papers);
        }
        roster
    }
}
