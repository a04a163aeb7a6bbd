//! Editor matches and their console rendering

use editorscout_common::errors::Result;
use editorscout_common::metrics;
use editorscout_common::{Paper, Roster};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

/// Papers matched to each editor, in discovery order
#[derive(Debug, Clone, Default)]
pub struct Findings {
    by_editor: BTreeMap<String, Vec<Arc<Paper>>>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `paper` to the editor's matches.
    ///
    /// Returns false when the same paper is already recorded for the editor.
    pub fn record(&mut self, editor: &str, paper: &Arc<Paper>) -> bool {
        let papers = self.by_editor.entry(editor.to_string()).or_default();
        if papers.iter().any(|p| p.id() == paper.id()) {
            return false;
        }
        papers.push(paper.clone());
        true
    }

    /// Matches for one editor
    pub fn papers_of(&self, editor: &str) -> &[Arc<Paper>] {
        self.by_editor.get(editor).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Editors with their matches, ordered by editor name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<Paper>])> {
        self.by_editor
            .iter()
            .map(|(editor, papers)| (editor.as_str(), papers.as_slice()))
    }

    /// Number of editors with at least one match
    pub fn editor_count(&self) -> usize {
        self.by_editor.len()
    }

    /// Total matches across editors
    pub fn match_count(&self) -> usize {
        self.by_editor.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_editor.is_empty()
    }
}

/// Writes match notices as they happen and the final summary
pub struct MatchReporter<W> {
    out: W,
}

impl MatchReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> MatchReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Immediate notice for one match
    pub fn notice(&mut self, editor: &str, paper: &Paper) -> Result<()> {
        writeln!(self.out, "{} authored {}", editor, paper.path_description())?;
        self.out.flush()?;
        Ok(())
    }

    /// Final report: papers visited and every editor's matches
    pub fn summary(&mut self, visited: usize, findings: &Findings) -> Result<()> {
        self.out.write_all(render_summary(visited, findings).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Summary text for a finished traversal
pub fn render_summary(visited: usize, findings: &Findings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} papers searched in BFS", visited);
    for (editor, papers) in findings.iter() {
        let _ = writeln!(out, "{} authored:", editor);
        for paper in papers {
            let _ = writeln!(out, "  {}", paper.path_description());
        }
    }
    out
}

/// Match a batch of newly discovered papers against the roster.
///
/// Each (editor, paper) match is appended to `findings` and announced through
/// `reporter`. Returns the number of new matches.
pub fn check_papers<W: Write>(
    papers: &[Arc<Paper>],
    roster: &Roster,
    findings: &mut Findings,
    reporter: &mut MatchReporter<W>,
) -> Result<usize> {
    let mut matched = 0;

    for (editor, editor_papers) in roster.iter() {
        for paper in papers {
            if !editor_papers.contains(paper.id()) {
                continue;
            }
            if findings.record(editor, paper) {
                reporter.notice(editor, paper)?;
                metrics::record_editor_match();
                info!(
                    editor = %editor,
                    paper_id = %paper.id(),
                    depth = paper.path_depth(),
                    "Editor match"
                );
                matched += 1;
            }
        }
    }

    Ok(matched)
}
