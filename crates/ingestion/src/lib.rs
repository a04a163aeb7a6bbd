//! editorscout Ingestion
//!
//! Brings outside data into a run:
//! 1. Reads entry titles from a BibTeX bibliography
//! 2. Resolves the titles to seed papers on the graph service
//! 3. Scrapes the editorial board and DBLP exports into an editor roster

pub mod bibliography;
pub mod errors;
pub mod roster;
pub mod seeds;

pub use bibliography::{load_titles, parse_titles};
pub use roster::{EditorPublications, Publication, RosterBuilder, ScrapeOutcome};
pub use seeds::{clean_title, resolve_seeds};
