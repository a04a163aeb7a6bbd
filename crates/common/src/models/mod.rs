//! Domain models shared across editorscout crates

mod paper;
mod roster;

pub use paper::{Ancestors, Neighbors, Paper, PaperId, Provenance};
pub use roster::Roster;
