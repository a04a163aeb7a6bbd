//! Seed resolution: bibliography titles to graph papers

use editorscout_common::errors::Result;
use editorscout_common::{GraphClient, Paper};
use tracing::{debug, info};

/// Search query for a title: ASCII letters, digits and single spaces only
pub fn clean_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .split(' ')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up each title and keep the top match, in bibliography order.
///
/// Titles with no match, or whose search failed, are skipped.
pub async fn resolve_seeds(graph: &GraphClient, titles: &[String]) -> Result<Vec<Paper>> {
    let mut seeds = Vec::with_capacity(titles.len());

    for (i, title) in titles.iter().enumerate() {
        let query = clean_title(title);
        if query.is_empty() {
            debug!(title = %title, "Title has no searchable characters");
            continue;
        }

        info!(progress = i + 1, total = titles.len(), query = %query, "Searching for seed");
        match graph.search_top_match(&query).await? {
            Some(paper) => {
                debug!(paper = %paper, "Seed resolved");
                seeds.push(paper);
            }
            None => debug!(query = %query, "No match"),
        }
    }

    info!(seeds = seeds.len(), titles = titles.len(), "Seed papers resolved");
    Ok(seeds)
}
