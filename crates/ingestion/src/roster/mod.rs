//! Editor roster building
//!
//! Scrapes the editorial board page, follows each editor's OpenReview profile
//! to their DBLP export, and resolves the open-access ids found there to
//! graph ids. Failures for one editor never stop the others.

mod board;
mod dblp;

pub use board::{find_anchor_href, parse_board, BoardEntry};
pub use dblp::{external_id_from_ee, parse_publications};

use crate::errors::ScrapeError;
use editorscout_common::config::ScrapeConfig;
use editorscout_common::errors::{Result, ScoutError};
use editorscout_common::{GraphClient, Roster};
use reqwest::Url;
use tracing::{debug, info, warn};

/// A DBLP article with its graph-service id, when one could be derived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub title: String,
    pub external_id: Option<String>,
}

/// Result of scraping one editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Publications(Vec<Publication>),
    /// Explanation shown in place of the publication list
    Placeholder(String),
}

impl From<std::result::Result<Vec<Publication>, ScrapeError>> for ScrapeOutcome {
    fn from(result: std::result::Result<Vec<Publication>, ScrapeError>) -> Self {
        match result {
            Ok(publications) => ScrapeOutcome::Publications(publications),
            Err(e) if e.is_missing_link() => ScrapeOutcome::Placeholder(e.to_string()),
            Err(e) => ScrapeOutcome::Placeholder(format!("Error: {}", e)),
        }
    }
}

/// An editor and what scraping their publications produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorPublications {
    pub name: String,
    pub outcome: ScrapeOutcome,
}

/// Builds the [`Roster`] of editors and the graph ids of their papers
pub struct RosterBuilder<'a> {
    graph: &'a GraphClient,
    http: reqwest::Client,
    heading: String,
}

impl<'a> RosterBuilder<'a> {
    /// Scraping uses its own session, without the graph API key
    pub fn new(graph: &'a GraphClient, config: &ScrapeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("editorscout/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            graph,
            http,
            heading: config.heading.clone(),
        })
    }

    async fn fetch_text(&self, url: &str) -> std::result::Result<String, ScrapeError> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn scrape_editor(&self, entry: &BoardEntry) -> std::result::Result<Vec<Publication>, ScrapeError> {
        let openreview = entry
            .openreview_url
            .as_ref()
            .ok_or(ScrapeError::OpenReviewLinkMissing)?;

        let profile = self.fetch_text(openreview.as_str()).await?;
        let dblp = find_anchor_href(&profile, "DBLP", openreview)?
            .ok_or(ScrapeError::DblpLinkMissing)?;
        let export_url = format!("{}.xml", dblp);

        debug!(editor = %entry.name, url = %export_url, "Fetching DBLP export");
        let xml = self.fetch_text(&export_url).await?;
        parse_publications(&xml)
    }

    /// Every editor on the board with their publications or a placeholder.
    ///
    /// Fails only when the board page itself cannot be fetched or parsed.
    pub async fn scrape_board(&self, editors_url: &str) -> Result<Vec<EditorPublications>> {
        let page_url = Url::parse(editors_url).map_err(|e| ScoutError::InvalidUrl {
            url: editors_url.to_string(),
            message: e.to_string(),
        })?;

        info!(url = %page_url, "Scraping editorial board");
        let html = self.fetch_text(page_url.as_str()).await?;
        let entries = parse_board(&html, &self.heading, &page_url)?;
        info!(editors = entries.len(), "Editors found");

        let mut editors = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let outcome = ScrapeOutcome::from(self.scrape_editor(entry).await);
            match &outcome {
                ScrapeOutcome::Publications(publications) => debug!(
                    progress = i + 1,
                    editor = %entry.name,
                    publications = publications.len(),
                    "Editor scraped"
                ),
                ScrapeOutcome::Placeholder(reason) => {
                    warn!(editor = %entry.name, reason = %reason, "Editor publications unavailable")
                }
            }
            editors.push(EditorPublications {
                name: entry.name.clone(),
                outcome,
            });
        }

        Ok(editors)
    }

    /// Scrape the board and resolve each editor's publications to graph ids.
    ///
    /// Only the first batch-size publications of an editor are considered.
    /// Editors left without any resolved id are not part of the roster.
    pub async fn build(&self, editors_url: &str) -> Result<Roster> {
        let editors = self.scrape_board(editors_url).await?;
        let mut roster = Roster::new();

        for editor in editors {
            let ScrapeOutcome::Publications(publications) = editor.outcome else {
                continue;
            };

            let external_ids: Vec<String> = publications
                .into_iter()
                .take(self.graph.batch_size())
                .filter_map(|p| p.external_id)
                .collect();
            if external_ids.is_empty() {
                debug!(editor = %editor.name, "No open-access ids");
                continue;
            }

            let ids = match self.graph.resolve_batch(&external_ids).await {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(editor = %editor.name, error = %e, "Id resolution failed");
                    continue;
                }
            };

            debug!(editor = %editor.name, requested = external_ids.len(), resolved = ids.len(), "Ids resolved");
            roster.insert(editor.name, ids);
        }

        info!(
            editors = roster.len(),
            papers = roster.paper_count(),
            "Editor roster built"
        );
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editorscout_common::config::GraphConfig;
    use editorscout_common::PaperId;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn graph_for(server: &MockServer) -> GraphClient {
        let config = GraphConfig {
            base_url: format!("{}/graph/v1", server.uri()),
            api_key: Some("test-key".to_string()),
            ..GraphConfig::default()
        };
        GraphClient::new(&config).unwrap()
    }

    async fn page(server: &MockServer, at: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    async fn mount_board(server: &MockServer) {
        let board = format!(
            r#"<h3>TMLR Action Editors</h3>
<ul>
  <li><a href="/people/jane">Jane Doe</a> [<a href="{uri}/profile/jane">OpenReview</a>]</li>
  <li><a href="/people/bob">Bob Roe</a> [<a href="/profile/bob">OpenReview</a>]</li>
  <li><a href="/people/cyd">Cyd Poe</a></li>
  <li><a href="/people/dee">Dee Loe</a> [<a href="/profile/dee">OpenReview</a>]</li>
  <li><a href="/people/eve">Eve Moe</a> [<a href="/profile/eve">OpenReview</a>]</li>
</ul>"#,
            uri = server.uri()
        );
        page(server, "/tmlr/editorial-board.html", board).await;

        page(server, "/profile/jane", r#"<a href="/pid/1">DBLP</a>"#.to_string()).await;
        page(server, "/profile/bob", r#"<a href="/pid/2">DBLP</a>"#.to_string()).await;
        page(server, "/profile/dee", "<p>No links</p>".to_string()).await;
        page(server, "/profile/eve", r#"<a href="/pid/5">DBLP</a>"#.to_string()).await;

        page(
            server,
            "/pid/1.xml",
            r#"<dblpperson><r><article><title>Attention Is All You Need.</title>
<ee type="oa">https://arxiv.org/abs/1706.03762</ee></article></r></dblpperson>"#
                .to_string(),
        )
        .await;
        page(
            server,
            "/pid/2.xml",
            r#"<dblpperson><r><article><title>Citing Work.</title>
<ee type="oa">https://doi.org/10.5555/citing</ee></article></r>
<r><article><title>Closed.</title><ee>https://example.org/closed</ee></article></r></dblpperson>"#
                .to_string(),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/pid/5.xml"))
            .respond_with(ResponseTemplate::new(500))
            .mount(server)
            .await;
    }

    fn builder(graph: &GraphClient) -> RosterBuilder<'_> {
        RosterBuilder::new(graph, &ScrapeConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_scrape_board_outcomes() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        let graph = graph_for(&server);

        let editors = builder(&graph)
            .scrape_board(&format!("{}/tmlr/editorial-board.html", server.uri()))
            .await
            .unwrap();

        let names: Vec<&str> = editors.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Jane Doe", "Bob Roe", "Cyd Poe", "Dee Loe", "Eve Moe"]);

        assert_eq!(
            editors[0].outcome,
            ScrapeOutcome::Publications(vec![Publication {
                title: "Attention Is All You Need.".to_string(),
                external_id: Some("ARXIV:1706.03762".to_string()),
            }])
        );
        assert_eq!(
            editors[2].outcome,
            ScrapeOutcome::Placeholder("OpenReview link not found".to_string())
        );
        assert_eq!(
            editors[3].outcome,
            ScrapeOutcome::Placeholder("DBLP link not found".to_string())
        );
        assert!(matches!(
            &editors[4].outcome,
            ScrapeOutcome::Placeholder(reason) if reason.starts_with("Error: ")
        ));
    }

    #[tokio::test]
    async fn test_build_resolves_ids() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        Mock::given(method("POST"))
            .and(path("/graph/v1/paper/batch"))
            .and(body_json(json!({"ids": ["ARXIV:1706.03762"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"paperId": "P1", "title": "Attention Is All You Need"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/graph/v1/paper/batch"))
            .and(body_json(json!({"ids": ["DOI:10.5555/citing"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([null])))
            .mount(&server)
            .await;
        let graph = graph_for(&server);

        let roster = builder(&graph)
            .build(&format!("{}/tmlr/editorial-board.html", server.uri()))
            .await
            .unwrap();

        assert_eq!(roster.len(), 1);
        assert!(roster.papers_of("Jane Doe").unwrap().contains(&PaperId::from("P1")));
        assert!(roster.papers_of("Bob Roe").is_none());
    }

    #[tokio::test]
    async fn test_board_failure_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tmlr/editorial-board.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let graph = graph_for(&server);

        let result = builder(&graph)
            .build(&format!("{}/tmlr/editorial-board.html", server.uri()))
            .await;

        assert!(matches!(result, Err(ScoutError::HttpClient(_))));
    }

    #[test]
    fn test_outcome_from_errors() {
        let missing: ScrapeOutcome = Err(ScrapeError::DblpLinkMissing).into();
        assert_eq!(missing, ScrapeOutcome::Placeholder("DBLP link not found".to_string()));

        let broken: ScrapeOutcome = Err(ScrapeError::Xml("unexpected end".to_string())).into();
        assert_eq!(
            broken,
            ScrapeOutcome::Placeholder("Error: XML parse error: unexpected end".to_string())
        );
    }
}
