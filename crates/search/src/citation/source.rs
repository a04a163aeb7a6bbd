//! Neighbor sources for the traversal

use async_trait::async_trait;
use editorscout_common::errors::Result;
use editorscout_common::{GraphClient, Neighbors, PaperId};

/// Supplies the citing and referenced papers of a paper
#[async_trait]
pub trait NeighborSource: Send + Sync {
    /// Unlinked neighbors of `paper_id`. "No neighbors" is not an error.
    async fn neighbors_of(&self, paper_id: &PaperId) -> Result<Neighbors>;
}

#[async_trait]
impl NeighborSource for GraphClient {
    async fn neighbors_of(&self, paper_id: &PaperId) -> Result<Neighbors> {
        self.neighbors(paper_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::{CitationTraversal, MatchReporter, StopReason};
    use editorscout_common::config::GraphConfig;
    use editorscout_common::{Paper, Roster};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_traversal_over_graph_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper/P1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "paperId": "P1",
                "citations": [{"paperId": "P2", "title": "Follow-up"}],
                "references": [{"paperId": "P3", "title": "Background"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = GraphClient::new(&GraphConfig {
            base_url: server.uri(),
            api_key: Some("test-key".to_string()),
            ..GraphConfig::default()
        })
        .unwrap();

        let roster: Roster = vec![("Bob", vec![PaperId::from("P3")])].into_iter().collect();
        let mut reporter = MatchReporter::new(Vec::new());

        let outcome = CitationTraversal::new(&client, &roster, 1, &mut reporter)
            .run(vec![Paper::new("P1", "Seed")])
            .await
            .unwrap();

        assert_eq!(outcome.visited, 3);
        assert_eq!(outcome.stop_reason, StopReason::Exhausted);
        let bob = outcome.findings.papers_of("Bob");
        assert_eq!(bob.len(), 1);
        assert!(bob[0].path_description().contains("which was referenced by \"Seed\""));
    }
}
