//! Ingestion error types

use editorscout_common::ScoutError;
use thiserror::Error;

/// Why one editor's publications could not be scraped
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("OpenReview link not found")]
    OpenReviewLinkMissing,

    #[error("DBLP link not found")]
    DblpLinkMissing,

    #[error("{0} not found on the editorial board page")]
    BoardElementMissing(String),

    #[error("Invalid link {href}: {message}")]
    InvalidLink { href: String, message: String },

    #[error("Invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScrapeError {
    /// Missing page elements, as opposed to failures while fetching or parsing
    pub fn is_missing_link(&self) -> bool {
        matches!(
            self,
            ScrapeError::OpenReviewLinkMissing | ScrapeError::DblpLinkMissing
        )
    }
}

impl From<ScrapeError> for ScoutError {
    fn from(e: ScrapeError) -> Self {
        match e {
            ScrapeError::Http(e) => ScoutError::HttpClient(e),
            ScrapeError::Xml(message) => ScoutError::Xml { message },
            other => ScoutError::Scrape {
                message: other.to_string(),
            },
        }
    }
}

impl From<quick_xml::Error> for ScrapeError {
    fn from(e: quick_xml::Error) -> Self {
        ScrapeError::Xml(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_links() {
        assert!(ScrapeError::DblpLinkMissing.is_missing_link());
        assert!(!ScrapeError::Xml("eof".into()).is_missing_link());
        assert_eq!(ScrapeError::OpenReviewLinkMissing.to_string(), "OpenReview link not found");
    }

    #[test]
    fn test_conversion_to_scout_error() {
        let err: ScoutError = ScrapeError::Xml("unexpected eof".into()).into();
        assert!(matches!(err, ScoutError::Xml { .. }));

        let err: ScoutError = ScrapeError::DblpLinkMissing.into();
        assert!(matches!(err, ScoutError::Scrape { ref message } if message == "DBLP link not found"));
    }
}
