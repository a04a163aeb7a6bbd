//! DBLP person export parsing

use super::Publication;
use crate::errors::ScrapeError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Graph-service id for an open-access link, when it points at arXiv or a DOI
pub fn external_id_from_ee(url: &str) -> Option<String> {
    if url.contains("arxiv.org") {
        url.rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .map(|id| format!("ARXIV:{}", id))
    } else if let Some((_, doi)) = url.split_once("doi.org/") {
        Some(format!("DOI:{}", doi))
    } else {
        None
    }
}

#[derive(Default)]
struct Article {
    title: Option<String>,
    ee: Option<String>,
}

impl Article {
    fn finish(self) -> Publication {
        let external_id = self
            .ee
            .as_deref()
            .map(str::trim)
            .and_then(external_id_from_ee);
        Publication {
            title: self.title.map(|t| t.trim().to_string()).unwrap_or_default(),
            external_id,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Capture {
    Title,
    Ee,
}

fn is_open_access(element: &BytesStart<'_>) -> Result<bool, ScrapeError> {
    let attr = element
        .try_get_attribute("type")
        .map_err(|e| ScrapeError::Xml(e.to_string()))?;
    Ok(attr.is_some_and(|a| &*a.value == b"oa"))
}

/// Journal articles in a DBLP person export.
///
/// Each article yields its first `title` (including text of nested markup)
/// and the id derived from its first open-access `ee` link.
pub fn parse_publications(xml: &str) -> Result<Vec<Publication>, ScrapeError> {
    let mut reader = Reader::from_str(xml);
    let mut publications = Vec::new();
    let mut article: Option<Article> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if article.is_none() {
                    if e.local_name().as_ref() == b"article" {
                        article = Some(Article::default());
                    }
                    continue;
                }
                let Some(current) = article.as_mut().filter(|_| capture.is_none()) else {
                    continue;
                };
                match e.local_name().as_ref() {
                    b"title" if current.title.is_none() => {
                        current.title = Some(String::new());
                        capture = Some(Capture::Title);
                    }
                    b"ee" if current.ee.is_none() && is_open_access(&e)? => {
                        current.ee = Some(String::new());
                        capture = Some(Capture::Ee);
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                let (Some(current), Some(field)) = (article.as_mut(), capture) else {
                    continue;
                };
                let text = match t.unescape() {
                    Ok(text) => text.into_owned(),
                    // Entities outside the XML predefined set
                    Err(_) => String::from_utf8_lossy(&t).into_owned(),
                };
                let target = match field {
                    Capture::Title => current.title.as_mut(),
                    Capture::Ee => current.ee.as_mut(),
                };
                if let Some(target) = target {
                    target.push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"article" => {
                    capture = None;
                    if let Some(done) = article.take() {
                        publications.push(done.finish());
                    }
                }
                b"title" if capture == Some(Capture::Title) => capture = None,
                b"ee" if capture == Some(Capture::Ee) => capture = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(publications)
}
