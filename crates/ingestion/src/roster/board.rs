//! HTML parsing for the editorial board and OpenReview profiles

use crate::errors::ScrapeError;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

/// One editor as listed on the board page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEntry {
    pub name: String,
    pub openreview_url: Option<Url>,
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn join(base: &Url, href: &str) -> Result<Url, ScrapeError> {
    base.join(href).map_err(|e| ScrapeError::InvalidLink {
        href: href.to_string(),
        message: e.to_string(),
    })
}

/// Editors listed under `heading`.
///
/// The list is the first `ul` sibling following the `h3` whose text is
/// `heading`. Entries without any anchor are skipped.
pub fn parse_board(html: &str, heading: &str, page_url: &Url) -> Result<Vec<BoardEntry>, ScrapeError> {
    let document = Html::parse_document(html);
    let h3 = selector("h3")?;
    let li = selector("li")?;
    let a = selector("a")?;

    let title = document
        .select(&h3)
        .find(|el| text_of(*el) == heading)
        .ok_or_else(|| ScrapeError::BoardElementMissing(format!("Heading '{}'", heading)))?;

    let list = title
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "ul")
        .ok_or_else(|| ScrapeError::BoardElementMissing(format!("Editor list under '{}'", heading)))?;

    let mut entries = Vec::new();
    for item in list.select(&li) {
        let Some(first) = item.select(&a).next() else {
            continue;
        };

        let openreview_url = match item
            .select(&a)
            .find(|anchor| text_of(*anchor) == "OpenReview")
            .and_then(|anchor| anchor.value().attr("href"))
        {
            Some(href) => Some(join(page_url, href)?),
            None => None,
        };

        entries.push(BoardEntry {
            name: text_of(first),
            openreview_url,
        });
    }

    Ok(entries)
}

/// Target of the first anchor whose text is `text`, resolved against `page_url`
pub fn find_anchor_href(html: &str, text: &str, page_url: &Url) -> Result<Option<Url>, ScrapeError> {
    let document = Html::parse_document(html);
    let a = selector("a")?;

    let href = document
        .select(&a)
        .find(|anchor| text_of(*anchor) == text)
        .and_then(|anchor| anchor.value().attr("href"));

    href.map(|href| join(page_url, href)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"
<html><body>
  <h3>TMLR Editors in Chief</h3>
  <ul><li><a href="/chief">Chief Person</a></li></ul>
  <h3>TMLR Action Editors</h3>
  <p>Listed alphabetically.</p>
  <ul>
    <li><a href="https://example.org/jane">Jane Doe</a>, Some University
        [<a href="https://openreview.net/profile?id=~Jane_Doe1">OpenReview</a>]</li>
    <li><a href="/bob">Bob Roe</a> [<a href="/profile?id=~Bob_Roe1">OpenReview</a>]</li>
    <li><a href="/cyd">Cyd Poe</a></li>
    <li>No links at all</li>
  </ul>
</body></html>
"#;

    fn page() -> Url {
        Url::parse("https://jmlr.org/tmlr/editorial-board.html").unwrap()
    }

    #[test]
    fn test_parse_board() {
        let entries = parse_board(BOARD, "TMLR Action Editors", &page()).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "Jane Doe");
        assert_eq!(
            entries[0].openreview_url.as_ref().unwrap().as_str(),
            "https://openreview.net/profile?id=~Jane_Doe1"
        );
        assert_eq!(
            entries[1].openreview_url.as_ref().unwrap().as_str(),
            "https://jmlr.org/profile?id=~Bob_Roe1"
        );
        assert_eq!(entries[2].name, "Cyd Poe");
        assert!(entries[2].openreview_url.is_none());
    }

    #[test]
    fn test_missing_heading() {
        let err = parse_board(BOARD, "TMLR Reviewers", &page()).unwrap_err();
        assert!(matches!(err, ScrapeError::BoardElementMissing(_)));
    }

    #[test]
    fn test_missing_list() {
        let html = "<h3>TMLR Action Editors</h3><p>Coming soon</p>";
        let err = parse_board(html, "TMLR Action Editors", &page()).unwrap_err();
        assert!(matches!(err, ScrapeError::BoardElementMissing(_)));
    }

    #[test]
    fn test_find_anchor_href() {
        let html = r#"<div><a href="https://dblp.org/pid/12/345">DBLP</a><a href="/x">Homepage</a></div>"#;
        let profile = Url::parse("https://openreview.net/profile?id=~Jane_Doe1").unwrap();

        let dblp = find_anchor_href(html, "DBLP", &profile).unwrap().unwrap();
        assert_eq!(dblp.as_str(), "https://dblp.org/pid/12/345");
        assert!(find_anchor_href(html, "Scholar", &profile).unwrap().is_none());
    }
}
