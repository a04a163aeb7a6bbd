//! BibTeX bibliography reading
//!
//! Only entry titles are needed. The scanner understands the usual BibTeX
//! shapes: `@type{key, field = {value}, ...}` or `@type(key, ...)`, values in
//! braces (nested), in quotes, or bare, joined with `#`. `@string`
//! definitions are collected and expanded where a bare value names them;
//! `@comment` and `@preamble` blocks are skipped.

use editorscout_common::errors::{Result, ScoutError};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Read a `.bib` file and return entry titles in file order
pub fn load_titles(path: &Path) -> Result<Vec<String>> {
    let source = std::fs::read_to_string(path).map_err(|e| ScoutError::Bibliography {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let titles = parse_titles(&source);
    debug!(path = %path.display(), titles = titles.len(), "Bibliography parsed");
    Ok(titles)
}

/// Titles of every entry in `source` that has one
pub fn parse_titles(source: &str) -> Vec<String> {
    let mut scanner = Scanner::new(source);
    let mut titles = Vec::new();

    while scanner.seek('@') {
        let entry_type = scanner.identifier().to_ascii_lowercase();
        scanner.skip_whitespace();

        let close = match scanner.peek() {
            Some('{') => '}',
            Some('(') => ')',
            _ => continue,
        };
        scanner.bump();

        match entry_type.as_str() {
            "comment" | "preamble" => {
                scanner.skip_block(close);
                continue;
            }
            "string" => {
                for (name, value) in scanner.fields(close) {
                    scanner.strings.insert(name, value);
                }
                continue;
            }
            _ => {}
        }

        if let Some(title) = scanner.entry_title(close) {
            titles.push(title);
        }
    }

    titles
}

/// Collapse whitespace and drop the braces BibTeX uses to protect case
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '{' && *c != '}')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    /// `@string` macros by lowercased name
    strings: HashMap<String, String>,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            strings: HashMap::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Advance past the next `target`; false at end of input
    fn seek(&mut self, target: char) -> bool {
        while let Some(c) = self.bump() {
            if c == target {
                return true;
            }
        }
        false
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn identifier(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.') {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }

    /// Skip to just past the `close` that ends the current block
    fn skip_block(&mut self, close: char) {
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' if depth > 0 => depth -= 1,
                c if c == close && depth == 0 => return,
                _ => {}
            }
        }
    }

    /// Parse the rest of an entry body and return its title, if any
    fn entry_title(&mut self, close: char) -> Option<String> {
        // Citation key
        loop {
            match self.peek()? {
                ',' => {
                    self.bump();
                    break;
                }
                c if c == close => {
                    self.bump();
                    return None;
                }
                _ => {
                    self.bump();
                }
            }
        }

        self.fields(close)
            .into_iter()
            .filter(|(name, _)| name == "title")
            .map(|(_, value)| normalize(&value))
            .find(|value| !value.is_empty())
    }

    /// `name = value` pairs up to the `close` that ends the block
    fn fields(&mut self, close: char) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        loop {
            while self.peek().is_some_and(|c| c.is_whitespace() || c == ',') {
                self.pos += 1;
            }
            match self.peek() {
                None => break,
                Some(c) if c == close => {
                    self.bump();
                    break;
                }
                Some('@') => break,
                _ => {}
            }

            let name = self.identifier().to_ascii_lowercase();
            self.skip_whitespace();
            if name.is_empty() || self.peek() != Some('=') {
                // Malformed field: resynchronize at the next separator
                self.skip_field(close);
                continue;
            }
            self.bump();

            let value = self.value(close);
            fields.push((name, value));
        }

        fields
    }

    /// A field value, possibly concatenated with `#`
    fn value(&mut self, close: char) -> String {
        let mut out = String::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('{') => {
                    self.bump();
                    out.push_str(&self.braced());
                }
                Some('"') => {
                    self.bump();
                    out.push_str(&self.quoted());
                }
                Some(_) => {
                    let token = self.bare(close);
                    match self.strings.get(&token.to_ascii_lowercase()) {
                        Some(expansion) => out.push_str(expansion),
                        None => out.push_str(&token),
                    }
                }
                None => break,
            }
            self.skip_whitespace();
            if self.peek() == Some('#') {
                self.bump();
                continue;
            }
            break;
        }
        out
    }

    /// Content up to the matching `}`; the opening brace is consumed
    fn braced(&mut self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' if depth == 0 => break,
                '}' => depth -= 1,
                _ => {}
            }
            out.push(c);
        }
        out
    }

    /// Content up to the closing quote outside braces
    fn quoted(&mut self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' if depth > 0 => depth -= 1,
                '"' if depth == 0 => break,
                _ => {}
            }
            out.push(c);
        }
        out
    }

    fn bare(&mut self, close: char) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' || c == '#' || c == close {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn skip_field(&mut self, close: char) {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '{' => depth += 1,
                '}' if depth > 0 => depth -= 1,
                ',' if depth == 0 => return,
                c if c == close && depth == 0 => return,
                _ => {}
            }
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
% references for the paper
@comment{ this {is} ignored }
@string{ neurips = "Advances in Neural Information Processing Systems" }

@inproceedings{vaswani2017attention,
  title={Attention Is All You Need},
  author={Vaswani, Ashish and Shazeer, Noam},
  booktitle=neurips,
  year={2017}
}

@Article{he2016,
  Author = "He, Kaiming",
  Title = "Deep Residual Learning for {Image} Recognition",
  year = 2016,
}

@misc(nokey_title,
  author = {Somebody},
  note = {no title here}
)

@article{concat,
  title = "Part one" # { and part two},
}
"#;

    #[test]
    fn test_parse_titles() {
        let titles = parse_titles(SAMPLE);
        assert_eq!(
            titles,
            vec![
                "Attention Is All You Need",
                "Deep Residual Learning for Image Recognition",
                "Part one and part two",
            ]
        );
    }

    #[test]
    fn test_nested_braces_and_whitespace() {
        let titles = parse_titles(
            "@article{k, title = {{BERT}: Pre-training of\n    Deep {B}idirectional Transformers}}",
        );
        assert_eq!(
            titles,
            vec!["BERT: Pre-training of Deep Bidirectional Transformers"]
        );
    }

    #[test]
    fn test_string_macros_are_expanded() {
        let source = r#"
@string{att = "Attention Is All You Need"}
@STRING(pre = {Revisiting})
@article{a, title = att}
@article{b, title = Pre # " " # att}
@article{c, title = undefined}
"#;
        assert_eq!(
            parse_titles(source),
            vec![
                "Attention Is All You Need",
                "Revisiting Attention Is All You Need",
                "undefined",
            ]
        );
    }

    #[test]
    fn test_malformed_field_is_skipped() {
        let titles = parse_titles("@article{k, broken {x}, title = {Still Found}}");
        assert_eq!(titles, vec!["Still Found"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_titles("").is_empty());
        assert!(parse_titles("just some text, no entries").is_empty());
    }

    #[test]
    fn test_load_titles_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "@article{{a, title={{Attention Is All You Need}}}}").unwrap();

        let titles = load_titles(file.path()).unwrap();
        assert_eq!(titles, vec!["Attention Is All You Need"]);
    }

    #[test]
    fn test_missing_file() {
        let err = load_titles(Path::new("/nonexistent/refs.bib")).unwrap_err();
        assert!(matches!(err, ScoutError::Bibliography { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
