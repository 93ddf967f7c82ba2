//! Content type inference.
//!
//! # Responsibilities
//! - Map a fixture path to a content type via the extension table
//! - Guess a content type from a raw body when no path is available
//!
//! # Design Decisions
//! - Body heuristics run in a fixed order, first match wins:
//!   JSON, HTML prefix, CSS rule block, script grammar, plain text
//! - The legacy `application/javascript` type is reported as `text/javascript`
//! - Unknown extensions and empty input default to JSON

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use regex::Regex;

/// Loose match for `selector { property: value; }` blocks.
static CSS_RULE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:^\s*)([\w#.@*,:\-.:>,*\s]+)\s*\{(?:[\s]*)((?:[A-Za-z\- \s]+:\s*['"0-9\w .,/()\-!%]+;?)*)*\s*\}(?:\s*)"#,
    )
    .expect("CSS rule pattern is valid")
});

const HTML_PREFIXES: [&str; 2] = ["<html>", "<!doctype html>"];

/// A detected content type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MimeType {
    Html,
    Css,
    Js,
    Json,
    Text,
    /// Any other type known to the extension table, e.g. `image/png`.
    Other(String),
}

impl MimeType {
    pub fn as_str(&self) -> &str {
        match self {
            MimeType::Html => "text/html",
            MimeType::Css => "text/css",
            MimeType::Js => "text/javascript",
            MimeType::Json => "application/json",
            MimeType::Text => "text/plain",
            MimeType::Other(essence) => essence,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, MimeType::Json)
    }

    /// Classify a `Content-Type` value, ignoring parameters and case.
    pub fn from_content_type(value: &str) -> Self {
        let essence = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/html" => MimeType::Html,
            "text/css" => MimeType::Css,
            "text/javascript" | "application/javascript" | "application/x-javascript" => MimeType::Js,
            "application/json" => MimeType::Json,
            "text/plain" => MimeType::Text,
            _ => MimeType::Other(essence),
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to [`sniff`].
#[derive(Debug, Clone, Copy)]
pub enum SniffInput<'a> {
    Path(&'a Path),
    Body(&'a str),
}

/// Infer a content type from a path or a body.
pub fn sniff(input: SniffInput<'_>) -> MimeType {
    match input {
        SniffInput::Path(path) => sniff_path(path),
        SniffInput::Body(body) => sniff_body(body),
    }
}

/// Infer a content type from a file extension. Unknown extensions yield JSON.
pub fn sniff_path(path: impl AsRef<Path>) -> MimeType {
    match mime_guess::from_path(path.as_ref()).first() {
        Some(mime) => MimeType::from_content_type(mime.essence_str()),
        None => MimeType::Json,
    }
}

/// Infer a content type from a raw body.
pub fn sniff_body(body: &str) -> MimeType {
    if serde_json::from_str::<serde_json::Value>(body).is_ok() {
        return MimeType::Json;
    }

    let lowered = body.to_lowercase();
    if HTML_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix)) {
        return MimeType::Html;
    }

    if CSS_RULE_BLOCK.is_match(body) {
        return MimeType::Css;
    }

    if parses_as_script(body) {
        return MimeType::Js;
    }

    MimeType::Text
}

/// True when `body` is a complete, error-free classic script.
///
/// A blank body parses as an empty program but carries no script, so it is
/// reported as text.
fn parses_as_script(body: &str) -> bool {
    if body.trim().is_empty() {
        return false;
    }

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, body, SourceType::cjs()).parse();
    parsed.errors.is_empty() && !parsed.panicked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_html() {
        assert_eq!(sniff_body("<html><body></body></html>"), MimeType::Html);
        assert_eq!(sniff_body("<!DOCTYPE html><html></html>"), MimeType::Html);
    }

    #[test]
    fn test_sniff_css() {
        let css = r#"
      :root {
        --color: red;
      }

      .test {
        display: flex;
      }
      "#;
        assert_eq!(sniff_body(css), MimeType::Css);
    }

    #[test]
    fn test_sniff_json() {
        let json = r#"
      [
        {
          "test": 1
        }
      ]
      "#;
        assert_eq!(sniff_body(json), MimeType::Json);
        assert_eq!(sniff_body(r#"{"a":1}"#), MimeType::Json);
    }

    #[test]
    fn test_sniff_js() {
        let js = r#"
      document.addEventListener("DOMContentLoaded", function (event) {
          document
            .getElementById("submit")
            .addEventListener("mousedown", () => alert('hi'));
        });
      "#;
        assert_eq!(sniff_body(js), MimeType::Js);
        assert_eq!(sniff_body("const answer = 42;"), MimeType::Js);
    }

    #[test]
    fn test_sniff_text() {
        assert_eq!(
            sniff_body("Text response from server for some reason"),
            MimeType::Text
        );
        assert_eq!(sniff_body(""), MimeType::Text);
        assert_eq!(sniff_body("   \n"), MimeType::Text);
    }

    #[test]
    fn test_sniff_script_syntax_errors_are_text() {
        assert_eq!(sniff_body("Hello, world!"), MimeType::Text);
        assert_eq!(sniff_body("OK."), MimeType::Text);
        assert_eq!(sniff_body("a = ;"), MimeType::Text);
        assert_eq!(sniff_body("function broken( {"), MimeType::Text);
    }

    #[test]
    fn test_sniff_path() {
        assert_eq!(sniff_path("index.html"), MimeType::Html);
        assert_eq!(sniff_path("style.css"), MimeType::Css);
        assert_eq!(sniff_path("example-fixture.json"), MimeType::Json);
        assert_eq!(sniff_path("script.js"), MimeType::Js);
        assert_eq!(sniff_path("response.txt"), MimeType::Text);
        assert_eq!(sniff_path("image.png"), MimeType::Other("image/png".into()));
        assert_eq!(sniff_path("no-extension"), MimeType::Json);
    }

    #[test]
    fn test_sniff_dispatch() {
        assert_eq!(sniff(SniffInput::Path(Path::new("a.js"))), MimeType::Js);
        assert_eq!(sniff(SniffInput::Body("{\"a\":1}")), MimeType::Json);
        assert_eq!(MimeType::Js.to_string(), "text/javascript");
    }

    #[test]
    fn test_from_content_type() {
        assert_eq!(
            MimeType::from_content_type("Application/JSON; charset=utf-8"),
            MimeType::Json
        );
        assert_eq!(MimeType::from_content_type("application/javascript"), MimeType::Js);
    }
}
