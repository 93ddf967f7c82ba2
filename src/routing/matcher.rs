//! URL pattern matching.
//!
//! # Responsibilities
//! - Compile a URL template once into a reusable matcher
//! - Compare hostnames when the template is an absolute URL
//! - Match the path component and extract `:name` / `*` captures
//!
//! # Design Decisions
//! - Query strings and fragments are ignored on both sides
//! - `:name` captures one path segment; `*` captures one or more characters
//!   across segments and is numbered `0, 1, ...` in encounter order
//! - Matching is anchored and case-insensitive, with one optional trailing `/`
//! - A template the grammar rejects degrades to exact path equality; compiling
//!   never fails

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Serialize;
use url::Url;

/// Host used to resolve templates and URLs that carry no host of their own.
const PLACEHOLDER_ORIGIN: &str = "http://localhost";

/// Captured path parameters. Anonymous `*` captures are keyed `"0"`, `"1"`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of the n-th anonymous wildcard capture.
    pub fn index(&self, n: usize) -> Option<&str> {
        self.get(&n.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Successful match of a URL against a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// The candidate's path component.
    pub path: String,
    pub params: Params,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParamKey {
    Named(String),
    Index(usize),
}

impl ParamKey {
    fn label(&self) -> String {
        match self {
            ParamKey::Named(name) => name.clone(),
            ParamKey::Index(i) => i.to_string(),
        }
    }
}

#[derive(Debug)]
enum PathMatcher {
    Template { regex: Regex, keys: Vec<ParamKey> },
    Literal,
}

/// Why a template could not be compiled as a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplateError {
    MissingName(usize),
    DuplicateName(String),
    Reserved(char),
    Regex(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::MissingName(at) => write!(f, "missing parameter name at {}", at),
            TemplateError::DuplicateName(name) => write!(f, "duplicate parameter name {:?}", name),
            TemplateError::Reserved(c) => write!(f, "reserved character {:?}", c),
            TemplateError::Regex(e) => write!(f, "{}", e),
        }
    }
}

/// A compiled URL template.
#[derive(Debug)]
pub struct UrlPattern {
    source: String,
    host: Option<String>,
    path: String,
    matcher: PathMatcher,
}

impl UrlPattern {
    /// Compile a template. Never fails: grammar errors fall back to literal
    /// path equality.
    pub fn compile(pattern: &str) -> Self {
        let (host, path) = match parse_absolute(pattern) {
            Some(url) => (url.host_str().map(str::to_owned), url.path().to_string()),
            None => (None, relative_path(pattern)),
        };

        let matcher = match build_template(&path) {
            Ok((regex, keys)) => PathMatcher::Template { regex, keys },
            Err(e) => {
                tracing::debug!(pattern = %pattern, error = %e, "Falling back to literal path match");
                PathMatcher::Literal
            }
        };

        Self {
            source: pattern.to_string(),
            host,
            path,
            matcher,
        }
    }

    /// The template exactly as given.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when the template failed to compile and matches literally.
    pub fn is_literal(&self) -> bool {
        matches!(self.matcher, PathMatcher::Literal)
    }

    /// Match a candidate URL. Returns `None` on a host or path mismatch.
    pub fn matches(&self, url: &str) -> Option<MatchResult> {
        let (candidate_host, candidate_path) = match parse_absolute(url) {
            Some(parsed) => (parsed.host_str().map(str::to_owned), parsed.path().to_string()),
            None => (None, relative_path(url)),
        };

        if let Some(host) = &self.host {
            if candidate_host.as_deref() != Some(host.as_str()) {
                return None;
            }
        }

        match &self.matcher {
            PathMatcher::Template { regex, keys } => {
                let captures = regex.captures(&candidate_path)?;
                let params = keys
                    .iter()
                    .enumerate()
                    .map(|(i, key)| {
                        let raw = captures.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
                        (key.label(), decode(raw))
                    })
                    .collect();
                Some(MatchResult {
                    path: candidate_path,
                    params,
                })
            }
            PathMatcher::Literal => (candidate_path == self.path).then(|| MatchResult {
                path: candidate_path,
                params: Params::default(),
            }),
        }
    }
}

/// Compile a pattern into a match function.
pub fn compile(pattern: &str) -> impl Fn(&str) -> Option<MatchResult> + Send + Sync {
    let pattern = UrlPattern::compile(pattern);
    move |url| pattern.matches(url)
}

fn parse_absolute(input: &str) -> Option<Url> {
    Url::parse(input).ok().filter(|url| url.has_host())
}

/// Path of `input` resolved against the placeholder origin.
fn relative_path(input: &str) -> String {
    if let Ok(url) = Url::parse(&format!("{}{}", PLACEHOLDER_ORIGIN, input)) {
        return url.path().to_string();
    }

    // Anything before the first '/' would have been read as part of the host.
    let without_query = input.split(['?', '#']).next().unwrap_or_default();
    match without_query.find('/') {
        Some(slash) => without_query[slash..].to_string(),
        None => "/".to_string(),
    }
}

fn build_template(path: &str) -> Result<(Regex, Vec<ParamKey>), TemplateError> {
    let mut pattern = String::from("(?i)^");
    let mut keys: Vec<ParamKey> = Vec::new();
    let mut anonymous = 0usize;
    let mut chars = path.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        match c {
            '*' => {
                pattern.push_str("(.+)");
                keys.push(ParamKey::Index(anonymous));
                anonymous += 1;
            }
            ':' => {
                let mut name = String::new();
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    return Err(TemplateError::MissingName(at));
                }
                if keys.iter().any(|k| *k == ParamKey::Named(name.clone())) {
                    return Err(TemplateError::DuplicateName(name));
                }
                pattern.push_str("([^/]+)");
                keys.push(ParamKey::Named(name));
            }
            '(' | ')' => return Err(TemplateError::Reserved(c)),
            _ => {
                let mut buf = [0u8; 4];
                pattern.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
        }
    }

    if !path.ends_with('/') {
        pattern.push_str("/?");
    }
    pattern.push('$');

    let regex = Regex::new(&pattern).map_err(|e| TemplateError::Regex(e.to_string()))?;
    Ok((regex, keys))
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards_with_and_without_host() {
        for pattern in ["https://example.com/callback/*/*", "/callback/*/*"] {
            let matcher = UrlPattern::compile(pattern);
            let found = matcher.matches("https://example.com/callback/test/123").unwrap();
            assert_eq!(found.params.index(0), Some("test"));
            assert_eq!(found.params.index(1), Some("123"));
            assert!(found.params.get("id").is_none());

            assert!(matcher.matches("https://example.com/not-callback/test/123").is_none());
            assert!(matcher.matches("https://example.com/callback/test").is_none());
            assert!(matcher.matches("https://example.com/callback").is_none());
        }
    }

    #[test]
    fn test_named_params() {
        let matcher = UrlPattern::compile("/callback/:id/:name");
        let found = matcher.matches("https://example.com/callback/123/456").unwrap();
        assert_eq!(found.path, "/callback/123/456");
        assert_eq!(
            found.params,
            [("id", "123"), ("name", "456")].into_iter().collect::<Params>()
        );
        assert!(matcher.matches("https://example.com/callback/123").is_none());
    }

    #[test]
    fn test_named_params_with_host() {
        let matcher = UrlPattern::compile("https://example.com/callback/:id/foo/:name");
        let found = matcher.matches("https://example.com/callback/test/foo/123").unwrap();
        assert_eq!(found.params.get("id"), Some("test"));
        assert_eq!(found.params.get("name"), Some("123"));
        assert!(matcher.matches("https://example.com/callback").is_none());
        assert!(matcher.matches("https://other.com/callback/test/foo/123").is_none());
    }

    #[test]
    fn test_mixed_wildcard_and_named() {
        let matcher = UrlPattern::compile("/*/:id/foo/:name");
        let found = matcher.matches("https://example.com/callback/test/foo/123").unwrap();
        assert_eq!(
            found.params,
            [("0", "callback"), ("id", "test"), ("name", "123")]
                .into_iter()
                .collect::<Params>()
        );
        assert!(matcher.matches("https://example.com/callback").is_none());
        assert!(matcher.matches("https://example.com/callback/1").is_none());
    }

    #[test]
    fn test_query_strings_are_ignored() {
        let url = "http://example.com/service/settings/users/me?uid=123";
        for pattern in [
            "*/service/settings/users/me?uid=*",
            "*/service/settings/users/me?*",
        ] {
            let found = UrlPattern::compile(pattern).matches(url).unwrap();
            assert_eq!(found.path, "/service/settings/users/me");
            assert!(found.params.is_empty());
        }
    }

    #[test]
    fn test_too_many_segments_in_pattern() {
        let matcher = UrlPattern::compile("/callback/*/*/*/*");
        assert!(matcher.matches("https://example.com/callback/test/123/456").is_none());
    }

    #[test]
    fn test_wildcard_spans_segments() {
        let matcher = UrlPattern::compile("/assets/*");
        let found = matcher.matches("https://cdn.example.com/assets/js/app.js").unwrap();
        assert_eq!(found.params.index(0), Some("js/app.js"));
    }

    #[test]
    fn test_case_and_trailing_slash() {
        let matcher = UrlPattern::compile("/Callback/get");
        assert!(matcher.matches("https://example.com/callback/GET").is_some());
        assert!(matcher.matches("https://example.com/callback/get/").is_some());
    }

    #[test]
    fn test_params_are_decoded() {
        let matcher = UrlPattern::compile("/users/:name");
        let found = matcher.matches("https://example.com/users/jane%20doe").unwrap();
        assert_eq!(found.params.get("name"), Some("jane doe"));
    }

    #[test]
    fn test_grammar_errors_fall_back_to_literal() {
        let matcher = UrlPattern::compile("/callback/:");
        assert!(matcher.is_literal());
        assert!(matcher.matches("https://example.com/callback/:").is_some());
        assert!(matcher.matches("https://example.com/callback/x").is_none());

        let duplicate = UrlPattern::compile("/a/:id/:id");
        assert!(duplicate.is_literal());

        let reserved = UrlPattern::compile("/a/(b)");
        assert!(reserved.is_literal());
        assert!(reserved.matches("https://example.com/a/(b)").is_some());
    }

    #[test]
    fn test_match_function() {
        let matches = compile("/callback/get");
        assert!(matches("https://example.com/callback/get").is_some());
        assert!(matches("https://example.com/callback/post").is_none());
        assert_eq!(UrlPattern::compile("/callback/get").source(), "/callback/get");
    }
}
