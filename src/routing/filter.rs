//! Request exclusion filter.
//!
//! # Responsibilities
//! - Exclude requests for configured static file extensions
//! - Exclude requests whose URL contains an ignored substring
//!
//! # Design Decisions
//! - Extension matching is anchored to the part of the URL before any `?` or
//!   `#`, so the query string's contents are never inspected
//! - Ignored URLs are literal substrings, escaped before compilation
//! - A filter is immutable; changes build a new filter that replaces the old
//!   one atomically (see `intercept::session`)

use regex::Regex;

/// Immutable exclusion filter built from extensions and ignored URLs.
#[derive(Debug, Default)]
pub struct RequestFilter {
    extensions: Option<Regex>,
    ignored: Option<Regex>,
}

impl RequestFilter {
    /// Build a filter from extensions (without the dot) and literal URL fragments.
    pub fn new(static_extensions: &[String], ignored_urls: &[String]) -> Self {
        let extensions = if static_extensions.is_empty() {
            None
        } else {
            let alternatives: Vec<String> =
                static_extensions.iter().map(|e| regex::escape(e)).collect();
            compile(&format!(r"^[^?#]*[.](?:{})(?:[?#]|$)", alternatives.join("|")))
        };

        let ignored = if ignored_urls.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = ignored_urls.iter().map(|u| regex::escape(u)).collect();
            compile(&alternatives.join("|"))
        };

        Self { extensions, ignored }
    }

    /// True when the filter lets every request through.
    pub fn is_match_all(&self) -> bool {
        self.extensions.is_none() && self.ignored.is_none()
    }

    /// True when `url` must bypass interception.
    pub fn excludes(&self, url: &str) -> bool {
        self.extensions.as_ref().is_some_and(|re| re.is_match(url))
            || self.ignored.as_ref().is_some_and(|re| re.is_match(url))
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(pattern = %pattern, error = %e, "Could not build request filter");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_excludes_nothing() {
        let filter = RequestFilter::default();
        assert!(filter.is_match_all());
        assert!(!filter.excludes("https://example.com/test.jpg"));
    }

    #[test]
    fn test_static_extensions() {
        let filter = RequestFilter::new(&strings(&["jpg", "png"]), &[]);
        assert!(filter.excludes("https://example.com/test.jpg"));
        assert!(filter.excludes("https://example.com/test.png?test=true"));
        assert!(filter.excludes("https://example.com/test.jpg?test=true&test2=false&test3=foo"));
        assert!(!filter.excludes("https://example.com/test.html"));
        assert!(!filter.excludes("https://example.com/test.html?img=a.jpg"));
        assert!(!filter.excludes("https://example.com/page?next=/img/b.png#top"));
        assert!(filter.excludes("https://example.com/test.jpg#anchor"));
        assert!(!filter.excludes("https://example.com/test.jpgx"));
        assert!(!filter.excludes("https://example.com/"));
    }

    #[test]
    fn test_ignored_urls_are_literal() {
        let filter = RequestFilter::new(&[], &strings(&["https://example.com/"]));
        assert!(!filter.is_match_all());
        assert!(filter.excludes("https://example.com/"));
        assert!(filter.excludes("https://example.com/anything"));
        assert!(!filter.excludes("https://example.org/"));

        let dotted = RequestFilter::new(&[], &strings(&["a.b"]));
        assert!(!dotted.excludes("https://axb.com"));
    }

    #[test]
    fn test_combined() {
        let filter = RequestFilter::new(&strings(&["jpg"]), &strings(&["/health"]));
        assert!(filter.excludes("https://example.com/x.jpg"));
        assert!(filter.excludes("https://example.com/health"));
        assert!(!filter.excludes("https://example.com/x.html"));
    }
}
