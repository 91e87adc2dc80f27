use reqwest::Url;

use crate::data_models::SearchResult;
use crate::sanitize::Sanitizer;

pub const NO_RESULTS_HTML: &str = "<p>No results found.</p>";

/// One result ready for display. Every field is already sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResult {
    pub href: String,
    pub title: String,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedResults {
    NoResults,
    Results(Vec<RenderedResult>),
}

impl RenderedResults {
    pub fn len(&self) -> usize {
        match self {
            RenderedResults::NoResults => 0,
            RenderedResults::Results(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_html(&self) -> String {
        match self {
            RenderedResults::NoResults => NO_RESULTS_HTML.to_string(),
            RenderedResults::Results(items) => items
                .iter()
                .map(|r| {
                    format!(
                        concat!(
                            "<div class=\"search-result\">\n",
                            "  <h2><a class=\"search-result-title\" href=\"{}\">{}</a></h2>\n",
                            "  <div class=\"search-result-url\">{}</div>\n",
                            "  <p class=\"search-result-description\">{}</p>\n",
                            "</div>\n"
                        ),
                        r.href, r.title, r.url, r.description
                    )
                })
                .collect(),
        }
    }
}

/// Renders results in the order given. An empty slice renders the
/// "no results" placeholder.
pub fn render<S: Sanitizer + ?Sized>(results: &[SearchResult], sanitizer: &S) -> RenderedResults {
    if results.is_empty() {
        return RenderedResults::NoResults;
    }

    let items = results
        .iter()
        .map(|result| RenderedResult {
            href: sanitizer.sanitize(link_target(&result.url)),
            title: sanitizer.sanitize(&result.title),
            url: sanitizer.sanitize(&result.url),
            description: sanitizer.sanitize(&result.description),
        })
        .collect();
    RenderedResults::Results(items)
}

// Only http(s) and relative links are clickable; javascript:, data: and
// friends become a dead anchor.
fn link_target(url: &str) -> &str {
    match Url::parse(url.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => url,
        Ok(_) => "#",
        Err(_) if url.contains(':') && !url.starts_with('/') => "#",
        Err(_) => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_target() {
        assert_eq!(link_target("https://rust-lang.org"), "https://rust-lang.org");
        assert_eq!(link_target("/about"), "/about");
        assert_eq!(link_target("javascript:alert(1)"), "#");
        assert_eq!(link_target(" JavaScript:alert(1)"), "#");
        assert_eq!(link_target("data:text/html,<b>x</b>"), "#");
    }
}
