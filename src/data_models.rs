use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_LANGUAGE: &str = "en";

/// A search the user actually submitted. Text is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    language: String,
}

impl SearchQuery {
    /// Returns `None` when the trimmed input is empty, so blank input never
    /// turns into a request.
    pub fn new(input: &str, language: &str) -> Option<SearchQuery> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        let language = match language.trim() {
            "" => DEFAULT_LANGUAGE,
            lang => lang,
        };
        Some(SearchQuery {
            text: text.to_string(),
            language: language.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
}

impl SearchResult {
    pub fn new(title: &str, url: &str, description: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "lenient_results")]
    pub search_results: Vec<SearchResult>,
}

impl SearchResponse {
    pub fn empty() -> SearchResponse {
        SearchResponse::default()
    }
}

// null or a non-array means no results; elements of the wrong shape are
// skipped one by one so the well-formed ones survive.
fn lenient_results<'de, D>(deserializer: D) -> Result<Vec<SearchResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Body the backend sends back from login, logout and register.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AuthOutcome {
    pub fn ok(message: Option<String>) -> AuthOutcome {
        AuthOutcome {
            success: true,
            message,
            error: None,
        }
    }

    pub fn failed(error: &str) -> AuthOutcome {
        AuthOutcome {
            success: false,
            message: None,
            error: Some(error.to_string()),
        }
    }
}

/// A page held by the demo search endpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Page {
    pub title: String,
    pub url: String,
    pub language: String,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    pub content: String,
}

impl Page {
    pub fn new(title: &str, url: &str, language: &str, content: &str) -> Page {
        Page {
            title: title.to_string(),
            url: url.to_string(),
            language: language.to_string(),
            last_updated: Some(Utc::now()),
            content: content.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_trimmed() {
        let q = SearchQuery::new("  rust lang \n", "en").unwrap();
        assert_eq!(q.text(), "rust lang");
        assert_eq!(q.language(), "en");
    }

    #[test]
    fn test_blank_query_is_rejected() {
        assert!(SearchQuery::new("", "en").is_none());
        assert!(SearchQuery::new("   \t\n", "en").is_none());
    }

    #[test]
    fn test_blank_language_falls_back_to_default() {
        let q = SearchQuery::new("rust", " ").unwrap();
        assert_eq!(q.language(), DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_missing_results_field_is_empty() {
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.search_results.is_empty());
    }

    #[test]
    fn test_malformed_results_field_is_empty() {
        for body in [
            r#"{"search_results": null}"#,
            r#"{"search_results": "nope"}"#,
            r#"{"search_results": {"title": "x"}}"#,
            r#"{"search_results": [1, 2, 3]}"#,
        ] {
            let resp: SearchResponse = serde_json::from_str(body).unwrap();
            assert!(resp.search_results.is_empty(), "body: {body}");
        }
    }

    #[test]
    fn test_bad_elements_are_skipped_individually() {
        let body = r#"{"search_results": [
            {"title": "A", "url": "https://a.example", "description": "d"},
            {"title": "B", "url": "https://b.example", "description": null},
            42,
            {"title": "C", "url": "https://c.example", "description": "e"}
        ]}"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            resp.search_results,
            vec![
                SearchResult::new("A", "https://a.example", "d"),
                SearchResult::new("C", "https://c.example", "e"),
            ]
        );
    }

    #[test]
    fn test_missing_result_fields_default_to_empty_strings() {
        let resp: SearchResponse =
            serde_json::from_str(r#"{"search_results": [{"title": "Only title"}]}"#).unwrap();
        assert_eq!(
            resp.search_results,
            vec![SearchResult::new("Only title", "", "")]
        );
    }

    #[test]
    fn test_backend_page_shape_decodes() {
        // the backend may send extra page columns; they are ignored
        let body = r#"{"search_results": [
            {"title": "T", "url": "https://a.example", "language": "en", "content": "c", "description": "d"}
        ]}"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.search_results[0].description, "d");
        assert_eq!(resp.search_results[0].url, "https://a.example");
    }
}
