use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;
use std::time::Instant;

use crate::data_models::{DEFAULT_LANGUAGE, Page, SearchResult};
use crate::store::PageStore;

use super::models::{HealthResponse, SearchParams, SearchResponseBody};

const SNIPPET_CHARS: usize = 200;

pub async fn search_handler(
    State(store): State<Arc<PageStore>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponseBody> {
    let start = Instant::now();
    let term = params.q.as_deref().unwrap_or("");
    let language = params
        .language
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);

    let search_results: Vec<SearchResult> = store
        .search(term, language)
        .into_iter()
        .map(to_result)
        .collect();

    tracing::info!(
        q = term,
        language,
        hits = search_results.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "search served"
    );
    Json(SearchResponseBody { search_results })
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "backend",
    })
}

fn to_result(page: &Page) -> SearchResult {
    SearchResult {
        title: page.title.clone(),
        url: page.url.clone(),
        description: snippet(&page.content),
    }
}

fn snippet(content: &str) -> String {
    match content.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

#[test]
fn test_snippet() {
    assert_eq!(snippet("short"), "short");

    let exact = "a".repeat(SNIPPET_CHARS);
    assert_eq!(snippet(&exact), exact);

    let long = "ø".repeat(SNIPPET_CHARS + 5);
    let cut = snippet(&long);
    assert!(cut.ends_with("..."));
    assert_eq!(cut.chars().count(), SNIPPET_CHARS + 3);
}
