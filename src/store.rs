use anyhow::{Context, Result};
use std::path::Path;

use crate::data_models::Page;

/// In-memory stand-in for the pages table the search endpoint reads from.
#[derive(Debug, Clone, Default)]
pub struct PageStore {
    pages: Vec<Page>,
}

impl PageStore {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Load pages from a JSON array of `Page` objects.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read pages file {}", path.display()))?;
        let pages: Vec<Page> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse pages file {}", path.display()))?;
        Ok(Self::new(pages))
    }

    /// A handful of pages so the demo has something to find.
    pub fn demo() -> Self {
        Self::new(vec![
            Page::new(
                "The Rust Programming Language",
                "https://www.rust-lang.org/",
                "en",
                "Rust is a language empowering everyone to build reliable and efficient software.",
            ),
            Page::new(
                "Tokio - An asynchronous Rust runtime",
                "https://tokio.rs/",
                "en",
                "Tokio is an asynchronous runtime for the Rust programming language.",
            ),
            Page::new(
                "Python.org",
                "https://www.python.org/",
                "en",
                "Python is a programming language that lets you work quickly.",
            ),
            Page::new(
                "Rust (programmeringssprog)",
                "https://da.wikipedia.org/wiki/Rust_(programmeringssprog)",
                "da",
                "Rust er et programmeringssprog med fokus på sikkerhed og hastighed.",
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages in `language` whose content contains `term`, ignoring case,
    /// in insertion order. An empty term matches nothing.
    pub fn search(&self, term: &str, language: &str) -> Vec<&Page> {
        if term.is_empty() {
            return Vec::new();
        }
        let needle = term.to_lowercase();
        self.pages
            .iter()
            .filter(|p| p.language == language)
            .filter(|p| p.content.to_lowercase().contains(&needle))
            .collect()
    }
}
