//! Pre-loaded content catalog (songs tagged by mood).

use crate::types::{ContentItem, Mood};
use anyhow::{Context, Result};
use std::path::Path;

/// Immutable, ordered collection of recommendable items.
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    items: Vec<ContentItem>,
}

impl ContentCatalog {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a JSON array of items (the `songs.json` layout).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let items: Vec<ContentItem> =
            serde_json::from_str(json).context("Failed to parse content catalog JSON")?;
        Ok(Self::new(items))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read catalog file: {}", path.as_ref().display())
        })?;
        let catalog = Self::from_json_str(&content)?;
        tracing::info!(
            "Loaded {} catalog items from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items whose tag is in `tags`, in catalog order.
    pub fn with_tags<'a>(&'a self, tags: &'a [Mood]) -> impl Iterator<Item = &'a ContentItem> + 'a {
        self.items.iter().filter(move |item| tags.contains(&item.mood_tag))
    }

    /// Item count per tag, for status output.
    pub fn count_by_tag(&self, tag: Mood) -> usize {
        self.items.iter().filter(|item| item.mood_tag == tag).count()
    }
}
