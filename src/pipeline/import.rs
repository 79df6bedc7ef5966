// Dataset import: load hashtags, places, and their links from a JSON file.
//
// Hashtags go in first so their embeddings are in place before places link
// to them. A place's tag list may name hashtags the file never defined;
// those are created without an embedding and simply never match a query.
// Embeddings are stored as given. Decoding (and rejecting junk) happens at
// query time.

use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{info, warn};

use crate::db::models::{Category, Dataset};
use crate::db::PlaceStore;

/// What an import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub hashtags: usize,
    pub places: usize,
    pub links: usize,
    /// Places dropped for an unrecognized category.
    pub skipped_places: usize,
}

/// Read and parse a dataset file.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse dataset {}", path.display()))
}

/// Column form of a seed embedding: strings are kept verbatim, anything
/// else is stored as its JSON text.
fn embedding_column(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Write a dataset into the store. `show_progress` draws a progress bar
/// over the place loop.
pub async fn run(store: &dyn PlaceStore, dataset: &Dataset, show_progress: bool) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for seed in &dataset.hashtags {
        let text = seed.text.trim();
        if text.is_empty() {
            continue;
        }
        let embedding = embedding_column(&seed.embedding);
        store.upsert_hashtag(text, embedding.as_deref()).await?;
        report.hashtags += 1;
    }

    let pb = if show_progress {
        let pb = ProgressBar::new(dataset.places.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  Importing [{bar:30}] {pos}/{len} ({eta})")?,
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    for seed in &dataset.places {
        let Some(category) = Category::parse(&seed.category) else {
            warn!(
                name = %seed.name,
                category = %seed.category,
                "Unrecognized category, skipping place"
            );
            report.skipped_places += 1;
            pb.inc(1);
            continue;
        };

        let place_id = store.insert_place(category, seed).await?;
        report.places += 1;

        for tag in &seed.hashtags {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }
            let hashtag_id = store.upsert_hashtag(tag, None).await?;
            store.link_place_hashtag(place_id, hashtag_id).await?;
            report.links += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(
        hashtags = report.hashtags,
        places = report.places,
        links = report.links,
        skipped = report.skipped_places,
        "Dataset imported"
    );
    Ok(report)
}
