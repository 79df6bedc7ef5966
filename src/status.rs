// Store status display: DB file size and row counts.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::db::PlaceStore;

/// Display store status to the terminal.
pub async fn show(store: &Arc<dyn PlaceStore>, db_display_path: &str) -> Result<()> {
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);
    println!("Tables: {}", store.table_count().await?);

    let stats = store.stats().await?;
    println!("Places: {}", stats.places);
    println!("Hashtags: {}", stats.hashtags);
    println!("Place-hashtag links: {}", stats.links);

    if stats.places == 0 {
        println!("\nNo places yet. Run `placetag import <file.json>` to load a dataset.");
    }

    Ok(())
}

/// `true` when the database file exists at all.
pub fn is_initialized(db_path: &str) -> bool {
    Path::new(db_path).exists()
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
