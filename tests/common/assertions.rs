//! Custom assertions and readers for end-to-end tests

use std::path::Path;
use tokio::sync::broadcast;
use verdict_dl::{Event, MetadataEntry};

/// Parse the metadata document at `path`
pub fn read_metadata(path: &Path) -> Vec<MetadataEntry> {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("Invalid metadata in {}: {}", path.display(), e))
}

/// Drain every event already buffered on `events`
pub fn drain_events(events: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}

/// Assert a file exists with exactly `expected` as its contents
pub fn assert_file_contents(path: &Path, expected: &[u8]) {
    let actual =
        std::fs::read(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    assert_eq!(
        actual,
        expected,
        "unexpected contents in {}",
        path.display()
    );
}
