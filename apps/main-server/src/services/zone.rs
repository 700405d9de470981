//! Zone table seeding.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use entities::Zone;
use study_store::{StoreError, StudyStore};

use crate::error::{ServerError, ServerResult};

/// Parses `part1,part2,part3` records. Blank lines are skipped and malformed
/// records are logged and skipped.
pub fn parse_zones(csv: &str) -> Vec<Zone> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(csv.as_bytes());

    reader
        .records()
        .filter_map(|result| match result {
            Ok(record) => {
                let zone = zone_from_record(&record);
                if zone.is_none() {
                    let line = record.position().map(|p| p.line());
                    tracing::warn!(line = ?line, "Skipping malformed zone record");
                }
                zone
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable zone record");
                None
            }
        })
        .collect()
}

fn zone_from_record(record: &StringRecord) -> Option<Zone> {
    match (record.len(), record.get(0), record.get(1), record.get(2)) {
        (3, Some(part1), Some(part2), Some(part3)) if !part1.is_empty() && !part3.is_empty() => {
            Some(Zone::new(part1, part2, part3))
        }
        _ => None,
    }
}

/// Loads zones from a CSV file when the zone table is empty.
///
/// Records repeating an earlier `(part1, part3)` are skipped. Returns the
/// number of zones created.
pub async fn seed_zones<S: StudyStore>(store: &S, path: &Path) -> ServerResult<usize> {
    if !store.list_zones().await?.is_empty() {
        tracing::debug!("Zone table already populated");
        return Ok(0);
    }

    let csv = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ServerError::Internal(format!("Failed to read {}: {e}", path.display())))?;

    let mut created = 0;
    for zone in parse_zones(&csv) {
        match store.create_zone(zone).await {
            Ok(_) => created += 1,
            Err(StoreError::AlreadyExists { id, .. }) => {
                tracing::warn!(zone = %id, "Skipping duplicate zone");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(count = created, path = %path.display(), "Zones seeded");

    Ok(created)
}
