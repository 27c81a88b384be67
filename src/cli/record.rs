use crate::core::error::SnapshotError;
use crate::core::series::SnapshotRecord;
use crate::core::snapshot::SnapshotRepository;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Dates the user already had a snapshot for.
    pub skipped: Vec<NaiveDate>,
}

/// Imports a YAML list of snapshot records for `user`.
///
/// Existing `(user, date)` pairs are skipped and reported, never overwritten.
pub async fn import(
    repository: &dyn SnapshotRepository,
    user: &str,
    path: &Path,
) -> Result<ImportSummary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
    let records: Vec<SnapshotRecord> = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot file: {}", path.display()))?;

    let mut summary = ImportSummary::default();
    for record in &records {
        match repository.insert(user, record).await {
            Ok(()) => summary.imported += 1,
            Err(SnapshotError::AlreadyExists { date, .. }) => {
                warn!(user, %date, "Snapshot already exists, skipping");
                summary.skipped.push(date);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to store snapshot for {}", record.date));
            }
        }
    }
    info!(
        imported = summary.imported,
        skipped = summary.skipped.len(),
        "Snapshot import finished"
    );
    Ok(summary)
}

pub async fn run(repository: &dyn SnapshotRepository, user: &str, path: &Path) -> Result<()> {
    let summary = import(repository, user, path).await?;
    println!("Imported {} snapshot(s)", summary.imported);
    if !summary.skipped.is_empty() {
        let dates: Vec<String> = summary.skipped.iter().map(|d| d.to_string()).collect();
        println!("Skipped existing: {}", dates.join(", "));
    }
    Ok(())
}
