use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::cli::StatusArgs;

/// Lenient view of a report manifest. Older or hand-edited reports may
/// miss fields; status should still print what is there.
#[derive(Debug, Default, Deserialize)]
struct ReportSnapshot {
    #[serde(default)]
    run_id: Option<String>,
    #[serde(default)]
    generated_at: Option<String>,
    #[serde(default)]
    total_records: Option<usize>,
    #[serde(default)]
    accuracy: Option<f64>,
    #[serde(default)]
    counts: Option<SnapshotCounts>,
    #[serde(default)]
    fields: Vec<SnapshotField>,
    #[serde(default)]
    diagnostics: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SnapshotCounts {
    #[serde(default)]
    true_positives: usize,
    #[serde(default)]
    true_negatives: usize,
    #[serde(default)]
    false_positives: usize,
    #[serde(default)]
    false_negatives: usize,
}

#[derive(Debug, Default, Deserialize)]
struct SnapshotField {
    #[serde(default)]
    field: String,
    #[serde(default)]
    errors: usize,
}

pub fn run(args: StatusArgs) -> Result<()> {
    info!(report_dir = %args.report_dir.display(), "status requested");

    let report_path = match args.report_path {
        Some(path) => Some(path),
        None => find_latest_report(&args.report_dir)?,
    };

    let Some(report_path) = report_path else {
        warn!(dir = %args.report_dir.display(), "no accuracy report found");
        return Ok(());
    };

    if !report_path.exists() {
        warn!(path = %report_path.display(), "accuracy report missing");
        return Ok(());
    }

    let raw = fs::read(&report_path)
        .with_context(|| format!("failed to read {}", report_path.display()))?;
    let snapshot: ReportSnapshot = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", report_path.display()))?;

    let counts = snapshot.counts.unwrap_or_default();
    let accuracy = snapshot
        .accuracy
        .map(|value| format!("{value:.3}"))
        .unwrap_or_else(|| "undefined".to_string());
    // Fields are ranked by error count in the report, so the first entry
    // is the worst performer.
    let hardest_field = snapshot
        .fields
        .first()
        .map(|field| format!("{} ({} errors)", field.field, field.errors))
        .unwrap_or_default();

    info!(
        path = %report_path.display(),
        run_id = %snapshot.run_id.unwrap_or_default(),
        generated_at = %snapshot.generated_at.unwrap_or_default(),
        total_records = snapshot.total_records.unwrap_or_default(),
        accuracy = %accuracy,
        true_positives = counts.true_positives,
        true_negatives = counts.true_negatives,
        false_positives = counts.false_positives,
        false_negatives = counts.false_negatives,
        hardest_field = %hardest_field,
        diagnostics = snapshot.diagnostics.len(),
        "loaded accuracy report"
    );

    Ok(())
}

fn find_latest_report(report_dir: &Path) -> Result<Option<PathBuf>> {
    if !report_dir.exists() {
        return Ok(None);
    }

    let mut latest_path: Option<PathBuf> = None;
    let mut latest_name: Option<String> = None;

    for entry in
        fs::read_dir(report_dir).with_context(|| format!("failed to read {}", report_dir.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !file_name.starts_with("accuracy_report_") || !file_name.ends_with(".json") {
            continue;
        }

        match &latest_name {
            Some(current) if file_name <= *current => {}
            _ => {
                latest_name = Some(file_name);
                latest_path = Some(entry.path());
            }
        }
    }

    Ok(latest_path)
}
