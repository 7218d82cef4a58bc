// Status report - writes the run's ledger as one CSV row per dashboard
use crate::domain::dashboard::AccountId;
use crate::domain::outcome::{MigrationOutcome, MigrationState, StatusLedger};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct StatusRow<'a> {
    name: &'a str,
    found: Option<bool>,
    widgets_found: Option<bool>,
    target_existed: Option<bool>,
    created: bool,
    target_guid: Option<&'a str>,
    error: Option<&'a str>,
    status: Option<u16>,
    unresolved_entities: String,
    state: MigrationState,
}

impl<'a> StatusRow<'a> {
    fn new(name: &'a str, outcome: &'a MigrationOutcome) -> Self {
        Self {
            name,
            found: outcome.found,
            widgets_found: outcome.widgets_found,
            target_existed: outcome.target_existed,
            created: outcome.created,
            target_guid: outcome.target_guid.as_deref(),
            error: outcome.error.as_deref(),
            status: outcome.status,
            unresolved_entities: outcome
                .unresolved_entities
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(";"),
            state: outcome.state,
        }
    }
}

/// `<source>_<input base name>_dashboards_<target>.csv`
pub fn status_file_name(source: AccountId, input_base_name: &str, target: AccountId) -> String {
    format!("{}_{}_dashboards_{}.csv", source, input_base_name, target)
}

pub fn write_status_csv(path: impl AsRef<Path>, ledger: &StatusLedger) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create status file {}", path.display()))?;

    for (name, outcome) in ledger.iter() {
        writer.serialize(StatusRow::new(name, outcome))?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = ledger.len(), "Wrote dashboard status");
    Ok(path.to_path_buf())
}
