// Migration outcome domain model - per-dashboard status and the run ledger
use super::entity::EntityId;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationState {
    #[default]
    Pending,
    SkippedExists,
    SkippedNotFound,
    Created,
    CreateFailed,
}

impl MigrationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationState::Pending => "PENDING",
            MigrationState::SkippedExists => "SKIPPED_EXISTS",
            MigrationState::SkippedNotFound => "SKIPPED_NOT_FOUND",
            MigrationState::Created => "CREATED",
            MigrationState::CreateFailed => "CREATE_FAILED",
        }
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one dashboard name during a run.
///
/// A flag left at `None` means the step deciding it was never reached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationOutcome {
    pub state: MigrationState,
    pub found: Option<bool>,
    pub widgets_found: Option<bool>,
    pub target_existed: Option<bool>,
    pub created: bool,
    pub target_guid: Option<String>,
    pub error: Option<String>,
    pub status: Option<u16>,
    /// Entity references shipped with their source-account id.
    pub unresolved_entities: Vec<EntityId>,
}

impl MigrationOutcome {
    pub fn skip_existing(&mut self) {
        self.target_existed = Some(true);
        self.state = MigrationState::SkippedExists;
    }

    pub fn skip_not_found(&mut self) {
        self.state = MigrationState::SkippedNotFound;
    }

    pub fn record_error(&mut self, error: impl fmt::Display) {
        self.error = Some(error.to_string());
    }

    pub fn record_created(&mut self, status: u16, guid: Option<String>) {
        self.status = Some(status);
        self.created = true;
        self.target_guid = guid;
        self.state = MigrationState::Created;
    }

    pub fn record_create_failed(&mut self, status: Option<u16>, error: impl fmt::Display) {
        self.status = status;
        self.created = false;
        self.record_error(error);
        self.state = MigrationState::CreateFailed;
    }
}

/// Outcomes keyed by dashboard name, in input order.
#[derive(Debug, Clone, Default)]
pub struct StatusLedger {
    entries: Vec<(String, MigrationOutcome)>,
    index: HashMap<String, usize>,
}

impl StatusLedger {
    /// Stores the outcome for `name`. A repeated name replaces the earlier
    /// record but keeps its original position.
    pub fn record(&mut self, name: impl Into<String>, outcome: MigrationOutcome) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&position) => self.entries[position].1 = outcome,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, outcome));
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&MigrationOutcome> {
        self.index.get(name).map(|&position| &self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MigrationOutcome)> {
        self.entries
            .iter()
            .map(|(name, outcome)| (name.as_str(), outcome))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut summary = LedgerSummary::default();
        for (_, outcome) in &self.entries {
            match outcome.state {
                MigrationState::Created => summary.created += 1,
                MigrationState::CreateFailed => summary.create_failed += 1,
                MigrationState::SkippedExists => summary.skipped_exists += 1,
                MigrationState::SkippedNotFound => summary.skipped_not_found += 1,
                MigrationState::Pending => {}
            }
            if outcome.created && !outcome.unresolved_entities.is_empty() {
                summary.created_with_unresolved += 1;
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    pub created: usize,
    pub create_failed: usize,
    pub skipped_exists: usize,
    pub skipped_not_found: usize,
    pub created_with_unresolved: usize,
}

impl fmt::Display for LedgerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} (with unresolved references: {}), create_failed={}, skipped_exists={}, skipped_not_found={}",
            self.created,
            self.created_with_unresolved,
            self.create_failed,
            self.skipped_exists,
            self.skipped_not_found
        )
    }
}
