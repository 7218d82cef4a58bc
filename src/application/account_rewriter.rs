// Account rewriter - moves NRQL account-id fields from source to target account
use crate::domain::dashboard::{AccountId, DashboardDefinition, WidgetConfiguration};
use serde::Deserialize;

/// Source and target account of one migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMapping {
    pub source: AccountId,
    pub target: AccountId,
}

impl AccountMapping {
    pub fn new(source: AccountId, target: AccountId) -> Self {
        Self { source, target }
    }

    /// Replaces `account_id` with the target account if it is the source account.
    pub fn rewrite(&self, account_id: &mut AccountId) {
        if *account_id == self.source {
            *account_id = self.target;
        }
    }
}

/// Which entries of a query's `accountIds` list are rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountIdsPolicy {
    /// Only index 0, matching dashboards migrated by earlier tooling.
    #[default]
    FirstOnly,
    All,
}

/// Rewrites `accountId` / `accountIds` on every NRQL query in the dashboard.
/// Widgets without queries are left alone.
pub fn rewrite_nrql_account_ids(
    dashboard: &mut DashboardDefinition,
    accounts: AccountMapping,
    policy: AccountIdsPolicy,
) {
    let queries = dashboard
        .widgets_mut()
        .filter_map(|widget| widget.raw_configuration.as_mut())
        .flat_map(WidgetConfiguration::queries_mut);

    for query in queries {
        if let Some(account_id) = query.account_id.as_mut() {
            accounts.rewrite(account_id);
        }

        let Some(account_ids) = query.account_ids.as_mut() else {
            continue;
        };
        match policy {
            AccountIdsPolicy::FirstOnly => {
                if let Some(first) = account_ids.first_mut() {
                    accounts.rewrite(first);
                }
            }
            AccountIdsPolicy::All => account_ids.iter_mut().for_each(|id| accounts.rewrite(id)),
        }
    }
}
