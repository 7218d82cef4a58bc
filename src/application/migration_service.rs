// Migration service - drives check, fetch, transform and create for each dashboard
use crate::application::account_rewriter::{
    rewrite_nrql_account_ids, AccountIdsPolicy, AccountMapping,
};
use crate::application::entity_directory::EntityDirectory;
use crate::application::entity_resolver::EntityResolver;
use crate::application::reference_cache::ReferenceCache;
use crate::domain::dashboard::DashboardDefinition;
use crate::domain::entity::EntityId;
use crate::domain::outcome::{MigrationOutcome, StatusLedger};
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardMigrationService {
    source: Arc<dyn EntityDirectory>,
    target: Arc<dyn EntityDirectory>,
    resolver: EntityResolver,
    accounts: AccountMapping,
    account_ids_policy: AccountIdsPolicy,
}

impl DashboardMigrationService {
    pub fn new(
        source: Arc<dyn EntityDirectory>,
        target: Arc<dyn EntityDirectory>,
        accounts: AccountMapping,
        account_ids_policy: AccountIdsPolicy,
    ) -> Self {
        let resolver = EntityResolver::new(source.clone(), target.clone());
        Self {
            source,
            target,
            resolver,
            accounts,
            account_ids_policy,
        }
    }

    /// Migrates the named dashboards one after another, in order. Every name
    /// ends up in the returned ledger; no single failure stops the run.
    pub async fn migrate(&self, names: &[String]) -> StatusLedger {
        tracing::info!(
            source_account = self.accounts.source,
            target_account = self.accounts.target,
            dashboards = names.len(),
            "Dashboard migration started"
        );

        let mut cache = ReferenceCache::default();
        let mut ledger = StatusLedger::default();
        for name in names {
            let outcome = self.migrate_dashboard(name, &mut cache).await;
            tracing::debug!(dashboard = %name, state = %outcome.state, "Dashboard processed");
            ledger.record(name.clone(), outcome);
        }

        tracing::info!(
            summary = %ledger.summary(),
            cached_references = cache.len(),
            "Dashboard migration complete"
        );
        ledger
    }

    pub async fn migrate_dashboard(
        &self,
        name: &str,
        cache: &mut ReferenceCache,
    ) -> MigrationOutcome {
        let mut outcome = MigrationOutcome::default();

        match self.target.get_dashboard(name, self.accounts.target).await {
            Ok(Some(_)) => {
                tracing::warn!(dashboard = name, "Dashboard already exists in target, skipping");
                outcome.skip_existing();
                return outcome;
            }
            Ok(None) => outcome.target_existed = Some(false),
            Err(e) => {
                // Without a definite answer a create could duplicate the dashboard.
                tracing::error!(dashboard = name, error = %e, "Could not check target account");
                outcome.status = e.status();
                outcome.record_error(&e);
                outcome.skip_not_found();
                return outcome;
            }
        }

        let Some(mut definition) = self.fetch_source(name, &mut outcome).await else {
            outcome.skip_not_found();
            return outcome;
        };
        tracing::info!(dashboard = name, "Found source dashboard");

        outcome.unresolved_entities = self.transform(&mut definition, cache).await;

        match self
            .target
            .create_dashboard(&definition, self.accounts.target)
            .await
        {
            Ok(created) if created.entity_created() => {
                tracing::info!(
                    dashboard = name,
                    guid = created.guid.as_deref().unwrap_or_default(),
                    unresolved_references = outcome.unresolved_entities.len(),
                    "Created target dashboard"
                );
                outcome.record_created(created.status, created.guid);
            }
            Ok(created) => {
                let error = if created.errors.is_empty() {
                    "dashboard was not created".to_string()
                } else {
                    created.errors.join("; ")
                };
                tracing::warn!(dashboard = name, status = created.status, error = %error, "Dashboard creation rejected");
                outcome.record_create_failed(Some(created.status), error);
            }
            Err(e) => {
                tracing::error!(dashboard = name, error = %e, "Dashboard creation failed");
                outcome.record_create_failed(e.status(), &e);
            }
        }

        outcome
    }

    /// Prepares a fetched source definition for the target account. Returns
    /// the entity references that had to be left pointing at the source.
    pub async fn transform(
        &self,
        definition: &mut DashboardDefinition,
        cache: &mut ReferenceCache,
    ) -> Vec<EntityId> {
        definition.guid = None;
        rewrite_nrql_account_ids(definition, self.accounts, self.account_ids_policy);
        self.resolver
            .resolve_dashboard(definition, self.accounts, cache)
            .await
    }

    async fn fetch_source(
        &self,
        name: &str,
        outcome: &mut MigrationOutcome,
    ) -> Option<DashboardDefinition> {
        let summary = match self.source.get_dashboard(name, self.accounts.source).await {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                tracing::warn!(dashboard = name, "Dashboard not found in source");
                outcome.found = Some(false);
                return None;
            }
            Err(e) => {
                tracing::error!(dashboard = name, error = %e, "Error looking up source dashboard");
                outcome.found = Some(false);
                outcome.status = e.status();
                outcome.record_error(&e);
                return None;
            }
        };
        outcome.found = Some(true);

        match self.source.get_dashboard_widgets(&summary.guid).await {
            Ok(Some(definition)) => {
                outcome.widgets_found = Some(true);
                Some(definition)
            }
            Ok(None) => {
                tracing::warn!(dashboard = name, guid = %summary.guid, "Dashboard widgets not found");
                outcome.widgets_found = Some(false);
                None
            }
            Err(e) => {
                tracing::error!(dashboard = name, error = %e, "Error fetching dashboard widgets");
                outcome.status = e.status();
                outcome.record_error(&e);
                None
            }
        }
    }
}
