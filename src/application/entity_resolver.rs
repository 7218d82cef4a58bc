// Entity resolver - re-points basic widget entity references at the target account
use crate::application::account_rewriter::AccountMapping;
use crate::application::entity_directory::{DirectoryError, EntityDirectory};
use crate::application::reference_cache::{CachedReference, ReferenceCache};
use crate::domain::dashboard::{AccountId, DashboardDefinition};
use crate::domain::entity::{EntityId, EntityType};
use std::sync::Arc;

/// Name and type of an entity as found in the source account.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntity {
    pub name: String,
    pub entity_type: EntityType,
}

#[derive(Clone)]
pub struct EntityResolver {
    source: Arc<dyn EntityDirectory>,
    target: Arc<dyn EntityDirectory>,
}

impl EntityResolver {
    pub fn new(source: Arc<dyn EntityDirectory>, target: Arc<dyn EntityDirectory>) -> Self {
        Self { source, target }
    }

    /// Rewrites widget-level `accountId` and every `entityIds` entry of the
    /// dashboard. Never fails: a reference that cannot be resolved keeps its
    /// source id and is returned so the caller can report it.
    pub async fn resolve_dashboard(
        &self,
        dashboard: &mut DashboardDefinition,
        accounts: AccountMapping,
        cache: &mut ReferenceCache,
    ) -> Vec<EntityId> {
        let dashboard_name = dashboard.name.clone();
        let mut unresolved = Vec::new();

        for widget in dashboard.widgets_mut() {
            let Some(config) = widget.raw_configuration.as_mut() else {
                continue;
            };
            if let Some(account_id) = config.account_id.as_mut() {
                accounts.rewrite(account_id);
            }

            for entity_id in config.entity_ids_mut() {
                match self
                    .resolve_reference(&dashboard_name, entity_id, accounts.target, cache)
                    .await
                {
                    Some(target_id) => *entity_id = target_id,
                    None => unresolved.push(entity_id.clone()),
                }
            }
        }

        unresolved
    }

    async fn resolve_reference(
        &self,
        dashboard_name: &str,
        source_id: &EntityId,
        target_account: AccountId,
        cache: &mut ReferenceCache,
    ) -> Option<EntityId> {
        match cache.lookup(source_id) {
            Some(CachedReference::Resolved(target_id)) => return Some(target_id.clone()),
            Some(CachedReference::Unresolved) => {
                tracing::warn!(
                    dashboard = dashboard_name,
                    entity_id = %source_id,
                    "Entity reference could not be resolved earlier in this run, leaving source id"
                );
                return None;
            }
            None => {}
        }

        let source_entity = match self.identify_source_entity(source_id).await {
            Ok(Some(source_entity)) => source_entity,
            Ok(None) => {
                tracing::warn!(
                    dashboard = dashboard_name,
                    entity_id = %source_id,
                    "Could not determine source entity for basic widget"
                );
                cache.mark_unresolved(source_id.clone());
                return None;
            }
            Err(e) => {
                // Not cached: a later widget may find the directory healthy again.
                tracing::warn!(
                    dashboard = dashboard_name,
                    entity_id = %source_id,
                    error = %e,
                    "Source entity lookup failed, leaving source id"
                );
                return None;
            }
        };

        let target_id = match self
            .find_target_entity(target_account, &source_entity)
            .await
        {
            Ok(Some(target_id)) => target_id.in_form_of(source_id),
            Ok(None) => {
                tracing::warn!(
                    dashboard = dashboard_name,
                    entity = %source_entity.name,
                    entity_type = %source_entity.entity_type,
                    "Could not find target entity; it has probably not been migrated yet"
                );
                cache.mark_unresolved(source_id.clone());
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    dashboard = dashboard_name,
                    entity = %source_entity.name,
                    entity_type = %source_entity.entity_type,
                    error = %e,
                    "Target entity lookup failed, leaving source id"
                );
                return None;
            }
        };

        tracing::debug!(
            source_id = %source_id,
            target_id = %target_id,
            entity = %source_entity.name,
            "Resolved entity reference"
        );
        cache.insert(source_id.clone(), target_id.clone());
        Some(target_id)
    }

    /// Looks up `entity_id` in the source account, one type at a time in
    /// [`EntityType::LOOKUP_ORDER`], stopping at the first match. A failed
    /// lookup does not stop the others, but without a match it is returned
    /// instead of a definite miss.
    pub async fn identify_source_entity(
        &self,
        entity_id: &EntityId,
    ) -> Result<Option<SourceEntity>, DirectoryError> {
        let mut failure = None;
        for entity_type in EntityType::LOOKUP_ORDER {
            match self.source.get_entity(entity_type, entity_id).await {
                Ok(Some(entity)) => {
                    return Ok(Some(SourceEntity {
                        name: entity.name,
                        entity_type,
                    }));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(
                        entity_id = %entity_id,
                        entity_type = %entity_type,
                        error = %e,
                        "Source entity lookup failed"
                    );
                    failure = Some(e);
                }
            }
        }
        failure.map_or(Ok(None), Err)
    }

    async fn find_target_entity(
        &self,
        target_account: AccountId,
        source_entity: &SourceEntity,
    ) -> Result<Option<EntityId>, DirectoryError> {
        let entity = self
            .target
            .get_entity_by_name(target_account, source_entity.entity_type, &source_entity.name)
            .await?;
        Ok(entity.and_then(|e| e.reference_id(source_entity.entity_type)))
    }
}
