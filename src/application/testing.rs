// In-memory directory used by the application-layer tests
use crate::application::entity_directory::{CreatedDashboard, DirectoryError, EntityDirectory};
use crate::domain::dashboard::{AccountId, DashboardDefinition, DashboardSummary};
use crate::domain::entity::{Entity, EntityId, EntityType};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetDashboard(String, AccountId),
    GetDashboardWidgets(String),
    GetEntity(EntityType, EntityId),
    GetEntityByName(AccountId, EntityType, String),
    CreateDashboard(String, AccountId),
}

#[derive(Default)]
struct State {
    dashboards: HashMap<(AccountId, String), DashboardDefinition>,
    entities: HashMap<(EntityType, EntityId), Entity>,
    named_entities: HashMap<(AccountId, EntityType, String), Entity>,
    created: Vec<(AccountId, DashboardDefinition)>,
    calls: Vec<Call>,
    widgets_error: Option<String>,
    hide_widgets: bool,
    reject_create: Option<String>,
    dashboard_lookup_status: Option<u16>,
    create_status: Option<u16>,
    name_lookup_status: Option<u16>,
    failing_entity_lookups: usize,
    next_guid: usize,
}

fn unavailable(status: u16) -> DirectoryError {
    DirectoryError::Http {
        status,
        body: "service unavailable".to_string(),
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    state: Mutex<State>,
}

impl FakeDirectory {
    pub fn with_dashboard(self, account_id: AccountId, mut dashboard: DashboardDefinition) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            if dashboard.guid.is_none() {
                dashboard.guid = Some(format!("{}-{}", account_id, dashboard.name));
            }
            state
                .dashboards
                .insert((account_id, dashboard.name.clone()), dashboard);
        }
        self
    }

    pub fn with_entity(
        self,
        entity_type: EntityType,
        id: impl Into<EntityId>,
        entity: Entity,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .entities
            .insert((entity_type, id.into()), entity);
        self
    }

    pub fn with_named_entity(
        self,
        account_id: AccountId,
        entity_type: EntityType,
        entity: Entity,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .named_entities
            .insert((account_id, entity_type, entity.name.clone()), entity);
        self
    }

    pub fn failing_widgets(self, message: &str) -> Self {
        self.state.lock().unwrap().widgets_error = Some(message.to_string());
        self
    }

    pub fn hiding_widgets(self) -> Self {
        self.state.lock().unwrap().hide_widgets = true;
        self
    }

    pub fn rejecting_create(self, message: &str) -> Self {
        self.state.lock().unwrap().reject_create = Some(message.to_string());
        self
    }

    /// Every dashboard lookup fails with `status`.
    pub fn failing_dashboard_lookup(self, status: u16) -> Self {
        self.state.lock().unwrap().dashboard_lookup_status = Some(status);
        self
    }

    /// Every create request fails with `status`.
    pub fn failing_create(self, status: u16) -> Self {
        self.state.lock().unwrap().create_status = Some(status);
        self
    }

    /// Every by-name entity lookup fails with `status`.
    pub fn failing_name_lookups(self, status: u16) -> Self {
        self.state.lock().unwrap().name_lookup_status = Some(status);
        self
    }

    /// The first `count` by-id entity lookups fail with a 503.
    pub fn failing_entity_lookups(self, count: usize) -> Self {
        self.state.lock().unwrap().failing_entity_lookups = count;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn created(&self) -> Vec<(AccountId, DashboardDefinition)> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn count_calls(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }
}

#[async_trait]
impl EntityDirectory for FakeDirectory {
    async fn get_dashboard(
        &self,
        name: &str,
        account_id: AccountId,
    ) -> Result<Option<DashboardSummary>, DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::GetDashboard(name.to_string(), account_id));
        if let Some(status) = state.dashboard_lookup_status {
            return Err(unavailable(status));
        }
        Ok(state
            .dashboards
            .get(&(account_id, name.to_string()))
            .map(|dashboard| DashboardSummary {
                guid: dashboard.guid.clone().unwrap_or_default(),
            }))
    }

    async fn get_dashboard_widgets(
        &self,
        guid: &str,
    ) -> Result<Option<DashboardDefinition>, DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::GetDashboardWidgets(guid.to_string()));
        if let Some(message) = &state.widgets_error {
            return Err(DirectoryError::Api {
                status: 200,
                message: message.clone(),
            });
        }
        if state.hide_widgets {
            return Ok(None);
        }
        Ok(state
            .dashboards
            .values()
            .find(|dashboard| dashboard.guid.as_deref() == Some(guid))
            .cloned())
    }

    async fn get_entity(
        &self,
        entity_type: EntityType,
        entity_id: &EntityId,
    ) -> Result<Option<Entity>, DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::GetEntity(entity_type, entity_id.clone()));
        if state.failing_entity_lookups > 0 {
            state.failing_entity_lookups -= 1;
            return Err(unavailable(503));
        }
        Ok(state.entities.get(&(entity_type, entity_id.clone())).cloned())
    }

    async fn get_entity_by_name(
        &self,
        account_id: AccountId,
        entity_type: EntityType,
        name: &str,
    ) -> Result<Option<Entity>, DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetEntityByName(
            account_id,
            entity_type,
            name.to_string(),
        ));
        if let Some(status) = state.name_lookup_status {
            return Err(unavailable(status));
        }
        Ok(state
            .named_entities
            .get(&(account_id, entity_type, name.to_string()))
            .cloned())
    }

    async fn create_dashboard(
        &self,
        definition: &DashboardDefinition,
        account_id: AccountId,
    ) -> Result<CreatedDashboard, DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::CreateDashboard(definition.name.clone(), account_id));
        if let Some(status) = state.create_status {
            return Err(unavailable(status));
        }
        state.created.push((account_id, definition.clone()));

        if let Some(message) = state.reject_create.clone() {
            return Ok(CreatedDashboard {
                status: 200,
                guid: None,
                errors: vec![message],
            });
        }

        state.next_guid += 1;
        let guid = format!("created-{}", state.next_guid);
        let mut stored = definition.clone();
        stored.guid = Some(guid.clone());
        state
            .dashboards
            .insert((account_id, definition.name.clone()), stored);

        Ok(CreatedDashboard {
            status: 200,
            guid: Some(guid),
            errors: Vec::new(),
        })
    }
}
