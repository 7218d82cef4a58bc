// NerdGraph implementation of the entity directory
use crate::application::entity_directory::{CreatedDashboard, DirectoryError, EntityDirectory};
use crate::domain::dashboard::{AccountId, DashboardDefinition, DashboardSummary};
use crate::domain::entity::{Entity, EntityId, EntityType};
use crate::infrastructure::config::{AccountSettings, Region};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

const ENTITY_SEARCH_QUERY: &str = r#"query($query: String!) {
  actor {
    entitySearch(query: $query) {
      results {
        entities {
          guid
          name
          accountId
          ... on ApmApplicationEntityOutline {
            applicationId
          }
          ... on DashboardEntityOutline {
            dashboardParentGuid
          }
        }
      }
    }
  }
}"#;

const DASHBOARD_QUERY: &str = r#"query($guid: EntityGuid!) {
  actor {
    entity(guid: $guid) {
      ... on DashboardEntity {
        guid
        name
        description
        permissions
        pages {
          name
          description
          widgets {
            title
            layout { column row width height }
            visualization { id }
            rawConfiguration
          }
        }
      }
    }
  }
}"#;

const DASHBOARD_CREATE_MUTATION: &str = r#"mutation($accountId: Int!, $dashboard: DashboardInput!) {
  dashboardCreate(accountId: $accountId, dashboard: $dashboard) {
    entityResult {
      guid
      name
    }
    errors {
      description
      type
    }
  }
}"#;

/// Client for one account's API key and region.
#[derive(Debug, Clone)]
pub struct NerdGraphClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ActorData<T> {
    actor: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntitySearchActor {
    entity_search: EntitySearch,
}

#[derive(Debug, Deserialize)]
struct EntitySearch {
    results: EntitySearchResults,
}

#[derive(Debug, Deserialize)]
struct EntitySearchResults {
    #[serde(default)]
    entities: Vec<EntityOutline>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityOutline {
    guid: String,
    name: String,
    #[serde(default)]
    application_id: Option<i64>,
    /// Set on dashboard pages, which share their parent's name.
    #[serde(default)]
    dashboard_parent_guid: Option<String>,
}

impl EntityOutline {
    fn into_entity(self) -> Entity {
        Entity {
            id: domain_id_from_guid(&self.guid),
            name: self.name,
            application_id: self.application_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntityActor {
    entity: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashboardCreateData {
    dashboard_create: DashboardCreateResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashboardCreateResult {
    entity_result: Option<CreatedEntity>,
    #[serde(default)]
    errors: Vec<CreateError>,
}

#[derive(Debug, Deserialize)]
struct CreatedEntity {
    guid: String,
}

#[derive(Debug, Deserialize)]
struct CreateError {
    description: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl NerdGraphClient {
    pub fn new(api_key: String, region: Region) -> Self {
        Self::with_endpoint(api_key, region.graphql_endpoint().to_string())
    }

    pub fn for_account(settings: &AccountSettings) -> Self {
        Self::new(settings.api_key.clone(), settings.region)
    }

    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<(u16, T), DirectoryError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("API-Key", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DirectoryError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphQlResponse<T> = serde_json::from_str(&body)?;
        if !parsed.errors.is_empty() {
            let message = parsed
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        parsed
            .data
            .map(|data| (status.as_u16(), data))
            .ok_or_else(|| DirectoryError::Api {
                status: status.as_u16(),
                message: "response contained no data".to_string(),
            })
    }

    async fn search_entities(&self, search: &str) -> Result<Vec<EntityOutline>, DirectoryError> {
        tracing::debug!("Executing entity search: {}", search);
        let (_, data): (u16, ActorData<EntitySearchActor>) = self
            .execute(ENTITY_SEARCH_QUERY, json!({ "query": search }))
            .await?;
        Ok(data.actor.entity_search.results.entities)
    }
}

#[async_trait]
impl EntityDirectory for NerdGraphClient {
    async fn get_dashboard(
        &self,
        name: &str,
        account_id: AccountId,
    ) -> Result<Option<DashboardSummary>, DirectoryError> {
        let search = format!(
            "name = '{}' AND type = 'DASHBOARD' AND accountId = {}",
            escape_search_value(name),
            account_id
        );
        let entities = self.search_entities(&search).await?;
        Ok(select_dashboard(entities, name))
    }

    async fn get_dashboard_widgets(
        &self,
        guid: &str,
    ) -> Result<Option<DashboardDefinition>, DirectoryError> {
        let (_, data): (u16, ActorData<EntityActor>) = self
            .execute(DASHBOARD_QUERY, json!({ "guid": guid }))
            .await?;

        match data.actor.entity {
            Some(Value::Object(fields)) if !fields.is_empty() => {
                Ok(Some(serde_json::from_value(Value::Object(fields))?))
            }
            _ => Ok(None),
        }
    }

    async fn get_entity(
        &self,
        entity_type: EntityType,
        entity_id: &EntityId,
    ) -> Result<Option<Entity>, DirectoryError> {
        let search = format!(
            "domainId = '{}' AND domain = '{}' AND type = '{}'",
            escape_search_value(&entity_id.to_string()),
            entity_type.domain(),
            entity_type.search_type()
        );
        let entities = self.search_entities(&search).await?;
        Ok(entities.into_iter().next().map(EntityOutline::into_entity))
    }

    async fn get_entity_by_name(
        &self,
        account_id: AccountId,
        entity_type: EntityType,
        name: &str,
    ) -> Result<Option<Entity>, DirectoryError> {
        let search = format!(
            "name = '{}' AND domain = '{}' AND type = '{}' AND accountId = {}",
            escape_search_value(name),
            entity_type.domain(),
            entity_type.search_type(),
            account_id
        );
        let entities = self.search_entities(&search).await?;
        Ok(entities
            .into_iter()
            .find(|e| e.name == name)
            .map(EntityOutline::into_entity))
    }

    async fn create_dashboard(
        &self,
        definition: &DashboardDefinition,
        account_id: AccountId,
    ) -> Result<CreatedDashboard, DirectoryError> {
        let variables = json!({
            "accountId": account_id,
            "dashboard": serde_json::to_value(definition)?,
        });
        let (status, data): (u16, DashboardCreateData) =
            self.execute(DASHBOARD_CREATE_MUTATION, variables).await?;

        let result = data.dashboard_create;
        Ok(CreatedDashboard {
            status,
            guid: result.entity_result.map(|e| e.guid),
            errors: result
                .errors
                .into_iter()
                .map(|e| match e.kind {
                    Some(kind) => format!("{}: {}", kind, e.description),
                    None => e.description,
                })
                .collect(),
        })
    }
}

/// Search matches substrings and also returns page entities; keep the
/// top-level dashboard with the exact name.
fn select_dashboard(entities: Vec<EntityOutline>, name: &str) -> Option<DashboardSummary> {
    entities
        .into_iter()
        .find(|e| e.name == name && e.dashboard_parent_guid.is_none())
        .map(|e| DashboardSummary { guid: e.guid })
}

/// Quotes a value for use inside a single-quoted entity search term.
fn escape_search_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Entity guids are base64 of `accountId|DOMAIN|TYPE|domainId`.
fn domain_id_from_guid(guid: &str) -> Option<EntityId> {
    let decoded = STANDARD_NO_PAD.decode(guid.trim_end_matches('=')).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    text.split('|')
        .nth(3)
        .filter(|id| !id.is_empty())
        .map(EntityId::from)
}
