// Directory trait for account-scoped entity and dashboard access
use crate::domain::dashboard::{AccountId, DashboardDefinition, DashboardSummary};
use crate::domain::entity::{Entity, EntityId, EntityType};
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by the directory itself (transport or server side).
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DirectoryError {
    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            DirectoryError::Http { status, .. } | DirectoryError::Api { status, .. } => {
                Some(*status)
            }
            DirectoryError::Transport(e) => e.status().map(|s| s.as_u16()),
            DirectoryError::Decode(_) => None,
        }
    }
}

/// Result of a dashboard creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedDashboard {
    pub status: u16,
    pub guid: Option<String>,
    pub errors: Vec<String>,
}

impl CreatedDashboard {
    pub fn entity_created(&self) -> bool {
        self.guid.is_some() && self.errors.is_empty()
    }
}

/// One account's view of the monitoring platform. Implementations are bound
/// to a single set of credentials and a region.
#[async_trait]
pub trait EntityDirectory: Send + Sync {
    /// Look up a dashboard by exact name (definition only, no widgets)
    async fn get_dashboard(
        &self,
        name: &str,
        account_id: AccountId,
    ) -> Result<Option<DashboardSummary>, DirectoryError>;

    /// Fetch the full dashboard, pages and widgets included
    async fn get_dashboard_widgets(
        &self,
        guid: &str,
    ) -> Result<Option<DashboardDefinition>, DirectoryError>;

    /// Look up an entity by id, assuming it has the given type
    async fn get_entity(
        &self,
        entity_type: EntityType,
        entity_id: &EntityId,
    ) -> Result<Option<Entity>, DirectoryError>;

    /// Look up an entity by exact name and type within an account
    async fn get_entity_by_name(
        &self,
        account_id: AccountId,
        entity_type: EntityType,
        name: &str,
    ) -> Result<Option<Entity>, DirectoryError>;

    async fn create_dashboard(
        &self,
        definition: &DashboardDefinition,
        account_id: AccountId,
    ) -> Result<CreatedDashboard, DirectoryError>;
}
