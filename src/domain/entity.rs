// Entity domain model - account-scoped references used by basic widgets
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, account-scoped entity identifier.
///
/// Widgets carry these either as JSON strings or as integers; the original
/// form is kept so an id is written back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl EntityId {
    /// A replacement for `original`, kept numeric when `original` was a
    /// number and the replacement is all digits.
    pub fn in_form_of(self, original: &EntityId) -> EntityId {
        match (self, original) {
            (EntityId::Text(text), EntityId::Number(_)) => match text.parse() {
                Ok(number) => EntityId::Number(number),
                Err(_) => EntityId::Text(text),
            },
            (id, _) => id,
        }
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(number) => write!(f, "{}", number),
            EntityId::Text(text) => f.write_str(text),
        }
    }
}

/// Entity categories a basic widget may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    ApmApplication,
    ApmKeyTransaction,
    BrowserApplication,
    MobileApplication,
}

impl EntityType {
    /// Order in which types are tried when only an id is known.
    pub const LOOKUP_ORDER: [EntityType; 4] = [
        EntityType::ApmApplication,
        EntityType::ApmKeyTransaction,
        EntityType::BrowserApplication,
        EntityType::MobileApplication,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::ApmApplication => "APM_APP",
            EntityType::ApmKeyTransaction => "APM_KT",
            EntityType::BrowserApplication => "BROWSER_APP",
            EntityType::MobileApplication => "MOBILE_APP",
        }
    }

    /// Entity search domain (`domain = '...'`).
    pub fn domain(&self) -> &'static str {
        match self {
            EntityType::ApmApplication | EntityType::ApmKeyTransaction => "APM",
            EntityType::BrowserApplication => "BROWSER",
            EntityType::MobileApplication => "MOBILE",
        }
    }

    /// Entity search type (`type = '...'`).
    pub fn search_type(&self) -> &'static str {
        match self {
            EntityType::ApmKeyTransaction => "KEY_TRANSACTION",
            _ => "APPLICATION",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity as reported by a directory lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub id: Option<EntityId>,
    /// Only populated for APM applications.
    pub application_id: Option<i64>,
}

impl Entity {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            name: name.into(),
            id: Some(id.into()),
            application_id: None,
        }
    }

    #[cfg(test)]
    pub fn application(name: impl Into<String>, application_id: i64) -> Self {
        Self {
            name: name.into(),
            id: None,
            application_id: Some(application_id),
        }
    }

    /// The identifier a widget should use to reference this entity.
    /// APM applications are referenced by application id, everything else
    /// by the generic entity id.
    pub fn reference_id(&self, entity_type: EntityType) -> Option<EntityId> {
        match entity_type {
            EntityType::ApmApplication => self.application_id.map(EntityId::from),
            _ => self.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_keeps_json_form() {
        let ids: Vec<EntityId> = serde_json::from_str(r#"["E1", 1234, "5678"]"#).unwrap();
        assert_eq!(
            ids,
            vec![EntityId::from("E1"), EntityId::Number(1234), EntityId::from("5678")]
        );
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"["E1",1234,"5678"]"#);
        assert!(serde_json::from_str::<EntityId>("null").is_err());
    }

    #[test]
    fn test_replacement_follows_original_form() {
        let number = EntityId::Number(1);
        let text = EntityId::from("E1");
        assert_eq!(EntityId::from("77").in_form_of(&number), EntityId::Number(77));
        assert_eq!(EntityId::from("K5").in_form_of(&number), EntityId::from("K5"));
        assert_eq!(EntityId::from("77").in_form_of(&text), EntityId::from("77"));
        assert_eq!(EntityId::Number(9).in_form_of(&text), EntityId::Number(9));
    }

    #[test]
    fn test_reference_id_reads_application_id_for_apm_apps() {
        let mut entity = Entity::application("checkout-svc", 9001);
        entity.id = Some(EntityId::from("generic"));

        assert_eq!(
            entity.reference_id(EntityType::ApmApplication),
            Some(EntityId::Number(9001))
        );
        assert_eq!(
            entity.reference_id(EntityType::BrowserApplication),
            Some(EntityId::from("generic"))
        );
    }

    #[test]
    fn test_lookup_order() {
        assert_eq!(EntityType::LOOKUP_ORDER[0], EntityType::ApmApplication);
        assert_eq!(EntityType::LOOKUP_ORDER[3], EntityType::MobileApplication);
        assert_eq!(EntityType::ApmKeyTransaction.search_type(), "KEY_TRANSACTION");
    }
}
