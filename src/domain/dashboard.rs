// Dashboard domain model
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::entity::EntityId;

pub type AccountId = i64;

/// A dashboard as fetched from (or submitted to) one account.
///
/// Everything the migrator does not interpret is kept in `extra` so a
/// fetched definition can be submitted again without losing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardDefinition {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            guid: None,
            name: name.into(),
            pages,
            extra: Map::new(),
        }
    }

    /// All widgets across all pages, in page order.
    #[cfg(test)]
    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.pages.iter().flat_map(|page| page.widgets.iter())
    }

    pub fn widgets_mut(&mut self) -> impl Iterator<Item = &mut Widget> {
        self.pages.iter_mut().flat_map(|page| page.widgets.iter_mut())
    }
}

/// Reduced view returned by a name lookup (no pages or widgets).
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub guid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub widgets: Vec<Widget>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    #[cfg(test)]
    pub fn new(widgets: Vec<Widget>) -> Self {
        Self {
            widgets,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_configuration: Option<WidgetConfiguration>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Widget {
    #[cfg(test)]
    pub fn new(raw_configuration: WidgetConfiguration) -> Self {
        Self {
            raw_configuration: Some(raw_configuration),
            extra: Map::new(),
        }
    }
}

/// A widget's `rawConfiguration`.
///
/// The platform does not tag widget kinds, so each field the migrator cares
/// about is read on its own: `accountId`, `nrqlQueries` and `entityIds` are
/// lifted out when they have the expected shape and left in `extra`
/// untouched otherwise. A widget can carry queries and entity references at
/// the same time. Individual list entries that are malformed are kept as
/// opaque JSON in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nrql_queries: Option<Vec<QueryEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_ids: Option<Vec<EntityReference>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WidgetConfiguration {
    pub fn from_map(mut raw: Map<String, Value>) -> Self {
        let account_id = take_parsed(&mut raw, "accountId");
        let nrql_queries = take_parsed::<Vec<Value>>(&mut raw, "nrqlQueries")
            .map(|entries| entries.into_iter().map(QueryEntry::from).collect());
        let entity_ids = take_parsed::<Vec<Value>>(&mut raw, "entityIds")
            .map(|entries| entries.into_iter().map(EntityReference::from).collect());
        Self {
            account_id,
            nrql_queries,
            entity_ids,
            extra: raw,
        }
    }

    #[cfg(test)]
    pub fn nrql(queries: Vec<NrqlQuery>) -> Self {
        Self {
            nrql_queries: Some(queries.into_iter().map(QueryEntry::Query).collect()),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn entities(account_id: Option<AccountId>, ids: Vec<EntityId>) -> Self {
        Self {
            account_id,
            entity_ids: Some(ids.into_iter().map(EntityReference::Id).collect()),
            ..Self::default()
        }
    }

    /// Well-formed NRQL queries, in order.
    pub fn queries_mut(&mut self) -> impl Iterator<Item = &mut NrqlQuery> {
        self.nrql_queries
            .iter_mut()
            .flatten()
            .filter_map(|entry| match entry {
                QueryEntry::Query(query) => Some(query),
                QueryEntry::Opaque(_) => None,
            })
    }

    /// Well-formed entity ids, in order.
    pub fn entity_ids_mut(&mut self) -> impl Iterator<Item = &mut EntityId> {
        self.entity_ids
            .iter_mut()
            .flatten()
            .filter_map(|entry| match entry {
                EntityReference::Id(id) => Some(id),
                EntityReference::Opaque(_) => None,
            })
    }

    #[cfg(test)]
    pub fn queries(&self) -> Vec<&NrqlQuery> {
        self.nrql_queries
            .iter()
            .flatten()
            .filter_map(|entry| match entry {
                QueryEntry::Query(query) => Some(query),
                QueryEntry::Opaque(_) => None,
            })
            .collect()
    }

    #[cfg(test)]
    pub fn entity_id_list(&self) -> Vec<EntityId> {
        self.entity_ids
            .iter()
            .flatten()
            .filter_map(|entry| match entry {
                EntityReference::Id(id) => Some(id.clone()),
                EntityReference::Opaque(_) => None,
            })
            .collect()
    }
}

impl<'de> Deserialize<'de> for WidgetConfiguration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}

/// Removes `key` from `raw` only if its value parses as `T`.
fn take_parsed<T: DeserializeOwned>(raw: &mut Map<String, Value>, key: &str) -> Option<T> {
    let parsed = serde_json::from_value(raw.get(key)?.clone()).ok()?;
    raw.remove(key);
    Some(parsed)
}

/// One element of `nrqlQueries`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryEntry {
    Query(NrqlQuery),
    Opaque(Value),
}

impl From<Value> for QueryEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(raw) => QueryEntry::Query(NrqlQuery::from_map(raw)),
            other => QueryEntry::Opaque(other),
        }
    }
}

/// One element of `entityIds`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityReference {
    Id(EntityId),
    Opaque(Value),
}

impl From<Value> for EntityReference {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => EntityReference::Id(EntityId::Text(text)),
            Value::Number(number) => match number.as_i64() {
                Some(id) => EntityReference::Id(EntityId::Number(id)),
                None => EntityReference::Opaque(Value::Number(number)),
            },
            other => EntityReference::Opaque(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NrqlQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_ids: Option<Vec<AccountId>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NrqlQuery {
    #[cfg(test)]
    pub fn new(query: &str) -> Self {
        let mut extra = Map::new();
        extra.insert("query".to_string(), Value::String(query.to_string()));
        Self {
            account_id: None,
            account_ids: None,
            extra,
        }
    }

    fn from_map(mut raw: Map<String, Value>) -> Self {
        Self {
            account_id: take_parsed(&mut raw, "accountId"),
            account_ids: take_parsed(&mut raw, "accountIds"),
            extra: raw,
        }
    }
}

impl<'de> Deserialize<'de> for NrqlQuery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}
