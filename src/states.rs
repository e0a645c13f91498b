use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatesError {
    #[error("invalid states document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntityAttributes {
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub unit_of_measurement: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    pub state: String,
    pub attributes: EntityAttributes,
}

impl EntityState {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: EntityAttributes::default(),
        }
    }

    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.attributes.friendly_name = Some(name.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.attributes.unit_of_measurement = Some(unit.into());
        self
    }
}

/// Read-only snapshot of the host's entity states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateStore {
    entities: BTreeMap<String, EntityState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity_id: impl Into<String>, state: EntityState) {
        self.entities.insert(entity_id.into(), state);
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.entities.get(entity_id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Accepts the REST `/api/states` array or an `{entity_id: state}` map.
    pub fn from_json(input: &str) -> Result<Self, StatesError> {
        let parsed: StatesFile = serde_json::from_str(input)?;
        let mut store = StateStore::new();
        match parsed {
            StatesFile::List(items) => {
                for item in items {
                    store.insert(item.entity_id, item.body.into_state());
                }
            }
            StatesFile::Map(map) => {
                for (entity_id, body) in map {
                    store.insert(entity_id, body.into_state());
                }
            }
        }
        Ok(store)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatesFile {
    List(Vec<ListedState>),
    Map(BTreeMap<String, StateBody>),
}

#[derive(Debug, Deserialize)]
struct ListedState {
    entity_id: String,
    #[serde(flatten)]
    body: StateBody,
}

#[derive(Debug, Deserialize)]
struct StateBody {
    state: Option<NumberOrString>,
    #[serde(default)]
    attributes: EntityAttributes,
}

impl StateBody {
    fn into_state(self) -> EntityState {
        EntityState {
            // A null state is what the host reports for an entity it has not heard from.
            state: self
                .state
                .map(|value| value.as_string())
                .unwrap_or_else(|| "unknown".to_string()),
            attributes: self.attributes,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn as_string(&self) -> String {
        match self {
            NumberOrString::Number(val) => format!("{}", val),
            NumberOrString::String(val) => val.clone(),
        }
    }
}
