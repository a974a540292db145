// Host entity models as reported by the home-automation API
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    pub last_changed: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl EntityState {
    pub fn attribute_f64(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).and_then(numeric)
    }

    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    pub fn attribute_strings(&self, name: &str) -> Vec<String> {
        self.attributes
            .get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One entry of an entity's state history. Minimal responses carry no
/// attributes beyond the first entry.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRecord {
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    pub last_changed: DateTime<Utc>,
    /// Moves on attribute-only updates too; absent in minimal responses
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl HistoryRecord {
    /// Numeric reading of the state, or of `attribute` when given. Non-finite
    /// and unparsable readings yield `None`.
    pub fn reading(&self, attribute: Option<&str>) -> Option<f64> {
        let value = match attribute {
            None => self.state.trim().parse::<f64>().ok(),
            Some(name) => self.attributes.get(name).and_then(numeric),
        }?;
        value.is_finite().then_some(value)
    }

    /// When the reading was taken. `last_changed` only follows the state, so
    /// attribute readings use `last_updated` when the host sent it.
    pub fn timestamp(&self, attribute: Option<&str>) -> DateTime<Utc> {
        match attribute {
            Some(_) => self.last_updated.unwrap_or(self.last_changed),
            None => self.last_changed,
        }
    }
}

/// Host attributes arrive as JSON numbers or numeric strings. Non-finite
/// values ("nan", "inf") count as missing.
fn numeric(value: &Value) -> Option<f64> {
    let value = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}
