//! Content records: the flat name-to-value(s) JSON object exchanged with the
//! surrounding application.

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::errors::{FormError, Result};
use crate::role::{Action, Role};
use crate::schema::FormSchema;

/// Field values keyed by field name. Values are scalars or arrays of scalars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRecord(JsonMap<String, JsonValue>);

impl ContentRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Value stored under `name`. A JSON `null` counts as absent.
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<JsonValue> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.0)
    }

    /// Overlay `other` on top of this record. Keys in `other` win.
    pub fn merge(&mut self, other: ContentRecord) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    /// Keep only the entries whose field gives `role` exactly `action`.
    /// Entries without a schema field are dropped.
    pub fn filter_by_action(&self, schema: &FormSchema, role: Role, action: Action) -> ContentRecord {
        let mut filtered = ContentRecord::new();
        for field in schema.fields() {
            if field.role_actions.get(role) != Some(action) {
                continue;
            }
            if let Some(value) = self.get(&field.name) {
                filtered.insert(field.name.clone(), value.clone());
            }
        }
        filtered
    }

    /// Check a submission made by `role`: every field `role` may edit must be
    /// present. Returns the record reduced to those fields.
    pub fn require_editable(&self, schema: &FormSchema, role: Role) -> Result<ContentRecord> {
        let mut filtered = ContentRecord::new();
        for field in schema.fields() {
            if field.role_actions.get(role) != Some(Action::Edit) {
                continue;
            }
            match self.get(&field.name) {
                Some(value) => filtered.insert(field.name.clone(), value.clone()),
                None => {
                    debug!(field = %field.name, %role, "submission is missing an editable field");
                    return Err(FormError::MissingField(field.name.clone()));
                }
            }
        }
        Ok(filtered)
    }
}

impl From<JsonMap<String, JsonValue>> for ContentRecord {
    fn from(map: JsonMap<String, JsonValue>) -> Self {
        Self(map)
    }
}

impl TryFrom<JsonValue> for ContentRecord {
    type Error = FormError;

    fn try_from(value: JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldSchema, FieldType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> FormSchema {
        FormSchema::new([
            FieldSchema::new("Description", FieldType::Markdown)
                .action(Role::Creator, Action::Edit)
                .action(Role::Student, Action::View),
            FieldSchema::new("Solution", FieldType::Code)
                .action(Role::Creator, Action::Nothing)
                .action(Role::Student, Action::Edit),
            FieldSchema::new("Tests", FieldType::String)
                .list()
                .action(Role::Creator, Action::Edit)
                .action(Role::Student, Action::Nothing),
        ])
        .unwrap()
    }

    fn record(value: JsonValue) -> ContentRecord {
        ContentRecord::try_from(value).unwrap()
    }

    #[test]
    fn null_counts_as_absent() {
        let r = record(json!({"a": null, "b": 0}));
        assert!(!r.contains("a"));
        assert_eq!(r.get("b"), Some(&json!(0)));
    }

    #[test]
    fn filter_by_action_keeps_matching_fields() {
        let r = record(json!({
            "Description": "# Sum",
            "Solution": "print(1)",
            "Tests": ["1", "2"],
            "Stray": true
        }));
        let visible = r.filter_by_action(&schema(), Role::Student, Action::View);
        assert_eq!(visible, record(json!({"Description": "# Sum"})));
    }

    #[test]
    fn require_editable_checks_presence() {
        let r = record(json!({"Description": "# Sum", "Tests": [], "Solution": "x"}));
        let stored = r.require_editable(&schema(), Role::Creator).unwrap();
        assert_eq!(stored, record(json!({"Description": "# Sum", "Tests": []})));

        let err = record(json!({"Description": "# Sum"}))
            .require_editable(&schema(), Role::Creator)
            .unwrap_err();
        assert!(matches!(err, FormError::MissingField(name) if name == "Tests"));
    }

    #[test]
    fn merge_overlays() {
        let mut base = record(json!({"a": 1, "b": 2}));
        base.merge(record(json!({"b": 3, "c": 4})));
        assert_eq!(base, record(json!({"a": 1, "b": 3, "c": 4})));
    }
}
