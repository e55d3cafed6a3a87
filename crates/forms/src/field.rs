//! Field types and field descriptors.
//!
//! This module defines the declarative pieces of the form engine:
//! - `FieldType`: the six supported scalar kinds
//! - `FieldSchema`: a named, typed slot with per-role actions
//!
//! Descriptors arrive from the surrounding application in a PascalCase wire
//! shape (`Name`, `Type`, `List`, `Default`, `Prompt`, `Title` and one key per
//! role). Two naming generations exist: older schemas use `Editor`/`Student`,
//! newer ones `Creator`/`Student`/`Result`. Both are accepted and normalised;
//! serialising a `FieldSchema` always produces the newer shape.
//!
//! Usage:
//! ```
//! use forms::{Action, FieldSchema, FieldType, Role};
//!
//! let field = FieldSchema::new("files", FieldType::String)
//!     .list()
//!     .prompt("Files to submit")
//!     .action(Role::Student, Action::Edit)
//!     .action(Role::Creator, Action::View);
//! assert!(field.is_list);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::warn;

use crate::errors::FormError;
use crate::role::{Action, Role, RoleActions};
use crate::value::Scalar;

/// Scalar kind of a field.
///
/// - Markdown / Text / Code are multi-line and edited through a text surface
/// - Int edits as a number input, String as a single-line input
/// - Bool edits as a checkbox
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FieldType {
    Markdown,
    Text,
    Code,
    Int,
    Bool,
    String,
}

impl FieldType {
    /// Parse a wire type name. The legacy `python` type is code with a language.
    pub fn parse_wire(raw: &str) -> Option<(FieldType, Option<String>)> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("python") {
            return Some((FieldType::Code, Some("python".to_string())));
        }
        raw.parse().ok().map(|t| (t, None))
    }
}

/// Declarative description of one slot in a content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireField", into = "WireField")]
pub struct FieldSchema {
    pub name: String,
    pub field_type: FieldType,
    pub is_list: bool,
    /// Declared default. `None` when the schema declares none, or one that
    /// does not fit the type.
    pub default: Option<Scalar>,
    pub prompt: Option<String>,
    pub title: Option<String>,
    /// Language of a code field (`python`, ...). Opaque to the engine.
    pub language: Option<String>,
    pub role_actions: RoleActions,
}

impl FieldSchema {
    /// Create a scalar field without a default and without role entries.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            is_list: false,
            default: None,
            prompt: None,
            title: None,
            language: None,
            role_actions: RoleActions::new(),
        }
    }

    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }

    /// Set the default. Values that do not fit the declared type are ignored.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Scalar::coerce(self.field_type, &value.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn action(mut self, role: Role, action: Action) -> Self {
        self.role_actions.set(role, action);
        self
    }

    /// Value a new control is seeded with: the declared default, else the type's zero.
    pub fn default_value(&self) -> Scalar {
        self.default
            .clone()
            .unwrap_or_else(|| Scalar::zero(self.field_type))
    }

    /// Non-empty prompt, if any.
    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }

    /// Non-empty title, if any.
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// True if `other` describes the same slot (name, type and list flag).
    pub fn same_slot(&self, other: &FieldSchema) -> bool {
        self.name == other.name
            && self.field_type == other.field_type
            && self.is_list == other.is_list
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireField {
    #[serde(alias = "name")]
    name: String,
    #[serde(alias = "type")]
    r#type: String,
    #[serde(default, alias = "list")]
    list: bool,
    #[serde(default, alias = "default", skip_serializing_if = "Value::is_null")]
    default: Value,
    #[serde(default, alias = "prompt", skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    #[serde(default, alias = "title", skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, alias = "language", skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default, alias = "creator", skip_serializing_if = "Option::is_none")]
    creator: Option<String>,
    #[serde(default, alias = "editor", skip_serializing)]
    editor: Option<String>,
    #[serde(default, alias = "student", skip_serializing_if = "Option::is_none")]
    student: Option<String>,
    #[serde(default, alias = "result", skip_serializing_if = "Option::is_none")]
    result: Option<String>,
}

impl TryFrom<WireField> for FieldSchema {
    type Error = FormError;

    fn try_from(wire: WireField) -> Result<Self, Self::Error> {
        let (field_type, legacy_language) =
            FieldType::parse_wire(&wire.r#type).ok_or_else(|| FormError::InvalidFieldType {
                field: wire.name.clone(),
                kind: wire.r#type.clone(),
            })?;

        let mut role_actions = RoleActions::new();
        let entries = [
            (Role::Creator, wire.creator.as_ref().or(wire.editor.as_ref())),
            (Role::Student, wire.student.as_ref()),
            (Role::Result, wire.result.as_ref()),
        ];
        for (role, raw) in entries {
            let Some(raw) = raw else { continue };
            let action = Action::parse_wire(raw).ok_or_else(|| FormError::InvalidAction {
                field: wire.name.clone(),
                action: raw.clone(),
            })?;
            role_actions.set(role, action);
        }

        let default = Scalar::coerce(field_type, &wire.default);
        if default.is_none() && !wire.default.is_null() {
            warn!(field = %wire.name, default = %wire.default, "default does not fit the field type; ignored");
        }

        Ok(FieldSchema {
            name: wire.name,
            field_type,
            is_list: wire.list,
            default,
            prompt: wire.prompt,
            title: wire.title,
            language: wire.language.or(legacy_language),
            role_actions,
        })
    }
}

impl From<FieldSchema> for WireField {
    fn from(field: FieldSchema) -> Self {
        let action = |role| field.role_actions.get(role).map(|a: Action| a.to_string());
        WireField {
            creator: action(Role::Creator),
            editor: None,
            student: action(Role::Student),
            result: action(Role::Result),
            r#type: field.field_type.to_string(),
            list: field.is_list,
            default: field.default.map(Value::from).unwrap_or_default(),
            prompt: field.prompt,
            title: field.title,
            language: field.language,
            name: field.name,
        }
    }
}
