//! Roles, actions and the per-field action table.
//!
//! A field carries one [`Action`] per [`Role`]. [`resolve`] looks the entry up
//! for the viewer and applies the read-only downgrade (`edit` becomes `view`).
//! A missing entry is a schema/application mismatch and fails with
//! [`FormError::UnknownRole`].

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::debug;

use crate::errors::{FormError, Result};
use crate::field::FieldSchema;

/// Viewer category used to select an action for each field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Role {
    /// Authors the record (called `Editor` in older schemas).
    #[serde(alias = "editor")]
    #[strum(to_string = "creator", serialize = "editor")]
    Creator,
    #[strum(to_string = "student")]
    Student,
    /// Reads a graded submission.
    #[strum(to_string = "result")]
    Result,
}

/// What a field renders as for a given role.
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
pub enum Action {
    Edit,
    View,
    Nothing,
}

impl Action {
    /// Parse an action as it appears on the wire. Servers that always emit every
    /// role key send `""` for roles that see nothing.
    pub fn parse_wire(raw: &str) -> Option<Action> {
        if raw.trim().is_empty() {
            return Some(Action::Nothing);
        }
        raw.trim().parse().ok()
    }

    /// Effective action once the read-only context is applied.
    pub fn downgraded(self, readonly: bool) -> Action {
        match self {
            Action::Edit if readonly => Action::View,
            other => other,
        }
    }

    pub fn is_rendered(self) -> bool {
        !matches!(self, Action::Nothing)
    }
}

/// Per-role action table of a field. Roles without an entry are unknown to the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleActions {
    creator: Option<Action>,
    student: Option<Action>,
    result: Option<Action>,
}

impl RoleActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, role: Role) -> Option<Action> {
        match role {
            Role::Creator => self.creator,
            Role::Student => self.student,
            Role::Result => self.result,
        }
    }

    pub fn set(&mut self, role: Role, action: Action) {
        *self.slot(role) = Some(action);
    }

    /// Roles that have an entry, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, Action)> + '_ {
        [Role::Creator, Role::Student, Role::Result]
            .into_iter()
            .filter_map(|role| self.get(role).map(|action| (role, action)))
    }

    fn slot(&mut self, role: Role) -> &mut Option<Action> {
        match role {
            Role::Creator => &mut self.creator,
            Role::Student => &mut self.student,
            Role::Result => &mut self.result,
        }
    }
}

/// Resolve the action `role` gets on `field`, downgrading `edit` to `view` in a
/// read-only context.
pub fn resolve(role: Role, field: &FieldSchema, readonly: bool) -> Result<Action> {
    let Some(action) = field.role_actions.get(role) else {
        return Err(FormError::UnknownRole {
            role,
            field: field.name.clone(),
        });
    };
    let effective = action.downgraded(readonly);
    if effective != action {
        debug!(field = %field.name, %role, "read-only context: edit downgraded to view");
    }
    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use pretty_assertions::assert_eq;

    fn field() -> FieldSchema {
        FieldSchema::new("code", FieldType::Code)
            .action(Role::Creator, Action::Edit)
            .action(Role::Student, Action::View)
            .action(Role::Result, Action::Nothing)
    }

    #[test]
    fn looks_up_the_role_entry() {
        let f = field();
        assert_eq!(resolve(Role::Creator, &f, false).unwrap(), Action::Edit);
        assert_eq!(resolve(Role::Student, &f, false).unwrap(), Action::View);
        assert_eq!(resolve(Role::Result, &f, false).unwrap(), Action::Nothing);
    }

    #[test]
    fn readonly_downgrades_edit_only() {
        let f = field();
        assert_eq!(resolve(Role::Creator, &f, true).unwrap(), Action::View);
        assert_eq!(resolve(Role::Student, &f, true).unwrap(), Action::View);
        assert_eq!(resolve(Role::Result, &f, true).unwrap(), Action::Nothing);
    }

    #[test]
    fn missing_entry_is_unknown_role() {
        let f = FieldSchema::new("n", FieldType::Int).action(Role::Creator, Action::Edit);
        let err = resolve(Role::Result, &f, false).unwrap_err();
        assert!(matches!(err, FormError::UnknownRole { role: Role::Result, .. }));
    }

    #[test]
    fn role_names_accept_the_legacy_editor_alias() {
        assert_eq!("editor".parse::<Role>().unwrap(), Role::Creator);
        assert_eq!("Creator".parse::<Role>().unwrap(), Role::Creator);
        assert_eq!(Role::Creator.to_string(), "creator");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn wire_actions() {
        assert_eq!(Action::parse_wire("edit"), Some(Action::Edit));
        assert_eq!(Action::parse_wire("View"), Some(Action::View));
        assert_eq!(Action::parse_wire(""), Some(Action::Nothing));
        assert_eq!(Action::parse_wire("grade"), None);
    }
}
