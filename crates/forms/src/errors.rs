use thiserror::Error;

use crate::node::NodeId;
use crate::role::Role;

pub type Result<T, E = FormError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("no action for role {role} on field '{field}'")]
    UnknownRole { role: Role, field: String },

    #[error("no handler presents field '{field}' of type {field_type} as {action}")]
    UnsupportedFieldPresentation {
        field: String,
        field_type: crate::field::FieldType,
        action: crate::role::Action,
    },

    #[error("node for field '{0}' does not match the schema")]
    MismatchedSchema(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("invalid action '{action}' on field '{field}'")]
    InvalidAction { field: String, action: String },

    #[error("invalid field type '{kind}' on field '{field}'")]
    InvalidFieldType { field: String, kind: String },

    #[error("duplicate field: {0}")]
    DuplicateField(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("problem type list is empty")]
    EmptyCatalog,

    #[error("invalid problem tag: {0}")]
    InvalidProblemTag(String),

    #[error("unknown problem type: {0}")]
    UnknownProblemType(String),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("node {0} is not editable")]
    NotEditable(NodeId),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormError {
    /// Field-level problems that skip one field instead of failing the whole operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FormError::UnsupportedFieldPresentation { .. } | FormError::MismatchedSchema(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use crate::role::Action;

    #[test]
    fn field_level_errors_are_recoverable() {
        let unsupported = FormError::UnsupportedFieldPresentation {
            field: "n".into(),
            field_type: FieldType::Int,
            action: Action::Edit,
        };
        assert!(unsupported.is_recoverable());
        assert!(FormError::MismatchedSchema("n".into()).is_recoverable());
        assert!(
            !FormError::UnknownRole {
                role: Role::Result,
                field: "n".into()
            }
            .is_recoverable()
        );
    }

    #[test]
    fn messages_name_the_field() {
        let err = FormError::UnknownRole {
            role: Role::Student,
            field: "notes".into(),
        };
        assert_eq!(err.to_string(), "no action for role student on field 'notes'");
    }
}
