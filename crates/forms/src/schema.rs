//! Form schema collections.
//!
//! - `FormSchema`: ordered, name-unique collection of `FieldSchema`
//! - `ProblemType`: a named schema as published by the grading backend
//! - `SchemaCatalog`: all known problem types, keyed by tag
//!
//! Field order is the presentation order of a built form. Serialization is
//! keyed by name, so lookups go through the index.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{FormError, Result};
use crate::field::FieldSchema;

/// Declarative schema for a form: fields in declared order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSchema>", into = "Vec<FieldSchema>")]
pub struct FormSchema {
    fields: IndexMap<String, Arc<FieldSchema>>,
}

impl FormSchema {
    /// Create a schema, rejecting duplicate field names.
    pub fn new(fields: impl IntoIterator<Item = FieldSchema>) -> Result<Self> {
        let mut map = IndexMap::new();
        for field in fields {
            if map.contains_key(&field.name) {
                return Err(FormError::DuplicateField(field.name));
            }
            map.insert(field.name.clone(), Arc::new(field));
        }
        Ok(Self { fields: map })
    }

    /// Parse a JSON array of field descriptors.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Find a field by its name.
    pub fn field(&self, name: &str) -> Option<&Arc<FieldSchema>> {
        self.fields.get(name)
    }

    /// Fields in declared order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &Arc<FieldSchema>> {
        self.fields.values()
    }
}

impl TryFrom<Vec<FieldSchema>> for FormSchema {
    type Error = FormError;

    fn try_from(fields: Vec<FieldSchema>) -> Result<Self> {
        FormSchema::new(fields)
    }
}

impl From<FormSchema> for Vec<FieldSchema> {
    fn from(schema: FormSchema) -> Self {
        schema
            .fields
            .into_values()
            .map(Arc::unwrap_or_clone)
            .collect()
    }
}

/// A kind of problem and the schema its records follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProblemType {
    #[serde(alias = "name")]
    pub name: String,
    #[serde(alias = "tag")]
    pub tag: String,
    #[serde(alias = "Description", alias = "fieldList", alias = "fields")]
    pub field_list: FormSchema,
}

impl ProblemType {
    pub fn fields(&self) -> &FormSchema {
        &self.field_list
    }
}

/// Tags are lowercase ASCII letters, digits, `-` and `_`.
pub fn is_valid_problem_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Known problem types keyed by tag, in the order they were received.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    types: IndexMap<String, ProblemType>,
}

impl SchemaCatalog {
    pub fn new(types: impl IntoIterator<Item = ProblemType>) -> Result<Self> {
        let mut map = IndexMap::new();
        for problem_type in types {
            if !is_valid_problem_tag(&problem_type.tag) {
                return Err(FormError::InvalidProblemTag(problem_type.tag));
            }
            tracing::debug!(tag = %problem_type.tag, "adding problem type");
            map.insert(problem_type.tag.clone(), problem_type);
        }
        if map.is_empty() {
            return Err(FormError::EmptyCatalog);
        }
        Ok(Self { types: map })
    }

    /// Parse the JSON list of problem types.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let types: Vec<ProblemType> = serde_json::from_str(raw)?;
        Self::new(types)
    }

    pub fn get(&self, tag: &str) -> Result<&ProblemType> {
        self.types
            .get(tag)
            .ok_or_else(|| FormError::UnknownProblemType(tag.to_string()))
    }

    /// `(name, tag)` pairs for a type picker.
    pub fn listing(&self) -> impl Iterator<Item = (&str, &str)> {
        self.types
            .values()
            .map(|t| (t.name.as_str(), t.tag.as_str()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use pretty_assertions::assert_eq;

    const CATALOG: &str = r#"[
        {"Name": "Python expression", "Tag": "python-expression", "FieldList": [
            {"Name": "Description", "Type": "markdown", "Creator": "edit", "Student": "view", "Result": "view"},
            {"Name": "Reference", "Type": "python", "Creator": "edit", "Student": "nothing", "Result": "nothing"}
        ]},
        {"Name": "Input/output", "Tag": "inout", "Description": [
            {"Name": "Tests", "Type": "string", "List": true, "Editor": "edit", "Student": "nothing"}
        ]}
    ]"#;

    #[test]
    fn schema_keeps_declared_order() {
        let schema = FormSchema::new([
            FieldSchema::new("b", FieldType::Text),
            FieldSchema::new("a", FieldType::Int),
        ])
        .unwrap();
        let names: Vec<_> = schema.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(schema.field("a").unwrap().field_type, FieldType::Int);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = FormSchema::new([
            FieldSchema::new("a", FieldType::Text),
            FieldSchema::new("a", FieldType::Int),
        ])
        .unwrap_err();
        assert!(matches!(err, FormError::DuplicateField(name) if name == "a"));

        let err = FormSchema::from_json_str(
            r#"[{"Name": "a", "Type": "text"}, {"Name": "a", "Type": "text"}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate field"));
    }

    #[test]
    fn catalog_lookup_and_listing() {
        let catalog = SchemaCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        let listing: Vec<_> = catalog.listing().collect();
        assert_eq!(
            listing,
            vec![("Python expression", "python-expression"), ("Input/output", "inout")]
        );

        let inout = catalog.get("inout").unwrap();
        assert_eq!(inout.fields().field_count(), 1);
        assert!(inout.fields().field("Tests").unwrap().is_list);
        assert!(matches!(
            catalog.get("missing"),
            Err(FormError::UnknownProblemType(_))
        ));
    }

    #[test]
    fn catalog_rejects_empty_lists_and_bad_tags() {
        assert!(matches!(
            SchemaCatalog::from_json_str("[]"),
            Err(FormError::EmptyCatalog)
        ));
        let err = SchemaCatalog::from_json_str(r#"[{"Name": "X", "Tag": "Bad Tag", "FieldList": []}]"#)
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidProblemTag(_)));
    }

    #[test]
    fn tags() {
        assert!(is_valid_problem_tag("python-3_basic"));
        assert!(!is_valid_problem_tag(""));
        assert!(!is_valid_problem_tag("Upper"));
    }
}
