//! Reads a content record back out of a render tree.
//!
//! Only `edit` nodes contribute. Values are extracted by the handler of the
//! field each node is tagged with; the schema is only consulted to reject
//! nodes that were not built from it.

use serde_json::Value;
use tracing::{debug, warn};

use crate::content::ContentRecord;
use crate::errors::{FormError, Result};
use crate::handler::HandlerRegistry;
use crate::node::{NodeContent, RenderNode, RenderTree};
use crate::role::Action;
use crate::schema::FormSchema;

/// Record produced by a serialize walk plus the nodes that had to be dropped.
#[derive(Debug, Default)]
pub struct SerializeOutcome {
    pub record: ContentRecord,
    pub diagnostics: Vec<FormError>,
}

#[derive(Debug, Clone, Copy)]
pub struct FormSerializer<'a> {
    schema: &'a FormSchema,
}

impl<'a> FormSerializer<'a> {
    /// `schema` must be the schema `tree` was built from.
    pub fn new(schema: &'a FormSchema) -> Self {
        Self { schema }
    }

    pub fn serialize(&self, tree: &mut RenderTree) -> ContentRecord {
        self.serialize_with_diagnostics(tree).record
    }

    /// Flush every text surface, then extract the value of every editable node.
    pub fn serialize_with_diagnostics(&self, tree: &mut RenderTree) -> SerializeOutcome {
        tree.save_editors();

        let mut outcome = SerializeOutcome::default();
        let registry = tree.registry();
        for node in tree.nodes() {
            if node.action() != Action::Edit {
                continue;
            }
            let name = node.field().name.clone();
            match self.extract_node(registry, node) {
                Ok(value) => outcome.record.insert(name, value),
                Err(err) => {
                    warn!(field = %name, error = %err, "value dropped");
                    outcome.diagnostics.push(err);
                }
            }
        }

        debug!(
            fields = outcome.record.len(),
            dropped = outcome.diagnostics.len(),
            "form serialized"
        );
        outcome
    }

    fn extract_node(&self, registry: &HandlerRegistry, node: &RenderNode) -> Result<Value> {
        let field = node.field();
        match self.schema.field(&field.name) {
            Some(known) if known.same_slot(field) => {}
            _ => return Err(FormError::MismatchedSchema(field.name.clone())),
        }

        match node.content() {
            NodeContent::Scalar(body) => Ok(registry.extract(field, body)?.into()),
            NodeContent::List(list) => {
                let mut values = Vec::with_capacity(list.len());
                for element in list.elements() {
                    let Some(body) = element.body() else {
                        return Err(FormError::MismatchedSchema(field.name.clone()));
                    };
                    let value = registry.extract(field, body)?;
                    if value.is_kept_in_list() {
                        values.push(Value::from(value));
                    }
                }
                Ok(Value::Array(values))
            }
        }
    }
}
