//! Builds render trees from a schema, a content record and a role.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::content::ContentRecord;
use crate::errors::Result;
use crate::handler::HandlerRegistry;
use crate::node::RenderTree;
use crate::renderer::FieldRenderer;
use crate::role::Role;
use crate::schema::FormSchema;

/// Entry point for turning `(schema, content, role, readonly)` into a `RenderTree`.
///
/// Fields are rendered in schema order. A field that no handler can present
/// is skipped and recorded in `RenderTree::diagnostics`; any other error
/// (such as a field without an action for `role`) aborts the build.
#[derive(Debug, Clone, Default)]
pub struct FormBuilder {
    registry: Arc<HandlerRegistry>,
}

impl FormBuilder {
    /// A builder using the standard handlers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn build(
        &self,
        schema: &FormSchema,
        content: &ContentRecord,
        role: Role,
        readonly: bool,
    ) -> Result<RenderTree> {
        let renderer = FieldRenderer::new(&self.registry);
        let mut nodes = Vec::with_capacity(schema.field_count());
        let mut diagnostics = Vec::new();

        for field in schema.fields() {
            match renderer.render(field, content, role, readonly) {
                Ok(Some(node)) => nodes.push(node),
                Ok(None) => {}
                Err(err) if err.is_recoverable() => {
                    warn!(field = %field.name, error = %err, "field skipped");
                    diagnostics.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        debug!(
            %role,
            readonly,
            fields = schema.field_count(),
            nodes = nodes.len(),
            "form built"
        );
        Ok(RenderTree::new(
            nodes,
            role,
            readonly,
            diagnostics,
            Arc::clone(&self.registry),
        ))
    }
}
