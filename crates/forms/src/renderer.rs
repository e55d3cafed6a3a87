//! Renders one field of a schema into a node.
//!
//! Scalar fields become one node with a header and a body. List fields become
//! a container with one shared header and one element node per value; the
//! elements reuse the scalar path on the same field descriptor and drop their
//! own header.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::content::ContentRecord;
use crate::errors::Result;
use crate::field::FieldSchema;
use crate::handler::HandlerRegistry;
use crate::node::{Affordance, ElementSpawner, Header, ListNode, RenderNode};
use crate::role::{Action, Role, resolve};
use crate::value::Scalar;

/// Renders single fields through a handler registry.
#[derive(Debug, Clone, Copy)]
pub struct FieldRenderer<'a> {
    registry: &'a Arc<HandlerRegistry>,
}

impl<'a> FieldRenderer<'a> {
    pub fn new(registry: &'a Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    /// Render `field` for `role`.
    ///
    /// Returns `Ok(None)` when the field resolves to `nothing` or a view has
    /// nothing to show. `UnknownRole` and handler errors are returned as is;
    /// deciding which of them abort a build is up to the caller.
    pub fn render(
        &self,
        field: &Arc<FieldSchema>,
        content: &ContentRecord,
        role: Role,
        readonly: bool,
    ) -> Result<Option<RenderNode>> {
        let action = resolve(role, field, readonly)?;
        if !action.is_rendered() {
            debug!(field = %field.name, %role, "field hidden");
            return Ok(None);
        }
        if field.is_list {
            self.render_list(field, content, role, action)
        } else {
            self.render_scalar(field, content, role, action)
        }
    }

    fn render_scalar(
        &self,
        field: &Arc<FieldSchema>,
        content: &ContentRecord,
        role: Role,
        action: Action,
    ) -> Result<Option<RenderNode>> {
        let value =
            initial_value(field, content.get(&field.name)).or_else(|| field.default.clone());
        let Some(body) = self.registry.render(field, action, value.as_ref())? else {
            return Ok(None);
        };
        let header = Header::for_field(field, action);
        Ok(Some(RenderNode::scalar(
            Arc::clone(field),
            role,
            action,
            Some(header),
            body,
        )))
    }

    fn render_list(
        &self,
        field: &Arc<FieldSchema>,
        content: &ContentRecord,
        role: Role,
        action: Action,
    ) -> Result<Option<RenderNode>> {
        let values = initial_values(field, action, content.get(&field.name));
        let mut elements = Vec::with_capacity(values.len());
        for value in &values {
            if let Some(element) = render_element(self.registry, field, role, action, value)? {
                elements.push(element);
            }
        }

        let spawner = (action == Action::Edit)
            .then(|| ElementSpawner::new(Arc::clone(self.registry), Arc::clone(field), role));
        if spawner.is_none() && elements.is_empty() {
            debug!(field = %field.name, "every list element suppressed in view");
            return Ok(None);
        }

        let header = Header::for_field(field, action);
        Ok(Some(RenderNode::list_container(
            Arc::clone(field),
            role,
            action,
            header,
            ListNode::new(elements, spawner),
        )))
    }
}

/// Render one list element: the scalar body without a header, removable when editable.
pub(crate) fn render_element(
    registry: &HandlerRegistry,
    field: &Arc<FieldSchema>,
    role: Role,
    action: Action,
    value: &Scalar,
) -> Result<Option<RenderNode>> {
    let Some(body) = registry.render(field, action, Some(value))? else {
        return Ok(None);
    };
    let element = RenderNode::scalar(Arc::clone(field), role, action, None, body);
    Ok(Some(if action == Action::Edit {
        element.with_affordance(Affordance::Remove)
    } else {
        element
    }))
}

/// Value of a scalar field. Content that does not fit the declared type counts as absent.
fn initial_value(field: &FieldSchema, raw: Option<&Value>) -> Option<Scalar> {
    let raw = raw?;
    let value = Scalar::coerce(field.field_type, raw);
    if value.is_none() {
        warn!(field = %field.name, %raw, "content value does not fit the field type; ignored");
    }
    value
}

/// Element values of a list field: the stored sequence, or one default element.
fn initial_values(field: &FieldSchema, action: Action, raw: Option<&Value>) -> Vec<Scalar> {
    match raw {
        None => seed_values(field, action),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let value = Scalar::coerce(field.field_type, item);
                if value.is_none() {
                    warn!(field = %field.name, %item, "list element does not fit the field type; skipped");
                }
                value
            })
            .collect(),
        Some(single) => match Scalar::coerce(field.field_type, single) {
            Some(value) => vec![value],
            None => {
                warn!(field = %field.name, raw = %single, "list content is not a sequence; using the default");
                seed_values(field, action)
            }
        },
    }
}

/// A view list without content shows the declared default only; an edit
/// list always gets one element to type into.
fn seed_values(field: &FieldSchema, action: Action) -> Vec<Scalar> {
    match (&field.default, action) {
        (Some(default), _) => vec![default.clone()],
        (None, Action::Edit) => vec![field.default_value()],
        (None, _) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FormError;
    use crate::field::FieldType;
    use crate::node::{Body, Readout};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry() -> Arc<HandlerRegistry> {
        Arc::new(HandlerRegistry::standard())
    }

    fn content(value: Value) -> ContentRecord {
        ContentRecord::try_from(value).unwrap()
    }

    #[test]
    fn nothing_renders_no_node() {
        let registry = registry();
        let field = Arc::new(
            FieldSchema::new("secret", FieldType::Text).action(Role::Student, Action::Nothing),
        );
        let node = FieldRenderer::new(&registry)
            .render(&field, &content(json!({"secret": "x"})), Role::Student, true)
            .unwrap();
        assert!(node.is_none());
    }

    #[test]
    fn unknown_role_is_an_error() {
        let registry = registry();
        let field =
            Arc::new(FieldSchema::new("n", FieldType::Int).action(Role::Creator, Action::Edit));
        let err = FieldRenderer::new(&registry)
            .render(&field, &ContentRecord::new(), Role::Student, false)
            .unwrap_err();
        assert!(matches!(err, FormError::UnknownRole { .. }));
    }

    #[test]
    fn scalar_node_carries_tags_and_header() {
        let registry = registry();
        let field = Arc::new(
            FieldSchema::new("answer", FieldType::String)
                .prompt("Your answer")
                .title("Answer")
                .action(Role::Student, Action::View),
        );
        let node = FieldRenderer::new(&registry)
            .render(&field, &content(json!({"answer": "42"})), Role::Student, false)
            .unwrap()
            .unwrap();
        assert_eq!(node.field().name, "answer");
        assert_eq!(node.role(), Role::Student);
        assert_eq!(node.action(), Action::View);
        assert_eq!(node.header(), Some(&Header::Title("Answer".into())));
        assert_eq!(
            node.body(),
            Some(&Body::Readout(Readout::Paragraph("42".into())))
        );
    }

    #[test]
    fn mistyped_content_counts_as_absent() {
        let registry = registry();
        let field = Arc::new(
            FieldSchema::new("n", FieldType::Int)
                .default(3)
                .action(Role::Creator, Action::Edit),
        );
        let node = FieldRenderer::new(&registry)
            .render(&field, &content(json!({"n": "lots"})), Role::Creator, false)
            .unwrap()
            .unwrap();
        let control = node.body().and_then(Body::control).unwrap();
        assert_eq!(control.text(), Some("3"));
    }

    #[test]
    fn list_without_content_starts_with_the_default() {
        let registry = registry();
        let field = Arc::new(
            FieldSchema::new("tests", FieldType::String)
                .list()
                .default("case")
                .action(Role::Creator, Action::Edit),
        );
        let node = FieldRenderer::new(&registry)
            .render(&field, &ContentRecord::new(), Role::Creator, false)
            .unwrap()
            .unwrap();
        let list = node.list().unwrap();
        assert_eq!(list.len(), 1);
        assert!(list.is_editable());
        assert_eq!(node.affordances(), &[Affordance::Add]);

        let element = &list.elements()[0];
        assert_eq!(element.header(), None);
        assert_eq!(element.affordances(), &[Affordance::Remove]);
        assert_eq!(
            element.body().and_then(Body::control).and_then(|c| c.text()),
            Some("case")
        );
    }

    #[test]
    fn view_list_drops_blank_elements() {
        let registry = registry();
        let field = Arc::new(
            FieldSchema::new("notes", FieldType::Text)
                .list()
                .action(Role::Result, Action::View),
        );
        let renderer = FieldRenderer::new(&registry);

        let node = renderer
            .render(&field, &content(json!({"notes": ["", "kept", " "]})), Role::Result, false)
            .unwrap()
            .unwrap();
        let list = node.list().unwrap();
        assert_eq!(list.len(), 1);
        assert!(!list.is_editable());
        assert!(node.affordances().is_empty());
        assert!(list.elements()[0].affordances().is_empty());

        let empty = renderer
            .render(&field, &content(json!({"notes": ["", " "]})), Role::Result, false)
            .unwrap();
        assert!(empty.is_none());
    }

    #[test]
    fn absent_content_uses_the_declared_default_for_scalars_and_lists() {
        let registry = registry();
        let renderer = FieldRenderer::new(&registry);
        let scalar = Arc::new(
            FieldSchema::new("s", FieldType::Int)
                .default(5)
                .action(Role::Result, Action::View),
        );
        let list = Arc::new(
            FieldSchema::new("l", FieldType::Int)
                .list()
                .default(5)
                .action(Role::Result, Action::View),
        );

        let node = renderer
            .render(&scalar, &ContentRecord::new(), Role::Result, false)
            .unwrap()
            .unwrap();
        assert_eq!(
            node.body(),
            Some(&Body::Readout(Readout::Paragraph("5".into())))
        );
        let node = renderer
            .render(&list, &ContentRecord::new(), Role::Result, false)
            .unwrap()
            .unwrap();
        assert_eq!(
            node.list().unwrap().elements()[0].body(),
            Some(&Body::Readout(Readout::Paragraph("5".into())))
        );
    }

    #[test]
    fn absent_content_without_a_default_is_hidden_in_view() {
        let registry = registry();
        let renderer = FieldRenderer::new(&registry);
        for field in [
            FieldSchema::new("s", FieldType::Int),
            FieldSchema::new("l", FieldType::Int).list(),
        ] {
            let field = Arc::new(field.action(Role::Result, Action::View));
            let node = renderer
                .render(&field, &ContentRecord::new(), Role::Result, false)
                .unwrap();
            assert!(node.is_none(), "{}", field.name);
        }
    }

    #[test]
    fn empty_edit_list_still_offers_add() {
        let registry = registry();
        let field = Arc::new(
            FieldSchema::new("files", FieldType::String)
                .list()
                .action(Role::Student, Action::Edit),
        );
        let node = FieldRenderer::new(&registry)
            .render(&field, &content(json!({"files": []})), Role::Student, false)
            .unwrap()
            .unwrap();
        assert!(node.list().unwrap().is_empty());
        assert_eq!(node.affordances(), &[Affordance::Add]);
    }

    #[test]
    fn scalar_content_in_a_list_field_becomes_one_element() {
        let registry = registry();
        let field = Arc::new(
            FieldSchema::new("n", FieldType::Int)
                .list()
                .action(Role::Creator, Action::View),
        );
        let node = FieldRenderer::new(&registry)
            .render(&field, &content(json!({"n": 0})), Role::Creator, false)
            .unwrap()
            .unwrap();
        assert_eq!(node.list().unwrap().len(), 1);
    }
}
