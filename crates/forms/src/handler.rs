//! Per-type rendering and extraction strategies.
//!
//! Every `FieldType` has one `FieldTypeHandler`. A handler turns a value into a
//! node body for an action (`render`) and reads the current value back out of
//! an editable body (`extract`). The `HandlerRegistry` is the lookup table from
//! `(FieldType, Action)` to a handler; a missing entry is reported as
//! `FormError::UnsupportedFieldPresentation` instead of falling through.
//!
//! View-mode suppression lives in the registry so every handler gets it: a
//! `view` of an absent or blank value renders nothing.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::errors::{FormError, Result};
use crate::field::{FieldSchema, FieldType};
use crate::node::{Body, Control, Readout, TextSurface};
use crate::role::Action;
use crate::value::{Scalar, parse_int};

/// Rendering/extraction strategy for one field type.
pub trait FieldTypeHandler: Send + Sync {
    fn field_type(&self) -> FieldType;

    /// Actions this handler can present. `nothing` never reaches a handler.
    fn supports(&self, action: Action) -> bool {
        matches!(action, Action::Edit | Action::View)
    }

    /// Build the body for `action`. `None` if the action is not implemented.
    fn render(&self, field: &FieldSchema, action: Action, value: &Scalar) -> Option<Body>;

    /// Read the current value out of an editable body. `None` if the body was
    /// not produced by this handler.
    fn extract(&self, body: &Body) -> Option<Scalar>;
}

/// Lookup table from field type to handler.
pub struct HandlerRegistry {
    handlers: HashMap<FieldType, Box<dyn FieldTypeHandler>>,
}

impl HandlerRegistry {
    /// A registry without any handlers.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with the six built-in handlers.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(TextSurfaceHandler::new(FieldType::Markdown));
        registry.register(TextSurfaceHandler::new(FieldType::Text));
        registry.register(TextSurfaceHandler::new(FieldType::Code));
        registry.register(IntHandler);
        registry.register(BoolHandler);
        registry.register(StringHandler);
        registry
    }

    /// Install a handler, returning the one it replaces.
    pub fn register(
        &mut self,
        handler: impl FieldTypeHandler + 'static,
    ) -> Option<Box<dyn FieldTypeHandler>> {
        self.handlers
            .insert(handler.field_type(), Box::new(handler))
    }

    pub fn unregister(&mut self, field_type: FieldType) -> Option<Box<dyn FieldTypeHandler>> {
        self.handlers.remove(&field_type)
    }

    pub fn get(&self, field_type: FieldType) -> Option<&dyn FieldTypeHandler> {
        self.handlers.get(&field_type).map(|h| h.as_ref())
    }

    pub fn supports(&self, field_type: FieldType, action: Action) -> bool {
        self.get(field_type).is_some_and(|h| h.supports(action))
    }

    /// Render the body of `field` for `action`.
    ///
    /// Returns `Ok(None)` for `nothing` and for a suppressed view (absent or
    /// blank value). For `edit`, an absent value seeds the control with the
    /// field default, or the type's zero when none is declared.
    pub fn render(
        &self,
        field: &FieldSchema,
        action: Action,
        value: Option<&Scalar>,
    ) -> Result<Option<Body>> {
        if action == Action::Nothing {
            return Ok(None);
        }
        let unsupported = || FormError::UnsupportedFieldPresentation {
            field: field.name.clone(),
            field_type: field.field_type,
            action,
        };
        let handler = self
            .get(field.field_type)
            .filter(|h| h.supports(action))
            .ok_or_else(unsupported)?;

        let value = match (action, value) {
            (Action::View, None) => return Ok(None),
            (Action::View, Some(v)) if v.is_blank() => {
                debug!(field = %field.name, "blank value suppressed in view");
                return Ok(None);
            }
            (_, Some(v)) => v.clone(),
            (_, None) => field.default_value(),
        };

        handler
            .render(field, action, &value)
            .map(Some)
            .ok_or_else(unsupported)
    }

    /// Read the value of an editable body created for `field`.
    pub fn extract(&self, field: &FieldSchema, body: &Body) -> Result<Scalar> {
        let handler =
            self.get(field.field_type)
                .ok_or_else(|| FormError::UnsupportedFieldPresentation {
                    field: field.name.clone(),
                    field_type: field.field_type,
                    action: Action::Edit,
                })?;
        handler
            .extract(body)
            .ok_or_else(|| FormError::MismatchedSchema(field.name.clone()))
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.handlers.keys().map(|t| t.as_ref()).collect();
        types.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("types", &types)
            .finish()
    }
}

/// Markdown, text and code: a multi-line text surface when editing.
struct TextSurfaceHandler {
    field_type: FieldType,
}

impl TextSurfaceHandler {
    fn new(field_type: FieldType) -> Self {
        Self { field_type }
    }
}

impl FieldTypeHandler for TextSurfaceHandler {
    fn field_type(&self) -> FieldType {
        self.field_type
    }

    fn render(&self, field: &FieldSchema, action: Action, value: &Scalar) -> Option<Body> {
        let text = value.to_string();
        let language = match self.field_type {
            FieldType::Code => field.language.clone(),
            _ => None,
        };
        match action {
            Action::Edit => Some(Body::Control(Control::TextArea {
                surface: TextSurface::new(text),
                language,
            })),
            Action::View if self.field_type == FieldType::Markdown => {
                Some(Body::Readout(Readout::Markdown(text)))
            }
            Action::View => Some(Body::Readout(Readout::Source { text, language })),
            Action::Nothing => None,
        }
    }

    fn extract(&self, body: &Body) -> Option<Scalar> {
        match body {
            Body::Control(Control::TextArea { surface, .. }) => Some(Scalar::Text(
                surface.value().trim_end_matches(['\n', '\r']).to_string(),
            )),
            _ => None,
        }
    }
}

struct IntHandler;

impl FieldTypeHandler for IntHandler {
    fn field_type(&self) -> FieldType {
        FieldType::Int
    }

    fn render(&self, _field: &FieldSchema, action: Action, value: &Scalar) -> Option<Body> {
        match action {
            Action::Edit => Some(Body::Control(Control::number_input(value.to_string()))),
            Action::View => Some(Body::Readout(Readout::Paragraph(value.to_string()))),
            Action::Nothing => None,
        }
    }

    fn extract(&self, body: &Body) -> Option<Scalar> {
        match body {
            Body::Control(Control::NumberInput(input)) => {
                let raw = input.value();
                let n = parse_int(raw).unwrap_or_else(|| {
                    debug!(input = raw, "non-numeric input coerced to 0");
                    0
                });
                Some(Scalar::Int(n))
            }
            _ => None,
        }
    }
}

struct BoolHandler;

impl FieldTypeHandler for BoolHandler {
    fn field_type(&self) -> FieldType {
        FieldType::Bool
    }

    fn render(&self, _field: &FieldSchema, action: Action, value: &Scalar) -> Option<Body> {
        let checked = matches!(value, Scalar::Bool(true));
        match action {
            Action::Edit => Some(Body::Control(Control::Checkbox(checked))),
            Action::View => Some(Body::Readout(Readout::Paragraph(checked.to_string()))),
            Action::Nothing => None,
        }
    }

    fn extract(&self, body: &Body) -> Option<Scalar> {
        match body {
            Body::Control(Control::Checkbox(checked)) => Some(Scalar::Bool(*checked)),
            _ => None,
        }
    }
}

struct StringHandler;

impl FieldTypeHandler for StringHandler {
    fn field_type(&self) -> FieldType {
        FieldType::String
    }

    fn render(&self, _field: &FieldSchema, action: Action, value: &Scalar) -> Option<Body> {
        match action {
            Action::Edit => Some(Body::Control(Control::text_input(single_line(
                &value.to_string(),
            )))),
            Action::View => Some(Body::Readout(Readout::Paragraph(value.to_string()))),
            Action::Nothing => None,
        }
    }

    fn extract(&self, body: &Body) -> Option<Scalar> {
        match body {
            Body::Control(Control::TextInput(input)) => {
                Some(Scalar::Text(single_line(input.value())))
            }
            _ => None,
        }
    }
}

/// Single-line inputs drop line breaks instead of storing them.
fn single_line(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}
