//! Render tree: presentation nodes tagged with the field and role they were
//! built from.
//!
//! A `RenderNode` is either a scalar node owning one `Body`, or a list
//! container owning ordered element nodes. Elements of an editable list carry
//! a `Remove` affordance and the container carries a trailing `Add`
//! affordance. Both act on the node that owns them: the container keeps what
//! it needs to create a new element (field, role, handler registry) so adding
//! works without the schema or the builder.
//!
//! Multi-line editors are modelled as a `TextSurface`: edits go to a buffer
//! and only become the control value after `save()`. The serializer flushes
//! every surface before it extracts anything.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;
use tui_input::{Input, InputRequest};

use crate::errors::{FormError, Result};
use crate::field::FieldSchema;
use crate::handler::HandlerRegistry;
use crate::renderer::render_element;
use crate::role::{Action, Role};

/// Header shown when neither a prompt (edit) nor a title (view) applies.
pub const PLACEHOLDER_HEADER: &str = "Field prompt/description goes here";

static NODE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a render node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        NodeId(NODE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Text shown above a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Prompt(String),
    Title(String),
    Placeholder,
}

impl Header {
    /// `edit` shows the prompt, `view` shows the title, anything else the placeholder.
    pub fn for_field(field: &FieldSchema, action: Action) -> Header {
        match action {
            Action::Edit => field
                .prompt_text()
                .map(|p| Header::Prompt(p.to_string()))
                .unwrap_or(Header::Placeholder),
            Action::View => field
                .title_text()
                .map(|t| Header::Title(t.to_string()))
                .unwrap_or(Header::Placeholder),
            Action::Nothing => Header::Placeholder,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Header::Prompt(text) | Header::Title(text) => text,
            Header::Placeholder => PLACEHOLDER_HEADER,
        }
    }
}

/// Opaque multi-line text editing surface with a buffered value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSurface {
    buffer: String,
    value: String,
}

impl TextSurface {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            buffer: text.clone(),
            value: text,
        }
    }

    /// Text currently shown in the editor.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Last saved value; what extraction reads.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn insert_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer != self.value
    }

    /// Flush the editor buffer into the control value.
    pub fn save(&mut self) {
        if self.is_dirty() {
            self.value.clone_from(&self.buffer);
        }
    }
}

/// Editable body of a node.
#[derive(Debug, Clone)]
pub enum Control {
    /// Markdown, text and code.
    TextArea {
        surface: TextSurface,
        language: Option<String>,
    },
    TextInput(Input),
    NumberInput(Input),
    Checkbox(bool),
}

impl Control {
    pub fn text_input(value: impl Into<String>) -> Self {
        Control::TextInput(Input::new(value.into()))
    }

    pub fn number_input(value: impl Into<String>) -> Self {
        Control::NumberInput(Input::new(value.into()))
    }

    /// Current text of a textual control. Text areas report their buffer.
    pub fn text(&self) -> Option<&str> {
        match self {
            Control::TextArea { surface, .. } => Some(surface.text()),
            Control::TextInput(input) | Control::NumberInput(input) => Some(input.value()),
            Control::Checkbox(_) => None,
        }
    }

    /// Replace the text of a textual control. Returns false for checkboxes.
    pub fn set_text(&mut self, text: &str) -> bool {
        match self {
            Control::TextArea { surface, .. } => surface.set_text(text),
            Control::TextInput(input) | Control::NumberInput(input) => {
                *input = Input::new(text.to_string());
            }
            Control::Checkbox(_) => return false,
        }
        true
    }

    /// Type `text` at the end of a textual control, one character at a time.
    pub fn type_text(&mut self, text: &str) -> bool {
        match self {
            Control::TextArea { surface, .. } => surface.insert_str(text),
            Control::TextInput(input) | Control::NumberInput(input) => {
                input.handle(InputRequest::GoToEnd);
                for c in text.chars() {
                    input.handle(InputRequest::InsertChar(c));
                }
            }
            Control::Checkbox(_) => return false,
        }
        true
    }

    pub fn checked(&self) -> Option<bool> {
        match self {
            Control::Checkbox(checked) => Some(*checked),
            _ => None,
        }
    }

    /// Set a checkbox. Returns false for textual controls.
    pub fn set_checked(&mut self, value: bool) -> bool {
        match self {
            Control::Checkbox(checked) => {
                *checked = value;
                true
            }
            _ => false,
        }
    }

    /// Flush buffered editor text. Other controls hold their value directly.
    pub fn save(&mut self) {
        if let Control::TextArea { surface, .. } = self {
            surface.save();
        }
    }
}

impl PartialEq for Control {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Control::TextArea {
                    surface: a,
                    language: la,
                },
                Control::TextArea {
                    surface: b,
                    language: lb,
                },
            ) => a == b && la == lb,
            (Control::TextInput(a), Control::TextInput(b))
            | (Control::NumberInput(a), Control::NumberInput(b)) => a.value() == b.value(),
            (Control::Checkbox(a), Control::Checkbox(b)) => a == b,
            _ => false,
        }
    }
}

/// Read-only body of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readout {
    /// Markdown source; turning it into markup is up to the presentation layer.
    Markdown(String),
    /// Text or code in a read-only editor.
    Source {
        text: String,
        language: Option<String>,
    },
    Paragraph(String),
}

impl Readout {
    pub fn text(&self) -> &str {
        match self {
            Readout::Markdown(text) | Readout::Paragraph(text) => text,
            Readout::Source { text, .. } => text,
        }
    }
}

/// Content of a scalar node or list element.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Control(Control),
    Readout(Readout),
}

impl Body {
    pub fn control(&self) -> Option<&Control> {
        match self {
            Body::Control(control) => Some(control),
            Body::Readout(_) => None,
        }
    }

    pub fn control_mut(&mut self) -> Option<&mut Control> {
        match self {
            Body::Control(control) => Some(control),
            Body::Readout(_) => None,
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, Body::Control(_))
    }
}

/// User-activatable control owned by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    /// Removes the list element that owns it.
    Remove,
    /// Appends a new element (seeded with the field default) to the list that owns it.
    Add,
}

/// Creates new elements for an editable list.
#[derive(Debug, Clone)]
pub(crate) struct ElementSpawner {
    registry: Arc<HandlerRegistry>,
    field: Arc<FieldSchema>,
    role: Role,
}

impl ElementSpawner {
    pub(crate) fn new(registry: Arc<HandlerRegistry>, field: Arc<FieldSchema>, role: Role) -> Self {
        Self {
            registry,
            field,
            role,
        }
    }

    fn spawn(&self) -> Result<RenderNode> {
        let element = render_element(
            &self.registry,
            &self.field,
            self.role,
            Action::Edit,
            &self.field.default_value(),
        )?;
        element.ok_or_else(|| FormError::UnsupportedFieldPresentation {
            field: self.field.name.clone(),
            field_type: self.field.field_type,
            action: Action::Edit,
        })
    }
}

/// Ordered elements of a list field.
#[derive(Debug, Clone)]
pub struct ListNode {
    elements: Vec<RenderNode>,
    spawner: Option<ElementSpawner>,
}

impl ListNode {
    pub(crate) fn new(elements: Vec<RenderNode>, spawner: Option<ElementSpawner>) -> Self {
        Self { elements, spawner }
    }

    /// Elements in visual order.
    pub fn elements(&self) -> &[RenderNode] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True if the list has an `Add` affordance.
    pub fn is_editable(&self) -> bool {
        self.spawner.is_some()
    }
}

#[derive(Debug, Clone)]
pub enum NodeContent {
    Scalar(Body),
    List(ListNode),
}

/// A presentation node tagged with the field it was built from and the role in effect.
#[derive(Debug, Clone)]
pub struct RenderNode {
    id: NodeId,
    field: Arc<FieldSchema>,
    role: Role,
    action: Action,
    header: Option<Header>,
    affordances: Vec<Affordance>,
    content: NodeContent,
}

impl RenderNode {
    pub(crate) fn scalar(
        field: Arc<FieldSchema>,
        role: Role,
        action: Action,
        header: Option<Header>,
        body: Body,
    ) -> Self {
        Self {
            id: NodeId::next(),
            field,
            role,
            action,
            header,
            affordances: Vec::new(),
            content: NodeContent::Scalar(body),
        }
    }

    pub(crate) fn list_container(
        field: Arc<FieldSchema>,
        role: Role,
        action: Action,
        header: Header,
        list: ListNode,
    ) -> Self {
        let affordances = if list.is_editable() {
            vec![Affordance::Add]
        } else {
            Vec::new()
        };
        Self {
            id: NodeId::next(),
            field,
            role,
            action,
            header: Some(header),
            affordances,
            content: NodeContent::List(list),
        }
    }

    pub(crate) fn with_affordance(mut self, affordance: Affordance) -> Self {
        self.affordances.push(affordance);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn field(&self) -> &Arc<FieldSchema> {
        &self.field
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// `None` for list elements; the container carries the shared header.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn affordances(&self) -> &[Affordance] {
        &self.affordances
    }

    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    pub fn body(&self) -> Option<&Body> {
        match &self.content {
            NodeContent::Scalar(body) => Some(body),
            NodeContent::List(_) => None,
        }
    }

    pub fn body_mut(&mut self) -> Option<&mut Body> {
        match &mut self.content {
            NodeContent::Scalar(body) => Some(body),
            NodeContent::List(_) => None,
        }
    }

    pub fn control_mut(&mut self) -> Option<&mut Control> {
        self.body_mut().and_then(Body::control_mut)
    }

    pub fn list(&self) -> Option<&ListNode> {
        match &self.content {
            NodeContent::List(list) => Some(list),
            NodeContent::Scalar(_) => None,
        }
    }

    pub fn list_mut(&mut self) -> Option<&mut ListNode> {
        match &mut self.content {
            NodeContent::List(list) => Some(list),
            NodeContent::Scalar(_) => None,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.action == Action::Edit
    }

    /// Activate the `Add` affordance: append an element seeded with the field
    /// default after every existing element. Returns the new element's id.
    pub fn add_element(&mut self) -> Result<NodeId> {
        let id = self.id;
        let NodeContent::List(list) = &mut self.content else {
            return Err(FormError::NotEditable(id));
        };
        let Some(spawner) = &list.spawner else {
            return Err(FormError::NotEditable(id));
        };
        let element = spawner.spawn()?;
        let element_id = element.id;
        list.elements.push(element);
        trace!(list = %id, element = %element_id, field = %self.field.name, "list element added");
        Ok(element_id)
    }

    /// Activate the `Remove` affordance of element `element` of this list.
    pub fn remove_element(&mut self, element: NodeId) -> Result<RenderNode> {
        let id = self.id;
        let NodeContent::List(list) = &mut self.content else {
            return Err(FormError::NodeNotFound(element));
        };
        let Some(position) = list.elements.iter().position(|e| e.id == element) else {
            return Err(FormError::NodeNotFound(element));
        };
        if !list.elements[position]
            .affordances
            .contains(&Affordance::Remove)
        {
            return Err(FormError::NotEditable(element));
        }
        let removed = list.elements.remove(position);
        trace!(list = %id, %element, field = %self.field.name, "list element removed");
        Ok(removed)
    }

    fn contains_element(&self, element: NodeId) -> bool {
        self.list()
            .is_some_and(|list| list.elements.iter().any(|e| e.id == element))
    }

    fn find(&self, id: NodeId) -> Option<&RenderNode> {
        if self.id == id {
            return Some(self);
        }
        self.list()
            .and_then(|list| list.elements.iter().find(|e| e.id == id))
    }

    fn find_mut(&mut self, id: NodeId) -> Option<&mut RenderNode> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.content {
            NodeContent::List(list) => list.elements.iter_mut().find(|e| e.id == id),
            NodeContent::Scalar(_) => None,
        }
    }

    fn save_editors(&mut self) {
        match &mut self.content {
            NodeContent::Scalar(body) => {
                if let Some(control) = body.control_mut() {
                    control.save();
                }
            }
            NodeContent::List(list) => {
                for element in &mut list.elements {
                    element.save_editors();
                }
            }
        }
    }
}

/// Built form: top-level nodes in schema order.
#[derive(Debug)]
pub struct RenderTree {
    nodes: Vec<RenderNode>,
    role: Role,
    readonly: bool,
    diagnostics: Vec<FormError>,
    registry: Arc<HandlerRegistry>,
}

impl RenderTree {
    pub(crate) fn new(
        nodes: Vec<RenderNode>,
        role: Role,
        readonly: bool,
        diagnostics: Vec<FormError>,
        registry: Arc<HandlerRegistry>,
    ) -> Self {
        Self {
            nodes,
            role,
            readonly,
            diagnostics,
            registry,
        }
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Field-level problems recovered while building (skipped fields).
    pub fn diagnostics(&self) -> &[FormError] {
        &self.diagnostics
    }

    pub(crate) fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// True if any node carries an editable control.
    pub fn is_editable(&self) -> bool {
        self.nodes.iter().any(RenderNode::is_editable)
    }

    /// Top-level node built for field `name`.
    pub fn find(&self, name: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.field.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut RenderNode> {
        self.nodes.iter_mut().find(|n| n.field.name == name)
    }

    /// Node (top-level or list element) with `id`.
    pub fn node(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.iter().find_map(|n| n.find(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut RenderNode> {
        self.nodes.iter_mut().find_map(|n| n.find_mut(id))
    }

    /// Activate the `Add` affordance of list `list`.
    pub fn add_element(&mut self, list: NodeId) -> Result<NodeId> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == list)
            .ok_or(FormError::NodeNotFound(list))?;
        node.add_element()
    }

    /// Activate the `Remove` affordance of list element `element`.
    pub fn remove_element(&mut self, element: NodeId) -> Result<RenderNode> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.contains_element(element))
            .ok_or(FormError::NodeNotFound(element))?;
        node.remove_element(element)
    }

    /// Flush every text surface into its control value.
    pub fn save_editors(&mut self) {
        for node in &mut self.nodes {
            node.save_editors();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use pretty_assertions::assert_eq;

    #[test]
    fn node_ids_are_unique() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert!(b > a);
    }

    #[test]
    fn header_selection() {
        let field = FieldSchema::new("n", FieldType::Int)
            .prompt("Pick a number")
            .title("Number");
        assert_eq!(
            Header::for_field(&field, Action::Edit),
            Header::Prompt("Pick a number".into())
        );
        assert_eq!(
            Header::for_field(&field, Action::View),
            Header::Title("Number".into())
        );

        let bare = FieldSchema::new("n", FieldType::Int).title("Number");
        let header = Header::for_field(&bare, Action::Edit);
        assert_eq!(header, Header::Placeholder);
        assert_eq!(header.text(), "Field prompt/description goes here");
    }

    #[test]
    fn text_surface_buffers_until_saved() {
        let mut surface = TextSurface::new("one");
        surface.insert_str(" two");
        assert_eq!(surface.text(), "one two");
        assert_eq!(surface.value(), "one");
        assert!(surface.is_dirty());
        surface.save();
        assert_eq!(surface.value(), "one two");
        assert!(!surface.is_dirty());
    }

    #[test]
    fn typing_into_inputs() {
        let mut control = Control::number_input("1");
        assert!(control.type_text("2"));
        assert_eq!(control.text(), Some("12"));
        assert!(control.set_text("7"));
        assert_eq!(control.text(), Some("7"));

        let mut checkbox = Control::Checkbox(false);
        assert!(!checkbox.type_text("x"));
        assert!(checkbox.set_checked(true));
        assert_eq!(checkbox.checked(), Some(true));
    }

    #[test]
    fn scalar_nodes_reject_list_operations() {
        let field = Arc::new(FieldSchema::new("s", FieldType::String));
        let mut node = RenderNode::scalar(
            field,
            Role::Student,
            Action::Edit,
            Some(Header::Placeholder),
            Body::Control(Control::text_input("x")),
        );
        assert!(matches!(node.add_element(), Err(FormError::NotEditable(_))));
        let stray = NodeId::next();
        assert!(matches!(
            node.remove_element(stray),
            Err(FormError::NodeNotFound(_))
        ));
    }
}
