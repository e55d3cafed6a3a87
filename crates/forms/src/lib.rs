//! Schema-driven, role-aware form engine.
//!
//! Given a [`FormSchema`], a [`ContentRecord`] and the viewer's [`Role`],
//! [`FormBuilder`] produces a [`RenderTree`] of editable controls and
//! read-only readouts. After the user is done, [`FormSerializer`] walks the
//! same tree and produces a content record that round-trips through the
//! schema.
//!
//! ```
//! use forms::{Action, ContentRecord, FieldSchema, FieldType, FormBuilder, FormSchema, FormSerializer, Role};
//!
//! let schema = FormSchema::new([
//!     FieldSchema::new("n", FieldType::Int).default(1).action(Role::Creator, Action::Edit),
//! ])?;
//! let mut tree = FormBuilder::new().build(&schema, &ContentRecord::new(), Role::Creator, false)?;
//! let record = FormSerializer::new(&schema).serialize(&mut tree);
//! assert_eq!(record.get("n"), Some(&serde_json::json!(1)));
//! # Ok::<(), forms::FormError>(())
//! ```

pub mod builder;
pub mod content;
pub mod errors;
pub mod field;
pub mod handler;
pub mod node;
pub mod renderer;
pub mod role;
pub mod schema;
pub mod serializer;
pub mod session;
pub mod value;

pub use builder::FormBuilder;
pub use content::ContentRecord;
pub use errors::{FormError, Result};
pub use field::{FieldSchema, FieldType};
pub use handler::{FieldTypeHandler, HandlerRegistry};
pub use node::{
    Affordance, Body, Control, Header, ListNode, NodeContent, NodeId, PLACEHOLDER_HEADER,
    Readout, RenderNode, RenderTree, TextSurface,
};
pub use renderer::FieldRenderer;
pub use role::{Action, Role, RoleActions, resolve};
pub use schema::{FormSchema, ProblemType, SchemaCatalog, is_valid_problem_tag};
pub use serializer::{FormSerializer, SerializeOutcome};
pub use session::{AccountRole, SessionContext};
pub use value::Scalar;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
