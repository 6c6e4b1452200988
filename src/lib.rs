//! Declarative multi-view printers for debugger value inspection.
//!
//! A type author registers a [`PrinterSpec`] per type name: an optional
//! summary, a list of named views, and optionally a default view. For each
//! inspected value the composer builds a lazy node tree (`<Static>`, `<Raw>`,
//! one section per view) that the host inspector expands on demand.
//!
//! All knowledge of the value itself comes through [`Introspect`].

pub mod compose;
pub mod error;
pub mod node;
pub mod registry;
pub mod render;
pub mod spec;
pub mod summary;
pub mod value;

pub use compose::{PrinterNode, compose};
pub use error::{ConfigError, DerivationError, IntrospectError};
pub use node::{Child, Children, Entry, Node, StructureHint, Window};
pub use registry::Registry;
pub use spec::{Derivation, PrinterSpec, ViewBody, ViewSpec};
pub use summary::{Summary, summary, summary_of};
pub use value::{Introspect, Scalar};

pub type Result<T> = anyhow::Result<T>;
