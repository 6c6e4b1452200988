//! Error taxonomy.
//!
//! - `ConfigError`: author mistakes found while registering printers. Fatal to
//!   that registration.
//! - `IntrospectError`: the value backend could not answer a structural query.
//! - `DerivationError`: one child slot failed to evaluate. Rendered inline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("printer already registered for type {type_name:?}")]
    DuplicatePrinter { type_name: String },

    #[error("printer for {type_name:?} declares view {view:?} more than once")]
    DuplicateView { type_name: String, view: String },

    #[error(
        "printer for {type_name:?} names default view {name:?}, but only [{}] are declared",
        available.join(", ")
    )]
    DanglingDefaultView {
        type_name: String,
        name: String,
        available: Vec<String>,
    },

    #[error("view {view:?} of {type_name:?} declares both `nodes` and `node`")]
    AmbiguousViewBody { type_name: String, view: String },

    #[error("view {view:?} of {type_name:?} declares neither `nodes` nor `node`")]
    MissingViewBody { type_name: String, view: String },

    #[error("view {view:?} of {type_name:?} uses unknown node factory {factory:?}")]
    UnknownNodeFactory {
        type_name: String,
        view: String,
        factory: String,
    },

    #[error("invalid type pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("view {view:?} of {type_name:?}: node {label:?}: {reason}")]
    InvalidDerivation {
        type_name: String,
        view: String,
        label: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntrospectError {
    #[error("no field {field:?} in {type_name}")]
    FieldNotFound { type_name: String, field: String },

    #[error("{type_name} does not support {what}")]
    Unsupported { type_name: String, what: &'static str },

    #[error("cannot convert {type_name} to {target}")]
    Conversion {
        type_name: String,
        target: &'static str,
    },
}

/// Failure of a single derivation or node factory.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct DerivationError {
    pub message: String,
}

impl DerivationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Inline marker shown in place of the failed child's value.
    pub fn marker(&self) -> String {
        format!("<error: {}>", self.message)
    }
}

impl From<anyhow::Error> for DerivationError {
    fn from(err: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line.
        Self::new(format!("{:#}", err))
    }
}
