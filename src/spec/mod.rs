//! Printer declarations and their validation.
//!
//! This module is separate from composition and rendering. It owns:
//! - derivations (how one child is computed)
//! - printer/view declarations (builder API)
//! - the JSON printers file

pub mod derive;
pub mod file;
pub mod printer;

pub use derive::{Derivation, as_address, as_float, as_int, computed, divided, field, path, scaled};
pub use file::{NodeFactories, PrintersFile, load_printers_file};
pub use printer::{NodeFactory, PrinterSpec, ViewBody, ViewSpec};
