//! Renderers that drive the node protocol the way a host inspector does.

pub mod text;

pub use text::{RenderOptions, render_value};
