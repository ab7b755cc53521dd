mod document;
mod overlay;
mod primitive;

pub use document::{CanvasView, PLACEHOLDER_TEXT, PROGRESS_TEXT, render_document};
pub use overlay::{DimensionLine, render_dimensions};
pub use primitive::{Primitive, Style, render_primitives, style_for};
