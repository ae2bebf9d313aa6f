//! OpenGL pixel format negotiation

mod error;
pub mod format;
pub mod select;

pub use error::SelectError;
pub use format::{ColorModel, FormatId, OfferedFormat, PixelFormatRequest};
pub use select::{select, PixelFormatSelector, SelectedFormat, SelectionPath};
