//! Output formatting for CLI.

mod json;
mod text;

pub use json::{JsonFormatter, SendOutput};
pub use text::TextFormatter;
