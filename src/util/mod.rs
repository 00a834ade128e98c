//! Utility functions for common operations.
//!
//! - **URL validation**: custom news sources are checked before the backend
//!   is asked to fetch them; article links are checked before opening
//! - **Text processing**: HTML escaping for rendered fragments, terminal
//!   control-character stripping and width-aware truncation for the TUI

mod text;
mod url_validator;

pub use text::{escape_html, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_source_url, validate_url_for_open, UrlValidationError};

/// Maximum accepted length of a search term or admin input, in bytes.
pub const MAX_INPUT_LENGTH: usize = 256;
