//! Label payload formats.

mod error;
mod labels;

pub use error::FormatError;
pub use labels::{ImagesResponse, labels_to_json, parse_command_script};
