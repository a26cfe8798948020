pub mod environment;
pub mod logging;
pub mod paths;
pub mod terminal;

pub use environment::resolve_index_path;
pub use paths::{document_url, docname_from_relative, format_path_with_tilde, validate_file_size};
pub use terminal::{single_line, strip_ansi_codes};
