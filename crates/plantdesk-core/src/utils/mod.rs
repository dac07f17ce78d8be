//! Utility functions for URL path handling.

pub mod path;

pub use path::{append_query, path_of, split_target};
