//! Filesystem and environment helpers.
//!
//! Locates the directory that holds the durable preference file and trace
//! output, and expands `~` in configured paths.

pub mod paths;

pub use paths::{default_data_dir, expand_tilde};
