//! Shared utility functions.
//!
//! This module contains reusable utilities used across the codebase:
//! - `files`: recursive document discovery by extension

mod files;

pub use files::{count_by_extension, display_name, find_files, has_extension};
