//! Utilities for uc_modeler
//!
//! This module provides identifier quoting and logging setup used across the library.

pub mod logging;
pub mod quoting;

// Re-export key utility functions
pub use quoting::{quote_ident, quote_list, quote_qualified, Dialect};
