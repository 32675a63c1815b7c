//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_validator`] - Redirect target validation
//! - [`db_error`] - Database error classification

pub mod code_generator;
pub mod db_error;
pub mod url_validator;
