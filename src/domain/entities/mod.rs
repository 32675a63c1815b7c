//! Core domain entities.
//!
//! - [`Link`] - A shortened URL record
//! - [`NewLink`] - Input for creating a record
//! - [`LinkStats`] - Read-only statistics projection of a record

pub mod link;

pub use link::{Link, LinkStats, NewLink};
