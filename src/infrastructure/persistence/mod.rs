//! Link repository implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - PostgreSQL storage through SQLx
//! - [`MemoryLinkRepository`] - in-process storage for development and tests
//!
//! [`pool`] builds the PostgreSQL connection pool and runs migrations.

pub mod memory_link_repository;
pub mod pg_link_repository;
pub mod pool;

pub use memory_link_repository::MemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
