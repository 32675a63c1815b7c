//! Repository trait for link storage.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage contract for short links.
///
/// Implementations must make [`insert`](LinkRepository::insert) race-safe
/// with respect to `short_code` uniqueness and apply
/// [`increment_clicks`](LinkRepository::increment_clicks) as one atomic step.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link if its short code is free.
    ///
    /// The store assigns `id`, sets `created_at` to now and `click_count` to 0.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a live link already uses the code.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by exact short code match.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError>;

    /// Atomically adds one to the click counter of the link with `id`.
    ///
    /// Returns the updated link, or `Ok(None)` if no such link exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn increment_clicks(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Hard-deletes the link with `id`.
    ///
    /// Returns `Ok(true)` if a record was removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Counts stored links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Checks whether the backend is reachable.
    async fn health_check(&self) -> bool;

    /// Short name of the backend for logs and health output.
    fn backend_name(&self) -> &'static str;
}
