//! Short link allocation and resolution service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{Link, LinkStats, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;

/// Default number of candidates drawn for a generated code before giving up.
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: usize = 5;

/// The only gateway for creating, resolving, counting and deleting links.
///
/// Holds no link state of its own: every call reads the store, so uniqueness
/// and click counts are never decided from stale data.
pub struct ShortenerService<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    generator: CodeGenerator,
    base_url: String,
    max_generation_attempts: usize,
}

impl<L: LinkRepository + ?Sized> ShortenerService<L> {
    /// Creates a new service.
    ///
    /// `base_url` is used to build `short_url` values; a trailing slash is
    /// ignored.
    pub fn new(repository: Arc<L>, generator: CodeGenerator, base_url: impl Into<String>) -> Self {
        Self {
            repository,
            generator,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_generation_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
        }
    }

    /// Sets how many generated candidates are tried before failing.
    ///
    /// Values below 1 are treated as 1.
    pub fn with_max_generation_attempts(mut self, attempts: usize) -> Self {
        self.max_generation_attempts = attempts.max(1);
        self
    }

    /// Creates a short link.
    ///
    /// # Code Selection
    ///
    /// - `custom_code` given: used verbatim, exactly one attempt
    /// - otherwise: up to `max_generation_attempts` random candidates; a
    ///   candidate that collides (pre-check hit or store unique violation)
    ///   is discarded and a new one is drawn
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the custom code is taken or every
    /// generated candidate collided.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn create_link(
        &self,
        original_url: String,
        custom_code: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Link, AppError> {
        if let Some(code) = custom_code {
            return self.try_create(code, &original_url, expires_at).await;
        }

        for attempt in 1..=self.max_generation_attempts {
            let candidate = self.generator.generate();

            match self.try_create(candidate, &original_url, expires_at).await {
                Err(AppError::Conflict { details, .. }) => {
                    debug!(attempt, details = %details, "Generated short code collided");
                    counter!("link_collisions_total").increment(1);
                }
                result => return result,
            }
        }

        warn!(
            attempts = self.max_generation_attempts,
            "Could not allocate a unique short code"
        );

        Err(AppError::conflict(
            "Failed to allocate a unique short code",
            json!({
                "reason": "exhausted_attempts",
                "attempts": self.max_generation_attempts,
            }),
        ))
    }

    /// Checks the candidate against the store, then inserts it.
    ///
    /// The store enforces uniqueness again on insert, so a code taken between
    /// the check and the insert still surfaces as [`AppError::Conflict`].
    async fn try_create(
        &self,
        short_code: String,
        original_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Link, AppError> {
        if self.repository.find_by_code(&short_code).await?.is_some() {
            return Err(AppError::conflict(
                format!("Short code {short_code} already exists"),
                json!({ "short_code": short_code }),
            ));
        }

        let link = self
            .repository
            .insert(NewLink {
                short_code,
                original_url: original_url.to_string(),
                expires_at,
            })
            .await?;

        info!(short_code = %link.short_code, id = link.id, "Short link created");
        counter!("links_created_total").increment(1);

        Ok(link)
    }

    /// Looks up a link by exact code. Expiry is not consulted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn resolve(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        self.repository.find_by_code(short_code).await
    }

    /// Atomically adds one click to `link` and returns the stored result.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link was deleted meanwhile.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn record_click(&self, link: &Link) -> Result<Link, AppError> {
        let updated = self
            .repository
            .increment_clicks(link.id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Short link not found",
                    json!({ "short_code": link.short_code }),
                )
            })?;

        debug!(
            short_code = %updated.short_code,
            click_count = updated.click_count,
            "Click recorded"
        );

        Ok(updated)
    }

    /// Returns true if the link has an expiry in the past.
    pub fn is_expired(&self, link: &Link) -> bool {
        link.is_expired()
    }

    /// Resolves a code for redirection and records the click.
    ///
    /// Expired links are refused before any click is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link uses the code.
    /// Returns [`AppError::Gone`] if the link has expired.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn resolve_for_redirect(&self, short_code: &str) -> Result<Link, AppError> {
        let Some(link) = self.resolve(short_code).await? else {
            counter!("redirects_total", "outcome" => "not_found").increment(1);
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "short_code": short_code }),
            ));
        };

        if self.is_expired(&link) {
            warn!(short_code, expires_at = ?link.expires_at, "Redirect refused, link expired");
            counter!("redirects_total", "outcome" => "expired").increment(1);
            return Err(AppError::gone(
                "Short link is no longer available",
                json!({ "short_code": short_code, "expires_at": link.expires_at }),
            ));
        }

        let link = self.record_click(&link).await?;
        counter!("redirects_total", "outcome" => "ok").increment(1);

        Ok(link)
    }

    /// Returns a statistics snapshot without recording a click.
    ///
    /// Returns `Ok(None)` for unknown codes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn stats(&self, short_code: &str) -> Result<Option<LinkStats>, AppError> {
        let now = Utc::now();
        Ok(self
            .resolve(short_code)
            .await?
            .map(|link| LinkStats::from_link(link, now)))
    }

    /// Hard-deletes the link using `short_code`.
    ///
    /// Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn delete(&self, short_code: &str) -> Result<bool, AppError> {
        let Some(link) = self.resolve(short_code).await? else {
            return Ok(false);
        };

        let deleted = self.repository.delete(link.id).await?;
        if deleted {
            info!(short_code, id = link.id, "Short link deleted");
            counter!("links_deleted_total").increment(1);
        }

        Ok(deleted)
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/r/{}", self.base_url, short_code)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of stored links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn link_count(&self) -> Result<i64, AppError> {
        self.repository.count().await
    }

    pub async fn storage_healthy(&self) -> bool {
        self.repository.health_check().await
    }

    pub fn storage_backend(&self) -> &'static str {
        self.repository.backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Duration;

    const BASE_URL: &str = "http://localhost:5000";

    fn create_test_link(id: i64, code: &str, expires_at: Option<DateTime<Utc>>) -> Link {
        Link::new(
            id,
            code.to_string(),
            "https://example.com".to_string(),
            Utc::now(),
            expires_at,
            0,
        )
    }

    fn link_from(new_link: &NewLink) -> Link {
        Link::new(
            10,
            new_link.short_code.clone(),
            new_link.original_url.clone(),
            Utc::now(),
            new_link.expires_at,
            0,
        )
    }

    fn service(repo: MockLinkRepository) -> ShortenerService<MockLinkRepository> {
        ShortenerService::new(Arc::new(repo), CodeGenerator::default(), BASE_URL)
    }

    #[tokio::test]
    async fn test_create_link_with_generated_code() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_code()
            .times(1)
            .returning(|_| Ok(None));

        mock_repo
            .expect_insert()
            .withf(|new_link| {
                new_link.short_code.len() == 6
                    && new_link.short_code.chars().all(|c| c.is_ascii_alphanumeric())
                    && new_link.original_url == "https://example.com"
            })
            .times(1)
            .returning(|new_link| Ok(link_from(&new_link)));

        let link = service(mock_repo)
            .create_link("https://example.com".to_string(), None, None)
            .await
            .unwrap();

        assert_eq!(link.short_code.len(), 6);
        assert_eq!(link.click_count, 0);
        assert!(link.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_create_link_with_custom_code() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(None));

        mock_repo
            .expect_insert()
            .withf(|new_link| new_link.short_code == "abc123")
            .times(1)
            .returning(|new_link| Ok(link_from(&new_link)));

        let link = service(mock_repo)
            .create_link(
                "https://example.com".to_string(),
                Some("abc123".to_string()),
                None,
            )
            .await
            .unwrap();

        assert_eq!(link.short_code, "abc123");
    }

    #[tokio::test]
    async fn test_create_link_keeps_expiry() {
        let mut mock_repo = MockLinkRepository::new();
        let expires_at = Utc::now() + Duration::days(1);

        mock_repo.expect_find_by_code().returning(|_| Ok(None));
        mock_repo
            .expect_insert()
            .withf(move |new_link| new_link.expires_at == Some(expires_at))
            .times(1)
            .returning(|new_link| Ok(link_from(&new_link)));

        let link = service(mock_repo)
            .create_link("https://example.com".to_string(), None, Some(expires_at))
            .await
            .unwrap();

        assert_eq!(link.expires_at, Some(expires_at));
    }

    #[tokio::test]
    async fn test_custom_code_conflict_does_not_insert() {
        let mut mock_repo = MockLinkRepository::new();

        let existing = create_test_link(5, "taken1", None);
        mock_repo
            .expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        mock_repo.expect_insert().times(0);

        let result = service(mock_repo)
            .create_link(
                "https://example.com".to_string(),
                Some("taken1".to_string()),
                None,
            )
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
        assert!(err.to_string().contains("taken1"));
    }

    #[tokio::test]
    async fn test_custom_code_store_violation_is_not_retried() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_code()
            .times(1)
            .returning(|_| Ok(None));

        mock_repo.expect_insert().times(1).returning(|new_link| {
            Err(AppError::conflict(
                "Short code already exists",
                json!({ "short_code": new_link.short_code }),
            ))
        });

        let result = service(mock_repo)
            .create_link(
                "https://example.com".to_string(),
                Some("raced1".to_string()),
                None,
            )
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_generated_code_collision_is_retried() {
        let mut mock_repo = MockLinkRepository::new();

        let existing = create_test_link(5, "whatever", None);
        let mut lookups = 0;
        mock_repo
            .expect_find_by_code()
            .times(2)
            .returning(move |_| {
                lookups += 1;
                if lookups == 1 {
                    Ok(Some(existing.clone()))
                } else {
                    Ok(None)
                }
            });

        mock_repo
            .expect_insert()
            .times(1)
            .returning(|new_link| Ok(link_from(&new_link)));

        let result = service(mock_repo)
            .create_link("https://example.com".to_string(), None, None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_store_violation_on_generated_code_is_retried() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_code()
            .times(2)
            .returning(|_| Ok(None));

        let mut inserts = 0;
        mock_repo.expect_insert().times(2).returning(move |new_link| {
            inserts += 1;
            if inserts == 1 {
                Err(AppError::conflict("Short code already exists", json!({})))
            } else {
                Ok(link_from(&new_link))
            }
        });

        let result = service(mock_repo)
            .create_link("https://example.com".to_string(), None, None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_generation_gives_up_after_max_attempts() {
        let mut mock_repo = MockLinkRepository::new();

        let existing = create_test_link(5, "whatever", None);
        mock_repo
            .expect_find_by_code()
            .times(3)
            .returning(move |_| Ok(Some(existing.clone())));

        mock_repo.expect_insert().times(0);

        let result = service(mock_repo)
            .with_max_generation_attempts(3)
            .create_link("https://example.com".to_string(), None, None)
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.details()["attempts"], 3);
        assert_eq!(err.details()["reason"], "exhausted_attempts");
    }

    #[tokio::test]
    async fn test_storage_error_is_not_retried() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_code()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        mock_repo.expect_insert().times(0);

        let result = service(mock_repo)
            .create_link("https://example.com".to_string(), None, None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_resolve_ignores_expiry() {
        let mut mock_repo = MockLinkRepository::new();

        let expired = create_test_link(1, "old", Some(Utc::now() - Duration::hours(1)));
        mock_repo
            .expect_find_by_code()
            .returning(move |_| Ok(Some(expired.clone())));

        let link = service(mock_repo).resolve("old").await.unwrap();

        assert!(link.is_some());
    }

    #[tokio::test]
    async fn test_resolve_for_redirect_records_click() {
        let mut mock_repo = MockLinkRepository::new();

        let link = create_test_link(3, "abc123", None);
        let found = link.clone();
        mock_repo
            .expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(found.clone())));

        mock_repo
            .expect_increment_clicks()
            .withf(|id| *id == 3)
            .times(1)
            .returning(move |_| {
                let mut clicked = link.clone();
                clicked.click_count += 1;
                Ok(Some(clicked))
            });

        let link = service(mock_repo)
            .resolve_for_redirect("abc123")
            .await
            .unwrap();

        assert_eq!(link.click_count, 1);
    }

    #[tokio::test]
    async fn test_resolve_for_redirect_not_found() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo.expect_find_by_code().returning(|_| Ok(None));
        mock_repo.expect_increment_clicks().times(0);

        let result = service(mock_repo).resolve_for_redirect("missing").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_for_redirect_expired_skips_click() {
        let mut mock_repo = MockLinkRepository::new();

        let expired = create_test_link(4, "gone", Some(Utc::now() - Duration::seconds(1)));
        mock_repo
            .expect_find_by_code()
            .returning(move |_| Ok(Some(expired.clone())));

        mock_repo.expect_increment_clicks().times(0);

        let result = service(mock_repo).resolve_for_redirect("gone").await;

        assert!(matches!(result.unwrap_err(), AppError::Gone { .. }));
    }

    #[tokio::test]
    async fn test_record_click_on_vanished_link() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Ok(None));

        let link = create_test_link(9, "vanished", None);
        let result = service(mock_repo).record_click(&link).await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_stats_unknown_code_is_none() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo.expect_find_by_code().returning(|_| Ok(None));

        let stats = service(mock_repo).stats("nope").await.unwrap();

        assert!(stats.is_none());
    }

    #[tokio::test]
    async fn test_stats_does_not_record_click() {
        let mut mock_repo = MockLinkRepository::new();

        let mut link = create_test_link(2, "abc123", Some(Utc::now() - Duration::days(1)));
        link.click_count = 7;
        mock_repo
            .expect_find_by_code()
            .returning(move |_| Ok(Some(link.clone())));
        mock_repo.expect_increment_clicks().times(0);

        let stats = service(mock_repo).stats("abc123").await.unwrap().unwrap();

        assert_eq!(stats.click_count, 7);
        assert!(stats.is_expired);
    }

    #[tokio::test]
    async fn test_delete_existing_link() {
        let mut mock_repo = MockLinkRepository::new();

        let link = create_test_link(8, "bye", None);
        mock_repo
            .expect_find_by_code()
            .returning(move |_| Ok(Some(link.clone())));
        mock_repo
            .expect_delete()
            .withf(|id| *id == 8)
            .times(1)
            .returning(|_| Ok(true));

        assert!(service(mock_repo).delete("bye").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_unknown_link() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo.expect_find_by_code().returning(|_| Ok(None));
        mock_repo.expect_delete().times(0);

        assert!(!service(mock_repo).delete("nope").await.unwrap());
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let service = ShortenerService::new(
            Arc::new(MockLinkRepository::new()),
            CodeGenerator::default(),
            "https://sho.rt/",
        );

        assert_eq!(service.short_url("abc123"), "https://sho.rt/r/abc123");
        assert_eq!(service.base_url(), "https://sho.rt");
    }

    #[test]
    fn test_max_attempts_floor() {
        let service = service(MockLinkRepository::new()).with_max_generation_attempts(0);
        assert_eq!(service.max_generation_attempts, 1);
    }
}
