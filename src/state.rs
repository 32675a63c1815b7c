//! Application state shared across HTTP handlers.

use std::sync::Arc;

use crate::application::services::ShortenerService;
use crate::domain::repositories::LinkRepository;

/// Shared state injected into every handler.
///
/// Cloning is cheap: the service sits behind an [`Arc`].
#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService<dyn LinkRepository>>,
    /// Answer redirects with 301 instead of 302.
    pub permanent_redirects: bool,
}

impl AppState {
    pub fn new(
        shortener: Arc<ShortenerService<dyn LinkRepository>>,
        permanent_redirects: bool,
    ) -> Self {
        Self {
            shortener,
            permanent_redirects,
        }
    }
}
