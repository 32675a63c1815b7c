//! In-process link repository backed by concurrent maps.
//!
//! Used when no database is configured and throughout the HTTP tests.
//! Data lives as long as the process.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Link store keyed by id with a secondary index on short code.
///
/// The code index is claimed through its map entry before the record is
/// written, so two concurrent inserts of one code cannot both succeed.
#[derive(Debug)]
pub struct MemoryLinkRepository {
    links: DashMap<i64, Link>,
    codes: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
            codes: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        match self.codes.entry(new_link.short_code.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                format!("Short code {} already exists", new_link.short_code),
                json!({ "short_code": new_link.short_code }),
            )),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let link = Link::new(
                    id,
                    new_link.short_code,
                    new_link.original_url,
                    Utc::now(),
                    new_link.expires_at,
                    0,
                );

                self.links.insert(id, link.clone());
                slot.insert(id);

                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        let Some(id) = self.codes.get(short_code).map(|entry| *entry.value()) else {
            return Ok(None);
        };

        Ok(self.links.get(&id).map(|link| link.value().clone()))
    }

    async fn increment_clicks(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(self.links.get_mut(&id).map(|mut link| {
            link.click_count += 1;
            link.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let Some((_, link)) = self.links.remove(&id) else {
            return Ok(false);
        };

        self.codes.remove_if(&link.short_code, |_, owner| *owner == id);

        Ok(true)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.links.len() as i64)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
