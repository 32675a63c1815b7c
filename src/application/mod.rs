//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide the operations the HTTP
//! handlers and the admin CLI call.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Link creation,
//!   resolution, click counting, statistics and deletion

pub mod services;
