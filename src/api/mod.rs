//! API Module
//!
//! HTTP handlers and routing for the verdict service REST API.
//!
//! # Endpoints
//! - `POST /api/happyScroll/v1/verdict` - Combined safety verdict
//! - `GET /api/happyScroll/v1/cache/stats` - Cache statistics
//! - `POST /api/happyScroll/v1/cache/clear` - Clear cached verdicts
//! - `GET /api/happyScroll/v1/quota` - Daily quota usage
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, API_PREFIX};
