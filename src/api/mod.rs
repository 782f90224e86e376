//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a batch of key-value pairs
//! - `POST /get` - Retrieve a batch of values, `null` for misses
//! - `GET /get/:key` - Retrieve a value by key
//! - `POST /del` - Delete a batch of keys
//! - `DELETE /del/:key` - Delete a key
//! - `POST /truncate` - Remove every entry
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
