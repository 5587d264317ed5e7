//! HTTP server layer
//!
//! Axum server with:
//! - `GET /` visitor list and `POST /sign`
//! - `GET /health`
//! - Request tracing
//! - Graceful shutdown

pub mod page;
pub mod routes;
pub mod server;

pub use page::IndexPage;
pub use server::{build_router, run_server, ServerConfig};
