//! Gateway server
//!
//! The request pipeline and the axum HTTP surface in front of it.

pub mod gateway;
pub mod http;

pub use gateway::Gateway;
pub use http::{DEFAULT_HTTP_PORT, HttpConfig, router, run_gateway};
