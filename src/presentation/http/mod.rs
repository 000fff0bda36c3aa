//! HTTP Surface
//!
//! Health probes, metrics and the read-only session API.

pub mod handlers;
pub mod routes;
