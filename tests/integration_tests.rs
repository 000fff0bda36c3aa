//! Integration Tests Entry Point
//!
//! This file serves as the entry point for integration tests.
//! Tests are organized by module:
//! - `api/` - HTTP endpoint tests
//! - `session/` - Session flows driven through the registry on paused time
//! - `common/` - Shared test utilities

mod api;
mod common;
mod session;
