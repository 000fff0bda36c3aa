//! HTTP API tests

mod health_tests;
mod session_tests;
