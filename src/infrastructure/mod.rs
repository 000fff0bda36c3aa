//! Infrastructure Layer
//!
//! Process-level plumbing that sits beside the domain: Prometheus metrics.

pub mod metrics;
