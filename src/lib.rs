//! # Quiz Server Library
//!
//! This crate provides a live quiz session server with:
//! - A WebSocket gateway for session requests and live events
//! - One task per session driving rounds, deadlines and scoring
//! - A small HTTP surface for health, metrics and session lookup
//!
//! ## Architecture
//!
//! - **Domain Layer**: Session state machine, rounds, scoreboard ranking
//! - **Application Layer**: Session registry, session workers, round timers, DTOs
//! - **Infrastructure Layer**: Prometheus metrics
//! - **Presentation Layer**: HTTP handlers and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! quiz_server/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects, scoreboard builder
//! +-- application/    Registry, session workers, timers, events, DTOs
//! +-- infrastructure/ Metrics
//! +-- presentation/   HTTP routes and WebSocket gateway
//! +-- shared/         Errors and validation glue
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Session runtime
pub mod application;

// Infrastructure layer - Metrics
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
