//! Application Layer
//!
//! Drives the domain: the session registry, one worker task per live
//! session, round timers, outbound events and the request/response DTOs.

pub mod dto;
pub mod events;
pub mod services;
