//! Backend worker: owns the HTTP client and answers UI commands with UI events.

pub mod commands;
pub mod runtime;
