//! # schwatz-observability
//!
//! Structured Logging via tracing-subscriber fuer Server und Client.

pub mod logging;

pub use logging::{filter_gueltig, logging_initialisieren, LogFormat};
