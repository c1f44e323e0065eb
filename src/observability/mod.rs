//! Observability subsystem
//!
//! Structured JSON logging for compilation, transport and decoding.
//!
//! # Principles
//!
//! 1. Observability is read-only: it never changes a compiled request
//! 2. Synchronous, no background threads
//! 3. Deterministic output: fixed key order per line
//!
//! # Usage
//!
//! ```ignore
//! use elasticql::observability::{log_event, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! log_event(Event::DocumentDeleted, &[("index", "users"), ("id", "42")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

#[cfg(test)]
pub(crate) use logger::capture;

/// Logs an event at its own severity; errors and worse go to stderr
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    let name = event.as_str();
    match event.severity() {
        Severity::Trace => Logger::trace(name, fields),
        Severity::Info => Logger::info(name, fields),
        Severity::Warn => Logger::warn(name, fields),
        Severity::Error => Logger::error(name, fields),
        Severity::Fatal => Logger::fatal(name, fields),
    }
}
