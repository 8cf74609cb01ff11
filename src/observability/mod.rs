//! Observability for iterator trees
//!
//! - Structured logging (JSON, one line per event)
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on evaluation
//! 3. No background threads
//! 4. Nothing is logged per element
//!
//! # Usage
//!
//! ```ignore
//! use aerologic::observability::{log_event, Event, Logger, Severity};
//!
//! let logger = Logger::new(Severity::Info);
//! log_event(&logger, Event::TreeInitialized, &[("leaves", "3")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event at its own severity
pub fn log_event(logger: &Logger, event: Event, fields: &[(&str, &str)]) {
    logger.log(event.severity(), event.as_str(), fields);
}
