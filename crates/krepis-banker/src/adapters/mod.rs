//! Adapters Layer - Ports & Adapters Pattern
//!
//! Outbound adapters that turn [`CycleReport`](crate::domain::CycleReport)s
//! into something outside the domain can consume.
//!
//! # Hexagonal Architecture
//! - Port: [`CycleObserver`](crate::domain::CycleObserver)
//! - Adapters: structured logs, in-memory trace, JSON lines

pub mod observer;

// Re-exports
pub use observer::{CollectingObserver, JsonLinesObserver, TracingObserver};
