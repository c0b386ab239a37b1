//! Broker inbound adapter for the client lifecycle saga.

pub mod consumer;

pub use consumer::{process_delivery, spawn_consumers, trace_id_from, Settlement, DEFAULT_PREFETCH};
