//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! REST handlers live under [`http`]; saga deliveries from the broker are
//! consumed by [`amqp`].

pub mod amqp;
pub mod http;
