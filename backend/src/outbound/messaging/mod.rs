//! Broker adapters for the client lifecycle saga.
//!
//! - [`AmqpBroker`] / [`AmqpClientSyncPublisher`]: RabbitMQ via `lapin`.
//! - [`InProcessBroker`]: queue-and-dispatch within one process, used by
//!   integration tests and single-process development.

mod amqp;
mod in_process;
mod topology;

pub use amqp::{AmqpBroker, AmqpClientSyncPublisher, BrokerError};
pub use in_process::InProcessBroker;
pub use topology::{ClientSyncTopology, DEFAULT_EXCHANGE};
