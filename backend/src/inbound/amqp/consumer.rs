//! Consumes saga queues and hands each delivery to a [`ClientSyncHandler`].
//!
//! One task per queue runs a consume-process-reconnect loop: when the
//! channel closes or cannot be opened the task waits and subscribes again.
//! Each delivery runs inside the [`TraceId`] carried in its headers, or a
//! fresh one when the publisher did not send any.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicNackOptions};
use lapin::types::{AMQPValue, FieldTable, ShortString};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::ports::ClientSyncHandler;
use crate::domain::{ClientSyncMessage, SyncStep, TraceId, TRACE_ID_HEADER};
use crate::outbound::messaging::{AmqpBroker, ClientSyncTopology};

/// Deliveries in flight per consumer.
pub const DEFAULT_PREFETCH: u16 = 10;

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// How a delivery is settled with the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Ack,
    /// Negative acknowledgement without requeue; the broker drops the message.
    Reject,
}

/// Trace identifier sent by the publisher, if present and well formed.
pub fn trace_id_from(headers: Option<&FieldTable>) -> Option<TraceId> {
    let value = headers?.inner().get(&ShortString::from(TRACE_ID_HEADER))?;
    let raw = match value {
        AMQPValue::LongString(text) => std::str::from_utf8(text.as_bytes()).ok()?.to_owned(),
        AMQPValue::ShortString(text) => text.as_str().to_owned(),
        _ => return None,
    };
    raw.parse().ok()
}

/// Decode one delivery and run the handler on it.
pub async fn process_delivery(
    handler: &dyn ClientSyncHandler,
    topology: &ClientSyncTopology,
    routing_key: &str,
    trace_id: Option<TraceId>,
    body: &[u8],
) -> Settlement {
    let trace_id = trace_id.unwrap_or_else(TraceId::generate);
    TraceId::scope(trace_id, async {
        let Some(step) = topology.step_for(routing_key) else {
            warn!(%trace_id, routing_key, "delivery on unknown routing key");
            return Settlement::Reject;
        };
        let message = match ClientSyncMessage::from_json(step, body) {
            Ok(message) => message,
            Err(err) => {
                warn!(%trace_id, %step, error = %err, "undecodable client sync message");
                return Settlement::Reject;
            }
        };
        let client_id = message.client_id();
        match handler.handle(message).await {
            Ok(outcome) => {
                debug!(%trace_id, %step, %client_id, ?outcome, "client sync message handled");
                Settlement::Ack
            }
            Err(err) => {
                error!(%trace_id, %step, %client_id, error = %err, "client sync message failed");
                Settlement::Reject
            }
        }
    })
    .await
}

async fn settle(delivery: &Delivery, settlement: Settlement) {
    let result = match settlement {
        Settlement::Ack => delivery.acker.ack(BasicAckOptions::default()).await,
        Settlement::Reject => {
            delivery
                .acker
                .nack(BasicNackOptions {
                    requeue: false,
                    ..BasicNackOptions::default()
                })
                .await
        }
    };
    if let Err(err) = result {
        warn!(error = %err, ?settlement, "failed to settle delivery");
    }
}

async fn consume_queue(
    broker: Arc<AmqpBroker>,
    step: SyncStep,
    handler: Arc<dyn ClientSyncHandler>,
    prefetch: u16,
) {
    let topology = broker.topology().clone();
    let queue = topology.queue(step);
    loop {
        match broker.consume(step, prefetch).await {
            Ok(mut consumer) => {
                info!(%queue, prefetch, "consuming client sync queue");
                while let Some(delivery) = consumer.next().await {
                    match delivery {
                        Ok(delivery) => {
                            let settlement = process_delivery(
                                handler.as_ref(),
                                &topology,
                                delivery.routing_key.as_str(),
                                trace_id_from(delivery.properties.headers().as_ref()),
                                &delivery.data,
                            )
                            .await;
                            settle(&delivery, settlement).await;
                        }
                        Err(err) => {
                            warn!(%queue, error = %err, "client sync consumer stream failed");
                            break;
                        }
                    }
                }
                warn!(%queue, "client sync consumer stopped; resubscribing");
            }
            Err(err) => warn!(%queue, error = %err, "failed to subscribe to client sync queue"),
        }
        tokio::time::sleep(RETRY_DELAY).await;
    }
}

/// Spawn one consumer task per step, all dispatching to `handler`.
pub fn spawn_consumers(
    broker: Arc<AmqpBroker>,
    steps: &[SyncStep],
    handler: Arc<dyn ClientSyncHandler>,
    prefetch: u16,
) -> Vec<JoinHandle<()>> {
    steps
        .iter()
        .map(|&step| {
            tokio::spawn(consume_queue(
                Arc::clone(&broker),
                step,
                Arc::clone(&handler),
                prefetch,
            ))
        })
        .collect()
}
