//! RabbitMQ adapter built on `lapin`.

use async_trait::async_trait;
use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, BasicQosOptions, ConfirmSelectOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::{AMQPValue, FieldTable, LongString};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer, ExchangeKind};
use tracing::{debug, info};

use crate::domain::ports::{ClientSyncPublishError, ClientSyncPublisher};
use crate::domain::{ClientSyncMessage, SyncStep, TraceId, TRACE_ID_HEADER};

use super::topology::{ClientSyncTopology, ALL_STEPS};

const JSON_CONTENT_TYPE: &str = "application/json";
const PERSISTENT: u8 = 2;

/// Errors raised while connecting to the broker or declaring topology.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    #[error("failed to connect to the broker: {message}")]
    Connect { message: String },
    #[error("failed to open a broker channel: {message}")]
    Channel { message: String },
    #[error("failed to declare broker topology: {message}")]
    Topology { message: String },
}

impl BrokerError {
    fn channel(error: lapin::Error) -> Self {
        Self::Channel {
            message: error.to_string(),
        }
    }

    fn topology(error: lapin::Error) -> Self {
        Self::Topology {
            message: error.to_string(),
        }
    }
}

/// Connection to RabbitMQ with the saga topology declared.
///
/// The exchange and all six step queues are declared durable on connect,
/// so messages published before the consuming side starts are retained.
pub struct AmqpBroker {
    connection: Connection,
    topology: ClientSyncTopology,
}

impl AmqpBroker {
    pub async fn connect(uri: &str, topology: ClientSyncTopology) -> Result<Self, BrokerError> {
        let connection = Connection::connect(uri, ConnectionProperties::default())
            .await
            .map_err(|err| BrokerError::Connect {
                message: err.to_string(),
            })?;
        let broker = Self {
            connection,
            topology,
        };
        broker.declare_topology().await?;
        info!(exchange = broker.topology.exchange(), "broker topology declared");
        Ok(broker)
    }

    async fn declare_topology(&self) -> Result<(), BrokerError> {
        let channel = self.channel().await?;
        channel
            .exchange_declare(
                self.topology.exchange(),
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(BrokerError::topology)?;

        for step in ALL_STEPS {
            let queue = self.topology.queue(step);
            channel
                .queue_declare(
                    &queue,
                    QueueDeclareOptions {
                        durable: true,
                        ..QueueDeclareOptions::default()
                    },
                    FieldTable::default(),
                )
                .await
                .map_err(BrokerError::topology)?;
            channel
                .queue_bind(
                    &queue,
                    self.topology.exchange(),
                    &self.topology.routing_key(step),
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await
                .map_err(BrokerError::topology)?;
        }
        channel.close(200, "topology declared").await.map_err(BrokerError::channel)
    }

    async fn channel(&self) -> Result<Channel, BrokerError> {
        self.connection
            .create_channel()
            .await
            .map_err(BrokerError::channel)
    }

    #[must_use]
    pub fn topology(&self) -> &ClientSyncTopology {
        &self.topology
    }

    /// Publisher on its own channel with publisher confirms enabled.
    pub async fn publisher(&self) -> Result<AmqpClientSyncPublisher, BrokerError> {
        let channel = self.channel().await?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(BrokerError::channel)?;
        Ok(AmqpClientSyncPublisher {
            channel,
            topology: self.topology.clone(),
        })
    }

    /// Start consuming the queue of `step` on a dedicated channel.
    pub async fn consume(&self, step: SyncStep, prefetch: u16) -> Result<Consumer, BrokerError> {
        let channel = self.channel().await?;
        channel
            .basic_qos(prefetch, BasicQosOptions::default())
            .await
            .map_err(BrokerError::channel)?;
        let queue = self.topology.queue(step);
        channel
            .basic_consume(
                &queue,
                &format!("cinema.{queue}"),
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(BrokerError::channel)
    }
}

/// Publishes saga messages as persistent JSON and waits for the broker's
/// confirmation.
pub struct AmqpClientSyncPublisher {
    channel: Channel,
    topology: ClientSyncTopology,
}

fn properties() -> BasicProperties {
    let mut headers = FieldTable::default();
    if let Some(trace_id) = TraceId::current() {
        headers.insert(
            TRACE_ID_HEADER.into(),
            AMQPValue::LongString(LongString::from(trace_id.to_string())),
        );
    }
    BasicProperties::default()
        .with_content_type(JSON_CONTENT_TYPE.into())
        .with_delivery_mode(PERSISTENT)
        .with_headers(headers)
}

#[async_trait]
impl ClientSyncPublisher for AmqpClientSyncPublisher {
    async fn publish(&self, message: &ClientSyncMessage) -> Result<(), ClientSyncPublishError> {
        let payload = message
            .to_json()
            .map_err(|err| ClientSyncPublishError::rejected(err.to_string()))?;
        let routing_key = self.topology.routing_key(message.step());
        let confirmation = self
            .channel
            .basic_publish(
                self.topology.exchange(),
                &routing_key,
                BasicPublishOptions::default(),
                &payload,
                properties(),
            )
            .await
            .map_err(|err| ClientSyncPublishError::unavailable(err.to_string()))?
            .await
            .map_err(|err| ClientSyncPublishError::unavailable(err.to_string()))?;
        if confirmation.is_nack() {
            return Err(ClientSyncPublishError::rejected(format!(
                "broker did not accept {routing_key}"
            )));
        }
        debug!(%routing_key, client_id = %message.client_id(), "client sync message published");
        Ok(())
    }
}
