//! Queue-and-dispatch broker living inside one process.
//!
//! Published messages are queued together with the publisher's trace id and
//! delivered to every handler subscribed to their step when [`InProcessBroker::deliver_pending`] runs, either
//! directly from a test or from the task started by
//! [`InProcessBroker::spawn_dispatcher`]. Messages published while
//! handling (rollbacks) join the same queue.
//!
//! Delivered messages are dropped unless the broker was built with
//! [`InProcessBroker::recording`], which keeps the publish history for
//! assertions.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::domain::ports::{ClientSyncHandler, ClientSyncPublishError, ClientSyncPublisher};
use crate::domain::{ClientSyncMessage, SyncStep, TraceId};

struct Subscription {
    steps: Vec<SyncStep>,
    handler: Arc<dyn ClientSyncHandler>,
}

#[derive(Default)]
struct Inner {
    queue: Mutex<VecDeque<(ClientSyncMessage, TraceId)>>,
    history: Option<Mutex<Vec<ClientSyncMessage>>>,
    subscriptions: Mutex<Vec<Arc<Subscription>>>,
    ready: Notify,
}

/// In-process stand-in for the RabbitMQ topology.
///
/// Cloning shares the same queue and subscriptions.
#[derive(Clone, Default)]
pub struct InProcessBroker {
    inner: Arc<Inner>,
}

impl InProcessBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Broker that also keeps every published message for [`Self::published`].
    pub fn recording() -> Self {
        Self {
            inner: Arc::new(Inner {
                history: Some(Mutex::new(Vec::new())),
                ..Inner::default()
            }),
        }
    }

    /// Deliver messages on `steps` to `handler`.
    pub async fn subscribe(&self, steps: &[SyncStep], handler: Arc<dyn ClientSyncHandler>) {
        self.inner.subscriptions.lock().await.push(Arc::new(Subscription {
            steps: steps.to_vec(),
            handler,
        }));
    }

    /// Every message published so far, in order; empty unless the broker
    /// is [`recording`](Self::recording).
    pub async fn published(&self) -> Vec<ClientSyncMessage> {
        match &self.inner.history {
            Some(history) => history.lock().await.clone(),
            None => Vec::new(),
        }
    }

    /// Deliver queued messages until the queue is empty; returns how many
    /// were delivered.
    pub async fn deliver_pending(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.inner.queue.lock().await.pop_front();
            let Some((message, trace_id)) = next else {
                return delivered;
            };
            delivered += 1;
            self.dispatch(message, trace_id).await;
        }
    }

    async fn dispatch(&self, message: ClientSyncMessage, trace_id: TraceId) {
        let step = message.step();
        let subscriptions: Vec<Arc<Subscription>> = self
            .inner
            .subscriptions
            .lock()
            .await
            .iter()
            .filter(|subscription| subscription.steps.contains(&step))
            .cloned()
            .collect();
        if subscriptions.is_empty() {
            debug!(%step, "no in-process subscriber for client sync message");
        }

        for subscription in subscriptions {
            let handler = Arc::clone(&subscription.handler);
            let message = message.clone();
            let outcome = TraceId::scope(trace_id, handler.handle(message)).await;
            match outcome {
                Ok(outcome) => debug!(%step, ?outcome, "client sync message handled"),
                Err(err) => error!(%step, error = %err, "client sync message could not be handled"),
            }
        }
    }

    /// Spawn a task delivering messages as they are published.
    pub fn spawn_dispatcher(&self) -> JoinHandle<()> {
        let broker = self.clone();
        tokio::spawn(async move {
            loop {
                broker.inner.ready.notified().await;
                broker.deliver_pending().await;
            }
        })
    }
}

#[async_trait]
impl ClientSyncPublisher for InProcessBroker {
    async fn publish(&self, message: &ClientSyncMessage) -> Result<(), ClientSyncPublishError> {
        if let Some(history) = &self.inner.history {
            history.lock().await.push(message.clone());
        }
        let trace_id = TraceId::current().unwrap_or_else(TraceId::generate);
        self.inner
            .queue
            .lock()
            .await
            .push_back((message.clone(), trace_id));
        self.inner.ready.notify_one();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockClientSyncHandler, SyncOutcome};
    use crate::domain::UserId;

    fn activate() -> ClientSyncMessage {
        ClientSyncMessage::for_client(SyncStep::Activate, UserId::random()).expect("id-only step")
    }

    #[tokio::test]
    async fn delivers_only_subscribed_steps() {
        let broker = InProcessBroker::recording();
        let mut handler = MockClientSyncHandler::new();
        handler
            .expect_handle()
            .withf(|message| message.step() == SyncStep::Activate)
            .times(1)
            .return_once(|_| Ok(SyncOutcome::Applied));
        broker
            .subscribe(&[SyncStep::Activate], Arc::new(handler))
            .await;

        broker.publish(&activate()).await.expect("queued");
        let deactivate = ClientSyncMessage::for_client(SyncStep::Deactivate, UserId::random())
            .expect("id-only step");
        broker.publish(&deactivate).await.expect("queued");

        assert_eq!(broker.deliver_pending().await, 2);
        assert_eq!(broker.published().await.len(), 2);
    }

    #[tokio::test]
    async fn messages_wait_in_the_queue_until_drained() {
        let broker = InProcessBroker::recording();
        let mut handler = MockClientSyncHandler::new();
        handler.expect_handle().times(0);
        broker
            .subscribe(&SyncStep::FORWARD, Arc::new(handler))
            .await;

        let message = activate();
        broker.publish(&message).await.expect("queued");

        assert_eq!(broker.published().await, vec![message]);
    }

    #[tokio::test]
    async fn plain_brokers_keep_no_history() {
        let broker = InProcessBroker::new();
        let mut handler = MockClientSyncHandler::new();
        handler
            .expect_handle()
            .times(1)
            .return_once(|_| Ok(SyncOutcome::Applied));
        broker
            .subscribe(&SyncStep::FORWARD, Arc::new(handler))
            .await;

        broker.publish(&activate()).await.expect("queued");

        assert_eq!(broker.deliver_pending().await, 1);
        assert!(broker.published().await.is_empty());
        assert_eq!(broker.deliver_pending().await, 0);
    }
}
