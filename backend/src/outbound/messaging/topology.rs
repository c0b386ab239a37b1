//! Exchange, routing key and queue names for the saga.

use crate::domain::SyncStep;

/// Exchange used when none is configured.
pub const DEFAULT_EXCHANGE: &str = "cinema.clients";

const ROUTING_PREFIX: &str = "client.";

pub(super) const ALL_STEPS: [SyncStep; 6] = [
    SyncStep::Create,
    SyncStep::CreateRollback,
    SyncStep::Activate,
    SyncStep::ActivateRollback,
    SyncStep::Deactivate,
    SyncStep::DeactivateRollback,
];

/// Broker names derived from the exchange.
///
/// Each step is published on `client.<step>` and consumed from a durable
/// queue of the same name bound to the topic exchange.
///
/// # Examples
/// ```
/// use cinema::domain::SyncStep;
/// use cinema::outbound::messaging::ClientSyncTopology;
///
/// let topology = ClientSyncTopology::default();
/// assert_eq!(topology.exchange(), "cinema.clients");
/// assert_eq!(topology.routing_key(SyncStep::ActivateRollback), "client.activate.rollback");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSyncTopology {
    exchange: String,
}

impl ClientSyncTopology {
    pub fn new(exchange: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
        }
    }

    #[must_use]
    pub fn exchange(&self) -> &str {
        self.exchange.as_str()
    }

    #[must_use]
    pub fn routing_key(&self, step: SyncStep) -> String {
        format!("{ROUTING_PREFIX}{}", step.as_str())
    }

    /// Queue consumed for `step`; named after its routing key.
    #[must_use]
    pub fn queue(&self, step: SyncStep) -> String {
        self.routing_key(step)
    }

    /// Step a routing key was derived from.
    #[must_use]
    pub fn step_for(&self, routing_key: &str) -> Option<SyncStep> {
        let name = routing_key.strip_prefix(ROUTING_PREFIX)?;
        ALL_STEPS.into_iter().find(|step| step.as_str() == name)
    }
}

impl Default for ClientSyncTopology {
    fn default() -> Self {
        Self::new(DEFAULT_EXCHANGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("client.create", Some(SyncStep::Create))]
    #[case("client.deactivate.rollback", Some(SyncStep::DeactivateRollback))]
    #[case("client.archive", None)]
    #[case("movie.create", None)]
    fn routing_keys_resolve_to_steps(#[case] key: &str, #[case] expected: Option<SyncStep>) {
        assert_eq!(ClientSyncTopology::default().step_for(key), expected);
    }

    #[test]
    fn queues_follow_routing_keys_under_custom_exchange() {
        let topology = ClientSyncTopology::new("staging.clients");
        assert_eq!(topology.exchange(), "staging.clients");
        assert_eq!(topology.queue(SyncStep::Create), "client.create");
    }
}
