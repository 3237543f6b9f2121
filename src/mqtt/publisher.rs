//! [`StatusPort`] adapter over an [`MqttPublisher`].
//!
//! Encodes status and health payloads and hands them to the client. A
//! failed publish is logged and counted here and never reaches the reset
//! sequence.

use log::{info, warn};

use crate::app::events::{DeviceStatus, HealthReport};
use crate::app::ports::StatusPort;

use super::client::MqttPublisher;
use super::codec::{encode_health, encode_status};
use super::topics::Topics;

#[derive(Clone, Copy)]
enum Outbound {
    Status,
    Health,
}

impl Outbound {
    fn label(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Health => "health",
        }
    }
}

pub struct StatusPublisher<C: MqttPublisher> {
    client: C,
    status_topic: String,
    health_topic: String,
    failures: u32,
}

impl<C: MqttPublisher> StatusPublisher<C> {
    pub fn new(client: C, topics: &Topics) -> Self {
        Self {
            client,
            status_topic: topics.status.clone(),
            health_topic: topics.health.clone(),
            failures: 0,
        }
    }

    /// Publishes that did not reach the client's outbox.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    fn send(&mut self, kind: Outbound, payload: Result<Vec<u8>, serde_json::Error>) -> bool {
        let topic = match kind {
            Outbound::Status => self.status_topic.as_str(),
            Outbound::Health => self.health_topic.as_str(),
        };
        let bytes = match payload {
            Ok(b) => b,
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                warn!("MQTT: {} encode failed: {}", kind.label(), e);
                return false;
            }
        };
        match self.client.enqueue(topic, &bytes) {
            Ok(()) => true,
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                warn!(
                    "MQTT: {} publish to {} failed: {} (failures={})",
                    kind.label(),
                    topic,
                    e,
                    self.failures
                );
                false
            }
        }
    }
}

impl<C: MqttPublisher> StatusPort for StatusPublisher<C> {
    fn publish_status(&mut self, status: DeviceStatus) {
        if self.send(Outbound::Status, encode_status(status)) {
            info!("MQTT: status '{}' queued", status.as_str());
        }
    }

    fn publish_health(&mut self, report: &HealthReport) -> bool {
        self.send(Outbound::Health, encode_health(report))
    }
}
