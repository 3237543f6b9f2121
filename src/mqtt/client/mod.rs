//! MQTT broker client.
//!
//! Owns the broker session and exposes a non-blocking publish path to the
//! control loop via [`MqttPublisher`]. Inbound messages never reach the
//! caller directly: the receiver side copies them into
//! [`INBOUND_CHANNEL`](super::channels::INBOUND_CHANNEL).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` driven by a dedicated
//!   `mqtt-rx` thread. On every disconnect the session is torn down and
//!   rebuilt after an exponential backoff delay. Subscriptions are issued
//!   from the control loop in [`MqttClient::service`], since esp-mqtt
//!   holds its client lock while an event is being delivered.
//! - **all other targets**: an in-memory client with a manual online flag
//!   that records every publish, for host-side testing.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::config::DeviceConfig;
use crate::error::ConnectionError;

use super::topics::Topics;

#[cfg(target_os = "espidf")]
mod esp_impl;

/// Non-blocking, at-least-once publish.
pub trait MqttPublisher {
    /// Queue `payload` for delivery on `topic` with QoS 1. Returns without
    /// waiting for the broker's acknowledgment.
    fn enqueue(&mut self, topic: &str, payload: &[u8]) -> Result<(), ConnectionError>;
}

/// A message handed to the simulated client.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: Vec<u8>,
}

pub struct MqttClient {
    broker_url: String,
    trigger_topic: String,

    // ── ESP-IDF fields ──────────────────────────────────────────
    #[cfg(target_os = "espidf")]
    shared: std::sync::Arc<esp_impl::Shared>,

    // ── Simulation fields ───────────────────────────────────────
    #[cfg(not(target_os = "espidf"))]
    online: bool,
    #[cfg(not(target_os = "espidf"))]
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    published: Vec<Published>,
}

impl MqttClient {
    /// Start the broker session and the `mqtt-rx` receiver thread.
    #[cfg(target_os = "espidf")]
    pub fn start(
        config: &DeviceConfig,
        topics: &Topics,
        inbound: &'static super::channels::InboundChannel,
    ) -> Result<Self, ConnectionError> {
        let broker_url = broker_url(config);
        let backoff =
            super::link::Backoff::new(config.reconnect_initial_secs, config.reconnect_max_secs);
        let shared = esp_impl::spawn_receiver(
            broker_url.clone(),
            topics.client_id.clone(),
            backoff,
            inbound,
        )?;
        info!("MQTT: client {} → {}", topics.client_id, broker_url);

        Ok(Self {
            broker_url,
            trigger_topic: topics.trigger.clone(),
            shared,
        })
    }

    /// Create an offline simulated client.
    #[cfg(not(target_os = "espidf"))]
    pub fn start(config: &DeviceConfig, topics: &Topics) -> Self {
        let broker_url = broker_url(config);
        info!("MQTT(sim): client {} → {}", topics.client_id, broker_url);
        Self {
            broker_url,
            trigger_topic: topics.trigger.clone(),
            online: false,
            subscribed: false,
            published: Vec::new(),
        }
    }

    pub fn broker_url(&self) -> &str {
        &self.broker_url
    }

    /// Control-loop housekeeping: (re)subscribe to the trigger topic after
    /// each new broker session.
    #[cfg(target_os = "espidf")]
    pub fn service(&mut self) {
        if !self.shared.take_resubscribe() {
            return;
        }
        match self.shared.subscribe(&self.trigger_topic) {
            Ok(()) => info!("MQTT: subscribed to {}", self.trigger_topic),
            Err(e) => {
                warn!("MQTT: subscribe to {} failed: {}", self.trigger_topic, e);
                self.shared.request_resubscribe();
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn service(&mut self) {
        if self.online && !self.subscribed {
            self.subscribed = true;
            info!("MQTT(sim): subscribed to {}", self.trigger_topic);
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn is_connected(&self) -> bool {
        self.online
    }

    // ── Simulation controls ───────────────────────────────────

    /// Bring the simulated session up or down. A new session needs a
    /// fresh subscription, as on the device.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_online(&mut self, online: bool) {
        if !online {
            self.subscribed = false;
        }
        self.online = online;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn published(&self) -> &[Published] {
        &self.published
    }
}

impl MqttPublisher for MqttClient {
    #[cfg(target_os = "espidf")]
    fn enqueue(&mut self, topic: &str, payload: &[u8]) -> Result<(), ConnectionError> {
        self.shared.enqueue(topic, payload)
    }

    #[cfg(not(target_os = "espidf"))]
    fn enqueue(&mut self, topic: &str, payload: &[u8]) -> Result<(), ConnectionError> {
        if !self.online {
            return Err(ConnectionError::NotConnected);
        }
        self.published.push(Published {
            topic: topic.to_owned(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}

fn broker_url(config: &DeviceConfig) -> String {
    format!("mqtt://{}:{}", config.mqtt_broker, config.mqtt_port)
}
