//! ESP-IDF platform helpers for `MqttClient`.
//!
//! Compiled only for `target_os = "espidf"`. The `mqtt-rx` thread owns the
//! session lifecycle; the control loop only touches the client through
//! [`Shared`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
};
use log::{debug, info, warn};

use crate::error::ConnectionError;
use crate::mqtt::channels::{InboundChannel, forward_inbound};
use crate::mqtt::link::{Backoff, LinkTracker};

const RX_STACK_SIZE: usize = 8 * 1024;

/// State shared between the receiver thread and the control loop.
pub(super) struct Shared {
    client: Mutex<Option<EspMqttClient<'static>>>,
    connected: AtomicBool,
    resubscribe: AtomicBool,
}

impl Shared {
    pub(super) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub(super) fn take_resubscribe(&self) -> bool {
        self.resubscribe.swap(false, Ordering::AcqRel)
    }

    pub(super) fn request_resubscribe(&self) {
        self.resubscribe.store(true, Ordering::Release);
    }

    pub(super) fn subscribe(&self, topic: &str) -> Result<(), ConnectionError> {
        let mut slot = self
            .client
            .lock()
            .map_err(|_| ConnectionError::SubscribeFailed)?;
        let client = slot.as_mut().ok_or(ConnectionError::NotConnected)?;
        client
            .subscribe(topic, QoS::AtLeastOnce)
            .map(|_| ())
            .map_err(|e| {
                warn!("MQTT: subscribe error {:?}", e);
                ConnectionError::SubscribeFailed
            })
    }

    /// Hand a QoS 1 message to the esp-mqtt outbox without waiting for
    /// PUBACK. Refused while the session is down: the session object is
    /// rebuilt on reconnect, so its outbox would be discarded anyway.
    pub(super) fn enqueue(&self, topic: &str, payload: &[u8]) -> Result<(), ConnectionError> {
        if !self.is_connected() {
            return Err(ConnectionError::NotConnected);
        }
        let mut slot = self
            .client
            .lock()
            .map_err(|_| ConnectionError::PublishFailed)?;
        let client = slot.as_mut().ok_or(ConnectionError::NotConnected)?;
        client
            .enqueue(topic, QoS::AtLeastOnce, false, payload)
            .map(|_| ())
            .map_err(|e| {
                warn!("MQTT: enqueue error {:?}", e);
                ConnectionError::PublishFailed
            })
    }

    fn install(&self, client: EspMqttClient<'static>) {
        if let Ok(mut slot) = self.client.lock() {
            *slot = Some(client);
        }
    }

    fn teardown(&self) {
        self.connected.store(false, Ordering::Release);
        if let Ok(mut slot) = self.client.lock() {
            slot.take();
        }
    }
}

/// Spawn the `mqtt-rx` thread. It connects, forwards inbound messages,
/// and on every disconnect waits out the backoff before reconnecting.
pub(super) fn spawn_receiver(
    url: String,
    client_id: String,
    mut backoff: Backoff,
    inbound: &'static InboundChannel,
) -> Result<Arc<Shared>, ConnectionError> {
    let shared = Arc::new(Shared {
        client: Mutex::new(None),
        connected: AtomicBool::new(false),
        resubscribe: AtomicBool::new(false),
    });
    let rx_shared = Arc::clone(&shared);

    thread::Builder::new()
        .name("mqtt-rx".into())
        .stack_size(RX_STACK_SIZE)
        .spawn(move || {
            let mut link = LinkTracker::new();
            loop {
                let conf = MqttClientConfiguration {
                    client_id: Some(client_id.as_str()),
                    ..Default::default()
                };
                match EspMqttClient::new(url.as_str(), &conf) {
                    Ok((client, conn)) => {
                        rx_shared.install(client);
                        run_session(&rx_shared, conn, inbound, &mut link, &mut backoff);
                        rx_shared.teardown();
                        link.update(false);
                    }
                    Err(e) => warn!("MQTT: client init failed: {:?}", e),
                }
                let delay = backoff.next_delay_ms();
                info!("MQTT: reconnecting in {} ms", delay);
                thread::sleep(Duration::from_millis(delay));
            }
        })
        .map_err(|_| ConnectionError::BrokerUnreachable)?;

    Ok(shared)
}

/// Pump one broker session until it disconnects.
fn run_session(
    shared: &Shared,
    mut conn: EspMqttConnection,
    inbound: &'static InboundChannel,
    link: &mut LinkTracker,
    backoff: &mut Backoff,
) {
    while let Ok(event) = conn.next() {
        match event.payload() {
            EventPayload::Connected(_) => {
                shared.connected.store(true, Ordering::Release);
                shared.request_resubscribe();
                backoff.reset();
                link.update(true);
            }
            EventPayload::Disconnected => return,
            EventPayload::Received {
                topic,
                data,
                details,
                ..
            } => {
                let topic = topic.unwrap_or("");
                if !matches!(details, Details::Complete) {
                    warn!("MQTT: dropping fragmented message on {} ({} bytes)", topic, data.len());
                    continue;
                }
                if let Err(reason) = forward_inbound(inbound, topic, data) {
                    warn!("MQTT: dropped message on {}: {}", topic, reason);
                }
            }
            EventPayload::Error(e) => warn!("MQTT: {:?}", e),
            other => debug!("MQTT: {:?}", other),
        }
    }
    warn!("MQTT: connection closed");
}
