//! MQTT session backed by `rumqttc`.
//!
//! `rumqttc` splits a connection into an [`AsyncClient`] (request handle) and an
//! [`EventLoop`] that must be polled to do any network I/O. Here the two halves
//! become:
//!
//! - [`MqttMessaging`] the [`Messaging`] handle given to the device core;
//! - [`MqttDriver`] a [`Task`] that polls the event loop only while a session is
//!   wanted and turns its outcomes into [`ConnEvent`]s.
//!
//! ```text
//! connect() ──► Notify ──► MqttDriver: poll() ... ConnAck ──► SessionConnected
//!                                          └─ Err(..)   ──► SessionDisconnected, idle
//! ```
//!
//! The driver never reconnects on its own; reconnect timing belongs to the
//! connectivity supervisor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet};
use tokio::sync::{Notify, mpsc};
use tokio_util::sync::CancellationToken;

use super::{Messaging, OutboundMessage};
use crate::config::BrokerConfig;
use crate::connectivity::ConnEvent;
use crate::error::PublishError;
use crate::tasks::Task;

/// Capacity of the request queue between the client handle and the event loop.
const REQUEST_CAPACITY: usize = 16;

/// [`Messaging`] handle over a `rumqttc` client.
#[derive(Clone)]
pub struct MqttMessaging {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
    wanted: Arc<Notify>,
}

/// Event-loop driver paired with an [`MqttMessaging`].
pub struct MqttDriver {
    event_loop: EventLoop,
    connected: Arc<AtomicBool>,
    wanted: Arc<Notify>,
    events: mpsc::Sender<ConnEvent>,
    broker: String,
}

impl MqttMessaging {
    /// Creates the handle and its driver. Nothing touches the network until
    /// [`Messaging::connect`] is called and the driver is running.
    pub fn new(cfg: &BrokerConfig, events: mpsc::Sender<ConnEvent>) -> (Self, MqttDriver) {
        let mut opts = MqttOptions::new(cfg.client_id.clone(), cfg.host.clone(), cfg.port);
        opts.set_keep_alive(cfg.keep_alive);
        if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
            opts.set_credentials(user.clone(), pass.clone());
        }

        let (client, event_loop) = AsyncClient::new(opts, REQUEST_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));
        let wanted = Arc::new(Notify::new());

        let messaging = Self {
            client,
            connected: Arc::clone(&connected),
            wanted: Arc::clone(&wanted),
        };
        let driver = MqttDriver {
            event_loop,
            connected,
            wanted,
            events,
            broker: format!("{}:{}", cfg.host, cfg.port),
        };
        (messaging, driver)
    }
}

impl Messaging for MqttMessaging {
    fn connect(&self) {
        self.wanted.notify_one();
    }

    fn disconnect(&self) {
        if let Err(e) = self.client.try_disconnect() {
            tracing::debug!(error = %e, "mqtt disconnect request not queued");
        }
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn publish(&self, msg: OutboundMessage) -> Result<(), PublishError> {
        self.client
            .try_publish(msg.topic, msg.qos.into(), msg.retain, msg.payload)
            .map_err(|e| PublishError::Rejected {
                reason: e.to_string(),
            })
    }
}

impl MqttDriver {
    /// Polls the event loop until the session ends or `ctx` is cancelled.
    ///
    /// Returns `false` if cancelled.
    async fn session(&mut self, ctx: &CancellationToken) -> bool {
        tracing::info!(broker = %self.broker, "mqtt connecting");
        loop {
            let polled = tokio::select! {
                res = self.event_loop.poll() => res,
                _ = ctx.cancelled() => return false,
            };

            match polled {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code == ConnectReturnCode::Success {
                        self.connected.store(true, Ordering::Release);
                        tracing::info!(broker = %self.broker, "mqtt connected");
                        self.report(ConnEvent::SessionConnected).await;
                    } else {
                        let reason = format!("connection refused: {:?}", ack.code);
                        self.end(reason).await;
                        return true;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    self.end(e.to_string()).await;
                    return true;
                }
            }
        }
    }

    async fn end(&mut self, reason: String) {
        self.connected.store(false, Ordering::Release);
        tracing::warn!(broker = %self.broker, %reason, "mqtt disconnected");
        self.report(ConnEvent::SessionDisconnected { reason }).await;
    }

    async fn report(&mut self, ev: ConnEvent) {
        if self.events.send(ev).await.is_err() {
            tracing::debug!("connectivity channel closed");
        }
    }
}

#[async_trait]
impl Task for MqttDriver {
    fn name(&self) -> &str {
        "mqtt"
    }

    async fn run(&mut self, ctx: CancellationToken) {
        loop {
            tokio::select! {
                _ = self.wanted.notified() => {}
                _ = ctx.cancelled() => break,
            }
            if !self.session(&ctx).await {
                break;
            }
        }
        self.connected.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn broker() -> BrokerConfig {
        BrokerConfig {
            host: "127.0.0.1".into(),
            port: 1,
            client_id: "pirvisor-test".into(),
            username: None,
            password: None,
            keep_alive: Duration::from_secs(30),
        }
    }

    fn assert_send<T: Send>(_: T) {}

    #[tokio::test]
    async fn driver_futures_can_move_across_threads() {
        let (tx, _rx) = mpsc::channel(1);
        let (_messaging, mut driver) = MqttMessaging::new(&broker(), tx);
        assert_send(driver.report(ConnEvent::LinkLost));
        assert_send(driver.end("gone".into()));
        assert_send(driver.run(CancellationToken::new()));
    }

    #[tokio::test]
    async fn idle_until_connect_requested() {
        let (tx, mut rx) = mpsc::channel(4);
        let (messaging, mut driver) = MqttMessaging::new(&broker(), tx);
        assert!(!messaging.connected());

        let ctx = CancellationToken::new();
        let child = ctx.clone();
        let handle = tokio::spawn(async move { driver.run(child).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err(), "no session attempt without connect()");

        ctx.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_reports_disconnect() {
        let (tx, mut rx) = mpsc::channel(4);
        let (messaging, mut driver) = MqttMessaging::new(&broker(), tx);

        let ctx = CancellationToken::new();
        let child = ctx.clone();
        let handle = tokio::spawn(async move { driver.run(child).await });

        messaging.connect();
        let ev = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("driver reports within timeout")
            .expect("channel open");
        assert!(matches!(ev, ConnEvent::SessionDisconnected { .. }));
        assert!(!messaging.connected());

        ctx.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn publish_while_idle_is_queued_until_full() {
        let (tx, _rx) = mpsc::channel(4);
        let (messaging, _driver) = MqttMessaging::new(&broker(), tx);

        for _ in 0..REQUEST_CAPACITY {
            messaging
                .publish(OutboundMessage::new("t", "x"))
                .expect("queue has room");
        }
        let err = messaging.publish(OutboundMessage::new("t", "x")).unwrap_err();
        assert_eq!(err.as_label(), "publish_rejected");
    }
}
