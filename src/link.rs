//! # Network link capability.
//!
//! The connectivity supervisor only observes the link: it learns about it
//! through [`ConnEvent::LinkAcquired`] / [`ConnEvent::LinkLost`] and asks for a
//! reacquire with [`Link::reconnect`]. The retry loop of the link itself lives
//! with the implementation.
//!
//! On a host the "link" is the route to the broker. [`HostLinkWatcher`] probes
//! it on a fixed interval: the broker address is resolved and a UDP socket is
//! connected to it, which fails without sending anything when there is no
//! route. The signal level, when the host has a wireless interface, comes from
//! `/proc/net/wireless`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::{Notify, mpsc};
use tokio_util::sync::CancellationToken;

use crate::connectivity::ConnEvent;
use crate::tasks::Task;

/// Upper bound for one reachability probe (name resolution included).
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Network link capability consumed by the device core.
pub trait Link: Send + Sync + 'static {
    /// `true` while the link is established.
    fn is_connected(&self) -> bool;

    /// Asks the link to try to come back. Returns immediately.
    fn reconnect(&self);

    /// Link quality in dBm, when the link has one.
    fn rssi(&self) -> Option<i32>;
}

/// Host [`Link`] handle. State is maintained by its [`HostLinkWatcher`].
#[derive(Clone, Debug)]
pub struct HostLink {
    connected: Arc<AtomicBool>,
    wake: Arc<Notify>,
    wireless: PathBuf,
}

/// Periodic reachability probe feeding link events to the supervisor.
pub struct HostLinkWatcher {
    target: String,
    interval: Duration,
    connected: Arc<AtomicBool>,
    wake: Arc<Notify>,
    events: mpsc::Sender<ConnEvent>,
}

impl HostLink {
    /// Creates the handle and its watcher. `target` is a `host:port` pair.
    pub fn new(
        target: impl Into<String>,
        interval: Duration,
        events: mpsc::Sender<ConnEvent>,
    ) -> (Self, HostLinkWatcher) {
        let connected = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        let link = Self {
            connected: Arc::clone(&connected),
            wake: Arc::clone(&wake),
            wireless: PathBuf::from("/proc/net/wireless"),
        };
        let watcher = HostLinkWatcher {
            target: target.into(),
            interval,
            connected,
            wake,
            events,
        };
        (link, watcher)
    }

    /// Overrides the wireless statistics file (for tests).
    pub fn with_wireless_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.wireless = path.into();
        self
    }
}

impl Link for HostLink {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn reconnect(&self) {
        self.wake.notify_one();
    }

    fn rssi(&self) -> Option<i32> {
        let contents = std::fs::read_to_string(&self.wireless).ok()?;
        parse_wireless_level(&contents)
    }
}

/// Returns the signal level of the first interface listed in `/proc/net/wireless`.
///
/// ```text
/// Inter-| sta-|   Quality        |   Discarded packets ...
///  face | tus | link level noise |  nwid  crypt ...
///  wlan0: 0000   54.  -56.  -256        0      0 ...
/// ```
fn parse_wireless_level(contents: &str) -> Option<i32> {
    contents
        .lines()
        .skip(2)
        .find_map(|line| {
            let (_, stats) = line.split_once(':')?;
            let level = stats.split_whitespace().nth(2)?;
            level.trim_end_matches('.').parse::<f64>().ok()
        })
        .map(|v| v as i32)
}

impl HostLinkWatcher {
    async fn probe(&self) -> bool {
        let attempt = async {
            let addr: SocketAddr = tokio::net::lookup_host(&self.target).await.ok()?.next()?;
            let bind: SocketAddr = if addr.is_ipv4() {
                ([0u8; 4], 0).into()
            } else {
                ([0u16; 8], 0).into()
            };
            let socket = UdpSocket::bind(bind).await.ok()?;
            socket.connect(addr).await.ok()
        };
        matches!(tokio::time::timeout(PROBE_TIMEOUT, attempt).await, Ok(Some(())))
    }

    /// Records the probe result; returns the event to report on a change.
    fn update(&self, up: bool) -> Option<ConnEvent> {
        let was = self.connected.swap(up, Ordering::AcqRel);
        match (was, up) {
            (false, true) => Some(ConnEvent::LinkAcquired),
            (true, false) => Some(ConnEvent::LinkLost),
            _ => None,
        }
    }
}

#[async_trait]
impl Task for HostLinkWatcher {
    fn name(&self) -> &str {
        "link"
    }

    async fn run(&mut self, ctx: CancellationToken) {
        loop {
            let up = tokio::select! {
                up = self.probe() => up,
                _ = ctx.cancelled() => break,
            };
            if let Some(ev) = self.update(up) {
                tracing::info!(probe = %self.target, event = ev.as_label(), "link changed");
                if self.events.send(ev).await.is_err() {
                    break;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.wake.notified() => {}
                _ = ctx.cancelled() => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIRELESS: &str = "\
Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
 face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
 wlan0: 0000   54.  -56.  -256        0      0      0      0      0        0
";

    #[test]
    fn parses_wireless_level() {
        assert_eq!(parse_wireless_level(WIRELESS), Some(-56));
        assert_eq!(parse_wireless_level("header\nheader\n"), None);
    }

    #[test]
    fn rssi_is_none_without_wireless_stats() {
        let (tx, _rx) = mpsc::channel(1);
        let (link, _watcher) = HostLink::new("127.0.0.1:1883", Duration::from_secs(5), tx);
        let link = link.with_wireless_path("/nonexistent/wireless");
        assert_eq!(link.rssi(), None);
    }

    #[test]
    fn rssi_reads_wireless_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), WIRELESS).unwrap();
        let (tx, _rx) = mpsc::channel(1);
        let (link, _watcher) = HostLink::new("127.0.0.1:1883", Duration::from_secs(5), tx);
        assert_eq!(link.with_wireless_path(file.path()).rssi(), Some(-56));
    }

    #[test]
    fn update_reports_only_changes() {
        let (tx, _rx) = mpsc::channel(1);
        let (link, watcher) = HostLink::new("127.0.0.1:1883", Duration::from_secs(5), tx);

        assert_eq!(watcher.update(false), None);
        assert_eq!(watcher.update(true), Some(ConnEvent::LinkAcquired));
        assert!(link.is_connected());
        assert_eq!(watcher.update(true), None);
        assert_eq!(watcher.update(false), Some(ConnEvent::LinkLost));
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn loopback_target_is_reachable() {
        let (tx, mut rx) = mpsc::channel(4);
        let (link, mut watcher) = HostLink::new("127.0.0.1:1883", Duration::from_secs(60), tx);

        let ctx = CancellationToken::new();
        let child = ctx.clone();
        let handle = tokio::spawn(async move { watcher.run(child).await });

        let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("probe finishes")
            .expect("channel open");
        assert_eq!(ev, ConnEvent::LinkAcquired);
        assert!(link.is_connected());

        ctx.cancel();
        handle.await.unwrap();
    }
}
