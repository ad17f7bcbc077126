//! # Device configuration.
//!
//! Provides [`Config`] centralized settings for the device runtime: broker
//! address and credentials, topic names, sensor source, activity periods,
//! thresholds and the reconnect policy.
//!
//! Config is used in two ways:
//! 1. **Runtime creation**: `Runtime::new(&config, subscribers)` (grace, bus capacity)
//! 2. **Device assembly**: `DeviceBuilder::new(config)` (everything else)
//!
//! ## Sources
//! [`Config::default`] holds the stock values; [`Config::from_env`] overrides them
//! from `PIRVISOR_*` environment variables (the binary loads a `.env` file first).
//!
//! | Variable                        | Field                   | Default            |
//! |---------------------------------|-------------------------|--------------------|
//! | `PIRVISOR_DEVICE`               | `device`                | `pirvisor`         |
//! | `PIRVISOR_BROKER_HOST`          | `broker.host`           | `localhost`        |
//! | `PIRVISOR_BROKER_PORT`          | `broker.port`           | `1883`             |
//! | `PIRVISOR_CLIENT_ID`            | `broker.client_id`      | value of `device`  |
//! | `PIRVISOR_BROKER_USERNAME`      | `broker.username`       | none               |
//! | `PIRVISOR_BROKER_PASSWORD`      | `broker.password`       | none               |
//! | `PIRVISOR_KEEP_ALIVE_S`         | `broker.keep_alive`     | `30`               |
//! | `PIRVISOR_TOPIC_PREFIX`         | `topics`                | `motion`           |
//! | `PIRVISOR_SENSOR_PATH`          | `sensor_path`           | gpio17 sysfs value |
//! | `PIRVISOR_DEBOUNCE_MS`          | `debounce`              | `1000`             |
//! | `PIRVISOR_SAMPLE_MS`            | `sample_period`         | `100`              |
//! | `PIRVISOR_STATUS_S`             | `status_period`         | `30`               |
//! | `PIRVISOR_MEMORY_S`             | `memory_period`         | `10`               |
//! | `PIRVISOR_LOW_MEMORY_BYTES`     | `low_memory_threshold`  | `10000`            |
//! | `PIRVISOR_RECONNECT_MS`         | `reconnect.first`       | `2000`             |
//! | `PIRVISOR_RECONNECT_MAX_MS`     | `reconnect.max`         | `2000`             |
//! | `PIRVISOR_RECONNECT_FACTOR`     | `reconnect.factor`      | `1.0`              |
//! | `PIRVISOR_RECONNECT_JITTER`     | `reconnect.jitter`      | `none`             |
//! | `PIRVISOR_LINK_PROBE_S`         | `link_probe_interval`   | `5`                |
//! | `PIRVISOR_GRACE_S`              | `grace`                 | `5`                |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::{BackoffPolicy, JitterPolicy};

/// Broker address, identity and session settings.
#[derive(Clone, Debug, PartialEq)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// MQTT keep-alive interval (at least 1s).
    pub keep_alive: Duration,
}

/// Fully qualified topic names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topics {
    /// Retained status / online messages.
    pub status: String,
    /// Motion JSON.
    pub motion: String,
    /// Plain-text event marker.
    pub events: String,
    /// Plain-text warnings.
    pub error: String,
}

impl Topics {
    /// Builds the four topics under `prefix` (`<prefix>/status`, `<prefix>/detected`, ...).
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        Self {
            status: format!("{prefix}/status"),
            motion: format!("{prefix}/detected"),
            events: format!("{prefix}/events"),
            error: format!("{prefix}/error"),
        }
    }
}

impl Default for Topics {
    fn default() -> Self {
        Self::with_prefix("motion")
    }
}

/// Configuration for the device runtime.
///
/// ## Field semantics
/// - `debounce`: minimum gap after an accepted edge before another one counts
/// - `sample_period`: sensor polling cadence
/// - `status_period`: heartbeat cadence
/// - `memory_period`: memory monitor cadence
/// - `low_memory_threshold`: free bytes under which a warning is sent
/// - `reconnect`: delay policy between session reconnect attempts
/// - `link_probe_interval`: how often the host link watcher re-checks reachability
/// - `grace`: maximum wait for actors on shutdown (`0s` = do not wait)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `conn_queue`: capacity of the connectivity event channel (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Device name reported in the online message.
    pub device: String,
    pub broker: BrokerConfig,
    pub topics: Topics,
    /// Binary input source (sysfs GPIO `value` file or compatible).
    pub sensor_path: PathBuf,
    pub debounce: Duration,
    pub sample_period: Duration,
    pub status_period: Duration,
    pub memory_period: Duration,
    pub low_memory_threshold: u64,
    pub reconnect: BackoffPolicy,
    pub link_probe_interval: Duration,
    pub grace: Duration,
    pub bus_capacity: usize,
    pub conn_queue: usize,
}

impl Config {
    /// Returns the debounce window in milliseconds.
    #[inline]
    pub fn debounce_ms(&self) -> u64 {
        self.debounce.as_millis().min(u128::from(u64::MAX)) as u64
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the connectivity channel capacity clamped to a minimum of 1.
    #[inline]
    pub fn conn_queue_clamped(&self) -> usize {
        self.conn_queue.max(1)
    }

    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration from an arbitrary key lookup, starting from the defaults.
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Config::default();

        if let Some(device) = get("PIRVISOR_DEVICE") {
            cfg.broker.client_id = device.clone();
            cfg.device = device;
        }
        if let Some(host) = get("PIRVISOR_BROKER_HOST") {
            cfg.broker.host = host;
        }
        if let Some(port) = parse::<u16>(&get, "PIRVISOR_BROKER_PORT")? {
            cfg.broker.port = port;
        }
        if let Some(id) = get("PIRVISOR_CLIENT_ID") {
            cfg.broker.client_id = id;
        }
        cfg.broker.username = get("PIRVISOR_BROKER_USERNAME");
        cfg.broker.password = get("PIRVISOR_BROKER_PASSWORD");
        if let Some(s) = parse::<u64>(&get, "PIRVISOR_KEEP_ALIVE_S")? {
            cfg.broker.keep_alive = Duration::from_secs(s);
        }
        if let Some(prefix) = get("PIRVISOR_TOPIC_PREFIX") {
            cfg.topics = Topics::with_prefix(&prefix);
        }
        if let Some(path) = get("PIRVISOR_SENSOR_PATH") {
            cfg.sensor_path = PathBuf::from(path);
        }
        if let Some(ms) = parse::<u64>(&get, "PIRVISOR_DEBOUNCE_MS")? {
            cfg.debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(&get, "PIRVISOR_SAMPLE_MS")? {
            cfg.sample_period = Duration::from_millis(ms);
        }
        if let Some(s) = parse::<u64>(&get, "PIRVISOR_STATUS_S")? {
            cfg.status_period = Duration::from_secs(s);
        }
        if let Some(s) = parse::<u64>(&get, "PIRVISOR_MEMORY_S")? {
            cfg.memory_period = Duration::from_secs(s);
        }
        if let Some(bytes) = parse::<u64>(&get, "PIRVISOR_LOW_MEMORY_BYTES")? {
            cfg.low_memory_threshold = bytes;
        }
        if let Some(ms) = parse::<u64>(&get, "PIRVISOR_RECONNECT_MS")? {
            cfg.reconnect.first = Duration::from_millis(ms);
            cfg.reconnect.max = cfg.reconnect.max.max(cfg.reconnect.first);
        }
        if let Some(ms) = parse::<u64>(&get, "PIRVISOR_RECONNECT_MAX_MS")? {
            cfg.reconnect.max = Duration::from_millis(ms);
        }
        if let Some(factor) = parse::<f64>(&get, "PIRVISOR_RECONNECT_FACTOR")? {
            cfg.reconnect.factor = factor;
        }
        if let Some(jitter) = parse::<JitterPolicy>(&get, "PIRVISOR_RECONNECT_JITTER")? {
            cfg.reconnect.jitter = jitter;
        }
        if let Some(s) = parse::<u64>(&get, "PIRVISOR_LINK_PROBE_S")? {
            cfg.link_probe_interval = Duration::from_secs(s);
        }
        if let Some(s) = parse::<u64>(&get, "PIRVISOR_GRACE_S")? {
            cfg.grace = Duration::from_secs(s);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("PIRVISOR_SAMPLE_MS", self.sample_period),
            ("PIRVISOR_STATUS_S", self.status_period),
            ("PIRVISOR_MEMORY_S", self.memory_period),
            ("PIRVISOR_LINK_PROBE_S", self.link_probe_interval),
        ];
        for (key, period) in periods {
            if period.is_zero() {
                return Err(ConfigError::invalid(key, "0", "period must be positive"));
            }
        }
        if self.broker.keep_alive < Duration::from_secs(1) {
            let secs = self.broker.keep_alive.as_secs().to_string();
            return Err(ConfigError::invalid(
                "PIRVISOR_KEEP_ALIVE_S",
                &secs,
                "keep-alive must be at least 1s",
            ));
        }
        if !self.reconnect.factor.is_finite() || self.reconnect.factor < 1.0 {
            return Err(ConfigError::invalid(
                "PIRVISOR_RECONNECT_FACTOR",
                &self.reconnect.factor.to_string(),
                "factor must be a finite number >= 1.0",
            ));
        }
        if self.reconnect.max < self.reconnect.first {
            let ms = self.reconnect.max.as_millis().to_string();
            return Err(ConfigError::invalid(
                "PIRVISOR_RECONNECT_MAX_MS",
                &ms,
                "cap must not be below the first reconnect delay",
            ));
        }
        if self.broker.client_id.is_empty() {
            return Err(ConfigError::invalid(
                "PIRVISOR_CLIENT_ID",
                "",
                "client id must not be empty",
            ));
        }
        Ok(())
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::invalid(key, &raw, e.to_string())),
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `debounce = 1s`, `sample_period = 100ms`
    /// - `status_period = 30s`, `memory_period = 10s`
    /// - `low_memory_threshold = 10_000` bytes
    /// - `reconnect` constant 2s, no jitter
    /// - `link_probe_interval = 5s`, `grace = 5s`
    /// - `bus_capacity = 1024`, `conn_queue = 32`
    fn default() -> Self {
        Self {
            device: "pirvisor".to_string(),
            broker: BrokerConfig {
                host: "localhost".to_string(),
                port: 1883,
                client_id: "pirvisor".to_string(),
                username: None,
                password: None,
                keep_alive: Duration::from_secs(30),
            },
            topics: Topics::default(),
            sensor_path: PathBuf::from("/sys/class/gpio/gpio17/value"),
            debounce: Duration::from_millis(1000),
            sample_period: Duration::from_millis(100),
            status_period: Duration::from_secs(30),
            memory_period: Duration::from_secs(10),
            low_memory_threshold: 10_000,
            reconnect: BackoffPolicy::constant(Duration::from_secs(2)),
            link_probe_interval: Duration::from_secs(5),
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
            conn_queue: 32,
        }
    }
}
