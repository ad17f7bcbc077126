//! # Jitter for reconnect delays.
//!
//! Devices that lost the broker together come back together. [`JitterPolicy`]
//! spreads their reconnects by randomizing each delay below its backoff base:
//!
//! | Policy  | Delay for base `d`        | Label   |
//! |---------|---------------------------|---------|
//! | `None`  | `d`                       | `none`  |
//! | `Full`  | uniform in `[0, d]`       | `full`  |
//! | `Equal` | `d/2` + uniform `[0, d/2]`| `equal` |
//!
//! Selected with `PIRVISOR_RECONNECT_JITTER`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;

/// Randomization applied to every reconnect delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Exact delays; the default for a standalone device.
    #[default]
    None,
    /// Anywhere between zero and the base delay.
    Full,
    /// At least half of the base delay.
    Equal,
}

impl JitterPolicy {
    pub fn as_label(&self) -> &'static str {
        match self {
            JitterPolicy::None => "none",
            JitterPolicy::Full => "full",
            JitterPolicy::Equal => "equal",
        }
    }

    /// Returns `delay` randomized according to the policy. Never exceeds `delay`.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let floor = match self {
            JitterPolicy::None => return delay,
            JitterPolicy::Full => 0,
            JitterPolicy::Equal => ms / 2,
        };
        if floor >= ms {
            return Duration::from_millis(ms);
        }
        Duration::from_millis(rand::rng().random_range(floor..=ms))
    }
}

impl fmt::Display for JitterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl FromStr for JitterPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(JitterPolicy::None),
            "full" => Ok(JitterPolicy::Full),
            "equal" => Ok(JitterPolicy::Equal),
            other => Err(format!("unknown jitter `{other}` (expected none, full or equal)")),
        }
    }
}
