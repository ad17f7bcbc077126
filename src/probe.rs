//! Free-memory gauge.

use std::path::PathBuf;

/// Source of the free-memory gauge read by the heartbeat and the memory monitor.
pub trait SystemProbe: Send + Sync + 'static {
    /// Free memory in bytes, `None` when the gauge is unavailable.
    fn free_memory(&self) -> Option<u64>;
}

/// Reads `MemAvailable` from `/proc/meminfo`.
#[derive(Debug, Clone)]
pub struct HostProbe {
    meminfo: PathBuf,
}

impl HostProbe {
    pub fn new() -> Self {
        Self {
            meminfo: PathBuf::from("/proc/meminfo"),
        }
    }

    /// Reads from another meminfo-formatted file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            meminfo: path.into(),
        }
    }
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for HostProbe {
    fn free_memory(&self) -> Option<u64> {
        let contents = std::fs::read_to_string(&self.meminfo).ok()?;
        parse_mem_available(&contents)
    }
}

/// Extracts `MemAvailable` (reported in kB) as bytes.
fn parse_mem_available(meminfo: &str) -> Option<u64> {
    let line = meminfo
        .lines()
        .find(|l| l.starts_with("MemAvailable:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    kb.checked_mul(1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:        8038360 kB
MemFree:          614252 kB
MemAvailable:    5243880 kB
Buffers:          263380 kB
";

    #[test]
    fn parses_mem_available_in_bytes() {
        assert_eq!(parse_mem_available(MEMINFO), Some(5_243_880 * 1024));
        assert_eq!(parse_mem_available("MemFree: 10 kB\n"), None);
        assert_eq!(parse_mem_available("MemAvailable: lots kB\n"), None);
    }

    #[test]
    fn reads_file_and_tolerates_absence() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), MEMINFO).unwrap();
        assert_eq!(HostProbe::with_path(file.path()).free_memory(), Some(5_243_880 * 1024));
        assert_eq!(HostProbe::with_path("/nonexistent/meminfo").free_memory(), None);
    }
}
