//! Binary motion input.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SensorError;

/// Source of the raw sensor level.
///
/// `read()` is called from a synchronous activity tick, so it must be quick.
pub trait MotionInput: Send + 'static {
    /// Returns `true` for a high level.
    fn read(&mut self) -> Result<bool, SensorError>;
}

/// Reads a sysfs-style GPIO `value` file (`0` or `1`, trailing newline allowed).
#[derive(Debug, Clone)]
pub struct FileInput {
    path: PathBuf,
}

impl FileInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MotionInput for FileInput {
    fn read(&mut self) -> Result<bool, SensorError> {
        let raw = fs::read_to_string(&self.path)?;
        match raw.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(SensorError::Malformed {
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_levels_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1").unwrap();
        let mut input = FileInput::new(file.path());
        assert!(input.read().unwrap());

        fs::write(file.path(), "0").unwrap();
        assert!(!input.read().unwrap());
    }

    #[test]
    fn rejects_garbage_and_missing_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "high").unwrap();
        let mut input = FileInput::new(file.path());
        let err = input.read().unwrap_err();
        assert_eq!(err.as_label(), "sensor_malformed");

        let mut missing = FileInput::new("/nonexistent/gpio/value");
        assert_eq!(missing.read().unwrap_err().as_label(), "sensor_io");
    }
}
