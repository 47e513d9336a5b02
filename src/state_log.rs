//! # Canonical State Log
//!
//! Downstream sink for the canonical gamepad state. Each change is written
//! as one JSON object per line:
//!
//! ```text
//! {"timestamp":"2024-05-01T12:00:00.000000+00:00","profile":"ProfileA","state":{"lx":32767,...}}
//! ```
//!
//! Identical consecutive states are skipped so an idle controller produces
//! no output.

use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::controller::{CanonicalGamepadState, Profile};
use crate::error::Result;

/// Target value selecting stdout
pub const STDOUT_TARGET: &str = "-";

#[derive(Debug, Serialize)]
struct StateRecord<'a> {
    timestamp: String,
    profile: Profile,
    state: &'a CanonicalGamepadState,
}

/// JSON Lines writer for canonical state changes.
pub struct StateLog {
    writer: Option<Box<dyn Write + Send>>,
    last: Option<(Profile, CanonicalGamepadState)>,
    records: u64,
}

impl std::fmt::Debug for StateLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateLog")
            .field("enabled", &self.writer.is_some())
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

impl StateLog {
    /// Open the configured target: `"-"` for stdout, empty to disable,
    /// anything else is a file opened for appending.
    ///
    /// # Errors
    ///
    /// Returns error if the file or its parent directory cannot be created.
    pub fn open(target: &str) -> Result<Self> {
        match target {
            "" => {
                debug!("State log disabled");
                Ok(Self::disabled())
            }
            STDOUT_TARGET => Ok(Self::from_writer(Box::new(io::stdout()))),
            path => {
                let path = Path::new(path);
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                info!("Writing state log to {}", path.display());
                Ok(Self::from_writer(Box::new(BufWriter::new(file))))
            }
        }
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Some(writer),
            last: None,
            records: 0,
        }
    }

    pub fn disabled() -> Self {
        Self {
            writer: None,
            last: None,
            records: 0,
        }
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Write `state` if it (or the profile) differs from the last record.
    ///
    /// Returns `true` when a line was written.
    pub fn record(&mut self, profile: Profile, state: &CanonicalGamepadState) -> Result<bool> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(false);
        };
        if self.last == Some((profile, *state)) {
            return Ok(false);
        }

        let record = StateRecord {
            timestamp: Utc::now().to_rfc3339(),
            profile,
            state,
        };
        serde_json::to_writer(&mut *writer, &record)?;
        writer.write_all(b"\n")?;

        self.last = Some((profile, *state));
        self.records += 1;
        Ok(true)
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::mapper::buttons;
    use tempfile::TempDir;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_jsonl_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.jsonl");
        let mut log = StateLog::open(path.to_str().unwrap()).unwrap();

        let state = CanonicalGamepadState {
            buttons: buttons::B1 | buttons::L3,
            analog: true,
            ..CanonicalGamepadState::default()
        };
        assert!(log.record(Profile::ProfileB, &state).unwrap());
        log.flush().unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["profile"], "ProfileB");
        assert_eq!(lines[0]["state"]["buttons"], 1 + 1024);
        assert_eq!(lines[0]["state"]["lx"], 32767);
        assert_eq!(lines[0]["state"]["analog"], true);

        let timestamp = lines[0]["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_skips_unchanged_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.jsonl");
        let mut log = StateLog::open(path.to_str().unwrap()).unwrap();

        let mut state = CanonicalGamepadState::default();
        assert!(log.record(Profile::ProfileA, &state).unwrap());
        assert!(!log.record(Profile::ProfileA, &state).unwrap());

        state.lx = 0;
        assert!(log.record(Profile::ProfileA, &state).unwrap());
        assert!(log.record(Profile::ProfileB, &state).unwrap());
        log.flush().unwrap();

        assert_eq!(log.records(), 3);
        assert_eq!(read_lines(&path).len(), 3);
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.jsonl");
        fs::write(&path, "{}\n").unwrap();

        let mut log = StateLog::open(path.to_str().unwrap()).unwrap();
        log.record(Profile::ProfileA, &CanonicalGamepadState::default()).unwrap();
        log.flush().unwrap();

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("state.jsonl");

        let mut log = StateLog::open(path.to_str().unwrap()).unwrap();
        log.record(Profile::ProfileA, &CanonicalGamepadState::default()).unwrap();
        log.flush().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let mut log = StateLog::open("").unwrap();
        assert!(!log.record(Profile::ProfileA, &CanonicalGamepadState::default()).unwrap());
        assert_eq!(log.records(), 0);
        assert!(log.flush().is_ok());
    }
}
