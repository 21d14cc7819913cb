//! Append-only memory log (`memory.txt`).
//!
//! Entries are written as `\n[HH:MM:SS] text\n` with one `write_all` on an
//! append-mode handle, so an interrupted process leaves either the whole
//! entry or none of it. Reads return a trailing window; the file itself is
//! never truncated.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct MemoryLog {
    path: PathBuf,
    window_chars: usize,
}

impl MemoryLog {
    pub fn new(path: impl Into<PathBuf>, window_chars: usize) -> Self {
        Self {
            path: path.into(),
            window_chars,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, text: &str) -> Result<()> {
        self.append_at(&Local::now(), text)
    }

    pub fn append_at<Tz: TimeZone>(&self, at: &DateTime<Tz>, text: &str) -> Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        let entry = format!("\n[{}] {}\n", at.format("%H:%M:%S"), text);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        file.write_all(entry.as_bytes())
            .with_context(|| format!("failed to append to {}", self.path.display()))?;
        Ok(())
    }

    /// The whole log; empty when nothing was written yet.
    pub fn read_all(&self) -> Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", self.path.display())),
        }
    }

    /// The trailing `window_chars` characters of the log.
    pub fn read_window(&self) -> Result<String> {
        let all = self.read_all()?;
        Ok(crate::utils::tail_chars(&all, self.window_chars).to_string())
    }
}
