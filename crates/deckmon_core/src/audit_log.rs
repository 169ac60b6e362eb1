//! Bounded plain-text audit trail.
//!
//! Each line is `[YYYY-mm-dd HH:MM:SS] message`. Only the most recent
//! [`MAX_AUDIT_LINES`] lines are kept. The engine only appends; it never
//! reads the log back for decisions.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// Number of lines retained in the audit log.
pub const MAX_AUDIT_LINES: usize = 100;

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: Utf8PathBuf,
    max_lines: usize,
}

impl AuditLog {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_lines: MAX_AUDIT_LINES,
        }
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines.max(1);
        self
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Appends a timestamped line, logging instead of failing.
    pub fn record(&self, message: &str) {
        if let Err(e) = self.append(message) {
            tracing::warn!("Failed to write audit log {}: {}", self.path, e);
        }
    }

    /// Appends a timestamped line and trims the file to the line cap.
    pub fn append(&self, message: &str) -> Result<()> {
        let timestamp = chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]");
        let line = format!("{} {}", timestamp, message.replace('\n', " "));

        let existing = match std::fs::read_to_string(self.path.as_std_path()) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut lines: Vec<&str> = existing.lines().collect();
        lines.push(&line);
        let skip = lines.len().saturating_sub(self.max_lines);

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .unwrap_or(Utf8Path::new("."));
        std::fs::create_dir_all(dir.as_std_path())?;

        let mut temp = tempfile::NamedTempFile::new_in(dir.as_std_path())?;
        for l in &lines[skip..] {
            writeln!(temp, "{}", l)?;
        }
        temp.persist(self.path.as_std_path())
            .map_err(|e| Error::Persist {
                path: self.path.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}
