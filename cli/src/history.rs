//! Command history persistence.
//!
//! Appends the verbatim submitted statement to `~/.meridian/history`, one
//! entry per line, in submission order. Recording is best-effort: a failure
//! is reported by the caller and never interrupts statement processing.

use std::path::{Path, PathBuf};

use crate::error::{Result, ShellError};

/// Command history manager
pub struct CommandHistory {
    path: PathBuf,
    max_size: usize,
}

impl CommandHistory {
    /// Create a history manager at the default path
    pub fn new(max_size: usize) -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let path = PathBuf::from(home).join(".meridian").join("history");

        Self { path, max_size }
    }

    /// Create with custom path
    pub fn with_path<P: AsRef<Path>>(path: P, max_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_size,
        }
    }

    /// Load history from file, most recent last
    pub fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| ShellError::History(format!("failed to read history file: {}", e)))?;

        let lines: Vec<String> = contents
            .lines()
            .map(|s| s.to_string())
            .rev()
            .take(self.max_size)
            .collect();

        Ok(lines.into_iter().rev().collect())
    }

    /// Save history to file, keeping the last `max_size` entries
    pub fn save(&self, history: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ShellError::History(format!("failed to create {}: {}", parent.display(), e)))?;
        }

        let skip = history.len().saturating_sub(self.max_size);
        let contents = history[skip..].join("\n");

        std::fs::write(&self.path, contents)
            .map_err(|e| ShellError::History(format!("failed to write history file: {}", e)))?;

        Ok(())
    }

    /// Append one entry. Duplicates are permitted; ordering is submission
    /// order.
    pub fn append(&self, line: &str) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }

        let mut history = self.load()?;
        history.push(line.to_string());
        self.save(&history)
    }

    /// Clear history
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| ShellError::History(format!("failed to remove history file: {}", e)))?;
        }
        Ok(())
    }

    /// Get history file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
