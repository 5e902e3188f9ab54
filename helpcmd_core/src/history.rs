//! Execution history, persisted as a capped JSON array.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::atomic::{atomic_write, StoreError};
use crate::executor::{AuditRecord, AuditSink};
use crate::types::ElevationPath;

pub const HISTORY_FILE: &str = "history.json";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RULE_WIDTH: usize = 80;

fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub command_key: String,
    pub command_name: String,
    pub command_text: String,
    pub success: bool,
    #[serde(default)]
    pub is_free_command: bool,
    #[serde(default)]
    pub elevation: ElevationPath,
}

impl From<&AuditRecord> for HistoryEntry {
    fn from(record: &AuditRecord) -> Self {
        Self {
            timestamp: record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            command_key: record.key.clone(),
            command_name: record.name.clone(),
            command_text: record.command.clone(),
            success: record.success,
            is_free_command: record.is_free_command,
            elevation: record.elevation.clone(),
        }
    }
}

pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
    entries: Mutex<Vec<HistoryEntry>>,
    load_warning: Option<String>,
}

impl HistoryStore {
    /// Load `history.json` from `data_dir`. A corrupt file is moved aside to
    /// `history.json.bak` before anything can overwrite it, and the store
    /// starts empty.
    pub fn open(data_dir: &Path, limit: usize) -> Self {
        let path = data_dir.join(HISTORY_FILE);
        let (entries, load_warning) = match Self::read(&path) {
            Ok(entries) => (entries, None),
            Err(e) => {
                let warning = match Self::preserve(&path) {
                    Ok(backup) => format!(
                        "{}; moved to {} and starting with empty history",
                        e,
                        backup.display()
                    ),
                    Err(backup_err) => format!(
                        "{}; could not preserve it ({}), starting with empty history",
                        e, backup_err
                    ),
                };
                log::warn!("[history] {}", warning);
                (Vec::new(), Some(warning))
            }
        };
        let store = Self {
            path,
            limit: limit.max(1),
            entries: Mutex::new(entries),
            load_warning,
        };
        store.truncate(&mut store.lock());
        store
    }

    /// Path the unreadable history file is moved to.
    pub fn backup_path(&self) -> PathBuf {
        backup_path_for(&self.path)
    }

    /// The warning logged while loading, if the file on disk was unusable.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    fn preserve(path: &Path) -> Result<PathBuf, StoreError> {
        let backup = backup_path_for(path);
        std::fs::rename(path, &backup).map_err(|e| StoreError::io(path, e))?;
        Ok(backup)
    }

    fn read(path: &Path) -> Result<Vec<HistoryEntry>, StoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn truncate(&self, entries: &mut Vec<HistoryEntry>) {
        if entries.len() > self.limit {
            let excess = entries.len() - self.limit;
            entries.drain(..excess);
        }
    }

    fn persist(&self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        atomic_write(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Add one entry and save. Memory is left untouched when the save fails.
    pub fn append(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut entries = self.lock();
        let mut next = entries.clone();
        next.push(entry);
        self.truncate(&mut next);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.lock();
        self.persist(&[])?;
        entries.clear();
        log::info!("[history] Cleared");
        Ok(())
    }

    /// Human-readable report of every entry.
    pub fn render_text(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let separator = "-".repeat(RULE_WIDTH);
        let mut out = String::new();
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "COMMAND HISTORY - HELP COMMANDS");
        let _ = writeln!(out, "{}\n", rule);

        for entry in self.lock().iter() {
            let _ = writeln!(out, "Date/Time: {}", entry.timestamp);
            let _ = writeln!(out, "Command: [{}] {}", entry.command_key, entry.command_name);
            let _ = writeln!(out, "Executed: {}", entry.command_text);
            let _ = writeln!(out, "Status: {}", if entry.success { "Success" } else { "Failure" });
            if entry.elevation != ElevationPath::None {
                let _ = writeln!(out, "Privileges: {}", entry.elevation.label());
            }
            if entry.is_free_command {
                let _ = writeln!(out, "Type: Free command");
            }
            let _ = writeln!(out, "{}\n", separator);
        }
        out
    }

    pub fn export_text(&self, target: &Path) -> Result<(), StoreError> {
        atomic_write(target, &self.render_text())?;
        log::info!("[history] Exported to {:?}", target);
        Ok(())
    }
}

impl AuditSink for HistoryStore {
    fn record(&self, record: &AuditRecord) {
        if let Err(e) = self.append(HistoryEntry::from(record)) {
            log::error!("[history] Failed to record '{}': {}", record.name, e);
        }
    }
}
