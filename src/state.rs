//! Reminder state: a small task counter persisted across invocations.
//!
//! Best-effort throughout: a missing or corrupt state file starts the
//! counter over, and save failures are ignored. Reminders must never block
//! the gate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ReminderConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub task_count: u64,
}

impl State {
    /// Load from the default location, falling back to a fresh state.
    pub fn load() -> Self {
        match state_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|data| serde_json::from_str(&data).ok())
            .unwrap_or_default()
    }

    /// Persist to the default location, ignoring failures.
    pub fn save(&self) {
        if let Some(path) = state_path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(data) = serde_json::to_string(self) {
            let _ = std::fs::write(path, data);
        }
    }

    pub fn increment(&mut self) {
        self.task_count += 1;
    }

    /// Messages of reminders whose interval divides the current count.
    pub fn due_reminders(&self, reminders: &[ReminderConfig]) -> Vec<String> {
        reminders
            .iter()
            .filter(|r| r.every > 0 && self.task_count % r.every == 0)
            .map(|r| r.message.clone())
            .collect()
    }
}

fn state_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(Path::new(&home).join(".local/share/watchman/state.json"))
}
