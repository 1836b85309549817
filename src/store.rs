use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::view_state::ExpandState;

/// Expand state of every tracked record, as stored in view_state.yaml
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct ViewStateFile {
    /// Maps a record key (e.g. an order reference) to its expand flags
    #[serde(default)]
    pub records: BTreeMap<String, ExpandState>,
}

impl ViewStateFile {
    /// Expand flags for `record`; empty if the record was never seen.
    pub fn record(&self, record: &str) -> ExpandState {
        self.records.get(record).cloned().unwrap_or_default()
    }
}

/// File-backed store for expand state
pub struct ViewStateStore {
    base_path: PathBuf,
}

impl ViewStateStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        ViewStateStore {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn state_path(&self) -> PathBuf {
        self.base_path.join("view_state.yaml")
    }

    /// Read the stored state. Returns the default state if none exists.
    pub fn read(&self) -> Result<ViewStateFile> {
        let state_path = self.state_path();
        if state_path.exists() {
            let content = fs::read_to_string(&state_path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(ViewStateFile::default())
        }
    }

    /// Write the state through a temp file and rename.
    pub fn write(&self, state: &ViewStateFile) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        let state_path = self.state_path();
        let temp_path = self.base_path.join(".view_state.yaml.tmp");

        let yaml = serde_yaml::to_string(state)?;
        fs::write(&temp_path, yaml)?;
        fs::rename(&temp_path, &state_path)?;

        Ok(())
    }

    /// Read-modify-write.
    pub fn update<F, T>(&self, update_fn: F) -> Result<T>
    where
        F: FnOnce(&mut ViewStateFile) -> T,
    {
        let mut state = self.read()?;
        let out = update_fn(&mut state);
        self.write(&state)?;
        Ok(out)
    }
}
