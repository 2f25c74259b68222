// called on startup and quit; only the track sources survive a restart,
// volume/speed/selection do not
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LooperError, Result};

const STATE_FILE: &str = "state.json";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    #[serde(rename = "uris", default)]
    pub sources: Vec<String>,
}

impl SavedState {
    pub fn from_sources(sources: &[PathBuf]) -> Self {
        Self {
            sources: sources.iter().map(|p| p.to_string_lossy().into_owned()).collect(),
        }
    }

    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.sources.iter().map(PathBuf::from).collect()
    }
}

// <data_dir>/state.json
fn state_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(STATE_FILE)
}

// missing file = first run
pub fn load_state(data_dir: &Path) -> Result<SavedState> {
    let path = state_file_path(data_dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SavedState::default()),
        Err(e) => return Err(LooperError::State(format!("{}: {e}", path.display()))),
    };
    serde_json::from_str(&data).map_err(|e| LooperError::State(format!("{}: {e}", path.display())))
}

// makes the data dir if it isn't there yet
pub fn save_state(data_dir: &Path, state: &SavedState) -> Result<()> {
    let path = state_file_path(data_dir);
    std::fs::create_dir_all(data_dir).map_err(|e| LooperError::DirectoryCreate {
        path: data_dir.to_path_buf(),
        source: e,
    })?;
    let json = serde_json::to_string_pretty(state).map_err(|e| LooperError::State(e.to_string()))?;
    std::fs::write(&path, json).map_err(|e| LooperError::State(format!("{}: {e}", path.display())))?;
    Ok(())
}
