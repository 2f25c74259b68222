// The three things the app can't run without. Any one missing and we quit.
use std::fmt;
use std::path::Path;

use crate::error::{LooperError, Result};

const WRITE_PROBE: &str = ".looper-write-check";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    RecordAudio,
    WriteExternalStorage,
    ReadExternalStorage,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Permission::RecordAudio => "microphone",
            Permission::WriteExternalStorage => "write to export folder",
            Permission::ReadExternalStorage => "read from music folder",
        })
    }
}

pub struct PermissionProbe<'a> {
    pub mic_available: bool,
    pub export_root: &'a Path,
    pub import_dir: Option<&'a Path>,
}

impl PermissionProbe<'_> {
    pub fn denied(&self) -> Vec<Permission> {
        let mut denied = Vec::new();
        if !self.mic_available {
            denied.push(Permission::RecordAudio);
        }
        if !can_write(self.export_root) {
            denied.push(Permission::WriteExternalStorage);
        }
        if let Some(dir) = self.import_dir {
            // nothing to read yet is fine
            if dir.exists() && std::fs::read_dir(dir).is_err() {
                denied.push(Permission::ReadExternalStorage);
            }
        }
        denied
    }

    pub fn require_all(&self) -> Result<()> {
        let denied = self.denied();
        if denied.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = denied.iter().map(ToString::to_string).collect();
        Err(LooperError::PermissionDenied(names.join(", ")))
    }
}

fn can_write(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(WRITE_PROBE);
    let ok = std::fs::write(&probe, b"").is_ok();
    let _ = std::fs::remove_file(&probe);
    ok
}
