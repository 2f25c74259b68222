use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{LooperError, Result};

// <root>/<folder>/<name>.<extension>
#[derive(Clone, Debug)]
pub struct ExportTarget {
    pub root: PathBuf,
    pub folder: String,
    pub extension: String,
}

impl ExportTarget {
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.folder)
    }

    pub fn file_for(&self, display_name: &str) -> PathBuf {
        self.dir().join(format!("{display_name}.{}", self.extension))
    }

    // mixes are rendered here, so they are always WAV
    pub fn mix_file_for(&self, display_name: &str) -> PathBuf {
        self.dir().join(format!("{display_name}.wav"))
    }
}

// An empty name is a no-op. A folder that can't be created is only logged;
// a copy that fails part way leaves a partial file behind.
pub fn export_track(source: &Path, display_name: &str, target: &ExportTarget) -> Result<Option<PathBuf>> {
    if display_name.is_empty() {
        return Ok(None);
    }

    let dir = target.dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        let err = LooperError::DirectoryCreate { path: dir, source: e };
        log::error!("{err}");
    }

    let destination = target.file_for(display_name);
    // opening the destination would truncate the source first
    if is_same_file(source, &destination) {
        log::info!("{} is already exported", destination.display());
        return Ok(Some(destination));
    }
    copy_bytes(source, &destination).map_err(|e| LooperError::Copy {
        destination: destination.clone(),
        source: e,
    })?;
    log::info!("exported {} to {}", source.display(), destination.display());
    Ok(Some(destination))
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn copy_bytes(source: &Path, destination: &Path) -> std::io::Result<u64> {
    let mut reader = BufReader::new(File::open(source)?);
    let mut writer = BufWriter::new(File::create(destination)?);
    let n = std::io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(n)
}
