use std::path::{Path, PathBuf};

use crate::audio::{next_handle_id, HandleId, SampleBuffer};
use crate::error::{LooperError, Result};

/// Extensions the import picker offers and the effects folder is scanned for.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "flac", "m4a", "aac", "3gp"];

// Decode a file from disk, prepare it for registration with the engine
pub fn load(path: &Path, target_rate: u32) -> Result<(HandleId, SampleBuffer)> {
    Ok((next_handle_id(), decode(path, target_rate)?))
}

pub fn decode(path: &Path, target_rate: u32) -> Result<SampleBuffer> {
    let buffer = SampleBuffer::load(path, target_rate).map_err(|e| LooperError::bind(path, format!("{e:#}")))?;
    log::debug!("decoded {} ({} frames)", path.display(), buffer.len());
    Ok(buffer)
}

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| AUDIO_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(e)))
}

// sorted so the effect bank order is stable between runs
pub fn index_audio_in_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_audio_file(p))
        .collect();
    paths.sort();
    Ok(paths)
}
