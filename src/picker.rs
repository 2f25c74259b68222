use std::path::{Path, PathBuf};

use crate::loader::sample_loader::AUDIO_EXTENSIONS;

// Native open dialog for a single audio file, starting in the music folder.
// Whatever comes back is only checked when a player binds to it.
pub fn pick_audio_file(initial_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Import audio")
        .add_filter("audio", AUDIO_EXTENSIONS);
    if let Some(dir) = initial_dir.filter(|d| d.is_dir()) {
        dialog = dialog.set_directory(dir);
    }
    let picked = dialog.pick_file();
    match &picked {
        Some(p) => log::info!("picked {}", p.display()),
        None => log::debug!("import cancelled"),
    }
    picked
}
