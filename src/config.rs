use std::path::{Path, PathBuf};

use clap::Parser;
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};

use crate::pipeline::export::ExportTarget;

const SETTINGS_FILE: &str = "settings.json";
const FALLBACK_DATA_DIR: &str = ".looper";

#[derive(Parser, Debug, Default)]
#[command(name = "looper", version, about = "Terminal soundboard and looper")]
pub struct Cli {
    /// App-private storage: recordings, saved tracks, log
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Public root exports are saved under (default: your Downloads folder)
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Folder of short sounds for the effect bank
    #[arg(long, value_name = "DIR")]
    pub effects_dir: Option<PathBuf>,

    /// error, warn, info, debug or trace (RUST_LOG wins if set)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// an import releases every track and leaves only the imported one
    #[default]
    Replace,
    Append,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub export_folder: String,
    pub export_extension: String,
    pub recording_extension: String,
    pub import_mode: ImportMode,
    pub export_root: Option<PathBuf>,
    pub effects_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_folder: "Looper".to_string(),
            export_extension: "mp3".to_string(),
            recording_extension: "mp3".to_string(),
            import_mode: ImportMode::Replace,
            export_root: None,
            effects_dir: None,
        }
    }
}

/// `<data_dir>/settings.json`. Missing is fine; unreadable is reported so
/// the caller can log it once logging is up.
pub fn load_settings(data_dir: &Path) -> Result<Settings, String> {
    let path = data_dir.join(SETTINGS_FILE);
    match std::fs::read_to_string(&path) {
        Ok(data) => serde_json::from_str(&data).map_err(|e| format!("{}: {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(format!("{}: {e}", path.display())),
    }
}

/// Platform locations before any overrides.
#[derive(Clone, Debug)]
pub struct DefaultDirs {
    pub data_dir: PathBuf,
    pub download_dir: Option<PathBuf>,
    pub music_dir: Option<PathBuf>,
}

impl DefaultDirs {
    pub fn detect() -> Self {
        let data_dir = ProjectDirs::from("", "", "looper")
            .map(|p| p.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join(FALLBACK_DATA_DIR));
        let user = UserDirs::new();
        Self {
            data_dir,
            download_dir: user.as_ref().and_then(|u| u.download_dir().map(Path::to_path_buf)),
            music_dir: user.as_ref().and_then(|u| u.audio_dir().map(Path::to_path_buf)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub effects_dir: PathBuf,
    pub music_dir: Option<PathBuf>,
    pub export: ExportTarget,
    pub recording_extension: String,
    pub import_mode: ImportMode,
    pub log_level: String,
    pub settings_error: Option<String>,
}

impl AppConfig {
    pub fn load(cli: Cli) -> Self {
        Self::resolve(cli, DefaultDirs::detect())
    }

    // flags beat settings.json, which beats platform defaults
    pub fn resolve(cli: Cli, dirs: DefaultDirs) -> Self {
        let data_dir = cli.data_dir.unwrap_or(dirs.data_dir);
        let (settings, settings_error) = match load_settings(&data_dir) {
            Ok(s) => (s, None),
            Err(e) => (Settings::default(), Some(e)),
        };

        let export_root = cli
            .export_dir
            .or(settings.export_root)
            .or(dirs.download_dir)
            .unwrap_or_else(|| data_dir.join("Downloads"));
        let effects_dir = cli
            .effects_dir
            .or(settings.effects_dir)
            .unwrap_or_else(|| data_dir.join("effects"));

        Self {
            effects_dir,
            music_dir: dirs.music_dir,
            export: ExportTarget {
                root: export_root,
                folder: settings.export_folder,
                extension: settings.export_extension,
            },
            recording_extension: settings.recording_extension,
            import_mode: settings.import_mode,
            log_level: cli.log_level.unwrap_or_else(|| "info".to_string()),
            settings_error,
            data_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs(root: &Path) -> DefaultDirs {
        DefaultDirs {
            data_dir: root.join("data"),
            download_dir: Some(root.join("Downloads")),
            music_dir: Some(root.join("Music")),
        }
    }

    #[test]
    fn defaults_without_settings_file() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = AppConfig::resolve(Cli::default(), dirs(tmp.path()));

        assert_eq!(cfg.data_dir, tmp.path().join("data"));
        assert_eq!(cfg.effects_dir, tmp.path().join("data").join("effects"));
        assert_eq!(cfg.export.file_for("take"), tmp.path().join("Downloads").join("Looper").join("take.mp3"));
        assert_eq!(cfg.import_mode, ImportMode::Replace);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.settings_error.is_none());
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(
            data.join(SETTINGS_FILE),
            r#"{ "export_folder": "Loops", "export_extension": "wav", "import_mode": "append" }"#,
        )
        .unwrap();

        let cfg = AppConfig::resolve(Cli::default(), dirs(tmp.path()));

        assert_eq!(cfg.export.folder, "Loops");
        assert_eq!(cfg.export.extension, "wav");
        assert_eq!(cfg.recording_extension, "mp3");
        assert_eq!(cfg.import_mode, ImportMode::Append);
    }

    #[test]
    fn flags_beat_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join(SETTINGS_FILE), r#"{ "export_root": "/from/settings" }"#).unwrap();

        let cli = Cli::parse_from(["looper", "--export-dir", "/from/flag", "--log-level", "debug"]);
        let cfg = AppConfig::resolve(cli, dirs(tmp.path()));

        assert_eq!(cfg.export.root, PathBuf::from("/from/flag"));
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn corrupt_settings_fall_back_and_report() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join(SETTINGS_FILE), "nope").unwrap();

        let cfg = AppConfig::resolve(Cli::default(), dirs(tmp.path()));

        assert!(cfg.settings_error.is_some());
        assert_eq!(cfg.export.folder, "Looper");
    }
}
