use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::Context;

const LOG_FILE: &str = "looper.log";

// stderr belongs to the terminal UI, so everything goes to a file in the data dir
pub fn init(data_dir: &Path, default_level: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(data_dir).with_context(|| format!("create {}", data_dir.display()))?;
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("logger already initialised")?;
    Ok(path)
}
