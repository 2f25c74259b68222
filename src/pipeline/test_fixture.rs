// Test-only helpers: a backend that records what it is asked to do, and a
// WAV writer for on-disk fixtures.

use std::path::{Path, PathBuf};

use crate::audio::next_handle_id;
use crate::audio_api::{AudioCommand, HandleId};
use crate::error::{LooperError, Result};
use crate::pipeline::player::PlayerBackend;

#[derive(Default)]
pub struct FakeBackend {
    pub sent: Vec<AudioCommand>,
    pub bound: Vec<(PathBuf, HandleId)>,
    pub effects: Vec<(PathBuf, HandleId)>,
    fail: Vec<PathBuf>,
}

impl FakeBackend {
    pub fn failing(paths: &[&str]) -> Self {
        Self {
            fail: paths.iter().map(PathBuf::from).collect(),
            ..Self::default()
        }
    }

    pub fn released(&self) -> Vec<HandleId> {
        self.sent
            .iter()
            .filter_map(|c| match c {
                AudioCommand::Release(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn triggered(&self) -> Vec<HandleId> {
        self.sent
            .iter()
            .filter_map(|c| match c {
                AudioCommand::TriggerEffect(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn check(&self, source: &Path) -> Result<()> {
        if self.fail.iter().any(|p| p == source) {
            return Err(LooperError::bind(source, "unsupported format"));
        }
        Ok(())
    }
}

impl PlayerBackend for FakeBackend {
    fn bind(&mut self, source: &Path) -> Result<HandleId> {
        self.check(source)?;
        let id = next_handle_id();
        self.bound.push((source.to_path_buf(), id));
        Ok(id)
    }

    fn bind_effect(&mut self, source: &Path) -> Result<HandleId> {
        self.check(source)?;
        let id = next_handle_id();
        self.effects.push((source.to_path_buf(), id));
        Ok(id)
    }

    fn send(&mut self, cmd: AudioCommand) {
        self.sent.push(cmd);
    }
}

// interleaved float samples
pub fn write_test_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}
