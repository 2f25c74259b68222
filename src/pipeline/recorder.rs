use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::audio::StereoFrame;
use crate::error::{LooperError, Result};

type Writer = hound::WavWriter<BufWriter<File>>;

/// `<dir>/<YYYYMMDDHHMMSS>.<ext>`, with `-1`, `-2`… appended when a clip
/// from the same second is already there.
pub fn recording_path<Tz: TimeZone>(dir: &Path, now: &DateTime<Tz>, ext: &str) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    let stamp = now.format("%Y%m%d%H%M%S").to_string();
    let mut path = dir.join(format!("{stamp}.{ext}"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{stamp}-{n}.{ext}"));
        n += 1;
    }
    path
}

pub struct RecorderSession {
    destination: PathBuf,
    writer: Writer,
    frames: usize,
}

impl std::fmt::Debug for RecorderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecorderSession")
            .field("destination", &self.destination)
            .field("frames", &self.frames)
            .finish()
    }
}

impl RecorderSession {
    // 16-bit stereo PCM, whatever the extension says
    pub fn start(destination: &Path, sample_rate: u32) -> Result<Self> {
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LooperError::prepare(destination, e))?;
        }
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(destination, spec).map_err(|e| LooperError::prepare(destination, e))?;
        log::info!("recording to {}", destination.display());
        Ok(Self {
            destination: destination.to_path_buf(),
            writer,
            frames: 0,
        })
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    #[cfg(test)]
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn write(&mut self, frames: &[StereoFrame]) -> Result<()> {
        for f in frames {
            for s in [f.left, f.right] {
                let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                self.writer
                    .write_sample(v)
                    .map_err(|e| LooperError::prepare(&self.destination, e))?;
            }
        }
        self.frames += frames.len();
        Ok(())
    }

    pub fn stop(self) -> Result<PathBuf> {
        let Self { destination, writer, frames } = self;
        writer.finalize().map_err(|e| LooperError::prepare(&destination, e))?;
        log::info!("recorded {frames} frames to {}", destination.display());
        Ok(destination)
    }
}
