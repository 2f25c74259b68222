// Offline mix of every track into one WAV, each at its current volume and
// speed, played once from the start. The result is as long as the longest
// track and is not normalised; the sum is only clamped when written.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::audio::{SampleBuffer, StereoFrame, Voice};
use crate::error::{LooperError, Result};
use crate::loader::sample_loader;

const RENDER_BLOCK_FRAMES: usize = 4096;

#[derive(Clone, Debug, PartialEq)]
pub struct MixInput {
    pub source: PathBuf,
    pub gain: f32,
    pub speed: f32,
}

#[derive(Debug)]
pub enum MixState {
    Decoding { done: usize, total: usize },
    Rendering(f32), // 0.0..=1.0
    Complete(PathBuf),
    Failed(LooperError),
}

pub struct MixLayer {
    buffer: SampleBuffer,
    voice: Voice,
}

impl MixLayer {
    pub fn new(buffer: SampleBuffer, gain: f32, speed: f32) -> Self {
        // a stopped speed would never reach the end
        let speed = if speed > 0.0 { speed } else { 1.0 };
        Self {
            buffer,
            voice: Voice {
                speed,
                gain_left: gain,
                gain_right: gain,
                playing: true,
                ..Voice::default()
            },
        }
    }

    // output frames until this layer runs out
    pub fn rendered_len(&self) -> usize {
        (self.buffer.len() as f64 / self.voice.speed as f64).ceil() as usize
    }
}

/// Renders the layers block by block, handing each block and the fraction
/// done so far to `sink`.
pub fn render_blocks<F>(layers: &mut [MixLayer], mut sink: F) -> Result<()>
where
    F: FnMut(&[StereoFrame], f32) -> Result<()>,
{
    let total = layers.iter().map(MixLayer::rendered_len).max().unwrap_or(0);
    let mut block = vec![StereoFrame::zero(); RENDER_BLOCK_FRAMES];
    let mut rendered = 0;

    while rendered < total {
        let n = (total - rendered).min(RENDER_BLOCK_FRAMES);
        let out = &mut block[..n];
        out.fill(StereoFrame::zero());
        for layer in layers.iter_mut() {
            layer.voice.render_into(&layer.buffer, out);
        }
        rendered += n;
        sink(out, rendered as f32 / total as f32)?;
    }
    Ok(())
}

/// Decodes every input, renders the mix and writes it to `destination`.
/// The file is written next to the destination first and renamed at the
/// end, so a failed mix never leaves a half-written file under the final name.
pub fn mix_to_file(inputs: &[MixInput], sample_rate: u32, destination: &Path, tx: &Sender<MixState>) -> Result<PathBuf> {
    if inputs.is_empty() {
        return Err(LooperError::mix(destination, "no tracks to mix"));
    }

    let mut layers = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let buffer = sample_loader::decode(&input.source, sample_rate)?;
        layers.push(MixLayer::new(buffer, input.gain, input.speed));
        let _ = tx.send(MixState::Decoding { done: i + 1, total: inputs.len() });
    }

    if let Some(dir) = destination.parent() {
        std::fs::create_dir_all(dir).map_err(|e| LooperError::DirectoryCreate {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = destination.with_extension("tmp.wav");
    let result = write_mix(&mut layers, sample_rate, &temp_path, tx)
        .and_then(|()| std::fs::rename(&temp_path, destination).map_err(|e| LooperError::mix(destination, e)));
    if let Err(e) = result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    log::info!("mixed {} tracks into {}", inputs.len(), destination.display());
    Ok(destination.to_path_buf())
}

fn write_mix(layers: &mut [MixLayer], sample_rate: u32, path: &Path, tx: &Sender<MixState>) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer: hound::WavWriter<BufWriter<File>> =
        hound::WavWriter::create(path, spec).map_err(|e| LooperError::mix(path, e))?;

    // one update per percent is plenty for a status line
    let mut last_percent = None;
    render_blocks(layers, |block, done| {
        for f in block {
            for s in [f.left, f.right] {
                let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer.write_sample(v).map_err(|e| LooperError::mix(path, e))?;
            }
        }
        let percent = (done * 100.0) as u32;
        if last_percent != Some(percent) {
            last_percent = Some(percent);
            let _ = tx.send(MixState::Rendering(done));
        }
        Ok(())
    })?;

    writer.finalize().map_err(|e| LooperError::mix(path, e))
}

// runs the whole mix on its own thread; the last state sent is always
// Complete or Failed
pub fn spawn_mix(inputs: Vec<MixInput>, sample_rate: u32, destination: PathBuf) -> Receiver<MixState> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        let last = match mix_to_file(&inputs, sample_rate, &destination, &tx) {
            Ok(path) => MixState::Complete(path),
            Err(e) => MixState::Failed(e),
        };
        let _ = tx.send(last);
    });
    rx
}
