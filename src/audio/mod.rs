use std::path::Path;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::audio_api::AudioCommand;
use crate::error::Result;
use crate::loader::sample_loader;
use crate::pipeline::player::PlayerBackend;

mod engine;
mod frame;
mod handle_id;
mod sample_buffer;
mod voice;

pub use frame::StereoFrame;
pub use handle_id::{next_handle_id, HandleId};
pub use sample_buffer::SampleBuffer;
pub use voice::Voice;

use engine::Engine;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    input_rx: Receiver<Vec<StereoFrame>>,
    sample_rate: u32,
    _output_stream: cpal::Stream,
    input_stream: Option<cpal::Stream>, // None when no mic available
}

impl AudioHandle {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn has_input(&self) -> bool {
        self.input_stream.is_some()
    }

    // mic frames since the last call, oldest first
    pub fn drain_input(&self) -> Vec<StereoFrame> {
        self.input_rx.try_iter().flatten().collect()
    }
}

impl PlayerBackend for AudioHandle {
    fn bind(&mut self, source: &Path) -> Result<HandleId> {
        let (id, buffer) = sample_loader::load(source, self.sample_rate)?;
        self.send(AudioCommand::RegisterSample { id, buffer });
        Ok(id)
    }

    fn bind_effect(&mut self, source: &Path) -> Result<HandleId> {
        let (id, buffer) = sample_loader::load(source, self.sample_rate)?;
        self.send(AudioCommand::RegisterEffect { id, buffer });
        Ok(id)
    }

    fn send(&mut self, cmd: AudioCommand) {
        if let Err(e) = self.tx.try_send(cmd) {
            log::warn!("audio command dropped: {:?}", e.into_inner().target());
        }
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;

    let (input_tx, input_rx) = crossbeam_channel::bounded::<Vec<StereoFrame>>(2048);

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream = build_output_stream_f32(&device, &config.into(), rx, channels)?;
            output_stream.play().context("failed to play output stream")?;

            let input_stream = try_build_input_stream(&host, sample_rate, input_tx);
            log::info!(
                "audio started: {sample_rate} Hz, {channels} ch, mic {}",
                if input_stream.is_some() { "on" } else { "off" }
            );

            Ok(AudioHandle {
                tx,
                input_rx,
                sample_rate,
                _output_stream: output_stream,
                input_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported)"),
    }
}

// ── Output stream ─────────────────────────────────────────────────

// scratch is allocated once; bigger device buffers are rendered in pieces
const MAX_BLOCK_FRAMES: usize = 4096;

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let channels = channels.max(1);
    let mut engine = Engine::new();
    let mut scratch = vec![StereoFrame::zero(); MAX_BLOCK_FRAMES];

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }
            render_interleaved(&mut engine, &mut scratch, data, channels);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

fn render_interleaved(engine: &mut Engine, scratch: &mut [StereoFrame], data: &mut [f32], channels: usize) {
    let chunk_frames = scratch.len().max(1);
    for chunk in data.chunks_mut(chunk_frames * channels) {
        let block = &mut scratch[..chunk.len() / channels];
        engine.render_block(block);

        for (out, frame) in chunk.chunks_exact_mut(channels).zip(block.iter()) {
            match out {
                [mono] => *mono = 0.5 * (frame.left + frame.right),
                [l, r, rest @ ..] => {
                    *l = frame.left;
                    *r = frame.right;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }
}

// ── Input stream ──────────────────────────────────────────────────

fn try_build_input_stream(
    host: &cpal::Host,
    target_sample_rate: u32,
    tx: Sender<Vec<StereoFrame>>,
) -> Option<cpal::Stream> {
    let Some(device) = host.default_input_device() else {
        log::warn!("no default input device, recording disabled");
        return None;
    };

    let supported = device.default_input_config().ok()?;
    let mut stream_config: cpal::StreamConfig = supported.into();
    stream_config.sample_rate = target_sample_rate;

    let in_channels = stream_config.channels as usize;

    let err_fn = |err| log::error!("audio input stream error: {err}");

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                let frames: Vec<StereoFrame> = if in_channels == 1 {
                    data.iter().map(|&s| StereoFrame::mono(s)).collect()
                } else {
                    data.chunks_exact(in_channels)
                        .map(|c| StereoFrame { left: c[0], right: c[1] })
                        .collect()
                };

                let _ = tx.try_send(frames);
            },
            err_fn,
            None,
        )
        .ok()?;

    if let Err(e) = stream.play() {
        log::warn!("could not start input stream: {e}");
        return None;
    }

    Some(stream)
}
