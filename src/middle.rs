use std::path::{Path, PathBuf};

use chrono::Local;
use crossbeam_channel::{Receiver, TryRecvError};

use crate::audio::StereoFrame;
use crate::config::ImportMode;
use crate::error::{LooperError, Result};
use crate::pipeline::controls::{speed_for_progress, volume_gain};
use crate::pipeline::effect_bank::EffectBank;
use crate::pipeline::export::{export_track, ExportTarget};
use crate::pipeline::mixdown::{spawn_mix, MixInput, MixState};
use crate::pipeline::persistence::SavedState;
use crate::pipeline::player::{PlayerBackend, PlayerState};
use crate::pipeline::recorder::{recording_path, RecorderSession};
use crate::pipeline::track_store::{Track, TrackStore};
use crate::shared::{DisplayState, InputEvent, RowView};

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub recordings_dir: PathBuf,
    pub recording_extension: String,
    pub export: ExportTarget,
    pub import_mode: ImportMode,
    pub sample_rate: u32,
    pub mic_available: bool,
}

/// The screen controller: owns the tracks, the effect bank and the
/// recorder, and turns input events into player commands. Runs on the UI
/// thread only.
pub struct Middle<B: PlayerBackend> {
    backend: B,
    store: TrackStore,
    effects: EffectBank,
    recorder: Option<RecorderSession>,
    mix: Option<Receiver<MixState>>,
    config: SessionConfig,
    status: String,
}

fn track_mut(store: &mut TrackStore, row: usize) -> Result<&mut Track> {
    let len = store.len();
    store.get_mut(row).ok_or(LooperError::IndexOutOfRange { index: row, len })
}

impl<B: PlayerBackend> Middle<B> {
    pub fn new(backend: B, config: SessionConfig) -> Self {
        Self {
            backend,
            store: TrackStore::new(),
            effects: EffectBank::default(),
            recorder: None,
            mix: None,
            config,
            status: String::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    #[cfg(test)]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[cfg(test)]
    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn load_effects<P: AsRef<Path>>(&mut self, resources: &[P]) {
        self.effects = EffectBank::preload_all(resources, &mut self.backend);
    }

    pub fn restore(&mut self, saved: &SavedState) {
        let report = self.store.restore_from(saved.source_paths(), &mut self.backend);
        if report.skipped.is_empty() {
            self.set_status(format!("{} tracks restored", report.restored));
        } else {
            self.set_status(format!(
                "{} tracks restored, {} could not be opened",
                report.restored,
                report.skipped.len()
            ));
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        let result = match event {
            InputEvent::Play(row) => self.play(row),
            InputEvent::Pause(row) => self.pause(row),
            InputEvent::Delete(row) => self.delete(row),
            InputEvent::VolumeStep(row, delta) => self.step_volume(row, delta),
            InputEvent::SpeedStep(row, delta) => self.step_speed(row, delta),
            InputEvent::StartRecording => self.start_recording(),
            InputEvent::StopRecording => self.stop_recording().map(|_| ()),
            InputEvent::Import(path) => self.import(&path).map(|_| ()),
            InputEvent::Export { row, name } => self.export(row, &name).map(|_| ()),
            InputEvent::MixDown { name } => self.mix_down(&name),
            InputEvent::TriggerEffect => {
                self.effects.play_random(&mut self.backend);
                Ok(())
            }
            // handled by the host loop
            InputEvent::PickImport | InputEvent::Quit => Ok(()),
        };
        if let Err(e) = result {
            log::error!("{e}");
            self.status = e.to_string();
        }
    }

    pub fn play(&mut self, row: usize) -> Result<()> {
        track_mut(&mut self.store, row)?.player.play(&mut self.backend);
        Ok(())
    }

    pub fn pause(&mut self, row: usize) -> Result<()> {
        track_mut(&mut self.store, row)?.player.pause(&mut self.backend);
        Ok(())
    }

    pub fn delete(&mut self, row: usize) -> Result<()> {
        if row >= self.store.len() {
            return Err(LooperError::IndexOutOfRange { index: row, len: self.store.len() });
        }
        self.store.remove_at(row, &mut self.backend);
        self.set_status(format!("Track {row} deleted"));
        Ok(())
    }

    pub fn step_volume(&mut self, row: usize, delta: i32) -> Result<()> {
        let track = track_mut(&mut self.store, row)?;
        let progress = track.controls.step_volume(delta);
        let gain = volume_gain(progress);
        log::debug!("track {row} volume {progress} -> gain {gain:.3}");
        track.player.set_volume(&mut self.backend, gain, gain);
        Ok(())
    }

    pub fn step_speed(&mut self, row: usize, delta: i32) -> Result<()> {
        let track = track_mut(&mut self.store, row)?;
        let progress = track.controls.step_speed(delta);
        if let Some(setting) = speed_for_progress(progress) {
            log::debug!("track {row} speed {progress} -> {}", setting.label);
            track.player.set_speed(&mut self.backend, setting.speed);
            track.controls.speed_label = setting.label;
            track.controls.applied_speed = setting.speed;
        }
        Ok(())
    }

    pub fn start_recording(&mut self) -> Result<()> {
        if self.recorder.is_some() {
            return Err(LooperError::SessionAlreadyActive);
        }
        let destination = recording_path(&self.config.recordings_dir, &Local::now(), &self.config.recording_extension);
        if !self.config.mic_available {
            return Err(LooperError::prepare(destination, "no input device"));
        }
        let session = RecorderSession::start(&destination, self.config.sample_rate)?;
        self.recorder = Some(session);
        self.effects.play_random(&mut self.backend);
        self.set_status("recording…".to_string());
        Ok(())
    }

    // without a session the frames are dropped
    pub fn capture(&mut self, frames: &[StereoFrame]) {
        let Some(session) = self.recorder.as_mut() else {
            return;
        };
        if let Err(e) = session.write(frames) {
            // the session is unusable, abandon it
            self.recorder = None;
            log::error!("{e}");
            self.status = e.to_string();
        }
    }

    pub fn stop_recording(&mut self) -> Result<usize> {
        let session = self.recorder.take().ok_or(LooperError::NoActiveSession)?;
        let path = session.stop()?;
        let index = self.store.add(&path, &mut self.backend)?;
        self.set_status(format!("Track {index} recorded"));
        Ok(index)
    }

    pub fn import(&mut self, source: &Path) -> Result<usize> {
        let index = match self.config.import_mode {
            ImportMode::Replace => self.store.replace_all_releasing_old(source, &mut self.backend)?,
            ImportMode::Append => self.store.add(source, &mut self.backend)?,
        };
        self.set_status(format!("imported {}", display_name(source)));
        Ok(index)
    }

    // the effect plays even for an empty name
    pub fn export(&mut self, row: usize, name: &str) -> Result<Option<PathBuf>> {
        self.effects.play_random(&mut self.backend);
        let len = self.store.len();
        let source = self
            .store
            .get(row)
            .map(|t| t.source.clone())
            .ok_or(LooperError::IndexOutOfRange { index: row, len })?;
        let written = export_track(&source, name, &self.config.export)?;
        if let Some(dest) = &written {
            self.set_status(format!("saved {}", dest.display()));
        }
        Ok(written)
    }

    // renders every track at its current volume and speed on a worker
    // thread; poll_mix picks up the progress
    pub fn mix_down(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Ok(());
        }
        if self.mix.is_some() {
            return Err(LooperError::MixAlreadyRunning);
        }
        let destination = self.config.export.mix_file_for(name);
        if self.store.len() == 0 {
            return Err(LooperError::mix(destination, "no tracks to mix"));
        }
        let inputs: Vec<MixInput> = self
            .store
            .iter()
            .map(|t| MixInput {
                source: t.source.clone(),
                gain: volume_gain(t.controls.volume),
                speed: t.controls.applied_speed,
            })
            .collect();
        self.set_status(format!("mixing {} tracks…", inputs.len()));
        self.mix = Some(spawn_mix(inputs, self.config.sample_rate, destination));
        Ok(())
    }

    pub fn poll_mix(&mut self) {
        let Some(rx) = self.mix.take() else {
            return;
        };
        loop {
            match rx.try_recv() {
                Ok(MixState::Decoding { done, total }) => self.status = format!("mixing: decoded {done}/{total}"),
                Ok(MixState::Rendering(done)) => self.status = format!("mixing: {:.0}%", done * 100.0),
                Ok(MixState::Complete(path)) => {
                    self.set_status(format!("mixed into {}", path.display()));
                    return;
                }
                Ok(MixState::Failed(e)) => {
                    log::error!("{e}");
                    self.status = e.to_string();
                    return;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::error!("mix thread ended without a result");
                    self.status = "mix failed".to_string();
                    return;
                }
            }
        }
        self.mix = Some(rx);
    }

    #[cfg(test)]
    pub fn is_mixing(&self) -> bool {
        self.mix.is_some()
    }

    pub fn saved_state(&self) -> SavedState {
        SavedState::from_sources(&self.store.snapshot_sources())
    }

    pub fn shutdown(&mut self) -> SavedState {
        if self.recorder.is_some() {
            if let Err(e) = self.stop_recording() {
                log::error!("recording lost at shutdown: {e}");
            }
        }
        if self.mix.take().is_some() {
            log::warn!("quitting with a mix still running, it is abandoned");
        }
        let state = self.saved_state();
        self.store.release_all(&mut self.backend);
        log::info!("shut down with {} tracks", state.sources.len());
        state
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            rows: self
                .store
                .iter()
                .enumerate()
                .map(|(i, t)| RowView {
                    label: format!("Track {i}"),
                    source: display_name(&t.source),
                    playing: t.player.state() == PlayerState::Playing,
                    volume: t.controls.volume,
                    speed: t.controls.speed,
                    speed_label: t.controls.speed_label.clone(),
                })
                .collect(),
            recording: self.recorder.as_ref().map(|r| display_name(r.destination())),
            status: self.status.clone(),
            effects_loaded: self.effects.len(),
        }
    }

    fn set_status(&mut self, status: String) {
        log::info!("{status}");
        self.status = status;
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
