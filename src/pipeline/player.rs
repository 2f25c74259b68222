use std::path::Path;

use crate::audio_api::{AudioCommand, HandleId};
use crate::error::Result;

/// The media service a player handle talks to. The real one decodes through
/// the loader and forwards commands to the audio thread.
pub trait PlayerBackend {
    fn bind(&mut self, source: &Path) -> Result<HandleId>;

    fn bind_effect(&mut self, source: &Path) -> Result<HandleId>;

    fn send(&mut self, cmd: AudioCommand);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Paused,
    Playing,
    Released, // terminal
}

#[derive(Debug)]
pub struct PlayerHandle {
    id: HandleId,
    state: PlayerState,
    looping: bool,
}

impl PlayerHandle {
    // always ends paused
    pub fn bind<B: PlayerBackend + ?Sized>(backend: &mut B, source: &Path) -> Result<Self> {
        let id = backend.bind(source)?;
        backend.send(AudioCommand::Pause(id));
        Ok(Self {
            id,
            state: PlayerState::Paused,
            looping: false,
        })
    }

    #[cfg(test)]
    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    #[cfg(test)]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    #[cfg(test)]
    pub fn is_released(&self) -> bool {
        self.state == PlayerState::Released
    }

    // the first play always turns looping on
    pub fn play<B: PlayerBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.dead("play") {
            return;
        }
        if !self.looping {
            self.looping = true;
            backend.send(AudioCommand::SetLooping { id: self.id, looping: true });
        }
        backend.send(AudioCommand::Play(self.id));
        self.state = PlayerState::Playing;
    }

    pub fn pause<B: PlayerBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.dead("pause") || self.state == PlayerState::Paused {
            return;
        }
        backend.send(AudioCommand::Pause(self.id));
        self.state = PlayerState::Paused;
    }

    pub fn set_volume<B: PlayerBackend + ?Sized>(&mut self, backend: &mut B, left: f32, right: f32) {
        if self.dead("set volume on") {
            return;
        }
        backend.send(AudioCommand::SetVolume { id: self.id, left, right });
    }

    pub fn set_speed<B: PlayerBackend + ?Sized>(&mut self, backend: &mut B, speed: f32) {
        if self.dead("set speed on") {
            return;
        }
        backend.send(AudioCommand::SetSpeed { id: self.id, speed });
    }

    // idempotent; only the first call reaches the engine
    pub fn release<B: PlayerBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.state == PlayerState::Released {
            return;
        }
        backend.send(AudioCommand::Release(self.id));
        self.state = PlayerState::Released;
    }

    fn dead(&self, what: &str) -> bool {
        if self.state == PlayerState::Released {
            log::warn!("tried to {what} released player {:?}", self.id);
            return true;
        }
        false
    }
}
