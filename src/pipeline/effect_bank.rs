use std::path::Path;

use rand::Rng;

use crate::audio_api::{AudioCommand, HandleId};
use crate::pipeline::player::PlayerBackend;

// confirmation sounds, loaded once at startup
#[derive(Debug, Default)]
pub struct EffectBank {
    handles: Vec<HandleId>,
}

impl EffectBank {
    pub fn preload_all<B, P>(resources: &[P], backend: &mut B) -> Self
    where
        B: PlayerBackend + ?Sized,
        P: AsRef<Path>,
    {
        let mut handles = Vec::with_capacity(resources.len());
        for res in resources {
            let res = res.as_ref();
            match backend.bind_effect(res) {
                Ok(id) => handles.push(id),
                Err(e) => log::warn!("effect {} not loaded: {e}", res.display()),
            }
        }
        log::info!("effect bank: {} of {} loaded", handles.len(), resources.len());
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[cfg(test)]
    pub fn handles(&self) -> &[HandleId] {
        &self.handles
    }

    pub fn play_random<B: PlayerBackend + ?Sized>(&self, backend: &mut B) {
        self.play_random_with(&mut rand::thread_rng(), backend);
    }

    // uniform over [0, count), fire-and-forget
    pub fn play_random_with<R, B>(&self, rng: &mut R, backend: &mut B)
    where
        R: Rng,
        B: PlayerBackend + ?Sized,
    {
        if self.handles.is_empty() {
            return;
        }
        let pick = rng.gen_range(0..self.handles.len());
        backend.send(AudioCommand::TriggerEffect(self.handles[pick]));
    }
}
