use std::sync::Arc;

use crate::audio_api::{AudioCommand, HandleId};

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::voice::Voice;

const MAX_EFFECT_VOICES: usize = 10; // same polyphony the effect mixer had on the phone
const EFFECT_GAIN: f32 = 1.0;

struct Player {
    id: HandleId,
    buffer: SampleBuffer,
    voice: Voice,
}

struct EffectVoice {
    buffer: Arc<SampleBuffer>,
    voice: Voice,
}

// audio thread only
pub struct Engine {
    players: Vec<Player>,
    effects: Vec<(HandleId, Arc<SampleBuffer>)>,
    effect_voices: [Option<EffectVoice>; MAX_EFFECT_VOICES], // fixed pool
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            effects: Vec::new(),
            effect_voices: std::array::from_fn(|_| None),
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                self.players.push(Player { id, buffer, voice: Voice::default() });
            }
            AudioCommand::Play(id) => {
                if let Some(p) = self.player_mut(id) {
                    p.voice.playing = true;
                }
            }
            AudioCommand::Pause(id) => {
                if let Some(p) = self.player_mut(id) {
                    p.voice.playing = false;
                }
            }
            AudioCommand::SetLooping { id, looping } => {
                if let Some(p) = self.player_mut(id) {
                    p.voice.looping = looping;
                }
            }
            AudioCommand::SetVolume { id, left, right } => {
                if let Some(p) = self.player_mut(id) {
                    p.voice.gain_left = left;
                    p.voice.gain_right = right;
                }
            }
            AudioCommand::SetSpeed { id, speed } => {
                if let Some(p) = self.player_mut(id) {
                    p.voice.speed = speed.max(0.0);
                }
            }
            AudioCommand::Release(id) => self.players.retain(|p| p.id != id),
            AudioCommand::RegisterEffect { id, buffer } => {
                self.effects.push((id, Arc::new(buffer)));
            }
            AudioCommand::TriggerEffect(id) => self.trigger_effect(id),
        }
    }

    fn player_mut(&mut self, id: HandleId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    fn trigger_effect(&mut self, id: HandleId) {
        let Some((_, buffer)) = self.effects.iter().find(|(eid, _)| *eid == id) else {
            return;
        };
        // a free slot if there is one, otherwise steal the first
        let slot = self
            .effect_voices
            .iter()
            .position(|v| v.as_ref().is_none_or(|ev| !ev.voice.playing))
            .unwrap_or(0);
        self.effect_voices[slot] = Some(EffectVoice {
            buffer: Arc::clone(buffer),
            voice: Voice::one_shot(EFFECT_GAIN),
        });
    }

    #[cfg(test)]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[cfg(test)]
    pub fn is_playing(&self, id: HandleId) -> bool {
        self.players.iter().any(|p| p.id == id && p.voice.playing)
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        for f in out.iter_mut() {
            *f = StereoFrame::zero();
        }
        for p in &mut self.players {
            p.voice.render_into(&p.buffer, out);
        }
        for slot in &mut self.effect_voices {
            if let Some(ev) = slot {
                ev.voice.render_into(&ev.buffer, out);
                if !ev.voice.playing {
                    *slot = None;
                }
            }
        }
        for f in out.iter_mut() {
            f.left = f.left.clamp(-1.0, 1.0);
            f.right = f.right.clamp(-1.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::next_handle_id;

    fn constant(value: f32, n: usize) -> SampleBuffer {
        SampleBuffer { data: vec![StereoFrame::mono(value); n] }
    }

    fn registered(engine: &mut Engine, value: f32) -> HandleId {
        let id = next_handle_id();
        engine.handle_cmd(AudioCommand::RegisterSample { id, buffer: constant(value, 16) });
        id
    }

    #[test]
    fn registered_player_is_silent_until_played() {
        let mut engine = Engine::new();
        let id = registered(&mut engine, 0.5);
        let mut out = vec![StereoFrame::zero(); 8];

        engine.render_block(&mut out);
        assert!(out.iter().all(|f| f.left == 0.0));

        engine.handle_cmd(AudioCommand::Play(id));
        engine.render_block(&mut out);
        assert!(out.iter().all(|f| f.left == 0.5));
    }

    #[test]
    fn volume_applies_per_channel() {
        let mut engine = Engine::new();
        let id = registered(&mut engine, 0.5);
        engine.handle_cmd(AudioCommand::SetVolume { id, left: 0.0, right: 1.0 });
        engine.handle_cmd(AudioCommand::Play(id));
        let mut out = vec![StereoFrame::zero(); 4];
        engine.render_block(&mut out);
        assert_eq!(out[0], StereoFrame { left: 0.0, right: 0.5 });
    }

    #[test]
    fn release_drops_the_player() {
        let mut engine = Engine::new();
        let a = registered(&mut engine, 0.25);
        let b = registered(&mut engine, 0.25);
        engine.handle_cmd(AudioCommand::Play(a));
        engine.handle_cmd(AudioCommand::Play(b));
        engine.handle_cmd(AudioCommand::Release(a));
        assert_eq!(engine.player_count(), 1);
        assert!(!engine.is_playing(a));

        let mut out = vec![StereoFrame::zero(); 4];
        engine.render_block(&mut out);
        assert_eq!(out[0].left, 0.25);
    }

    #[test]
    fn commands_for_unknown_ids_are_ignored() {
        let mut engine = Engine::new();
        let ghost = next_handle_id();
        engine.handle_cmd(AudioCommand::Play(ghost));
        engine.handle_cmd(AudioCommand::Release(ghost));
        engine.handle_cmd(AudioCommand::TriggerEffect(ghost));
        assert_eq!(engine.player_count(), 0);
    }

    #[test]
    fn overlapping_effects_layer_and_output_is_clamped() {
        let mut engine = Engine::new();
        let id = next_handle_id();
        engine.handle_cmd(AudioCommand::RegisterEffect { id, buffer: constant(0.4, 8) });
        engine.handle_cmd(AudioCommand::TriggerEffect(id));
        engine.handle_cmd(AudioCommand::TriggerEffect(id));

        let mut out = vec![StereoFrame::zero(); 4];
        engine.render_block(&mut out);
        assert!((out[0].left - 0.8).abs() < 1e-6);

        engine.handle_cmd(AudioCommand::TriggerEffect(id));
        engine.handle_cmd(AudioCommand::TriggerEffect(id));
        engine.render_block(&mut out);
        assert_eq!(out[0].left, 1.0);
    }

    #[test]
    fn finished_effects_free_their_slot() {
        let mut engine = Engine::new();
        let id = next_handle_id();
        engine.handle_cmd(AudioCommand::RegisterEffect { id, buffer: constant(0.1, 2) });
        engine.handle_cmd(AudioCommand::TriggerEffect(id));
        let mut out = vec![StereoFrame::zero(); 4];
        engine.render_block(&mut out);
        assert!(engine.effect_voices.iter().all(|v| v.is_none()));
    }
}
