pub use crate::audio::{HandleId, SampleBuffer};

// Everything the UI thread may ask of the audio thread. The engine can't
// touch the filesystem, so buffers are decoded first (see loader) and handed
// over already registered under an id.
#[derive(Clone, Debug)]
pub enum AudioCommand {
    // track players: registered paused at position 0
    RegisterSample { id: HandleId, buffer: SampleBuffer },
    Play(HandleId),
    Pause(HandleId),
    SetLooping { id: HandleId, looping: bool },
    SetVolume { id: HandleId, left: f32, right: f32 },
    SetSpeed { id: HandleId, speed: f32 },
    Release(HandleId),

    // effect bank: fire-and-forget, overlapping triggers layer
    RegisterEffect { id: HandleId, buffer: SampleBuffer },
    TriggerEffect(HandleId),
}

impl AudioCommand {
    pub fn target(&self) -> HandleId {
        match self {
            AudioCommand::RegisterSample { id, .. }
            | AudioCommand::SetLooping { id, .. }
            | AudioCommand::SetVolume { id, .. }
            | AudioCommand::SetSpeed { id, .. }
            | AudioCommand::RegisterEffect { id, .. } => *id,
            AudioCommand::Play(id)
            | AudioCommand::Pause(id)
            | AudioCommand::Release(id)
            | AudioCommand::TriggerEffect(id) => *id,
        }
    }
}
