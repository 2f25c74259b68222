// Slider positions for one track row and the curves that turn them into
// player settings.

pub const VOLUME_MAX: u8 = 100;
pub const VOLUME_DEFAULT: u8 = 100;
pub const SPEED_MAX: u8 = 82;
pub const SPEED_DEFAULT: u8 = 41;
const SPEED_DIVISOR: f32 = 41.0;
const SPEED_INERT_BELOW: u8 = 3; // 0, 1 and 2 leave the player alone

/// Logarithmic gain for a volume slider position, identical on both channels.
///
/// Both ends are pinned: 0 is silence and the top is unity gain. The curve
/// itself would divide `ln(0)` at the top.
pub fn volume_gain(progress: u8) -> f32 {
    match progress {
        0 => 0.0,
        p if p >= VOLUME_MAX => 1.0,
        p => {
            let max = VOLUME_MAX as f32;
            1.0 - (max - p as f32).ln() / max.ln()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedSetting {
    pub label: String,
    pub speed: f32,
}

/// Playback speed for a speed slider position, or `None` when the position
/// is one of the inert ones at the bottom of the slider.
///
/// The speed is `progress / 41` shown to two decimals. "2.44" is shown as
/// "2.50", and the applied speed is always the shown value, so that one
/// position plays at 2.5x.
pub fn speed_for_progress(progress: u8) -> Option<SpeedSetting> {
    if progress < SPEED_INERT_BELOW {
        return None;
    }
    let mut label = format!("{:.2}", progress as f32 / SPEED_DIVISOR);
    if label == "2.44" {
        label = "2.50".to_string();
    }
    let speed = label.parse().ok()?;
    Some(SpeedSetting { label, speed })
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackControls {
    pub volume: u8,
    pub speed: u8,
    pub speed_label: String,
    pub applied_speed: f32, // last speed sent to the player; inert positions keep it
}

impl Default for TrackControls {
    fn default() -> Self {
        Self {
            volume: VOLUME_DEFAULT,
            speed: SPEED_DEFAULT,
            speed_label: "1.00".to_string(),
            applied_speed: 1.0,
        }
    }
}

impl TrackControls {
    pub fn step_volume(&mut self, delta: i32) -> u8 {
        self.volume = (self.volume as i32 + delta).clamp(0, VOLUME_MAX as i32) as u8;
        self.volume
    }

    pub fn step_speed(&mut self, delta: i32) -> u8 {
        self.speed = (self.speed as i32 + delta).clamp(0, SPEED_MAX as i32) as u8;
        self.speed
    }
}
