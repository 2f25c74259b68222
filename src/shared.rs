// Types the TUI and the controller share. The TUI only ever turns keys into
// `InputEvent`s and draws whatever `DisplayState` it is handed; the state
// itself lives in `Middle`.
//
// Keys:
//   Up / k, Down / j   move the row cursor
//   p / Enter          play the row (the first play turns looping on)
//   o                  pause the row
//   x                  delete the row
//   [ / ]              row volume down / up
//   - / =              row speed down / up
//   r / t              start / stop recording
//   i                  import an audio file
//   s                  save the row under a name (prompt)
//   m                  mix every track into one wav (prompt)
//   e                  play a random effect
//   q / Esc            quit

use std::path::PathBuf;

pub const VOLUME_STEP: i32 = 5;
pub const SPEED_STEP: i32 = 1;

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // row transport, by row index
    Play(usize),
    Pause(usize),
    Delete(usize),

    // row sliders, by row index and slider steps
    VolumeStep(usize, i32),
    SpeedStep(usize, i32),

    StartRecording,
    StopRecording,

    // asks the host for a file; the host answers with Import
    PickImport,
    Import(PathBuf),

    // the row is whichever one the cursor was on when saving started
    Export { row: usize, name: String },
    MixDown { name: String },

    TriggerEffect,
    Quit,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayState {
    pub rows: Vec<RowView>,
    pub recording: Option<String>, // file name of the clip being recorded
    pub status: String,
    pub effects_loaded: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RowView {
    pub label: String,
    pub source: String,
    pub playing: bool,
    pub volume: u8,
    pub speed: u8,
    pub speed_label: String,
}
