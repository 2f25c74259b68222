use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use super::mode::{SavePrompt, SaveTarget, TuiState};
use crate::shared::{InputEvent, SPEED_STEP, VOLUME_STEP};

// poll for input, track cursor/prompt state in TuiState, and resolve keys
// into semantic input events for the controller
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

pub fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    if ts.prompt.is_some() {
        return handle_prompt_key(code, ts);
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],

        // cursor
        KeyCode::Up | KeyCode::Char('k') => {
            ts.move_cursor(-1);
            vec![]
        }
        KeyCode::Down | KeyCode::Char('j') => {
            ts.move_cursor(1);
            vec![]
        }

        // screen-wide buttons
        KeyCode::Char('r') => vec![InputEvent::StartRecording],
        KeyCode::Char('t') => vec![InputEvent::StopRecording],
        KeyCode::Char('i') => vec![InputEvent::PickImport],
        KeyCode::Char('e') => vec![InputEvent::TriggerEffect],
        KeyCode::Char('s') => {
            let row = ts.cursor;
            open_prompt(ts, SaveTarget::Track(row))
        }
        KeyCode::Char('m') => open_prompt(ts, SaveTarget::Mix),

        // row controls, always on the cursor row
        KeyCode::Char('p') | KeyCode::Enter => row_event(ts, InputEvent::Play),
        KeyCode::Char('o') => row_event(ts, InputEvent::Pause),
        KeyCode::Char('x') => row_event(ts, InputEvent::Delete),
        KeyCode::Char('[') => row_event(ts, |row| InputEvent::VolumeStep(row, -VOLUME_STEP)),
        KeyCode::Char(']') => row_event(ts, |row| InputEvent::VolumeStep(row, VOLUME_STEP)),
        KeyCode::Char('-') => row_event(ts, |row| InputEvent::SpeedStep(row, -SPEED_STEP)),
        KeyCode::Char('=') => row_event(ts, |row| InputEvent::SpeedStep(row, SPEED_STEP)),

        _ => vec![],
    }
}

// nothing to save without a track
fn open_prompt(ts: &mut TuiState, target: SaveTarget) -> Vec<InputEvent> {
    if ts.has_rows() {
        ts.prompt = Some(SavePrompt { target, name: String::new() });
    }
    vec![]
}

fn row_event(ts: &TuiState, make: impl FnOnce(usize) -> InputEvent) -> Vec<InputEvent> {
    if !ts.has_rows() {
        return vec![];
    }
    vec![make(ts.cursor)]
}

// typing a save name: Enter confirms, Esc cancels
fn handle_prompt_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    let Some(prompt) = ts.prompt.as_mut() else {
        return vec![];
    };
    match code {
        KeyCode::Esc => {
            ts.prompt = None;
            vec![]
        }
        KeyCode::Enter => {
            let name = std::mem::take(&mut prompt.name);
            let event = match prompt.target {
                SaveTarget::Track(row) => InputEvent::Export { row, name },
                SaveTarget::Mix => InputEvent::MixDown { name },
            };
            ts.prompt = None;
            vec![event]
        }
        KeyCode::Backspace => {
            prompt.name.pop();
            vec![]
        }
        KeyCode::Char(c) if !c.is_control() && c != '/' && c != '\\' => {
            prompt.name.push(c);
            vec![]
        }
        _ => vec![],
    }
}
