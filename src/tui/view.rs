use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::list::draw_track_list;
use super::mode::{SaveTarget, TuiState};
use crate::shared::DisplayState;

const HELP: &str = "↑↓ select  p play  o pause  x delete  [ ] volume  - = speed  r record  t stop  i import  s save  m mix  e fx  q quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState, blink_on: bool) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // record / status bar
            Constraint::Min(6),    // track list
            Constraint::Length(1), // key help
        ])
        .split(area);

    draw_top_bar(frame, sections[0], state, blink_on);
    draw_track_list(frame, sections[1], &state.rows, ts.cursor, blink_on);
    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        sections[2],
    );

    if let Some(prompt) = &ts.prompt {
        draw_save_prompt(frame, area, prompt.target, &prompt.name);
    }
}

fn draw_top_bar(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) {
    let mut spans = Vec::new();
    match &state.recording {
        Some(name) => {
            let dot = if blink_on { "● REC " } else { "  REC " };
            spans.push(Span::styled(dot, Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)));
            spans.push(Span::raw(format!("{name}   ")));
        }
        None => spans.push(Span::styled("○ idle   ", Style::default().fg(Color::Gray))),
    }
    spans.push(Span::styled(
        format!("{} tracks  {} fx   ", state.rows.len(), state.effects_loaded),
        Style::default().fg(Color::LightMagenta),
    ));
    spans.push(Span::raw(state.status.clone()));

    let bar = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL).title(" looper "));
    frame.render_widget(bar, area);
}

fn draw_save_prompt(frame: &mut Frame, area: Rect, target: SaveTarget, name: &str) {
    let popup = centered(area, 50, 5);
    let title = match target {
        SaveTarget::Track(row) => format!("Save Track {row} as:"),
        SaveTarget::Mix => "Mix all tracks into (.wav):".to_string(),
    };
    let text = vec![
        Line::from(title),
        Line::from(Span::styled(format!("{name}_"), Style::default().fg(Color::Yellow))),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" save (Enter / Esc) ")),
        popup,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
