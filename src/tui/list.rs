use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::pipeline::controls::{SPEED_MAX, VOLUME_MAX};
use crate::shared::RowView;

const BAR_WIDTH: usize = 20;

// one two-line item per track; full redraw every frame
pub fn draw_track_list(frame: &mut Frame, area: Rect, rows: &[RowView], cursor: usize, blink_on: bool) {
    let items: Vec<ListItem> = rows.iter().map(|row| row_item(row, blink_on)).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" tracks "))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(cursor.min(rows.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn row_item(row: &RowView, blink_on: bool) -> ListItem<'static> {
    let transport = if row.playing {
        let style = if blink_on {
            Style::default().fg(Color::LightGreen)
        } else {
            Style::default().fg(Color::Green)
        };
        Span::styled("▶ looping", style)
    } else {
        Span::styled("⏸ paused ", Style::default().fg(Color::Gray))
    };

    let title = Line::from(vec![
        Span::styled(format!("{:<9}", row.label), Style::default().fg(Color::LightMagenta)),
        transport,
        Span::raw("  "),
        Span::styled(row.source.clone(), Style::default().fg(Color::DarkGray)),
    ]);
    let sliders = Line::from(vec![
        Span::raw("   vol "),
        Span::styled(bar(row.volume, VOLUME_MAX), Style::default().fg(Color::Cyan)),
        Span::raw(format!(" {:>3}   speed ", row.volume)),
        Span::styled(bar(row.speed, SPEED_MAX), Style::default().fg(Color::Yellow)),
        Span::raw(format!(" {}x", row.speed_label)),
    ]);
    ListItem::new(vec![title, sliders])
}

fn bar(value: u8, max: u8) -> String {
    let filled = (value as usize * BAR_WIDTH).div_ceil(max.max(1) as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(0, 100).chars().filter(|c| *c == '█').count(), 0);
        assert_eq!(bar(100, 100).chars().filter(|c| *c == '█').count(), BAR_WIDTH);
        assert_eq!(bar(41, 82).chars().filter(|c| *c == '█').count(), BAR_WIDTH / 2);
        assert_eq!(bar(1, 100).chars().count(), BAR_WIDTH);
    }
}
