use chrono::{DateTime, Utc};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Status;
use crate::ui::renderfns::format_age;

/// Draw the status bar with the last action result and data age
pub fn draw_status_bar(
  frame: &mut Frame,
  area: Rect,
  status: &Status,
  fetched_at: Option<DateTime<Utc>>,
) {
  let (message, style) = match status {
    Status::Idle => (String::new(), Style::default().fg(Color::DarkGray)),
    Status::Info(msg) => (msg.clone(), Style::default().fg(Color::Green)),
    Status::Error(msg) => (msg.clone(), Style::default().fg(Color::Red)),
  };

  let age = match fetched_at {
    Some(at) => format!("synced {}", format_age(at, Utc::now())),
    None => "not synced".to_string(),
  };

  let line = Line::from(vec![
    Span::styled(format!(" {}", message), style),
    Span::raw("  "),
    Span::styled(age, Style::default().fg(Color::DarkGray)),
  ]);

  frame.render_widget(Paragraph::new(line), area);
}
