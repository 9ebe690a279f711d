use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Draw the "Create Todo" and "List Todos" buttons side by side
pub fn draw_buttons(frame: &mut Frame, area: Rect, creating: bool, refreshing: bool) {
  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(area);

  let create_label = if creating {
    "Create Todo (saving...)"
  } else {
    "Create Todo"
  };
  let list_label = if refreshing {
    "List Todos (loading...)"
  } else {
    "List Todos"
  };

  draw_button(frame, chunks[0], "c", create_label);
  draw_button(frame, chunks[1], "l", list_label);
}

fn draw_button(frame: &mut Frame, area: Rect, key: &str, label: &str) {
  let line = Line::from(vec![
    Span::styled(format!("[{}] ", key), Style::default().fg(Color::Cyan)),
    Span::styled(label.to_string(), Style::default().fg(Color::White).bold()),
  ]);

  let paragraph = Paragraph::new(line).alignment(Alignment::Center).block(
    Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue)),
  );

  frame.render_widget(paragraph, area);
}
