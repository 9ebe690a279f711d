use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with app name, endpoint and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, endpoint: &str) {
  let host = extract_host(endpoint);

  let header = Line::from(vec![
    Span::styled(" todosync ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", host), Style::default().fg(Color::White)),
    Span::raw("  "),
    // Shortcuts - keys highlighted, descriptions dimmed
    Span::styled("<j/k>", Style::default().fg(Color::Cyan)),
    Span::styled(" scroll", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<q>", Style::default().fg(Color::Cyan)),
    Span::styled(" quit", Style::default().fg(Color::DarkGray)),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

/// Extract host from the GraphQL endpoint URL
fn extract_host(endpoint: &str) -> String {
  url::Url::parse(endpoint)
    .ok()
    .and_then(|u| u.host_str().map(String::from))
    .unwrap_or_else(|| endpoint.to_string())
}
