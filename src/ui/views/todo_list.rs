use crate::cache::CachedEntry;
use crate::todo::Todo;
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub fn draw_todo_list(
  frame: &mut Frame,
  area: Rect,
  entries: &[CachedEntry<Todo>],
  state: &mut ListState,
) {
  ensure_valid_selection(state, entries.len());

  let block = Block::default()
    .title(format!(" Todos ({}) ", entries.len()))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if entries.is_empty() {
    let paragraph = Paragraph::new("No todos yet. Press 'c' to create one.")
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = entries
    .iter()
    .map(|entry| {
      let todo = &entry.entity;
      let mut spans = vec![
        Span::raw(truncate(&todo.name, 40)),
        Span::raw("  "),
        Span::styled(
          truncate(&todo.description, 60),
          Style::default().fg(Color::DarkGray),
        ),
      ];

      let line = if entry.is_provisional() {
        spans.push(Span::styled(
          "  saving…",
          Style::default().fg(Color::Yellow).italic(),
        ));
        Line::from(spans).style(Style::default().add_modifier(Modifier::DIM))
      } else {
        Line::from(spans)
      };
      ListItem::new(line)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  frame.render_stateful_widget(list, area, state);
}

/// Keep the selection inside the list after it shrinks or grows
fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_selection_clamped_to_list() {
    let mut state = ListState::default();

    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));

    state.select(Some(7));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}
