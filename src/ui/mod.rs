mod components;
mod renderfns;
mod views;

use crate::app::App;
use crate::todo::RemoteDataService;
use ratatui::prelude::*;

/// Main draw function
pub fn draw<R: RemoteDataService>(frame: &mut Frame, app: &mut App<R>) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Length(3), // Buttons
      Constraint::Min(1),    // Todo list
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  renderfns::draw_header(frame, chunks[0], app.endpoint());
  components::draw_buttons(frame, chunks[1], app.is_creating(), app.is_refreshing());

  let entries = app.entries().to_vec();
  views::draw_todo_list(frame, chunks[2], &entries, app.list_state_mut());

  components::draw_status_bar(frame, chunks[3], app.status(), app.fetched_at());
}
