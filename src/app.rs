use crate::cache::CachedEntry;
use crate::event::{Event, EventHandler, SyncEvent};
use crate::todo::{CachedTodoClient, CreateTodoInput, RemoteDataService, Todo};
use crate::ui;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Message shown in the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
  Idle,
  Info(String),
  Error(String),
}

/// Main application state
pub struct App<R: RemoteDataService> {
  /// Cached todo client
  todos: CachedTodoClient<R>,

  /// Payload sent by the "Create Todo" action
  sample: CreateTodoInput,

  /// Endpoint shown in the header
  endpoint: String,

  /// Last cache snapshot, taken on every tick
  entries: Vec<CachedEntry<Todo>>,
  fetched_at: Option<DateTime<Utc>>,

  list_state: ListState,
  status: Status,

  /// Number of creates in flight
  creating: usize,
  /// Number of refreshes in flight
  refreshing: usize,

  /// A refresh held back until in-flight creates settle
  list_queued: bool,
  /// Creates held back until in-flight refreshes settle
  creates_queued: usize,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl<R: RemoteDataService> App<R> {
  pub fn new(todos: CachedTodoClient<R>, sample: CreateTodoInput, endpoint: String) -> Self {
    let (tx, _rx) = mpsc::unbounded_channel();

    Self {
      todos,
      sample,
      endpoint,
      entries: Vec::new(),
      fetched_at: None,
      list_state: ListState::default(),
      status: Status::Idle,
      creating: 0,
      refreshing: 0,
      list_queued: false,
      creates_queued: 0,
      event_tx: tx,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    // Initial data load
    self.on_list_requested();

    // Main loop
    let result = self.event_loop(&mut terminal, &mut events).await;

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      if let Some(event) = events.next().await {
        self.handle_event(event);
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.sync_from_cache(),
      Event::Sync(sync_event) => self.handle_sync_event(sync_event),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }

      // Actions
      KeyCode::Char('c') => self.on_create_requested(),
      KeyCode::Char('l') | KeyCode::Char('r') => self.on_list_requested(),

      // Navigation
      KeyCode::Up | KeyCode::Char('k') => self.list_state.select_previous(),
      KeyCode::Down | KeyCode::Char('j') => self.list_state.select_next(),

      _ => {}
    }
  }

  /// Create the sample todo; it shows up on the next tick.
  ///
  /// Creates and refreshes never overlap, so a create requested during a
  /// refresh waits for it.
  fn on_create_requested(&mut self) {
    if self.refreshing > 0 {
      self.creates_queued += 1;
      self.status = Status::Info("Create queued until the list is loaded".to_string());
      return;
    }
    self.dispatch_create();
  }

  fn dispatch_create(&mut self) {
    let pending = match self.todos.create(self.sample.clone()) {
      Ok(pending) => pending,
      Err(e) => {
        error!("Create failed before dispatch: {}", e);
        self.status = Status::Error(e.to_string());
        return;
      }
    };

    self.creating += 1;
    self.status = Status::Info(format!("Saving \"{}\"...", pending.provisional().name));
    self.sync_from_cache();

    let tx = self.event_tx.clone();
    tokio::spawn(async move {
      let event = match pending.confirmed().await {
        Ok(todo) => SyncEvent::Created(todo),
        Err(e) => SyncEvent::CreateFailed(e.to_string()),
      };
      let _ = tx.send(Event::Sync(event));
    });
  }

  /// Refresh the list from the network, once pending creates have settled.
  fn on_list_requested(&mut self) {
    if self.creating > 0 {
      self.list_queued = true;
      return;
    }
    self.dispatch_refresh();
  }

  fn dispatch_refresh(&mut self) {
    self.refreshing += 1;
    let todos = self.todos.clone();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let event = match todos.refresh().await {
        Ok(items) => SyncEvent::Listed(items.len()),
        Err(e) => SyncEvent::ListFailed(e.to_string()),
      };
      let _ = tx.send(Event::Sync(event));
    });
  }

  fn handle_sync_event(&mut self, event: SyncEvent) {
    match event {
      SyncEvent::Created(todo) => {
        self.creating = self.creating.saturating_sub(1);
        self.status = Status::Info(format!("Created \"{}\"", todo.name));
        // Pick up anything else that changed server-side
        self.list_queued = true;
        self.after_create_settled();
      }
      SyncEvent::CreateFailed(msg) => {
        self.creating = self.creating.saturating_sub(1);
        warn!("Create failed: {}", msg);
        self.status = Status::Error(format!("Create failed: {}", msg));
        self.after_create_settled();
      }
      SyncEvent::Listed(count) => {
        self.refreshing = self.refreshing.saturating_sub(1);
        self.status = Status::Info(format!("Loaded {} todos", count));
        self.after_refresh_settled();
      }
      SyncEvent::ListFailed(msg) => {
        self.refreshing = self.refreshing.saturating_sub(1);
        warn!("List failed: {}", msg);
        self.status = Status::Error(format!("List failed: {}", msg));
        self.after_refresh_settled();
      }
    }
    self.sync_from_cache();
  }

  fn after_create_settled(&mut self) {
    if self.creating == 0 && self.list_queued {
      self.list_queued = false;
      self.dispatch_refresh();
    }
  }

  fn after_refresh_settled(&mut self) {
    if self.refreshing > 0 {
      return;
    }
    for _ in 0..std::mem::take(&mut self.creates_queued) {
      self.dispatch_create();
    }
  }

  /// Copy the current cache contents for rendering.
  fn sync_from_cache(&mut self) {
    match self.todos.read() {
      Ok(result) => {
        self.entries = result.data;
        self.fetched_at = result.fetched_at;
      }
      Err(e) => {
        error!("Cache read failed: {}", e);
        self.status = Status::Error(e.to_string());
      }
    }
  }

  // Accessors for UI rendering
  pub fn entries(&self) -> &[CachedEntry<Todo>] {
    &self.entries
  }

  pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
    self.fetched_at
  }

  pub fn status(&self) -> &Status {
    &self.status
  }

  pub fn is_refreshing(&self) -> bool {
    self.refreshing > 0
  }

  pub fn is_creating(&self) -> bool {
    self.creating > 0
  }

  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }

  pub fn list_state_mut(&mut self) -> &mut ListState {
    &mut self.list_state
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::{SyncError, SyncResult};
  use async_trait::async_trait;
  use std::sync::{Arc, Mutex};
  use tokio::sync::Notify;

  struct StaticRemote {
    fail_creates: bool,
  }

  #[async_trait]
  impl RemoteDataService for StaticRemote {
    async fn mutate_create(&self, input: &CreateTodoInput) -> SyncResult<Todo> {
      if self.fail_creates {
        return Err(SyncError::RemoteUnavailable("offline".to_string()));
      }
      Ok(Todo {
        id: "srv-1".to_string(),
        name: input.name().to_string(),
        description: String::new(),
        typename: "Todo".to_string(),
      })
    }

    async fn query_list(&self) -> SyncResult<Vec<Todo>> {
      Ok(Vec::new())
    }
  }

  /// Stores a created todo right away but holds back the reply.
  struct CommitFirstRemote {
    records: Arc<Mutex<Vec<Todo>>>,
    reply: Arc<Notify>,
  }

  #[async_trait]
  impl RemoteDataService for CommitFirstRemote {
    async fn mutate_create(&self, input: &CreateTodoInput) -> SyncResult<Todo> {
      let todo = Todo {
        id: "srv-1".to_string(),
        name: input.name().to_string(),
        description: String::new(),
        typename: "Todo".to_string(),
      };
      self.records.lock().unwrap().push(todo.clone());
      self.reply.notified().await;
      Ok(todo)
    }

    async fn query_list(&self) -> SyncResult<Vec<Todo>> {
      Ok(self.records.lock().unwrap().clone())
    }
  }

  fn app(fail_creates: bool) -> (App<StaticRemote>, mpsc::UnboundedReceiver<Event>) {
    app_with(StaticRemote { fail_creates })
  }

  fn app_with<R: RemoteDataService>(remote: R) -> (App<R>, mpsc::UnboundedReceiver<Event>) {
    let client = CachedTodoClient::new(remote);
    let sample = CreateTodoInput::new("Use AppSync", None).unwrap();
    let mut app = App::new(client, sample, "https://example.com/graphql".to_string());
    let (tx, rx) = mpsc::unbounded_channel();
    app.event_tx = tx;
    (app, rx)
  }

  fn press<R: RemoteDataService>(app: &mut App<R>, c: char) {
    app.handle_event(Event::Key(KeyEvent::new(
      KeyCode::Char(c),
      KeyModifiers::NONE,
    )));
  }

  #[tokio::test]
  async fn test_create_key_shows_provisional_immediately() {
    let (mut app, mut rx) = app(false);

    press(&mut app, 'c');
    assert_eq!(app.entries().len(), 1);
    assert!(app.entries()[0].is_provisional());

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, Event::Sync(SyncEvent::Created(_))));
    app.handle_event(event);

    assert_eq!(app.status(), &Status::Info("Created \"Use AppSync\"".to_string()));
    assert!(app.is_refreshing());
  }

  #[tokio::test]
  async fn test_failed_create_reports_error() {
    let (mut app, mut rx) = app(true);

    press(&mut app, 'c');
    let event = rx.recv().await.unwrap();
    app.handle_event(event);

    assert!(app.entries().is_empty());
    assert!(matches!(app.status(), Status::Error(_)));
  }

  #[tokio::test]
  async fn test_quit_key() {
    let (mut app, _rx) = app(false);
    press(&mut app, 'q');
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_list_waits_for_pending_create() {
    let records = Arc::new(Mutex::new(Vec::new()));
    let reply = Arc::new(Notify::new());
    let (mut app, mut rx) = app_with(CommitFirstRemote {
      records: Arc::clone(&records),
      reply: Arc::clone(&reply),
    });

    press(&mut app, 'c');
    while records.lock().unwrap().is_empty() {
      tokio::task::yield_now().await;
    }

    // The server has the todo, but the create has not been answered yet
    press(&mut app, 'l');
    assert!(!app.is_refreshing());
    for _ in 0..10 {
      tokio::task::yield_now().await;
    }
    app.handle_event(Event::Tick);
    assert_eq!(app.entries().len(), 1);
    assert!(app.entries()[0].is_provisional());

    reply.notify_one();
    let event = rx.recv().await.unwrap();
    assert!(matches!(event, Event::Sync(SyncEvent::Created(_))));
    app.handle_event(event);
    assert!(!app.is_creating());
    assert!(app.is_refreshing());

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, Event::Sync(SyncEvent::Listed(1))));
    app.handle_event(event);

    assert_eq!(app.entries().len(), 1);
    assert_eq!(app.entries()[0].entity.id, "srv-1");
    assert!(!app.entries()[0].is_provisional());
  }

  #[tokio::test]
  async fn test_create_waits_for_pending_refresh() {
    let (mut app, mut rx) = app(false);

    press(&mut app, 'l');
    press(&mut app, 'c');
    assert!(app.entries().is_empty());
    assert!(!app.is_creating());

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, Event::Sync(SyncEvent::Listed(0))));
    app.handle_event(event);

    // The queued create goes out once the list is in
    assert!(app.is_creating());
    assert_eq!(app.entries().len(), 1);
    assert!(app.entries()[0].is_provisional());

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, Event::Sync(SyncEvent::Created(_))));
  }
}
