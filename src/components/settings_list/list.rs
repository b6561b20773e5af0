use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Margin, Position, Rect},
  style::{Color, Modifier, Style},
  text::Span,
  widgets::{Block, Borders, List, ListItem, ListState},
};
use tokio::{sync::mpsc::UnboundedSender, task::spawn};
use tracing::{debug, info};

use crate::{
  action::Action,
  components::{
    Component,
    settings_list::{instruction_footer::InstructionFooter, row_item::RowItem},
  },
  settings::{Click, Dispatcher, Outcome},
};

const HIGHLIGHT_SYMBOL: &str = "→ ";

pub struct SettingsList {
  dispatcher: Dispatcher,
  action_tx: Option<UnboundedSender<Action>>,
  // Local cached copy of the rendered rows
  rows: Vec<RowItem>,
  list_state: ListState,
  selected_index: usize,
  list_area: Rect,
  instruction_footer: InstructionFooter,
}

impl SettingsList {
  pub fn new(dispatcher: Dispatcher) -> Self {
    let mut list = SettingsList {
      dispatcher,
      action_tx: None,
      rows: Vec::new(),
      list_state: ListState::default(),
      selected_index: 0,
      list_area: Rect::default(),
      instruction_footer: InstructionFooter::default(),
    };
    list.sync_rows();
    list
  }

  // Rows change underneath us whenever an interaction commits.
  fn sync_rows(&mut self) {
    self.rows = self.dispatcher.view().rows().into_iter().map(RowItem::new).collect();
    if self.selected_index >= self.rows.len() {
      self.selected_index = self.rows.len().saturating_sub(1);
    }
  }

  pub fn select_next(&mut self) {
    if self.rows.is_empty() {
      return;
    }
    self.selected_index = (self.selected_index + 1) % self.rows.len();
  }

  pub fn select_previous(&mut self) {
    if self.rows.is_empty() {
      return;
    }
    self.selected_index = match self.selected_index {
      0 => self.rows.len() - 1,
      index => index - 1,
    };
  }

  fn selected(&self) -> Option<&RowItem> {
    self.rows.get(self.selected_index)
  }

  fn selected_key(&self) -> Option<String> {
    self.selected().map(|row_item| row_item.row.key.clone())
  }

  /// Maps a terminal cell to the click it stands for. Cells outside the list
  /// body yield nothing; cells below the last row yield a click on no row.
  pub fn hit_test(&self, column: u16, row: u16) -> Option<Click> {
    let body = self.list_area.inner(Margin { horizontal: 1, vertical: 1 });
    if !body.contains(Position { x: column, y: row }) {
      return None;
    }
    let position = self.list_state.offset() + (row - body.y) as usize;
    let Some(row_item) = self.rows.get(position) else {
      return Some(Click::bare());
    };
    let key = row_item.row.key.clone();
    let text_column = (column - body.x).checked_sub(Span::raw(HIGHLIGHT_SYMBOL).width() as u16);
    match (row_item.info_marker(), text_column) {
      (Some(marker), Some(text_column)) if marker.contains(&text_column) => Some(Click::info(key)),
      _ => Some(Click::row(key)),
    }
  }

  fn dispatch(&self, click: Click) {
    let dispatcher = self.dispatcher.clone();
    let action_tx = self.action_tx.clone();

    let future = async move {
      let outcome = dispatcher.dispatch(&click).await;
      match &outcome {
        Outcome::Committed(value) => info!("SettingsList: {:?} committed {}", click.key, value),
        other => debug!("SettingsList: {:?} -> {:?}", click.key, other),
      }
      if let Some(tx) = action_tx {
        let _ = tx.send(Action::Render);
      }
    };

    spawn(future);
  }

  fn render_list(&mut self, f: &mut Frame<'_>, area: Rect) {
    self.list_area = area;
    let render_items: Vec<ListItem> = self.rows.iter().map(RowItem::render).collect();
    let list = List::new(render_items)
      .block(Block::default().title("Settings").borders(Borders::ALL))
      .style(Style::default().fg(Color::White))
      .highlight_style(Style::default().add_modifier(Modifier::BOLD))
      .highlight_symbol(HIGHLIGHT_SYMBOL)
      .repeat_highlight_symbol(true);

    self.list_state.select((!self.rows.is_empty()).then_some(self.selected_index));
    f.render_stateful_widget(list, area, &mut self.list_state);
  }
}

#[async_trait::async_trait]
impl Component for SettingsList {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> color_eyre::Result<()> {
    self.action_tx = Some(tx);
    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> color_eyre::Result<()> {
    self.sync_rows();

    let layout_base = Layout::default().direction(Direction::Vertical);
    let chunks = layout_base.constraints([Constraint::Min(1), Constraint::Length(1)]).split(area);

    self.render_list(frame, chunks[0]);

    let kind = self.selected_key().and_then(|key| self.dispatcher.items().get(&key)).map(|item| item.kind);
    self.instruction_footer.render(frame, chunks[1], self.selected(), kind.as_ref());

    Ok(())
  }

  async fn handle_key_events(&mut self, key: KeyEvent) -> color_eyre::Result<Option<Action>> {
    let action = match key {
      KeyEvent { code: KeyCode::Down | KeyCode::Char('j'), modifiers: KeyModifiers::NONE, kind: _, state: _ } => {
        Some(Action::SelectNext)
      },
      KeyEvent { code: KeyCode::Up | KeyCode::Char('k'), modifiers: KeyModifiers::NONE, kind: _, state: _ } => {
        Some(Action::SelectPrevious)
      },
      KeyEvent { code: KeyCode::Enter | KeyCode::Char(' '), modifiers: KeyModifiers::NONE, kind: _, state: _ } => {
        self.selected_key().map(|key| Action::Click(Click::row(key)))
      },
      KeyEvent { code: KeyCode::Char('i'), modifiers: KeyModifiers::NONE, kind: _, state: _ } => {
        self.selected_key().map(|key| Action::Click(Click::info(key)))
      },
      _ => None,
    };

    Ok(action)
  }

  async fn handle_mouse_events(&mut self, mouse: MouseEvent) -> color_eyre::Result<Option<Action>> {
    let action = match mouse.kind {
      MouseEventKind::Down(MouseButton::Left) => self.hit_test(mouse.column, mouse.row).map(Action::Click),
      MouseEventKind::ScrollDown => Some(Action::SelectNext),
      MouseEventKind::ScrollUp => Some(Action::SelectPrevious),
      _ => None,
    };
    Ok(action)
  }

  async fn update(&mut self, action: Action) -> color_eyre::Result<Option<Action>> {
    match action {
      Action::SelectPrevious => {
        self.select_previous();
        Ok(None)
      },
      Action::SelectNext => {
        self.select_next();
        Ok(None)
      },
      Action::Click(click) => {
        if let Some(key) = &click.key
          && let Some(position) = self.rows.iter().position(|row_item| &row_item.row.key == key)
        {
          self.selected_index = position;
        }
        self.dispatch(click);
        Ok(None)
      },
      _ => Ok(None),
    }
  }
}
