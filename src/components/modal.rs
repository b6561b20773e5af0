use std::{collections::VecDeque, path::PathBuf};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use lazy_static::lazy_static;
use ratatui::{
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use regex::Regex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::{
  action::Action,
  components::{
    Component,
    text_input::{InputOutcome, TextInput},
  },
  settings::{
    dialogs::DialogRequest,
    item::{ItemValue, PathMode, PromptType, SelectOption},
  },
  tui::{Event, Frame},
};

lazy_static! {
  static ref EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
  static ref URL: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://\S+$").unwrap();
}

enum Reply {
  Value(oneshot::Sender<Option<ItemValue>>),
  Text(oneshot::Sender<Option<String>>),
  None,
}

#[derive(Debug, Clone, PartialEq)]
enum Answer {
  Value(ItemValue),
  Text(String),
  Dismissed,
}

enum Check {
  Prompt { prompt_type: PromptType, required: bool, pattern: Option<Regex> },
  Color,
  Path(PathMode),
}

impl Check {
  fn accepts(&self, text: &str) -> bool {
    match self {
      Check::Prompt { prompt_type, required, pattern } => {
        validate_prompt(text, *prompt_type, *required, pattern.as_ref())
      },
      Check::Color => !text.is_empty() && text.parse::<Color>().is_ok(),
      Check::Path(PathMode::File) => expand_home(text).is_file(),
      Check::Path(PathMode::Folder) => expand_home(text).is_dir(),
    }
  }

  fn hint(&self) -> &'static str {
    match self {
      Check::Prompt { prompt_type: PromptType::Textarea, .. } => "enter: Save | alt + enter: New line | esc: Cancel",
      Check::Color => "enter: Save (name, #rrggbb or 0-255) | esc: Cancel",
      Check::Path(_) => "enter: Choose | esc: Cancel",
      Check::Prompt { .. } => "enter: Save | esc: Cancel",
    }
  }
}

enum Body {
  Select { options: Vec<SelectOption>, list_state: ListState },
  Input { input: TextInput, check: Check },
  Message(String),
}

struct Dialog {
  title: String,
  body: Body,
  reply: Reply,
}

impl Dialog {
  fn open(request: DialogRequest) -> Self {
    match request {
      DialogRequest::Select { title, options, default, reply } => {
        let selected = default.and_then(|default| options.iter().position(|option| option.value == default));
        let list_state = ListState::default().with_selected(Some(selected.unwrap_or(0)));
        Dialog { title, body: Body::Select { options, list_state }, reply: Reply::Value(reply) }
      },
      DialogRequest::Prompt { text, default, prompt_type, options, reply } => {
        let pattern = options.pattern.as_deref().and_then(|pattern| match Regex::new(&format!("^(?:{pattern})$")) {
          Ok(regex) => Some(regex),
          Err(err) => {
            warn!("Ignoring invalid prompt pattern `{}`: {}", pattern, err);
            None
          },
        });
        let mut input = TextInput::with_text(default.as_deref().unwrap_or_default())
          .multiline(prompt_type == PromptType::Textarea)
          .masked(prompt_type == PromptType::Password);
        input.init_style(&prompt_type.to_string(), options.placeholder.as_deref());
        let check = Check::Prompt { prompt_type, required: options.required, pattern };
        Dialog { title: text, body: Body::Input { input, check }, reply: Reply::Text(reply) }
      },
      DialogRequest::Color { default, reply } => {
        let mut input = TextInput::with_text(default.as_deref().unwrap_or_default());
        input.init_style("color", None);
        let body = Body::Input { input, check: Check::Color };
        Dialog { title: "Color".to_string(), body, reply: Reply::Text(reply) }
      },
      DialogRequest::PickPath { mode, reply } => {
        let mut input = TextInput::new();
        input.init_style(&mode.to_string(), Some("~/"));
        Dialog {
          title: format!("Choose a {mode}"),
          body: Body::Input { input, check: Check::Path(mode) },
          reply: Reply::Text(reply),
        }
      },
      DialogRequest::Alert { title, message } => Dialog { title, body: Body::Message(message), reply: Reply::None },
    }
  }

  /// Feeds a key to the dialog. Returns the answer once the dialog is done.
  fn handle_key(&mut self, key: KeyEvent) -> Option<Answer> {
    match &mut self.body {
      Body::Select { options, list_state } => match key.code {
        KeyCode::Esc => Some(Answer::Dismissed),
        KeyCode::Down | KeyCode::Char('j') => {
          let next = list_state.selected().map_or(0, |selected| (selected + 1) % options.len().max(1));
          list_state.select(Some(next));
          None
        },
        KeyCode::Up | KeyCode::Char('k') => {
          let previous = match list_state.selected() {
            Some(0) | None => options.len().saturating_sub(1),
            Some(selected) => selected - 1,
          };
          list_state.select(Some(previous));
          None
        },
        KeyCode::Enter => {
          Some(list_state.selected().and_then(|selected| options.get(selected)).map_or(Answer::Dismissed, |option| {
            Answer::Value(option.value.clone())
          }))
        },
        _ => None,
      },
      Body::Input { input, check } => match input.handle_key_event(key, |text| check.accepts(text))? {
        InputOutcome::Cancelled => Some(Answer::Dismissed),
        InputOutcome::Submitted(text) => match check {
          Check::Path(_) => Some(Answer::Text(resolve_path(&text))),
          _ => Some(Answer::Text(text)),
        },
      },
      Body::Message(_) => match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') => Some(Answer::Dismissed),
        _ => None,
      },
    }
  }

  fn finish(self, answer: Answer) {
    let delivered = match (self.reply, answer) {
      (Reply::Value(reply), Answer::Value(value)) => reply.send(Some(value)).is_ok(),
      (Reply::Text(reply), Answer::Text(text)) => reply.send(Some(text)).is_ok(),
      (Reply::Value(reply), _) => reply.send(None).is_ok(),
      (Reply::Text(reply), _) => reply.send(None).is_ok(),
      (Reply::None, _) => true,
    };
    if !delivered {
      debug!("Dialog `{}` closed after its requester went away", self.title);
    }
  }

  fn height(&self) -> u16 {
    match &self.body {
      Body::Select { options, .. } => u16::try_from(options.len()).unwrap_or(u16::MAX).saturating_add(2).min(16),
      Body::Input { check: Check::Prompt { prompt_type: PromptType::Textarea, .. }, .. } => 9,
      Body::Input { .. } => 6,
      Body::Message(message) => u16::try_from(message.lines().count()).unwrap_or(u16::MAX).saturating_add(4).min(16),
    }
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
      .title(self.title.clone())
      .borders(Borders::ALL)
      .style(Style::default().fg(Color::White).bg(Color::Black));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    match &mut self.body {
      Body::Select { options, list_state } => {
        let items: Vec<ListItem> = options.iter().map(|option| ListItem::new(option.text.clone())).collect();
        let list = List::new(items)
          .highlight_style(Style::default().add_modifier(Modifier::BOLD))
          .highlight_symbol("→ ")
          .repeat_highlight_symbol(true);
        f.render_stateful_widget(list, inner, list_state);
      },
      Body::Input { input, check } => {
        let [input_area, hint_area] = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(inner);
        input.render(f, input_area);
        let hint = Line::from(Span::styled(check.hint(), Style::default().add_modifier(Modifier::DIM)));
        f.render_widget(hint, hint_area);
      },
      Body::Message(message) => {
        let [text_area, hint_area] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
        f.render_widget(Paragraph::new(message.clone()).wrap(Wrap { trim: false }), text_area);
        let hint = Line::from(Span::styled("enter: Close", Style::default().add_modifier(Modifier::DIM)));
        f.render_widget(hint, hint_area);
      },
    }
  }
}

fn validate_prompt(text: &str, prompt_type: PromptType, required: bool, pattern: Option<&Regex>) -> bool {
  if text.is_empty() {
    return !required;
  }
  if let Some(pattern) = pattern
    && !pattern.is_match(text)
  {
    return false;
  }
  match prompt_type {
    PromptType::Number => text.parse::<serde_json::Number>().is_ok(),
    PromptType::Email => EMAIL.is_match(text),
    PromptType::Url => URL.is_match(text),
    PromptType::Text | PromptType::Textarea | PromptType::Password => true,
  }
}

fn expand_home(text: &str) -> PathBuf {
  match (text.strip_prefix("~/"), directories::BaseDirs::new()) {
    (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
    _ if text == "~" => directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()).unwrap_or_default(),
    _ => PathBuf::from(text),
  }
}

fn resolve_path(text: &str) -> String {
  let path = expand_home(text);
  std::fs::canonicalize(&path).unwrap_or(path).display().to_string()
}

fn popup_area(area: Rect, height: u16) -> Rect {
  let [area] = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center).areas(area);
  let [area] = Layout::horizontal([Constraint::Percentage(60)]).flex(Flex::Center).areas(area);
  area
}

/// Shows the dialogs settings interactions ask for, one at a time.
#[derive(Default)]
pub struct ModalHost {
  active: Option<Dialog>,
  queue: VecDeque<DialogRequest>,
}

impl ModalHost {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, request: DialogRequest) {
    if self.active.is_none() {
      self.active = Some(Dialog::open(request));
    } else {
      self.queue.push_back(request);
    }
  }

  pub fn is_open(&self) -> bool {
    self.active.is_some()
  }

  pub fn title(&self) -> Option<&str> {
    self.active.as_ref().map(|dialog| dialog.title.as_str())
  }

  /// Answers and closes the current dialog once the key completes it, then
  /// opens the next queued one. Yields `DialogClosed` when nothing is left.
  pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
    let answer = self.active.as_mut()?.handle_key(key)?;
    if let Some(dialog) = self.active.take() {
      dialog.finish(answer);
    }
    self.active = self.queue.pop_front().map(Dialog::open);
    if self.active.is_none() { Some(Action::DialogClosed) } else { Some(Action::Render) }
  }

  /// Bracketed paste goes into the open text input, if any.
  pub fn paste(&mut self, text: &str) {
    if let Some(Dialog { body: Body::Input { input, .. }, .. }) = self.active.as_mut() {
      input.paste(text);
    }
  }
}

#[async_trait::async_trait]
impl Component for ModalHost {
  async fn handle_events(&mut self, event: Option<Event>) -> Result<Option<Action>> {
    match event {
      Some(Event::Key(key)) => Ok(self.handle_key(key)),
      Some(Event::Paste(text)) => {
        self.paste(&text);
        Ok(None)
      },
      _ => Ok(None),
    }
  }

  async fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    Ok(self.handle_key(key))
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    if let Some(dialog) = self.active.as_mut() {
      let popup = popup_area(area, dialog.height());
      dialog.draw(f, popup);
    }
    Ok(())
  }
}
