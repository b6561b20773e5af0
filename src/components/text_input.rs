use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
  layout::Rect,
  prelude::Color,
  style::Style,
  widgets::{Block, Borders},
};
use tui_textarea::{Input, TextArea};

use crate::tui::Frame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
  Submitted(String),
  Cancelled,
}

#[derive(Debug, Default, Clone)]
pub struct InputState {
  pub value: Option<String>,
  pub is_valid: Option<bool>,
}

#[derive(Debug, Default)]
pub struct TextInput {
  pub text_input: TextArea<'static>,
  pub input_state: InputState,
  multiline: bool,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Starts the input pre-filled with `text`, cursor at the end.
  pub fn with_text(text: &str) -> Self {
    let mut input = Self::new();
    input.text_input = TextArea::from(text.lines().map(str::to_string).collect::<Vec<_>>());
    input.text_input.move_cursor(tui_textarea::CursorMove::Bottom);
    input.text_input.move_cursor(tui_textarea::CursorMove::End);
    input
  }

  /// Alt+Enter inserts a line break instead of submitting.
  pub fn multiline(mut self, multiline: bool) -> Self {
    self.multiline = multiline;
    self
  }

  pub fn masked(mut self, masked: bool) -> Self {
    if masked {
      self.text_input.set_mask_char('•');
    }
    self
  }

  pub fn init_style(&mut self, title: &str, placeholder: Option<&str>) {
    self.text_input.set_style(Style::default().fg(Color::White));
    self.text_input.set_block(Block::default().title(title.to_string()).borders(Borders::ALL));
    if let Some(placeholder) = placeholder {
      self.text_input.set_placeholder_text(placeholder.to_string());
    }
  }

  /// Single-line inputs read back every line joined by spaces.
  pub fn get_text(&self) -> String {
    if self.multiline {
      self.text_input.lines().join("\n")
    } else {
      self.text_input.lines().join(" ").trim().to_string()
    }
  }

  pub fn paste(&mut self, text: &str) {
    if self.multiline {
      self.text_input.insert_str(text);
    } else {
      self.text_input.insert_str(text.replace(['\r', '\n'], " "));
    }
  }

  // Returns the submitted text if the input is valid and enter was pressed.
  pub fn handle_key_event<F>(&mut self, key_event: KeyEvent, validate_fn: F) -> Option<InputOutcome>
  where
    F: Fn(&str) -> bool,
  {
    match key_event {
      KeyEvent { code: KeyCode::Esc, .. } => {
        self.input_state = InputState::default();
        Some(InputOutcome::Cancelled)
      },
      KeyEvent { code: KeyCode::Enter, modifiers: KeyModifiers::ALT, .. } if self.multiline => {
        self.text_input.insert_newline();
        None
      },
      KeyEvent { code: KeyCode::Enter, .. } => {
        let text = self.get_text();
        if validate_fn(&text) {
          self.input_state.value = Some(text.clone());
          self.input_state.is_valid = Some(true);
          return Some(InputOutcome::Submitted(text));
        }
        self.input_state.is_valid = Some(false);
        None
      },
      _ => {
        if self.text_input.input(Input::from(key_event)) {
          let text = self.get_text();
          self.input_state.is_valid = Some(validate_fn(&text));
          self.input_state.value = Some(text);
        }
        None
      },
    }
  }

  pub fn render(&mut self, f: &mut Frame<'_>, area: Rect) {
    if self.input_state.is_valid == Some(false) {
      self.text_input.set_style(Style::default().fg(Color::Red));
    } else {
      self.text_input.set_style(Style::default().fg(Color::White));
    }
    f.render_widget(&self.text_input, area);
  }
}
