use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
  prelude::*,
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::Component;
use crate::action::Action;

/// Full screen report for errors the app cannot recover from on its own.
#[derive(Default)]
pub struct ErrorView {
  message: Option<String>,
  scroll: u16,
  last_height: u16,
}

impl ErrorView {
  pub fn set_message(&mut self, message: &str) {
    self.message = Some(strip_ansi_escapes::strip_str(message));
    self.scroll = 0;
  }

  pub fn message(&self) -> Option<&str> {
    self.message.as_deref()
  }

  fn has_scrolled_to_bottom(&self) -> bool {
    match &self.message {
      Some(message) => {
        let total_lines = message.lines().count() as u16;
        self.scroll + self.last_height >= total_lines
      },
      None => false,
    }
  }
}

#[async_trait::async_trait]
impl Component for ErrorView {
  fn draw(&mut self, frame: &mut Frame, area: Rect) -> color_eyre::Result<()> {
    self.last_height = area.height.saturating_sub(3);
    let [body, footer] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
    let message = self.message.clone().unwrap_or_default();
    let paragraph = Paragraph::new(message)
      .block(Block::default().title("Error").style(Style::default().fg(Color::Red)).borders(Borders::ALL))
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));

    frame.render_widget(paragraph, body);
    frame.render_widget(Line::from("esc: Back | ↑/↓: Scroll"), footer);
    Ok(())
  }

  async fn handle_key_events(&mut self, key: KeyEvent) -> color_eyre::Result<Option<Action>> {
    let action = match key.code {
      KeyCode::Up => {
        self.scroll = self.scroll.saturating_sub(1);
        None
      },
      KeyCode::Down => {
        if !self.has_scrolled_to_bottom() {
          self.scroll += 1;
        }
        None
      },
      KeyCode::Esc => {
        self.scroll = 0;
        self.message = None;
        self.last_height = 0;
        Some(Action::ExitError)
      },
      _ => None,
    };
    Ok(action)
  }
}

#[cfg(test)]
mod tests {
  use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
  use pretty_assertions::assert_eq;

  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent { code, modifiers: KeyModifiers::NONE, kind: KeyEventKind::Press, state: KeyEventState::NONE }
  }

  #[test]
  fn test_message_is_stripped_of_ansi() {
    let mut view = ErrorView::default();

    view.set_message("\u{1b}[31mFailed to draw\u{1b}[0m");

    assert_eq!(view.message(), Some("Failed to draw"));
  }

  #[tokio::test]
  async fn test_scroll_stops_at_bottom() {
    let mut view = ErrorView::default();
    view.set_message("one\ntwo\nthree");
    view.last_height = 2;

    view.handle_key_events(key(KeyCode::Down)).await.unwrap();
    view.handle_key_events(key(KeyCode::Down)).await.unwrap();
    view.handle_key_events(key(KeyCode::Up)).await.unwrap();
    view.handle_key_events(key(KeyCode::Up)).await.unwrap();

    assert_eq!(view.scroll, 0);
  }

  #[tokio::test]
  async fn test_escape_leaves_error_mode() {
    let mut view = ErrorView::default();
    view.set_message("boom");

    let action = view.handle_key_events(key(KeyCode::Esc)).await.unwrap();

    assert_eq!(action, Some(Action::ExitError));
    assert_eq!(view.message(), None);
  }
}
