use std::{ops::Range, str::FromStr};

use ratatui::{
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::ListItem,
};

use crate::settings::{Row, RowControl};

const PLACEHOLDER_ICON: &str = "·";
const NAMED_ICON: &str = "■";
const INFO_MARKER: &str = " (i)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowItem {
  pub row: Row,
}

impl RowItem {
  pub fn new(row: Row) -> Self {
    RowItem { row }
  }

  /// Single glyphs are shown as they are; icon names get a neutral square.
  fn icon(&self) -> Span<'static> {
    let glyph = match self.row.icon.as_deref() {
      Some(icon) if icon.chars().count() == 1 => icon.to_string(),
      Some(_) => NAMED_ICON.to_string(),
      None => PLACEHOLDER_ICON.to_string(),
    };
    let style = match self.row.icon_color.as_deref().map(Color::from_str) {
      Some(Ok(color)) => Style::default().fg(color),
      _ => Style::default(),
    };
    Span::styled(glyph, style)
  }

  fn lead(&self) -> Vec<Span<'static>> {
    vec![self.icon(), Span::raw(" "), Span::raw(self.row.text.clone())]
  }

  /// Columns of the info marker relative to the start of the row's text line.
  pub fn info_marker(&self) -> Option<Range<u16>> {
    self.row.info.as_ref()?;
    let start = self.lead().iter().map(Span::width).sum::<usize>() as u16;
    Some(start..start + INFO_MARKER.len() as u16)
  }

  pub fn render(&self) -> ListItem<'static> {
    let mut parts = self.lead();
    if self.row.info.is_some() {
      parts.push(Span::styled(INFO_MARKER, Style::default().fg(Color::Cyan)));
    }

    match &self.row.control {
      RowControl::Checkbox(checkbox) => {
        let mark = if checkbox.checked() { "[x]" } else { "[ ]" };
        parts.push(Span::raw(" "));
        parts.push(Span::styled(mark, Style::default().add_modifier(Modifier::BOLD)));
      },
      RowControl::Value(text) if !text.is_empty() => {
        parts.push(Span::styled(format!("  {}", text), Style::default().add_modifier(Modifier::DIM)));
      },
      RowControl::Value(_) | RowControl::None => {},
    }
    if self.row.trailing_padding > 0 {
      parts.push(Span::raw(" ".repeat(self.row.trailing_padding as usize)));
    }

    ListItem::from(Line::from(parts))
  }
}
