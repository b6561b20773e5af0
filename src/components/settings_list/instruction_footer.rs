use ratatui::{
  layout::Rect,
  prelude::{Line, Span},
};

use crate::{
  settings::{InteractionKind, RowControl},
  tui::Frame,
};

use super::row_item::RowItem;

#[derive(Debug, Default)]
pub struct InstructionFooter {}

impl InstructionFooter {
  pub fn commands(&self, selected: Option<&RowItem>, kind: Option<&InteractionKind>) -> Line<'static> {
    let mut commands = vec![Span::raw("q: Quit"), Span::raw(" | ↑/↓: Move")];

    if let Some(selected) = selected {
      match (&selected.row.control, kind) {
        (RowControl::Checkbox(_), _) => commands.push(Span::raw(" | enter: Toggle")),
        (_, Some(InteractionKind::Link(_))) => commands.push(Span::raw(" | enter: Open")),
        (_, Some(InteractionKind::None) | None) => {},
        _ => commands.push(Span::raw(" | enter: Edit")),
      }
      if selected.row.info.is_some() {
        commands.push(Span::raw(" | i: Info"));
      }
    }

    Line::from(commands)
  }

  pub fn render(&self, f: &mut Frame<'_>, area: Rect, selected: Option<&RowItem>, kind: Option<&InteractionKind>) {
    f.render_widget(self.commands(selected, kind), area);
  }
}
