use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
  dialogs::Dialogs,
  dispatcher::{Dispatcher, OnChange},
  format::format_value,
  item::{InteractionKind, ListItem},
  sorter::arrange,
  store::SharedItems,
};

/// Marker a click target carries so the list's single listener knows what was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionMarker {
  ListItem,
  Info,
}

/// A click delivered to the list container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Click {
  pub action: Option<ActionMarker>,
  pub key: Option<String>,
}

impl Click {
  pub fn row(key: impl Into<String>) -> Self {
    Click { action: Some(ActionMarker::ListItem), key: Some(key.into()) }
  }

  pub fn info(key: impl Into<String>) -> Self {
    Click { action: Some(ActionMarker::Info), key: Some(key.into()) }
  }

  /// A click that landed on the container but on no row.
  pub fn bare() -> Self {
    Click { action: None, key: None }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkbox {
  checked: bool,
}

impl Checkbox {
  pub fn new(checked: bool) -> Self {
    Checkbox { checked }
  }

  pub fn checked(&self) -> bool {
    self.checked
  }

  pub fn toggle(&mut self) -> bool {
    self.checked = !self.checked;
    self.checked
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowControl {
  None,
  Checkbox(Checkbox),
  Value(String),
}

/// The visual node for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
  pub key: String,
  pub icon: Option<String>,
  pub icon_color: Option<String>,
  pub text: String,
  pub info: Option<String>,
  pub control: RowControl,
  pub trailing_padding: u16,
}

impl Row {
  pub fn build(item: &ListItem) -> Self {
    let (control, trailing_padding) = match &item.kind {
      InteractionKind::Checkbox => (RowControl::Checkbox(Checkbox::new(item.checked())), 1),
      kind if kind.shows_value() || item.value.is_some() => {
        let text = item.value.as_ref().map(|value| format_value(value, item.value_text.as_ref())).unwrap_or_default();
        (RowControl::Value(text), 0)
      },
      _ => (RowControl::None, 0),
    };
    Row {
      key: item.key.clone(),
      icon: item.icon.clone(),
      icon_color: item.icon_color.clone(),
      text: capitalize(&item.text),
      info: item.info.clone(),
      control,
      trailing_padding,
    }
  }

  pub fn value_text(&self) -> Option<&str> {
    match &self.control {
      RowControl::Value(text) => Some(text),
      _ => None,
    }
  }

  pub fn checked(&self) -> Option<bool> {
    match &self.control {
      RowControl::Checkbox(checkbox) => Some(checkbox.checked()),
      _ => None,
    }
  }
}

pub fn capitalize(text: &str) -> String {
  let mut chars = text.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

#[derive(Debug, Default)]
struct RowSlots {
  rows: Vec<Row>,
  by_key: HashMap<String, usize>,
}

/// The list container rows are rendered into.
#[derive(Debug, Default, Clone)]
pub struct ListView {
  inner: Arc<Mutex<RowSlots>>,
}

impl ListView {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, RowSlots> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn replace(&self, rows: Vec<Row>) {
    let by_key = rows.iter().enumerate().map(|(position, row)| (row.key.clone(), position)).collect();
    *self.lock() = RowSlots { rows, by_key };
  }

  pub fn rows(&self) -> Vec<Row> {
    self.lock().rows.clone()
  }

  pub fn row(&self, key: &str) -> Option<Row> {
    let slots = self.lock();
    slots.by_key.get(key).and_then(|&position| slots.rows.get(position)).cloned()
  }

  /// Flips the row's checkbox and returns its new state.
  pub fn toggle_checkbox(&self, key: &str) -> Option<bool> {
    let mut slots = self.lock();
    let position = *slots.by_key.get(key)?;
    match slots.rows.get_mut(position).map(|row| &mut row.control) {
      Some(RowControl::Checkbox(checkbox)) => Some(checkbox.toggle()),
      _ => None,
    }
  }

  /// Replaces the text of the row's value node. Rows without one are left alone.
  pub fn set_value_text(&self, key: &str, text: String) -> bool {
    let mut slots = self.lock();
    let Some(position) = slots.by_key.get(key).copied() else {
      return false;
    };
    match slots.rows.get_mut(position).map(|row| &mut row.control) {
      Some(RowControl::Value(current)) => {
        *current = text;
        true
      },
      _ => false,
    }
  }
}

/// Renders settings entries into a [`ListView`] and binds the click dispatcher.
#[derive(Clone)]
pub struct Renderer {
  dialogs: Arc<dyn Dialogs>,
  info_label: String,
}

impl Renderer {
  pub fn new(dialogs: Arc<dyn Dialogs>, info_label: impl Into<String>) -> Self {
    Renderer { dialogs, info_label: info_label.into() }
  }

  /// Clears `container`, fills it with one row per entry in display order and
  /// returns the dispatcher that handles clicks on it.
  pub fn render(
    &self,
    container: &ListView,
    items: &SharedItems,
    on_change: OnChange,
    sort_alphabetically: bool,
  ) -> Dispatcher {
    let rows = items.with_items(|entries| {
      arrange(entries, sort_alphabetically).into_iter().map(|slot| Row::build(&entries[slot])).collect::<Vec<_>>()
    });
    debug!("Rendering {} settings rows", rows.len());
    container.replace(rows);
    Dispatcher::new(items.clone(), container.clone(), self.dialogs.clone(), on_change)
      .with_info_label(self.info_label.clone())
  }
}
