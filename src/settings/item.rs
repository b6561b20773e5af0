use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use strum::Display;

/// The current value of a settings entry.
///
/// Booleans drive checkbox rows, strings are what prompts, pickers and colour
/// dialogs produce. Anything else (numbers, option values loaded from a file)
/// is carried as an opaque JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
  Bool(bool),
  Text(String),
  Other(serde_json::Value),
}

impl ItemValue {
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      ItemValue::Bool(b) => Some(*b),
      ItemValue::Other(serde_json::Value::Bool(b)) => Some(*b),
      _ => None,
    }
  }

  /// Loose truthiness: `false`, `null`, zero and empty strings are falsy, everything else is truthy.
  pub fn is_truthy(&self) -> bool {
    match self {
      ItemValue::Bool(b) => *b,
      ItemValue::Text(text) => !text.is_empty(),
      ItemValue::Other(serde_json::Value::Null) => false,
      ItemValue::Other(serde_json::Value::Bool(b)) => *b,
      ItemValue::Other(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
      ItemValue::Other(serde_json::Value::String(text)) => !text.is_empty(),
      ItemValue::Other(_) => true,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      ItemValue::Text(text) => Some(text),
      ItemValue::Other(serde_json::Value::String(text)) => Some(text),
      _ => None,
    }
  }
}

impl fmt::Display for ItemValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ItemValue::Bool(b) => write!(f, "{b}"),
      ItemValue::Text(text) => f.write_str(text),
      ItemValue::Other(serde_json::Value::String(text)) => f.write_str(text),
      ItemValue::Other(value) => write!(f, "{value}"),
    }
  }
}

impl From<bool> for ItemValue {
  fn from(value: bool) -> Self {
    ItemValue::Bool(value)
  }
}

impl From<&str> for ItemValue {
  fn from(value: &str) -> Self {
    ItemValue::Text(value.to_string())
  }
}

impl From<String> for ItemValue {
  fn from(value: String) -> Self {
    ItemValue::Text(value)
  }
}

/// Per-item display override, applied before the value is compacted for display.
pub type ValueText = Arc<dyn Fn(&ItemValue) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PromptType {
  #[default]
  Text,
  Number,
  Textarea,
  Url,
  Email,
  Password,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptOptions {
  pub required: bool,
  pub placeholder: Option<String>,
  #[serde(rename = "match")]
  pub pattern: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PathMode {
  File,
  Folder,
}

/// One choice of a select entry. Loaded either from a bare value or from a
/// `[value, label]` pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSelectOption")]
pub struct SelectOption {
  pub value: ItemValue,
  pub text: String,
}

impl SelectOption {
  pub fn new(value: impl Into<ItemValue>, text: impl Into<String>) -> Self {
    SelectOption { value: value.into(), text: text.into() }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelectOption {
  Pair(ItemValue, String),
  Plain(ItemValue),
}

impl From<RawSelectOption> for SelectOption {
  fn from(raw: RawSelectOption) -> Self {
    match raw {
      RawSelectOption::Pair(value, text) => SelectOption { value, text },
      RawSelectOption::Plain(value) => {
        let text = value.to_string();
        SelectOption { value, text }
      },
    }
  }
}

/// The single edit affordance an entry exposes.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionKind {
  None,
  Select(Vec<SelectOption>),
  Checkbox,
  Prompt { text: String, prompt_type: PromptType, options: PromptOptions },
  Path(PathMode),
  Color,
  Link(String),
}

impl InteractionKind {
  /// Whether the row shows a value text node for this kind.
  pub fn shows_value(&self) -> bool {
    !matches!(self, InteractionKind::None | InteractionKind::Checkbox)
  }
}

#[derive(Clone)]
pub struct ListItem {
  pub key: String,
  pub text: String,
  pub icon: Option<String>,
  pub icon_color: Option<String>,
  pub info: Option<String>,
  pub value: Option<ItemValue>,
  pub value_text: Option<ValueText>,
  pub index: Option<usize>,
  pub kind: InteractionKind,
}

impl ListItem {
  pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
    ListItem {
      key: key.into(),
      text: text.into(),
      icon: None,
      icon_color: None,
      info: None,
      value: None,
      value_text: None,
      index: None,
      kind: InteractionKind::None,
    }
  }

  pub fn with_value(mut self, value: impl Into<ItemValue>) -> Self {
    self.value = Some(value.into());
    self.settle_kind();
    self
  }

  /// Sets the edit affordance. A boolean value still turns anything but a
  /// select into a checkbox, the same as for items loaded from a file.
  pub fn with_kind(mut self, kind: InteractionKind) -> Self {
    self.kind = kind;
    self.settle_kind();
    self
  }

  pub fn with_index(mut self, index: usize) -> Self {
    self.index = Some(index);
    self
  }

  pub fn with_info(mut self, info: impl Into<String>) -> Self {
    self.info = Some(info.into());
    self
  }

  pub fn with_icon(mut self, icon: impl Into<String>, color: Option<&str>) -> Self {
    self.icon = Some(icon.into());
    self.icon_color = color.map(str::to_string);
    self
  }

  pub fn with_value_text<F>(mut self, formatter: F) -> Self
  where
    F: Fn(&ItemValue) -> String + Send + Sync + 'static,
  {
    self.value_text = Some(Arc::new(formatter));
    self
  }

  fn settle_kind(&mut self) {
    if matches!(self.value, Some(ItemValue::Bool(_))) && !matches!(self.kind, InteractionKind::Select(_)) {
      self.kind = InteractionKind::Checkbox;
    }
  }

  pub fn checked(&self) -> bool {
    self.value.as_ref().and_then(ItemValue::as_bool).unwrap_or(false)
  }
}

impl fmt::Debug for ListItem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ListItem")
      .field("key", &self.key)
      .field("text", &self.text)
      .field("value", &self.value)
      .field("index", &self.index)
      .field("kind", &self.kind)
      .field("value_text", &self.value_text.is_some())
      .finish_non_exhaustive()
  }
}

/// A settings entry as written in an items file, with every discriminator optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDescriptor {
  pub key: String,
  #[serde(default)]
  pub text: String,
  pub icon: Option<String>,
  pub icon_color: Option<String>,
  pub info: Option<String>,
  pub value: Option<ItemValue>,
  pub index: Option<serde_json::Value>,
  pub select: Option<Vec<SelectOption>>,
  pub checkbox: Option<bool>,
  pub prompt: Option<String>,
  pub prompt_type: Option<PromptType>,
  pub prompt_options: Option<PromptOptions>,
  #[serde(default)]
  pub file: bool,
  #[serde(default)]
  pub folder: bool,
  #[serde(default)]
  pub color: bool,
  pub link: Option<String>,
}

impl ItemDescriptor {
  /// Picks the interaction kind by precedence: select, checkbox, prompt,
  /// file/folder, color, link.
  pub fn interaction_kind(&self) -> InteractionKind {
    if let Some(options) = &self.select {
      return InteractionKind::Select(options.clone());
    }
    if self.checkbox.is_some() || matches!(self.value, Some(ItemValue::Bool(_))) {
      return InteractionKind::Checkbox;
    }
    if let Some(text) = self.prompt.as_ref().filter(|text| !text.is_empty()) {
      return InteractionKind::Prompt {
        text: text.clone(),
        prompt_type: self.prompt_type.unwrap_or_default(),
        options: self.prompt_options.clone().unwrap_or_default(),
      };
    }
    if self.file {
      return InteractionKind::Path(PathMode::File);
    }
    if self.folder {
      return InteractionKind::Path(PathMode::Folder);
    }
    if self.color {
      return InteractionKind::Color;
    }
    match self.link.as_ref().filter(|link| !link.is_empty()) {
      Some(link) => InteractionKind::Link(link.clone()),
      None => InteractionKind::None,
    }
  }

  fn position(&self) -> Option<usize> {
    let index = self.index.as_ref()?;
    let whole = index.as_u64().or_else(|| index.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64));
    whole.and_then(|i| usize::try_from(i).ok())
  }
}

impl From<ItemDescriptor> for ListItem {
  fn from(descriptor: ItemDescriptor) -> Self {
    let kind = descriptor.interaction_kind();
    let index = descriptor.position();
    let mut value = descriptor.value;
    if kind == InteractionKind::Checkbox {
      // The checkbox flag seeds the state; the value carries it from here on.
      let checked = descriptor.checkbox.unwrap_or(false) || value.as_ref().is_some_and(ItemValue::is_truthy);
      value = Some(ItemValue::Bool(checked));
    }
    let text = if descriptor.text.is_empty() { descriptor.key.clone() } else { descriptor.text };
    ListItem {
      key: descriptor.key,
      text,
      icon: descriptor.icon,
      icon_color: descriptor.icon_color,
      info: descriptor.info,
      value,
      value_text: None,
      index,
      kind,
    }
  }
}
