use std::{
  collections::HashSet,
  sync::{Arc, Mutex, PoisonError},
};

use tracing::{debug, error, info, warn};

use super::{
  dialogs::Dialogs,
  format::format_value,
  item::{InteractionKind, ItemValue, ListItem, PromptType},
  render::{ActionMarker, Click, ListView},
  store::SharedItems,
};
use crate::error::Error;

/// Called with `(key, new_value)` after every committed change.
pub type OnChange = Arc<dyn Fn(&str, &ItemValue) + Send + Sync>;

/// How a click was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
  /// The click carried no row marker.
  Ignored,
  /// The clicked key is not in the item set.
  Missed,
  /// An interaction on the same key is still in flight.
  Busy,
  Cancelled,
  Failed,
  LinkOpened,
  InfoShown,
  NoEffect,
  Committed(ItemValue),
}

enum Resolution {
  Value(ItemValue),
  Cancelled,
  LinkOpened,
  NoEffect,
}

type InFlight = Arc<Mutex<HashSet<String>>>;

/// Marks a key as busy until dropped.
struct InFlightGuard {
  keys: InFlight,
  key: String,
}

impl InFlightGuard {
  fn acquire(keys: &InFlight, key: &str) -> Option<Self> {
    let inserted = keys.lock().unwrap_or_else(PoisonError::into_inner).insert(key.to_string());
    inserted.then(|| InFlightGuard { keys: keys.clone(), key: key.to_string() })
  }
}

impl Drop for InFlightGuard {
  fn drop(&mut self) {
    self.keys.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.key);
  }
}

/// Resolves clicks on a rendered list into edits of the clicked entry.
///
/// Cheap to clone; clones share the item store, the rendered rows and the set
/// of keys with an interaction in flight.
#[derive(Clone)]
pub struct Dispatcher {
  items: SharedItems,
  view: ListView,
  dialogs: Arc<dyn Dialogs>,
  on_change: OnChange,
  in_flight: InFlight,
  info_label: String,
}

impl Dispatcher {
  pub fn new(items: SharedItems, view: ListView, dialogs: Arc<dyn Dialogs>, on_change: OnChange) -> Self {
    Dispatcher { items, view, dialogs, on_change, in_flight: InFlight::default(), info_label: "Info".to_string() }
  }

  pub fn with_info_label(mut self, label: impl Into<String>) -> Self {
    self.info_label = label.into();
    self
  }

  pub fn view(&self) -> &ListView {
    &self.view
  }

  pub fn items(&self) -> &SharedItems {
    &self.items
  }

  pub async fn dispatch(&self, click: &Click) -> Outcome {
    let Some(key) = click.key.as_deref() else {
      return Outcome::Ignored;
    };
    match click.action {
      Some(ActionMarker::ListItem) => {},
      Some(ActionMarker::Info) => return self.show_info(key),
      None => return Outcome::Ignored,
    }

    let Some(item) = self.items.get(key) else {
      debug!("Click on unknown settings key `{}`", key);
      return Outcome::Missed;
    };
    let Some(_guard) = InFlightGuard::acquire(&self.in_flight, key) else {
      debug!("Ignoring click on `{}`: interaction already in flight", key);
      return Outcome::Busy;
    };

    let candidate = match self.resolve(&item).await {
      Ok(Resolution::Value(value)) => value,
      Ok(Resolution::Cancelled) => {
        debug!("Interaction on `{}` cancelled", key);
        return Outcome::Cancelled;
      },
      Ok(Resolution::LinkOpened) => return Outcome::LinkOpened,
      Ok(Resolution::NoEffect) => return Outcome::NoEffect,
      Err(Error::Dismissed(what)) => {
        debug!("Interaction on `{}` dismissed: {}", key, what);
        return Outcome::Failed;
      },
      Err(err) => {
        error!("Interaction on `{}` failed: {}", key, err);
        return Outcome::Failed;
      },
    };
    self.commit(&item, candidate)
  }

  fn show_info(&self, key: &str) -> Outcome {
    match self.items.get(key).and_then(|item| item.info) {
      Some(info) => {
        self.dialogs.alert(&self.info_label, &info);
        Outcome::InfoShown
      },
      None => Outcome::Missed,
    }
  }

  async fn resolve(&self, item: &ListItem) -> Result<Resolution, Error> {
    let current = item.value.as_ref();
    let resolution = match &item.kind {
      InteractionKind::Select(options) => match self.dialogs.select(&item.text, options, current).await? {
        Some(value) => Resolution::Value(value),
        None => Resolution::Cancelled,
      },
      InteractionKind::Checkbox => match self.view.toggle_checkbox(&item.key) {
        Some(checked) => Resolution::Value(ItemValue::Bool(checked)),
        None => {
          warn!("No checkbox rendered for `{}`", item.key);
          Resolution::NoEffect
        },
      },
      InteractionKind::Prompt { text, prompt_type, options } => {
        match self.dialogs.prompt(text, current, *prompt_type, options).await? {
          Some(answer) => Resolution::Value(typed_answer(answer, *prompt_type)),
          None => Resolution::Cancelled,
        }
      },
      InteractionKind::Path(mode) => Resolution::Value(ItemValue::Text(self.dialogs.pick_path(*mode).await?.url)),
      InteractionKind::Color => Resolution::Value(ItemValue::Text(self.dialogs.color(current).await?)),
      InteractionKind::Link(url) => {
        self.dialogs.open_link(url);
        Resolution::LinkOpened
      },
      InteractionKind::None => Resolution::NoEffect,
    };
    Ok(resolution)
  }

  fn commit(&self, item: &ListItem, value: ItemValue) -> Outcome {
    if !self.items.set_value(&item.key, value.clone()) {
      debug!("`{}` left the item set before commit", item.key);
      return Outcome::Missed;
    }
    self.view.set_value_text(&item.key, format_value(&value, item.value_text.as_ref()));
    info!("Setting `{}` changed to {}", item.key, value);
    (self.on_change)(&item.key, &value);
    Outcome::Committed(value)
  }
}

fn typed_answer(answer: String, prompt_type: PromptType) -> ItemValue {
  if prompt_type == PromptType::Number
    && let Ok(number) = answer.trim().parse::<serde_json::Number>()
  {
    return ItemValue::Other(serde_json::Value::Number(number));
  }
  ItemValue::Text(answer)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use tokio::sync::Notify;

  use super::*;
  use crate::settings::{
    dialogs::mock_dialogs::{DialogCall, MockDialogs},
    item::{PathMode, PromptOptions, SelectOption},
    render::Renderer,
  };

  type Changes = Arc<Mutex<Vec<(String, ItemValue)>>>;

  struct Harness {
    dispatcher: Dispatcher,
    dialogs: Arc<MockDialogs>,
    changes: Changes,
  }

  fn harness(items: Vec<ListItem>, dialogs: MockDialogs) -> Harness {
    let items = SharedItems::from_items(items).unwrap();
    let dialogs = Arc::new(dialogs);
    let changes = Changes::default();
    let sink = changes.clone();
    let on_change: OnChange = Arc::new(move |key: &str, value: &ItemValue| {
      sink.lock().unwrap().push((key.to_string(), value.clone()));
    });
    let dispatcher = Renderer::new(dialogs.clone(), "Info").render(&ListView::new(), &items, on_change, false);
    Harness { dispatcher, dialogs, changes }
  }

  fn prompt_item(key: &str) -> ListItem {
    ListItem::new(key, "Name").with_value("old").with_kind(InteractionKind::Prompt {
      text: "Your name".to_string(),
      prompt_type: PromptType::Text,
      options: PromptOptions::default(),
    })
  }

  impl Harness {
    fn changes(&self) -> Vec<(String, ItemValue)> {
      self.changes.lock().unwrap().clone()
    }

    fn value(&self, key: &str) -> Option<ItemValue> {
      self.dispatcher.items().value(key)
    }

    fn value_text(&self, key: &str) -> Option<String> {
      self.dispatcher.view().row(key).and_then(|row| row.value_text().map(str::to_string))
    }
  }

  #[tokio::test]
  async fn test_click_without_marker_is_ignored() {
    let h = harness(vec![ListItem::new("wrap", "Wrap").with_value(false)], MockDialogs::new());

    let bare = h.dispatcher.dispatch(&Click::bare()).await;
    let keyed = h.dispatcher.dispatch(&Click { action: None, key: Some("wrap".to_string()) }).await;

    assert_eq!(bare, Outcome::Ignored);
    assert_eq!(keyed, Outcome::Ignored);
    assert_eq!(h.value("wrap"), Some(ItemValue::Bool(false)));
    assert!(h.changes().is_empty());
  }

  #[tokio::test]
  async fn test_unknown_key_is_a_silent_miss() {
    let h = harness(vec![ListItem::new("wrap", "Wrap").with_value(false)], MockDialogs::new());

    assert_eq!(h.dispatcher.dispatch(&Click::row("nope")).await, Outcome::Missed);
    assert!(h.changes().is_empty());
  }

  #[tokio::test]
  async fn test_checkbox_toggles_and_reports_each_click() {
    let h = harness(vec![ListItem::new("wrap", "Wrap").with_value(false)], MockDialogs::new());

    let first = h.dispatcher.dispatch(&Click::row("wrap")).await;
    let second = h.dispatcher.dispatch(&Click::row("wrap")).await;

    assert_eq!(first, Outcome::Committed(ItemValue::Bool(true)));
    assert_eq!(second, Outcome::Committed(ItemValue::Bool(false)));
    assert_eq!(
      h.changes(),
      vec![("wrap".to_string(), ItemValue::Bool(true)), ("wrap".to_string(), ItemValue::Bool(false))]
    );
    assert_eq!(h.dispatcher.view().row("wrap").unwrap().checked(), Some(false));
    assert!(h.dialogs.calls().is_empty());
  }

  #[tokio::test]
  async fn test_select_uses_current_value_as_default() {
    let options = vec![SelectOption::new("dark", "Dark"), SelectOption::new("light", "Light")];
    let h = harness(
      vec![ListItem::new("theme", "Theme").with_value("dark").with_kind(InteractionKind::Select(options))],
      MockDialogs::new().with_select_reply(Some(ItemValue::from("light"))),
    );

    let outcome = h.dispatcher.dispatch(&Click::row("theme")).await;

    assert_eq!(outcome, Outcome::Committed(ItemValue::from("light")));
    assert_eq!(
      h.dialogs.calls(),
      vec![DialogCall::Select { title: "Theme".to_string(), default: Some(ItemValue::from("dark")) }]
    );
    assert_eq!(h.value_text("theme"), Some("light".to_string()));
  }

  #[tokio::test]
  async fn test_select_backing_out_is_a_cancel() {
    let h = harness(
      vec![ListItem::new("theme", "Theme").with_value("dark").with_kind(InteractionKind::Select(vec![]))],
      MockDialogs::new().with_select_reply(None),
    );

    assert_eq!(h.dispatcher.dispatch(&Click::row("theme")).await, Outcome::Cancelled);
    assert_eq!(h.value("theme"), Some(ItemValue::from("dark")));
    assert!(h.changes().is_empty());
  }

  #[tokio::test]
  async fn test_cancelled_prompt_changes_nothing() {
    let h = harness(vec![prompt_item("name")], MockDialogs::new().with_prompt_reply(None));

    let outcome = h.dispatcher.dispatch(&Click::row("name")).await;

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(h.value("name"), Some(ItemValue::from("old")));
    assert_eq!(h.value_text("name"), Some("old".to_string()));
    assert!(h.changes().is_empty());
  }

  #[tokio::test]
  async fn test_prompt_answer_shows_first_line() {
    let h = harness(vec![prompt_item("name")], MockDialogs::new().with_prompt_reply(Some("hello\nworld")));

    let outcome = h.dispatcher.dispatch(&Click::row("name")).await;

    assert_eq!(outcome, Outcome::Committed(ItemValue::from("hello\nworld")));
    assert_eq!(h.value("name"), Some(ItemValue::from("hello\nworld")));
    assert_eq!(h.value_text("name"), Some("hello".to_string()));
    assert_eq!(h.changes(), vec![("name".to_string(), ItemValue::from("hello\nworld"))]);
  }

  #[tokio::test]
  async fn test_long_prompt_answer_is_truncated_for_display() {
    let long = "a".repeat(60);
    let h = harness(vec![prompt_item("name")], MockDialogs::new().with_prompt_reply(Some(&long)));

    h.dispatcher.dispatch(&Click::row("name")).await;

    let shown = h.value_text("name").unwrap();
    assert_eq!(shown, format!("{}...", "a".repeat(47)));
    assert_eq!(shown.chars().count(), 50);
  }

  #[tokio::test]
  async fn test_number_prompt_commits_a_number() {
    let item = ListItem::new("tab", "Tab size")
      .with_value(ItemValue::Other(serde_json::json!(2)))
      .with_kind(InteractionKind::Prompt {
        text: "Tab size".to_string(),
        prompt_type: PromptType::Number,
        options: PromptOptions::default(),
      })
      .with_value_text(|value| format!("{value} spaces"));
    let h = harness(vec![item], MockDialogs::new().with_prompt_reply(Some("4")));

    let outcome = h.dispatcher.dispatch(&Click::row("tab")).await;

    assert_eq!(outcome, Outcome::Committed(ItemValue::Other(serde_json::json!(4))));
    assert_eq!(h.value_text("tab"), Some("4 spaces".to_string()));
  }

  #[tokio::test]
  async fn test_path_picker_modes() {
    let h = harness(
      vec![
        ListItem::new("file", "File").with_kind(InteractionKind::Path(PathMode::File)),
        ListItem::new("dir", "Dir").with_kind(InteractionKind::Path(PathMode::Folder)),
      ],
      MockDialogs::new().with_path_reply("/home/me/project"),
    );

    h.dispatcher.dispatch(&Click::row("file")).await;
    let outcome = h.dispatcher.dispatch(&Click::row("dir")).await;

    assert_eq!(outcome, Outcome::Committed(ItemValue::from("/home/me/project")));
    assert_eq!(h.dialogs.calls(), vec![DialogCall::PickPath(PathMode::File), DialogCall::PickPath(PathMode::Folder)]);
    assert_eq!(h.value_text("dir"), Some("/home/me/project".to_string()));
  }

  #[tokio::test]
  async fn test_color_is_seeded_with_current_value() {
    let h = harness(
      vec![ListItem::new("accent", "Accent").with_value("#ff0000").with_kind(InteractionKind::Color)],
      MockDialogs::new().with_color_reply("#00ff00"),
    );

    let outcome = h.dispatcher.dispatch(&Click::row("accent")).await;

    assert_eq!(outcome, Outcome::Committed(ItemValue::from("#00ff00")));
    assert_eq!(h.dialogs.calls(), vec![DialogCall::Color { default: Some(ItemValue::from("#ff0000")) }]);
  }

  #[tokio::test]
  async fn test_link_opens_without_committing() {
    let h = harness(
      vec![
        ListItem::new("docs", "Docs")
          .with_value("site")
          .with_kind(InteractionKind::Link("https://example.com/docs".to_string())),
      ],
      MockDialogs::new(),
    );

    let outcome = h.dispatcher.dispatch(&Click::row("docs")).await;

    assert_eq!(outcome, Outcome::LinkOpened);
    assert_eq!(h.dialogs.calls(), vec![DialogCall::OpenLink("https://example.com/docs".to_string())]);
    assert_eq!(h.value("docs"), Some(ItemValue::from("site")));
    assert!(h.changes().is_empty());
  }

  #[tokio::test]
  async fn test_plain_row_has_no_effect() {
    let h = harness(vec![ListItem::new("about", "About")], MockDialogs::new());

    assert_eq!(h.dispatcher.dispatch(&Click::row("about")).await, Outcome::NoEffect);
    assert!(h.changes().is_empty());
  }

  #[tokio::test]
  async fn test_collaborator_failure_leaves_value_alone() {
    let h = harness(
      vec![ListItem::new("dir", "Dir").with_value("/tmp").with_kind(InteractionKind::Path(PathMode::Folder))],
      MockDialogs::new().failing(),
    );

    let outcome = h.dispatcher.dispatch(&Click::row("dir")).await;

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(h.value("dir"), Some(ItemValue::from("/tmp")));
    assert_eq!(h.value_text("dir"), Some("/tmp".to_string()));
    assert!(h.changes().is_empty());
  }

  #[derive(Clone, Default)]
  struct LogBuffer(Arc<Mutex<Vec<u8>>>);

  impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
      Ok(())
    }
  }

  impl LogBuffer {
    fn text(&self) -> String {
      String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
  }

  #[tokio::test]
  async fn test_dismissed_picker_is_not_logged_as_an_error() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
      .with_max_level(tracing::Level::INFO)
      .with_ansi(false)
      .with_writer(move || writer.clone())
      .finish();
    let _default = tracing::subscriber::set_default(subscriber);

    let dismissed = harness(
      vec![ListItem::new("accent", "Accent").with_value("#ff0000").with_kind(InteractionKind::Color)],
      MockDialogs::new().dismissing(),
    );
    assert_eq!(dismissed.dispatcher.dispatch(&Click::row("accent")).await, Outcome::Failed);
    assert_eq!(dismissed.value("accent"), Some(ItemValue::from("#ff0000")));
    assert!(dismissed.changes().is_empty());
    assert_eq!(logs.text(), "");

    let closed = harness(vec![prompt_item("name")], MockDialogs::new().failing());
    assert_eq!(closed.dispatcher.dispatch(&Click::row("name")).await, Outcome::Failed);
    assert!(logs.text().contains("ERROR"));
    assert!(logs.text().contains("Interaction on `name` failed"));
  }

  #[tokio::test]
  async fn test_failed_interaction_releases_the_key() {
    let h = harness(vec![prompt_item("name")], MockDialogs::new().failing());

    assert_eq!(h.dispatcher.dispatch(&Click::row("name")).await, Outcome::Failed);
    assert_eq!(h.dispatcher.dispatch(&Click::row("name")).await, Outcome::Failed);
    assert_eq!(h.dialogs.calls().len(), 2);
  }

  #[tokio::test]
  async fn test_overlapping_click_on_same_key_is_dropped() {
    let gate = Arc::new(Notify::new());
    let h = harness(
      vec![prompt_item("name"), prompt_item("other")],
      MockDialogs::new().with_prompt_reply(Some("new")).gated(gate.clone()),
    );

    let first = {
      let dispatcher = h.dispatcher.clone();
      tokio::spawn(async move { dispatcher.dispatch(&Click::row("name")).await })
    };
    while h.dialogs.calls().is_empty() {
      tokio::task::yield_now().await;
    }

    let overlapping = h.dispatcher.dispatch(&Click::row("name")).await;
    let other = {
      let dispatcher = h.dispatcher.clone();
      tokio::spawn(async move { dispatcher.dispatch(&Click::row("other")).await })
    };
    while h.dialogs.calls().len() < 2 {
      tokio::task::yield_now().await;
    }
    gate.notify_one();
    gate.notify_one();

    assert_eq!(overlapping, Outcome::Busy);
    assert_eq!(first.await.unwrap(), Outcome::Committed(ItemValue::from("new")));
    assert_eq!(other.await.unwrap(), Outcome::Committed(ItemValue::from("new")));
    assert_eq!(h.changes().len(), 2);
    gate.notify_one();
    assert_eq!(h.dispatcher.dispatch(&Click::row("name")).await, Outcome::Committed(ItemValue::from("new")));
  }

  #[tokio::test]
  async fn test_info_click_raises_alert() {
    let h = harness(vec![ListItem::new("about", "About").with_info("Build 42")], MockDialogs::new());

    let outcome = h.dispatcher.dispatch(&Click::info("about")).await;

    assert_eq!(outcome, Outcome::InfoShown);
    assert_eq!(
      h.dialogs.calls(),
      vec![DialogCall::Alert { title: "Info".to_string(), message: "Build 42".to_string() }]
    );
    assert!(h.changes().is_empty());
  }
}
