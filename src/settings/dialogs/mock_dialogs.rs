use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::types::{Dialogs, PickedPath};
use crate::{
  error::Error,
  settings::item::{ItemValue, PathMode, PromptOptions, PromptType, SelectOption},
};

#[derive(Debug, Clone, PartialEq)]
pub enum DialogCall {
  Select { title: String, default: Option<ItemValue> },
  Prompt { text: String, default: Option<ItemValue>, prompt_type: PromptType },
  Color { default: Option<ItemValue> },
  PickPath(PathMode),
  Alert { title: String, message: String },
  OpenLink(String),
}

/// Scripted dialogs. Every answer is fixed up front; `gated` holds async
/// answers back until the test notifies. `failing` drops the dialog,
/// `dismissing` answers as if the user pressed Esc on a picker.
#[derive(Debug, Default)]
pub struct MockDialogs {
  select_reply: Option<ItemValue>,
  prompt_reply: Option<String>,
  color_reply: String,
  path_reply: String,
  fail: bool,
  dismiss: bool,
  gate: Option<Arc<Notify>>,
  calls: Mutex<Vec<DialogCall>>,
}

impl MockDialogs {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_select_reply(mut self, reply: Option<ItemValue>) -> Self {
    self.select_reply = reply;
    self
  }

  pub fn with_prompt_reply(mut self, reply: Option<&str>) -> Self {
    self.prompt_reply = reply.map(str::to_string);
    self
  }

  pub fn with_color_reply(mut self, reply: &str) -> Self {
    self.color_reply = reply.to_string();
    self
  }

  pub fn with_path_reply(mut self, reply: &str) -> Self {
    self.path_reply = reply.to_string();
    self
  }

  pub fn failing(mut self) -> Self {
    self.fail = true;
    self
  }

  pub fn dismissing(mut self) -> Self {
    self.dismiss = true;
    self
  }

  pub fn gated(mut self, gate: Arc<Notify>) -> Self {
    self.gate = Some(gate);
    self
  }

  pub fn calls(&self) -> Vec<DialogCall> {
    self.calls.lock().unwrap().clone()
  }

  async fn answer<T: Send>(&self, call: DialogCall, reply: T) -> Result<T, Error> {
    self.calls.lock().unwrap().push(call);
    if let Some(gate) = &self.gate {
      gate.notified().await;
    }
    if self.dismiss {
      return Err(Error::Dismissed("mock picker".to_string()));
    }
    if self.fail { Err(Error::DialogClosed) } else { Ok(reply) }
  }
}

#[async_trait]
impl Dialogs for MockDialogs {
  async fn select(
    &self,
    title: &str,
    _options: &[SelectOption],
    default: Option<&ItemValue>,
  ) -> Result<Option<ItemValue>, Error> {
    let call = DialogCall::Select { title: title.to_string(), default: default.cloned() };
    self.answer(call, self.select_reply.clone()).await
  }

  async fn prompt(
    &self,
    text: &str,
    default: Option<&ItemValue>,
    prompt_type: PromptType,
    _options: &PromptOptions,
  ) -> Result<Option<String>, Error> {
    let call = DialogCall::Prompt { text: text.to_string(), default: default.cloned(), prompt_type };
    self.answer(call, self.prompt_reply.clone()).await
  }

  async fn color(&self, default: Option<&ItemValue>) -> Result<String, Error> {
    self.answer(DialogCall::Color { default: default.cloned() }, self.color_reply.clone()).await
  }

  async fn pick_path(&self, mode: PathMode) -> Result<PickedPath, Error> {
    self.answer(DialogCall::PickPath(mode), PickedPath { url: self.path_reply.clone() }).await
  }

  fn alert(&self, title: &str, message: &str) {
    self.calls.lock().unwrap().push(DialogCall::Alert { title: title.to_string(), message: message.to_string() });
  }

  fn open_link(&self, url: &str) {
    self.calls.lock().unwrap().push(DialogCall::OpenLink(url.to_string()));
  }
}
