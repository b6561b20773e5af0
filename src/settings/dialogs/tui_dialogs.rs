use async_trait::async_trait;
use tokio::sync::{mpsc::UnboundedSender, oneshot};
use tracing::{error, info};

use super::types::{Dialogs, PickedPath};
use crate::{
  error::Error,
  settings::item::{ItemValue, PathMode, PromptOptions, PromptType, SelectOption},
};

/// A dialog the terminal host has to show. Every request except `Alert`
/// carries the channel its answer goes back on; `None` means the user backed out.
#[derive(Debug)]
pub enum DialogRequest {
  Select {
    title: String,
    options: Vec<SelectOption>,
    default: Option<ItemValue>,
    reply: oneshot::Sender<Option<ItemValue>>,
  },
  Prompt {
    text: String,
    default: Option<String>,
    prompt_type: PromptType,
    options: PromptOptions,
    reply: oneshot::Sender<Option<String>>,
  },
  Color { default: Option<String>, reply: oneshot::Sender<Option<String>> },
  PickPath { mode: PathMode, reply: oneshot::Sender<Option<String>> },
  Alert { title: String, message: String },
}

/// Forwards dialogs to the host's event loop and waits for the answer.
#[derive(Debug, Clone)]
pub struct TuiDialogs {
  tx: UnboundedSender<DialogRequest>,
}

impl TuiDialogs {
  pub fn new(tx: UnboundedSender<DialogRequest>) -> Self {
    TuiDialogs { tx }
  }

  async fn ask<T: Send>(&self, build: impl FnOnce(oneshot::Sender<T>) -> DialogRequest + Send) -> Result<T, Error> {
    let (reply, answer) = oneshot::channel();
    self.tx.send(build(reply)).map_err(|_| Error::DialogClosed)?;
    answer.await.map_err(|_| Error::DialogClosed)
  }
}

#[async_trait]
impl Dialogs for TuiDialogs {
  async fn select(
    &self,
    title: &str,
    options: &[SelectOption],
    default: Option<&ItemValue>,
  ) -> Result<Option<ItemValue>, Error> {
    let (title, options, default) = (title.to_string(), options.to_vec(), default.cloned());
    self.ask(|reply| DialogRequest::Select { title, options, default, reply }).await
  }

  async fn prompt(
    &self,
    text: &str,
    default: Option<&ItemValue>,
    prompt_type: PromptType,
    options: &PromptOptions,
  ) -> Result<Option<String>, Error> {
    let (text, default, options) = (text.to_string(), default.map(ItemValue::to_string), options.clone());
    self.ask(|reply| DialogRequest::Prompt { text, default, prompt_type, options, reply }).await
  }

  async fn color(&self, default: Option<&ItemValue>) -> Result<String, Error> {
    let default = default.map(ItemValue::to_string);
    let color = self.ask(|reply| DialogRequest::Color { default, reply }).await?;
    color.ok_or_else(|| Error::Dismissed("color".to_string()))
  }

  async fn pick_path(&self, mode: PathMode) -> Result<PickedPath, Error> {
    let url = self.ask(|reply| DialogRequest::PickPath { mode, reply }).await?;
    url.map(|url| PickedPath { url }).ok_or_else(|| Error::Dismissed(mode.to_string()))
  }

  fn alert(&self, title: &str, message: &str) {
    let request = DialogRequest::Alert { title: title.to_string(), message: message.to_string() };
    if self.tx.send(request).is_err() {
      error!("Dropped alert `{}`: dialog host is gone", title);
    }
  }

  fn open_link(&self, url: &str) {
    info!("Opening {}", url);
    if let Err(err) = open::that_detached(url) {
      error!("Failed to open {}: {}", url, err);
    }
  }
}
