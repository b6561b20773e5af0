use async_trait::async_trait;

use crate::{
  error::Error,
  settings::item::{ItemValue, PathMode, PromptOptions, PromptType, SelectOption},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedPath {
  pub url: String,
}

/// The dialogs an interaction can open. Implemented by the terminal host and by
/// test doubles.
#[async_trait]
pub trait Dialogs: Send + Sync {
  /// Resolves with the chosen option, or `None` when the user backs out.
  async fn select(
    &self,
    title: &str,
    options: &[SelectOption],
    default: Option<&ItemValue>,
  ) -> Result<Option<ItemValue>, Error>;

  /// Resolves with the entered text, or `None` when the user cancels.
  async fn prompt(
    &self,
    text: &str,
    default: Option<&ItemValue>,
    prompt_type: PromptType,
    options: &PromptOptions,
  ) -> Result<Option<String>, Error>;

  async fn color(&self, default: Option<&ItemValue>) -> Result<String, Error>;

  async fn pick_path(&self, mode: PathMode) -> Result<PickedPath, Error>;

  fn alert(&self, title: &str, message: &str);

  fn open_link(&self, url: &str);
}
