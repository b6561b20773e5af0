use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("dialog closed before answering")]
  DialogClosed,
  #[error("dialog dismissed: {0}")]
  Dismissed(String),
  #[error("duplicate settings key `{0}`")]
  DuplicateKey(String),
  #[error(transparent)]
  Json5(#[from] json5::Error),
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error(transparent)]
  Config(#[from] config::ConfigError),
}
