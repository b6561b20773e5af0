use serde::{Deserialize, Serialize};
use strum::Display;

use crate::settings::Click;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum Action {
  Click(Click),
  DialogClosed,
  Error(String),
  ExitError,
  Quit,
  Render,
  Resize(u16, u16),
  Resume,
  SelectNext,
  SelectPrevious,
  Suspend,
  Tick,
  ValueChanged { key: String, value: String },
}
