#[cfg(test)]
pub mod mock_dialogs;
pub mod tui_dialogs;
pub mod types;

pub use tui_dialogs::{DialogRequest, TuiDialogs};
pub use types::{Dialogs, PickedPath};
