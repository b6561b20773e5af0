pub mod dialogs;
pub mod dispatcher;
pub mod format;
pub mod item;
pub mod loader;
pub mod render;
pub mod sorter;
pub mod store;

pub use dispatcher::{Dispatcher, OnChange, Outcome};
pub use item::{InteractionKind, ItemDescriptor, ItemValue, ListItem};
pub use render::{ActionMarker, Click, ListView, Renderer, Row, RowControl};
pub use store::SharedItems;
