use std::path::Path;

use tracing::info;

use super::{
  item::{ItemDescriptor, ListItem},
  store::SharedItems,
};
use crate::error::Error;

const DEFAULT_ITEMS: &str = include_str!("../../assets/items.json5");

/// Parses a JSON5 array of item descriptors.
pub fn parse_items(source: &str) -> Result<Vec<ListItem>, Error> {
  let descriptors: Vec<ItemDescriptor> = json5::from_str(source)?;
  Ok(descriptors.into_iter().map(ListItem::from).collect())
}

pub fn load_items(path: &Path) -> Result<SharedItems, Error> {
  let source = std::fs::read_to_string(path)?;
  let items = parse_items(&source)?;
  info!("Loaded {} settings from {}", items.len(), path.display());
  SharedItems::from_items(items)
}

pub fn default_items() -> Result<SharedItems, Error> {
  SharedItems::from_items(parse_items(DEFAULT_ITEMS)?)
}
