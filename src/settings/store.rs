use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use derive_deref::{Deref, DerefMut};

use super::item::{ItemValue, ListItem};
use crate::error::Error;

#[derive(Debug, Default, Clone, Deref, DerefMut)]
struct KeyIndex(HashMap<String, usize>);

#[derive(Debug, Default)]
struct ItemSlots {
  items: Vec<ListItem>,
  by_key: KeyIndex,
}

/// The caller's settings entries, shared with the dispatcher.
///
/// Cloning the handle shares the same entries: values committed by an
/// interaction are visible to every holder without copying items around.
#[derive(Debug, Default, Clone)]
pub struct SharedItems {
  inner: Arc<Mutex<ItemSlots>>,
}

impl SharedItems {
  pub fn from_items(items: Vec<ListItem>) -> Result<Self, Error> {
    let mut by_key = KeyIndex::default();
    for (slot, item) in items.iter().enumerate() {
      if by_key.insert(item.key.clone(), slot).is_some() {
        return Err(Error::DuplicateKey(item.key.clone()));
      }
    }
    Ok(SharedItems { inner: Arc::new(Mutex::new(ItemSlots { items, by_key })) })
  }

  fn lock(&self) -> MutexGuard<'_, ItemSlots> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn len(&self) -> usize {
    self.lock().items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn get(&self, key: &str) -> Option<ListItem> {
    let slots = self.lock();
    let slot = *slots.by_key.get(key)?;
    slots.items.get(slot).cloned()
  }

  pub fn value(&self, key: &str) -> Option<ItemValue> {
    self.get(key).and_then(|item| item.value)
  }

  /// Writes `value` into the entry for `key`. Returns false when the key is unknown.
  pub fn set_value(&self, key: &str, value: ItemValue) -> bool {
    let mut slots = self.lock();
    let Some(slot) = slots.by_key.get(key).copied() else {
      return false;
    };
    match slots.items.get_mut(slot) {
      Some(item) => {
        item.value = Some(value);
        true
      },
      None => false,
    }
  }

  pub(crate) fn with_items<R>(&self, f: impl FnOnce(&[ListItem]) -> R) -> R {
    f(&self.lock().items)
  }
}
