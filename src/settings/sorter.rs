use std::cmp::Ordering;

use super::item::ListItem;

/// Structural order of a list before placement: entries without an explicit
/// index (`loose`) and entries pinned to one (`pinned`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
  pub loose: Vec<usize>,
  pub pinned: Vec<usize>,
}

/// Loose entries ascend by key. Pinned entries ascend by index, ties broken by key.
pub fn structural_order(items: &[ListItem]) -> Order {
  let (mut pinned, mut loose): (Vec<usize>, Vec<usize>) =
    (0..items.len()).partition(|&slot| items[slot].index.is_some());
  loose.sort_by(|&a, &b| items[a].key.cmp(&items[b].key));
  pinned.sort_by(|&a, &b| by_index(&items[a], &items[b]));
  Order { loose, pinned }
}

fn by_index(a: &ListItem, b: &ListItem) -> Ordering {
  a.index.cmp(&b.index).then_with(|| a.key.cmp(&b.key))
}

/// Sorts the loose entries by their label. Stable, so equal labels keep key order.
pub fn sort_by_text(items: &[ListItem], order: &mut Order) {
  order.loose.sort_by(|&a, &b| items[a].text.cmp(&items[b].text));
}

/// Appends loose entries, then splices each pinned entry at its index.
///
/// Indices past the end land at the end. A later entry pinned to an occupied
/// position pushes the earlier one down; nothing is dropped.
pub fn place(items: &[ListItem], order: Order) -> Vec<usize> {
  let Order { loose, pinned } = order;
  let mut rows = loose;
  for slot in pinned {
    let at = items[slot].index.unwrap_or(rows.len()).min(rows.len());
    rows.insert(at, slot);
  }
  rows
}

/// Final row order as slots into `items`.
pub fn arrange(items: &[ListItem], sort_alphabetically: bool) -> Vec<usize> {
  let mut order = structural_order(items);
  if sort_alphabetically {
    sort_by_text(items, &mut order);
  }
  place(items, order)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn keys(items: &[ListItem], rows: &[usize]) -> Vec<String> {
    rows.iter().map(|&slot| items[slot].key.clone()).collect()
  }

  #[test]
  fn test_loose_items_follow_key_order() {
    let items = vec![ListItem::new("c", "Zeta"), ListItem::new("a", "Alpha"), ListItem::new("b", "Beta")];

    let rows = arrange(&items, false);

    assert_eq!(keys(&items, &rows), vec!["a", "b", "c"]);
  }

  #[test]
  fn test_key_order_does_not_depend_on_input_order() {
    let forward = vec![ListItem::new("a", "x"), ListItem::new("b", "x"), ListItem::new("c", "x")];
    let backward = vec![ListItem::new("c", "x"), ListItem::new("b", "x"), ListItem::new("a", "x")];

    assert_eq!(keys(&forward, &arrange(&forward, true)), keys(&backward, &arrange(&backward, true)));
  }

  #[test]
  fn test_alphabetical_pass_sorts_by_text() {
    let items = vec![ListItem::new("a", "Zoom"), ListItem::new("b", "Font"), ListItem::new("c", "Auto save")];

    let rows = arrange(&items, true);

    assert_eq!(keys(&items, &rows), vec!["c", "b", "a"]);
  }

  #[test]
  fn test_alphabetical_pass_leaves_pinned_items_in_place() {
    let items = vec![
      ListItem::new("a", "Zoom"),
      ListItem::new("b", "Font"),
      ListItem::new("pinned", "Aaa").with_index(2),
      ListItem::new("c", "Auto save"),
    ];

    let rows = arrange(&items, true);

    assert_eq!(keys(&items, &rows), vec!["c", "b", "pinned", "a"]);
  }

  #[test]
  fn test_pinned_items_land_at_their_index() {
    let items = vec![
      ListItem::new("a", "A"),
      ListItem::new("b", "B"),
      ListItem::new("c", "C"),
      ListItem::new("first", "First").with_index(0),
      ListItem::new("third", "Third").with_index(2),
    ];

    let rows = arrange(&items, false);

    assert_eq!(keys(&items, &rows), vec!["first", "a", "third", "b", "c"]);
  }

  #[test]
  fn test_colliding_index_displaces_without_dropping() {
    let items = vec![
      ListItem::new("a", "A"),
      ListItem::new("x", "X").with_index(1),
      ListItem::new("y", "Y").with_index(1),
      ListItem::new("b", "B"),
    ];

    let rows = arrange(&items, false);

    assert_eq!(keys(&items, &rows), vec!["a", "y", "x", "b"]);
  }

  #[test]
  fn test_out_of_range_index_appends() {
    let items = vec![ListItem::new("far", "Far").with_index(40), ListItem::new("a", "A")];

    let rows = arrange(&items, false);

    assert_eq!(keys(&items, &rows), vec!["a", "far"]);
  }
}
