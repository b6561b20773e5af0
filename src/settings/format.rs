use super::item::{ItemValue, ValueText};

pub const MAX_VALUE_CHARS: usize = 47;
pub const ELLIPSIS: &str = "...";

/// Compact display text for a value.
///
/// The item's own formatter runs first when present. Text is cut at the first
/// line break and shortened to [`MAX_VALUE_CHARS`] characters plus [`ELLIPSIS`].
/// Non-text values are shown as they stringify.
pub fn format_value(value: &ItemValue, formatter: Option<&ValueText>) -> String {
  match formatter {
    Some(formatter) => compact(&formatter(value)),
    None => match value.as_str() {
      Some(text) => compact(text),
      None => value.to_string(),
    },
  }
}

fn compact(text: &str) -> String {
  let first_line = text.split('\n').next().unwrap_or_default();
  if first_line.chars().count() > MAX_VALUE_CHARS {
    let kept: String = first_line.chars().take(MAX_VALUE_CHARS).collect();
    format!("{kept}{ELLIPSIS}")
  } else {
    first_line.to_string()
  }
}
