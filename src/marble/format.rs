use std::fmt::Write;

use super::value::{MarbleValue, ValueMap};
use crate::notification::{Frame, Notification, TimedRecord};

/// Renders records back into a diagram.
///
/// Returns `None` when the timeline cannot be written unambiguously: a frame
/// off the tick grid, or a value with no single alphanumeric token (looked up
/// in `values` first, then [`MarbleValue::to_token`]).
///
/// ```rust
/// use rxmarble::{marble::format_sequence, notification::TimedRecord};
///
/// let records = vec![
///   TimedRecord::<char, &str>::next(10, 'a'),
///   TimedRecord::next(10, 'b'),
///   TimedRecord::complete(30),
/// ];
/// assert_eq!(format_sequence(&records, 10, None).as_deref(), Some("-(ab)-|"));
/// ```
pub fn format_sequence<T, E>(
  records: &[TimedRecord<T, E>], tick: Frame, values: Option<&ValueMap<T>>,
) -> Option<String>
where
  T: MarbleValue + PartialEq,
{
  let tick = tick.max(1);
  let mut out = String::new();
  let mut slot: Frame = 0;
  let mut idx = 0;

  while idx < records.len() {
    let frame = records[idx].frame;
    if frame % tick != 0 || frame / tick < slot {
      return None;
    }
    while slot < frame / tick {
      out.push('-');
      slot += 1;
    }

    let same_frame = records[idx..].iter().take_while(|r| r.frame == frame).count();
    let mut tokens = String::with_capacity(same_frame);
    for record in &records[idx..idx + same_frame] {
      tokens.push(token_for(&record.notification, values)?);
    }
    if same_frame > 1 {
      let _ = write!(out, "({tokens})");
    } else {
      out.push_str(&tokens);
    }
    slot += 1;
    idx += same_frame;
  }
  Some(out)
}

fn token_for<T, E>(notification: &Notification<T, E>, values: Option<&ValueMap<T>>) -> Option<char>
where
  T: MarbleValue + PartialEq,
{
  match notification {
    Notification::Next(v) => values
      .and_then(|map| map.token_of(v))
      .or_else(|| v.to_token())
      .filter(|c| c.is_alphanumeric()),
    Notification::Error(_) => Some('#'),
    Notification::Complete => Some('|'),
  }
}
