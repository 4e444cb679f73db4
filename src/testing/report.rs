//! Readable renderings of timelines for mismatch reports.

use std::fmt::Debug;

use crate::{
  marble::{MarbleValue, ValueMap, format_sequence},
  notification::{Frame, SubscriptionWindow, TimedRecord},
};

/// One record per line, preceded by the diagram when the timeline can be
/// written as one.
pub(crate) fn render_records<T, E>(
  records: &[TimedRecord<T, E>], tick: Frame, values: Option<&ValueMap<T>>,
) -> String
where
  T: MarbleValue + PartialEq + Debug,
  E: Debug,
{
  if records.is_empty() {
    return "  (no notifications)".to_owned();
  }
  let mut lines = Vec::with_capacity(records.len() + 1);
  if let Some(diagram) = format_sequence(records, tick, values) {
    lines.push(format!("  {diagram}"));
  }
  lines.extend(records.iter().map(|r| format!("  {r}")));
  lines.join("\n")
}

pub(crate) fn render_windows(windows: &[SubscriptionWindow], tick: Frame) -> String {
  if windows.is_empty() {
    return "  (no subscriptions)".to_owned();
  }
  windows
    .iter()
    .map(|w| match window_diagram(w, tick) {
      Some(diagram) => format!("  {w} {diagram}"),
      None => format!("  {w}"),
    })
    .collect::<Vec<_>>()
    .join("\n")
}

fn window_diagram(window: &SubscriptionWindow, tick: Frame) -> Option<String> {
  let tick = tick.max(1);
  if window.subscribed % tick != 0 {
    return None;
  }
  let mut out = "-".repeat((window.subscribed / tick) as usize);
  match window.unsubscribed {
    None => out.push('^'),
    Some(end) if end == window.subscribed => out.push_str("(^!)"),
    Some(end) if end % tick == 0 => {
      out.push('^');
      out.push_str(&"-".repeat(((end - window.subscribed) / tick - 1) as usize));
      out.push('!');
    }
    Some(_) => return None,
  }
  Some(out)
}
