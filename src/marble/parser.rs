use tracing::trace;

use super::value::{ErrorMarker, MarbleValue, ValueMap};
use crate::{
  config::{MarbleConfig, MarkerPolicy},
  error::MarbleError,
  notification::{Frame, MarbleSequence, Notification, SubscriptionWindow, TimedRecord},
};

/// Turns diagrams into timelines under one [`MarbleConfig`].
///
/// ```rust
/// use rxmarble::{marble::MarbleParser, notification::TimedRecord};
///
/// let parser = MarbleParser::default();
/// let seq = parser.parse_sequence::<char, &str>("---a---b---|", None, None).unwrap();
/// assert_eq!(
///   seq.records(),
///   &[TimedRecord::next(30, 'a'), TimedRecord::next(70, 'b'), TimedRecord::complete(110)]
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MarbleParser {
  config: MarbleConfig,
}

/// Tracks the frame of the character under the cursor. Every character
/// outside a group takes one tick; a whole group takes one tick.
struct Timeline {
  tick: Frame,
  slot: Frame,
  group: Option<(usize, Frame)>,
}

impl Timeline {
  fn new(tick: Frame) -> Self { Self { tick, slot: 0, group: None } }

  fn frame(&self, diagram: &str, position: usize) -> Result<Frame, MarbleError> {
    match self.group {
      Some((_, frame)) => Ok(frame),
      None => self
        .slot
        .checked_mul(self.tick)
        .ok_or_else(|| MarbleError::malformed(diagram, position, "frame exceeds the clock range")),
    }
  }

  fn open_group(&mut self, diagram: &str, position: usize) -> Result<(), MarbleError> {
    if self.group.is_some() {
      return Err(MarbleError::malformed(diagram, position, "groups cannot be nested"));
    }
    self.group = Some((position, self.frame(diagram, position)?));
    Ok(())
  }

  fn close_group(&mut self, diagram: &str, position: usize) -> Result<(), MarbleError> {
    if self.group.take().is_none() {
      return Err(MarbleError::malformed(diagram, position, "`)` without a matching `(`"));
    }
    self.slot += 1;
    Ok(())
  }

  fn advance(&mut self) {
    if self.group.is_none() {
      self.slot += 1;
    }
  }

  fn finish(&self, diagram: &str) -> Result<(), MarbleError> {
    match self.group {
      Some((position, _)) => Err(MarbleError::malformed(diagram, position, "unclosed group")),
      None => Ok(()),
    }
  }
}

impl MarbleParser {
  pub fn new(config: MarbleConfig) -> Self { Self { config } }

  pub fn config(&self) -> &MarbleConfig { &self.config }

  /// Parses an emission diagram.
  ///
  /// Tokens resolve through `values` first and fall back to their literal
  /// meaning. `#` raises `error`, or the type's [`ErrorMarker`] when none is
  /// given.
  pub fn parse_sequence<T, E>(
    &self, diagram: &str, values: Option<&ValueMap<T>>, error: Option<E>,
  ) -> Result<MarbleSequence<T, E>, MarbleError>
  where
    T: MarbleValue + Clone,
    E: ErrorMarker,
  {
    let mut timeline = Timeline::new(self.config.tick_frames());
    let mut records = Vec::new();
    let mut origin = None;
    let mut error = error;
    let mut terminated = false;

    for (position, ch) in diagram.chars().enumerate() {
      if ch.is_whitespace() {
        continue;
      }
      let frame = timeline.frame(diagram, position)?;
      match ch {
        '-' => {}
        '(' => {
          if terminated {
            return Err(trailing(diagram, position));
          }
          timeline.open_group(diagram, position)?;
          continue;
        }
        ')' => {
          timeline.close_group(diagram, position)?;
          continue;
        }
        '|' => {
          if terminated {
            return Err(trailing(diagram, position));
          }
          records.push(TimedRecord::complete(frame));
          terminated = true;
        }
        '#' => {
          if terminated {
            return Err(trailing(diagram, position));
          }
          let err = error
            .take()
            .or_else(E::error_marker)
            .ok_or_else(|| MarbleError::MissingErrorValue { diagram: diagram.to_owned() })?;
          records.push(TimedRecord::error(frame, err));
          terminated = true;
        }
        '^' | '!' => {
          if self.config.policy() == MarkerPolicy::Strict {
            return Err(MarbleError::malformed(
              diagram,
              position,
              format!("`{ch}` is not allowed in a strict emission diagram"),
            ));
          }
          if ch == '^' {
            if origin.is_some() {
              return Err(MarbleError::MultipleSubscriptionMarkers {
                diagram: diagram.to_owned(),
                marker: '^',
              });
            }
            origin = Some(frame);
          }
        }
        token if token.is_alphanumeric() => {
          if terminated {
            return Err(trailing(diagram, position));
          }
          let value = values
            .and_then(|map| map.get(token).cloned())
            .or_else(|| T::from_token(token))
            .ok_or_else(|| MarbleError::UnmappedToken { diagram: diagram.to_owned(), token })?;
          records.push(TimedRecord { frame, notification: Notification::Next(value) });
        }
        other => {
          return Err(MarbleError::malformed(diagram, position, format!("unexpected `{other}`")));
        }
      }
      timeline.advance();
    }
    timeline.finish(diagram)?;

    trace!(diagram, records = records.len(), ?origin, "parsed marble sequence");
    MarbleSequence::with_origin(records, origin)
  }

  /// Parses a subscription diagram made of `-`, `^`, `!` and groups.
  pub fn parse_subscription_window(&self, diagram: &str) -> Result<SubscriptionWindow, MarbleError> {
    let mut timeline = Timeline::new(self.config.tick_frames());
    let mut subscribed = None;
    let mut unsubscribed = None;

    for (position, ch) in diagram.chars().enumerate() {
      if ch.is_whitespace() {
        continue;
      }
      let frame = timeline.frame(diagram, position)?;
      match ch {
        '-' => {}
        '(' => {
          timeline.open_group(diagram, position)?;
          continue;
        }
        ')' => {
          timeline.close_group(diagram, position)?;
          continue;
        }
        '^' | '!' => {
          let slot = if ch == '^' { &mut subscribed } else { &mut unsubscribed };
          if slot.replace(frame).is_some() {
            return Err(MarbleError::MultipleSubscriptionMarkers {
              diagram: diagram.to_owned(),
              marker: ch,
            });
          }
        }
        other => {
          return Err(MarbleError::malformed(
            diagram,
            position,
            format!("unexpected `{other}` in a subscription diagram"),
          ));
        }
      }
      timeline.advance();
    }
    timeline.finish(diagram)?;

    let subscribed = subscribed.unwrap_or(0);
    if let Some(end) = unsubscribed
      && end < subscribed
    {
      return Err(MarbleError::InvertedWindow {
        diagram: diagram.to_owned(),
        subscribed,
        unsubscribed: end,
      });
    }
    Ok(SubscriptionWindow { subscribed, unsubscribed })
  }

  /// Frame of the `|` in `diagram`, for expressing delays as diagrams.
  pub fn time(&self, diagram: &str) -> Result<Frame, MarbleError> {
    let seq = self.parse_sequence::<char, &'static str>(diagram, None, None)?;
    match seq.terminal() {
      Some(TimedRecord { frame, notification: Notification::Complete }) => Ok(*frame),
      _ => Err(MarbleError::malformed(diagram, diagram.chars().count(), "no `|` to measure")),
    }
  }
}

fn trailing(diagram: &str, position: usize) -> MarbleError {
  MarbleError::TrailingTokensAfterTerminal { diagram: diagram.to_owned(), position }
}

/// [`MarbleParser::parse_sequence`] with the default configuration.
pub fn parse_sequence<T, E>(
  diagram: &str, values: Option<&ValueMap<T>>, error: Option<E>,
) -> Result<MarbleSequence<T, E>, MarbleError>
where
  T: MarbleValue + Clone,
  E: ErrorMarker,
{
  MarbleParser::default().parse_sequence(diagram, values, error)
}

/// [`MarbleParser::parse_subscription_window`] with the default
/// configuration.
pub fn parse_subscription_window(diagram: &str) -> Result<SubscriptionWindow, MarbleError> {
  MarbleParser::default().parse_subscription_window(diagram)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::notification::NotificationKind;

  type Rec = TimedRecord<char, &'static str>;

  fn seq(diagram: &str) -> Result<MarbleSequence<char, &'static str>, MarbleError> {
    parse_sequence(diagram, None, None)
  }

  #[rxmarble_macro::test]
  fn reference_diagram() {
    let parsed = seq("---a---b---|").unwrap();
    assert_eq!(parsed.records(), &[Rec::next(30, 'a'), Rec::next(70, 'b'), Rec::complete(110)]);
  }

  #[rxmarble_macro::test]
  fn whitespace_takes_no_time() {
    assert_eq!(seq("  -a - b|  ").unwrap(), seq("-a-b|").unwrap());
  }

  #[rxmarble_macro::test]
  fn group_shares_one_frame_and_one_tick() {
    let grouped = seq("(abc|)").unwrap();
    assert_eq!(
      grouped.records(),
      &[Rec::next(0, 'a'), Rec::next(0, 'b'), Rec::next(0, 'c'), Rec::complete(0)]
    );

    let spread = seq("abc|").unwrap();
    let frames: Vec<_> = spread.records().iter().map(|r| r.frame).collect();
    assert_eq!(frames, vec![0, 10, 20, 30]);
    assert_ne!(grouped, spread);

    let after = seq("-(ab)-c").unwrap();
    assert_eq!(after.records(), &[Rec::next(10, 'a'), Rec::next(10, 'b'), Rec::next(30, 'c')]);
  }

  #[rxmarble_macro::test]
  fn values_and_errors_resolve() {
    let values = ValueMap::from([('a', 1), ('b', 2)]);
    let parsed = parse_sequence("a-b-3#", Some(&values), Some("Number too high!")).unwrap();
    assert_eq!(
      parsed.records(),
      &[
        TimedRecord::next(0, 1),
        TimedRecord::next(20, 2),
        TimedRecord::next(40, 3),
        TimedRecord::error(50, "Number too high!"),
      ]
    );

    let default_error = seq("--#").unwrap();
    assert_eq!(default_error.records(), &[Rec::error(20, "error")]);
  }

  #[rxmarble_macro::test]
  fn unmapped_and_missing_values() {
    let values = ValueMap::from([('a', 1)]);
    let err = parse_sequence::<i32, &str>("a-x", Some(&values), None).unwrap_err();
    assert_eq!(err, MarbleError::UnmappedToken { diagram: "a-x".into(), token: 'x' });

    let err = parse_sequence::<char, std::convert::Infallible>("-#", None, None).unwrap_err();
    assert_eq!(err, MarbleError::MissingErrorValue { diagram: "-#".into() });
  }

  #[rxmarble_macro::test]
  fn malformed_symbols() {
    let err = seq("-a-?").unwrap_err();
    assert!(matches!(err, MarbleError::MalformedDiagram { position: 3, .. }));
    assert!(matches!(seq("((a))").unwrap_err(), MarbleError::MalformedDiagram { position: 1, .. }));
    assert!(matches!(seq("(ab").unwrap_err(), MarbleError::MalformedDiagram { position: 0, .. }));
    assert!(matches!(seq("ab)").unwrap_err(), MarbleError::MalformedDiagram { position: 2, .. }));
  }

  #[rxmarble_macro::test]
  fn nothing_emits_after_terminal() {
    assert_eq!(
      seq("-a|b").unwrap_err(),
      MarbleError::TrailingTokensAfterTerminal { diagram: "-a|b".into(), position: 3 }
    );
    assert!(matches!(seq("#-|").unwrap_err(), MarbleError::TrailingTokensAfterTerminal { .. }));
    assert!(matches!(seq("|(a)").unwrap_err(), MarbleError::TrailingTokensAfterTerminal { .. }));
    // Time may still pass, and a group may close around its terminal.
    assert!(seq("-a|---").is_ok());
    assert!(seq("(a|)--").is_ok());
  }

  #[rxmarble_macro::test]
  fn caret_is_a_zero_emission_origin() {
    let parsed = seq("---a--^-b-|").unwrap();
    assert_eq!(parsed.origin(), Some(60));
    assert_eq!(parsed.len(), 3);
    assert!(parsed.records().iter().all(|r| r.frame != 60));

    let rebased = parsed.relative_to_origin();
    assert_eq!(rebased.records(), &[Rec::next(20, 'b'), Rec::complete(40)]);

    assert!(matches!(seq("^-^").unwrap_err(), MarbleError::MultipleSubscriptionMarkers { .. }));
    assert_eq!(seq("a!b").unwrap().records(), &[Rec::next(0, 'a'), Rec::next(20, 'b')]);
  }

  #[rxmarble_macro::test]
  fn strict_policy_rejects_markers() {
    let parser = MarbleParser::new(MarbleConfig::new().strict_markers());
    for diagram in ["^-a|", "-a-!"] {
      let err = parser.parse_sequence::<char, &str>(diagram, None, None).unwrap_err();
      assert!(matches!(err, MarbleError::MalformedDiagram { .. }), "{diagram}");
    }
    assert!(parser.parse_sequence::<char, &str>("-a|", None, None).is_ok());
  }

  #[rxmarble_macro::test]
  fn custom_tick() {
    let parser = MarbleParser::new(MarbleConfig::new().tick(1));
    let parsed = parser.parse_sequence::<char, &str>("--a|", None, None).unwrap();
    assert_eq!(parsed.records(), &[Rec::next(2, 'a'), Rec::complete(3)]);
  }

  #[rxmarble_macro::test]
  fn huge_ticks_fail_instead_of_overflowing() {
    let parser = MarbleParser::new(MarbleConfig::new().tick(u64::MAX / 2));
    let err = parser.parse_sequence::<char, &str>("---a|", None, None).unwrap_err();
    assert!(matches!(err, MarbleError::MalformedDiagram { position: 3, .. }));
    assert!(matches!(
      parser.parse_subscription_window("---^").unwrap_err(),
      MarbleError::MalformedDiagram { position: 3, .. }
    ));
    assert_eq!(parser.parse_sequence::<char, &str>("--a", None, None).unwrap().records(), &[
      Rec::next(u64::MAX - 1, 'a')
    ]);
  }

  #[rxmarble_macro::test]
  fn subscription_windows() {
    assert_eq!(parse_subscription_window("^------!").unwrap(), SubscriptionWindow {
      subscribed: 0,
      unsubscribed: Some(70)
    });
    assert_eq!(parse_subscription_window("--^--").unwrap(), SubscriptionWindow::open(20));
    assert_eq!(parse_subscription_window("").unwrap(), SubscriptionWindow::open(0));
    assert_eq!(parse_subscription_window("---!").unwrap(), SubscriptionWindow {
      subscribed: 0,
      unsubscribed: Some(30)
    });
    assert_eq!(parse_subscription_window("-(^!)").unwrap(), SubscriptionWindow {
      subscribed: 10,
      unsubscribed: Some(10)
    });
  }

  #[rxmarble_macro::test]
  fn malformed_subscription_windows() {
    assert_eq!(
      parse_subscription_window("^-^-!").unwrap_err(),
      MarbleError::MultipleSubscriptionMarkers { diagram: "^-^-!".into(), marker: '^' }
    );
    assert!(matches!(
      parse_subscription_window("^-!!").unwrap_err(),
      MarbleError::MultipleSubscriptionMarkers { marker: '!', .. }
    ));
    assert_eq!(
      parse_subscription_window("-!-^").unwrap_err(),
      MarbleError::InvertedWindow { diagram: "-!-^".into(), subscribed: 30, unsubscribed: 10 }
    );
    assert!(matches!(
      parse_subscription_window("^-a-!").unwrap_err(),
      MarbleError::MalformedDiagram { position: 2, .. }
    ));
  }

  #[rxmarble_macro::test]
  fn time_measures_to_the_pipe() {
    let parser = MarbleParser::default();
    assert_eq!(parser.time("---|").unwrap(), 30);
    assert_eq!(parser.time("|").unwrap(), 0);
    assert!(parser.time("---").is_err());
  }

  #[rxmarble_macro::test]
  fn kinds_in_order() {
    let kinds: Vec<_> =
      seq("a(b#)").unwrap().records().iter().map(|r| r.notification.kind()).collect();
    assert_eq!(kinds, vec![NotificationKind::Next, NotificationKind::Next, NotificationKind::Error]);
  }
}
