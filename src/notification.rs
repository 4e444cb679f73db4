//! Timeline data: notifications, timed records, sequences and subscription
//! windows.

use std::fmt;

use crate::error::MarbleError;

/// Logical time unit of the virtual scheduler.
pub type Frame = u64;

/// One event a producer can deliver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Notification<T, E> {
  Next(T),
  Error(E),
  Complete,
}

/// Discriminant of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
  Next,
  Error,
  Complete,
}

impl<T, E> Notification<T, E> {
  pub fn kind(&self) -> NotificationKind {
    match self {
      Notification::Next(_) => NotificationKind::Next,
      Notification::Error(_) => NotificationKind::Error,
      Notification::Complete => NotificationKind::Complete,
    }
  }

  /// The payload of a `Next`.
  pub fn value(&self) -> Option<&T> {
    match self {
      Notification::Next(v) => Some(v),
      _ => None,
    }
  }

  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }
}

/// A notification stamped with the frame it happened at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimedRecord<T, E> {
  pub frame: Frame,
  pub notification: Notification<T, E>,
}

impl<T, E> TimedRecord<T, E> {
  pub fn next(frame: Frame, value: T) -> Self {
    Self { frame, notification: Notification::Next(value) }
  }

  pub fn error(frame: Frame, err: E) -> Self {
    Self { frame, notification: Notification::Error(err) }
  }

  pub fn complete(frame: Frame) -> Self { Self { frame, notification: Notification::Complete } }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Display for TimedRecord<T, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.notification {
      Notification::Next(v) => write!(f, "@{} Next({v:?})", self.frame),
      Notification::Error(e) => write!(f, "@{} Error({e:?})", self.frame),
      Notification::Complete => write!(f, "@{} Complete", self.frame),
    }
  }
}

/// An immutable, validated timeline.
///
/// Frames never decrease and at most one terminal record exists, always in
/// last position. `origin` is the frame of the `^` the sequence was parsed
/// with, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarbleSequence<T, E> {
  records: Vec<TimedRecord<T, E>>,
  origin: Option<Frame>,
}

impl<T, E> MarbleSequence<T, E> {
  pub fn new(records: Vec<TimedRecord<T, E>>) -> Result<Self, MarbleError> {
    Self::with_origin(records, None)
  }

  pub fn with_origin(
    records: Vec<TimedRecord<T, E>>, origin: Option<Frame>,
  ) -> Result<Self, MarbleError> {
    for (idx, pair) in records.windows(2).enumerate() {
      if pair[1].frame < pair[0].frame {
        return Err(MarbleError::InvalidSequence {
          reason: format!(
            "record {} at frame {} precedes frame {}",
            idx + 1,
            pair[1].frame,
            pair[0].frame
          ),
        });
      }
    }
    if let Some(pos) = records.iter().position(|r| r.notification.is_terminal())
      && pos + 1 != records.len()
    {
      return Err(MarbleError::InvalidSequence {
        reason: format!("terminal record {pos} is followed by {} more", records.len() - pos - 1),
      });
    }
    Ok(Self { records, origin })
  }

  pub fn records(&self) -> &[TimedRecord<T, E>] { &self.records }

  pub fn into_records(self) -> Vec<TimedRecord<T, E>> { self.records }

  pub fn origin(&self) -> Option<Frame> { self.origin }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  /// The `Complete` or `Error` record ending the sequence.
  pub fn terminal(&self) -> Option<&TimedRecord<T, E>> {
    self.records.last().filter(|r| r.notification.is_terminal())
  }

  /// Rebases frames so the origin becomes frame 0. Records before the
  /// origin are dropped: nobody can observe them.
  pub fn relative_to_origin(self) -> Self {
    let Some(origin) = self.origin else { return self };
    let records = self
      .records
      .into_iter()
      .filter(|r| r.frame >= origin)
      .map(|r| TimedRecord { frame: r.frame - origin, notification: r.notification })
      .collect();
    Self { records, origin: Some(0) }
  }
}

/// When a consumer was attached to a producer. `unsubscribed` is `None`
/// while the window is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionWindow {
  pub subscribed: Frame,
  pub unsubscribed: Option<Frame>,
}

impl SubscriptionWindow {
  pub fn new(subscribed: Frame, unsubscribed: Option<Frame>) -> Result<Self, MarbleError> {
    match unsubscribed {
      Some(end) if end < subscribed => Err(MarbleError::InvalidSequence {
        reason: format!("window closes at {end} before it opens at {subscribed}"),
      }),
      _ => Ok(Self { subscribed, unsubscribed }),
    }
  }

  pub fn open(subscribed: Frame) -> Self { Self { subscribed, unsubscribed: None } }

  pub fn is_open(&self) -> bool { self.unsubscribed.is_none() }
}

impl fmt::Display for SubscriptionWindow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.unsubscribed {
      Some(end) => write!(f, "[{}, {end}]", self.subscribed),
      None => write!(f, "[{}, open)", self.subscribed),
    }
  }
}
