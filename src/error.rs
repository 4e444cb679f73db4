//! Error types for marble parsing, virtual-time draining and assertions.

use std::fmt;

use thiserror::Error;

use crate::notification::Frame;

/// Everything that can go wrong while setting up or running a marble test.
///
/// Parse-time variants mean the test itself is malformed and abort the run
/// at setup. [`MarbleError::Assertion`] is the ordinary way a run reports a
/// failing expectation. [`MarbleError::DrainTimeout`] is an infrastructure
/// failure: a producer never let virtual time settle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MarbleError {
  /// Unrecognized symbol or unbalanced group
  #[error("malformed marble diagram `{diagram}` at {position}: {reason}")]
  MalformedDiagram {
    /// Diagram as written
    diagram: String,
    /// Character index of the offending symbol
    position: usize,
    /// What was wrong
    reason: String,
  },

  /// An emitting token follows `|` or `#`
  #[error("marble diagram `{diagram}` emits at {position} after it already terminated")]
  TrailingTokensAfterTerminal {
    /// Diagram as written
    diagram: String,
    /// Character index of the trailing token
    position: usize,
  },

  /// More than one `^` or `!`
  #[error("marble diagram `{diagram}` has more than one `{marker}` marker")]
  MultipleSubscriptionMarkers {
    /// Diagram as written
    diagram: String,
    /// The repeated marker
    marker: char,
  },

  /// `!` placed before `^`
  #[error(
    "subscription diagram `{diagram}` unsubscribes at frame {unsubscribed} before subscribing \
     at frame {subscribed}"
  )]
  InvertedWindow {
    /// Diagram as written
    diagram: String,
    /// Frame of `^`
    subscribed: Frame,
    /// Frame of `!`
    unsubscribed: Frame,
  },

  /// A token has no entry in the value map and no literal meaning
  #[error("token `{token}` in marble diagram `{diagram}` has no value")]
  UnmappedToken {
    /// Diagram as written
    diagram: String,
    /// The unmapped token
    token: char,
  },

  /// `#` used without an error value for an error type with no default
  #[error("marble diagram `{diagram}` raises `#` but no error value was supplied")]
  MissingErrorValue {
    /// Diagram as written
    diagram: String,
  },

  /// Cold producers always start at their own subscription
  #[error("cold observable diagram `{diagram}` cannot carry a `^` subscription offset")]
  ColdSubscriptionOffset {
    /// Diagram as written
    diagram: String,
  },

  /// Records that do not form a valid timeline
  #[error("invalid marble sequence: {reason}")]
  InvalidSequence {
    /// What was wrong
    reason: String,
  },

  /// A live action is queued beyond the frame bound
  #[error(
    "virtual time did not settle: next action at frame {next_frame} exceeds the bound of \
     {max_frames} frames ({pending} actions pending)"
  )]
  DrainTimeout {
    /// Configured bound
    max_frames: Frame,
    /// Frame of the first action past the bound
    next_frame: Frame,
    /// Queue length when the bound was hit
    pending: usize,
  },

  /// One or more expectations did not hold
  #[error("{0}")]
  Assertion(MismatchReport),
}

impl MarbleError {
  pub(crate) fn malformed(diagram: &str, position: usize, reason: impl Into<String>) -> Self {
    Self::MalformedDiagram { diagram: diagram.to_owned(), position, reason: reason.into() }
  }

  /// Whether this error is an assertion failure rather than a broken test.
  pub fn is_assertion(&self) -> bool { matches!(self, Self::Assertion(_)) }
}

/// A single failed expectation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
  /// Captured notifications differ from the expected diagram
  #[error("{label}: notifications differ\nexpected:\n{expected}\nactual:\n{actual}")]
  SequenceMismatch {
    /// Which expectation
    label: String,
    /// Readable expected timeline
    expected: String,
    /// Readable actual timeline
    actual: String,
  },

  /// Captured subscription windows differ from the expected diagrams
  #[error("{label}: subscriptions differ\nexpected:\n{expected}\nactual:\n{actual}")]
  SubscriptionMismatch {
    /// Which expectation
    label: String,
    /// Readable expected windows
    expected: String,
    /// Readable actual windows
    actual: String,
  },
}

impl Mismatch {
  /// Which expectation failed.
  pub fn label(&self) -> &str {
    match self {
      Self::SequenceMismatch { label, .. } | Self::SubscriptionMismatch { label, .. } => label,
    }
  }
}

/// Every mismatch of a run, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MismatchReport(pub Vec<Mismatch>);

impl MismatchReport {
  pub fn mismatches(&self) -> &[Mismatch] { &self.0 }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for MismatchReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} marble expectation(s) failed", self.0.len())?;
    for mismatch in &self.0 {
      write!(f, "\n\n{mismatch}")?;
    }
    Ok(())
  }
}
