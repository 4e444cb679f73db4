//! Run configuration.
//!
//! ```rust
//! use rxmarble::config::{MarbleConfig, MarkerPolicy};
//!
//! let config = MarbleConfig::new().tick(1).max_frames(500).strict_markers();
//! assert_eq!(config.tick_frames(), 1);
//! assert_eq!(config.policy(), MarkerPolicy::Strict);
//! ```

use crate::notification::Frame;

/// Frames one diagram character stands for unless configured otherwise.
pub const DEFAULT_TICK: Frame = 10;

/// Default bound on how far a drain may advance virtual time.
pub const DEFAULT_MAX_FRAMES: Frame = 10_000;

/// How `^` and `!` are treated inside an emission diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerPolicy {
  /// Markers take one tick and never emit; `^` sets the origin.
  #[default]
  ZeroEmission,
  /// Markers are rejected as malformed.
  Strict,
}

/// Knobs shared by the parser, the scheduler and the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarbleConfig {
  tick: Frame,
  max_frames: Frame,
  policy: MarkerPolicy,
}

impl MarbleConfig {
  /// Tick of 10 frames, 10 000 frame bound, zero-emission markers.
  pub fn new() -> Self {
    Self { tick: DEFAULT_TICK, max_frames: DEFAULT_MAX_FRAMES, policy: MarkerPolicy::ZeroEmission }
  }

  /// Sets how many frames one diagram character spans. Zero is raised to 1.
  pub fn tick(mut self, frames: Frame) -> Self {
    self.tick = frames.max(1);
    self
  }

  /// Sets the highest frame a drain may reach before failing with
  /// `DrainTimeout`.
  pub fn max_frames(mut self, frames: Frame) -> Self {
    self.max_frames = frames;
    self
  }

  pub fn marker_policy(mut self, policy: MarkerPolicy) -> Self {
    self.policy = policy;
    self
  }

  /// Shorthand for `marker_policy(MarkerPolicy::Strict)`.
  pub fn strict_markers(self) -> Self { self.marker_policy(MarkerPolicy::Strict) }

  pub fn tick_frames(&self) -> Frame { self.tick }

  pub fn frame_bound(&self) -> Frame { self.max_frames }

  pub fn policy(&self) -> MarkerPolicy { self.policy }
}

impl Default for MarbleConfig {
  fn default() -> Self { Self::new() }
}
