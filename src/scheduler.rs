//! Virtual-time scheduling.
//!
//! Every time-based producer of a marble run goes through one
//! [`TestScheduler`]; nothing here ever touches the wall clock.

mod test_scheduler;

pub use test_scheduler::TestScheduler;

pub use crate::subscription::TaskHandle;
use crate::notification::Frame;

/// What a scheduled action wants after it ran once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  /// Drop the action.
  Finished,
  /// Run the action again after this many frames.
  Sleeping(Frame),
}
