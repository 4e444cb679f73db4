//! Virtual-time scheduler for deterministic marble runs.
//!
//! Provides a logical clock that only advances when explicitly instructed,
//! and a queue of actions ordered by frame and then by registration order.
//!
//! # Usage
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//!
//! use rxmarble::scheduler::{TaskState, TestScheduler};
//!
//! let scheduler = TestScheduler::default();
//! let fired = Rc::new(Cell::new(false));
//! let f = fired.clone();
//! scheduler.schedule(30, move || {
//!   f.set(true);
//!   TaskState::Finished
//! });
//!
//! scheduler.advance_by(20);
//! assert!(!fired.get());
//! scheduler.flush().unwrap();
//! assert!(fired.get());
//! assert_eq!(scheduler.now(), 30);
//! ```
//!
//! # Sharing
//!
//! `TestScheduler` is a cheap handle: clones share one clock and one queue.
//! The state is never borrowed while an action runs, so actions may schedule
//! or cancel further actions.

use std::{cmp::Ordering, collections::BinaryHeap, fmt};

use tracing::{debug, trace};

use super::{TaskHandle, TaskState};
use crate::{
  config::DEFAULT_MAX_FRAMES, error::MarbleError, notification::Frame, rc::MutRc,
  subscription::Subscription,
};

// ==================== Internal State ====================

struct TestSchedulerState {
  virtual_time: Frame,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
  max_frames: Frame,
}

impl TestSchedulerState {
  fn push(&mut self, frame: Frame, task: Box<dyn FnMut() -> TaskState>, handle: TaskHandle) {
    let task_id = self.next_task_id;
    self.next_task_id += 1;
    self.task_queue.push(ScheduledTask { frame, task_id, task, handle });
  }

  /// Drops cancelled actions sitting at the head of the queue.
  fn prune_cancelled(&mut self) {
    while self.task_queue.peek().is_some_and(|t| t.handle.is_closed()) {
      self.task_queue.pop();
    }
  }

  fn live_count(&self) -> usize { self.task_queue.iter().filter(|t| !t.handle.is_closed()).count() }
}

struct ScheduledTask {
  frame: Frame,
  task_id: usize,
  task: Box<dyn FnMut() -> TaskState>,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool { self.frame == other.frame && self.task_id == other.task_id }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier frames first, then FIFO by task_id
    other.frame.cmp(&self.frame).then_with(|| other.task_id.cmp(&self.task_id))
  }
}

/// How far a drain loop may go.
#[derive(Clone, Copy)]
enum Until {
  /// Stop before the first action past this frame.
  Frame(Frame),
  /// Run everything, failing on a live action past the frame bound.
  Drained,
}

// ==================== TestScheduler ====================

/// A virtual time scheduler for deterministic testing.
#[derive(Clone)]
pub struct TestScheduler(MutRc<TestSchedulerState>);

impl TestScheduler {
  /// A scheduler at frame 0 whose [`flush`](Self::flush) fails once a live
  /// action lies beyond `max_frames`.
  pub fn new(max_frames: Frame) -> Self {
    Self(MutRc::own(TestSchedulerState {
      virtual_time: 0,
      task_queue: BinaryHeap::new(),
      next_task_id: 0,
      max_frames,
    }))
  }

  /// Resets the clock to zero and discards every pending action.
  ///
  /// Handles of discarded actions report closed afterwards.
  pub fn reset(&self) {
    let discarded = {
      let mut state = self.0.rc_deref_mut();
      state.virtual_time = 0;
      state.next_task_id = 0;
      std::mem::take(&mut state.task_queue)
    };
    for task in discarded {
      task.handle.mark_finished();
    }
  }

  /// Current virtual time.
  pub fn now(&self) -> Frame { self.0.rc_deref().virtual_time }

  pub fn max_frames(&self) -> Frame { self.0.rc_deref().max_frames }

  pub fn set_max_frames(&self, max_frames: Frame) { self.0.rc_deref_mut().max_frames = max_frames; }

  /// Number of queued actions that have not been cancelled.
  pub fn pending_count(&self) -> usize { self.0.rc_deref().live_count() }

  /// Check if there are no live actions left.
  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  /// Queues `task` to run `delay` frames from now.
  ///
  /// The task returns [`TaskState::Sleeping`] to run again later, which
  /// re-queues it behind everything already registered for that frame.
  pub fn schedule(&self, delay: Frame, task: impl FnMut() -> TaskState + 'static) -> TaskHandle {
    let mut state = self.0.rc_deref_mut();
    let frame = state.virtual_time.saturating_add(delay);
    let handle = TaskHandle::new();
    state.push(frame, Box::new(task), handle.clone());
    handle
  }

  /// Queues `task` at an absolute frame. Frames already past run at the
  /// current frame.
  pub fn schedule_at(&self, frame: Frame, task: impl FnMut() -> TaskState + 'static) -> TaskHandle {
    let delay = frame.saturating_sub(self.now());
    self.schedule(delay, task)
  }

  fn next_due(&self, until: Until) -> Result<Option<ScheduledTask>, MarbleError> {
    let mut state = self.0.rc_deref_mut();
    state.prune_cancelled();
    let Some(head) = state.task_queue.peek() else { return Ok(None) };
    match until {
      Until::Frame(limit) if head.frame > limit => return Ok(None),
      Until::Drained if head.frame > state.max_frames => {
        return Err(MarbleError::DrainTimeout {
          max_frames: state.max_frames,
          next_frame: head.frame,
          pending: state.live_count(),
        });
      }
      _ => {}
    }
    let task = state.task_queue.pop();
    if let Some(task) = &task {
      state.virtual_time = task.frame;
    }
    Ok(task)
  }

  fn execute_tasks_until(&self, until: Until) -> Result<(), MarbleError> {
    while let Some(mut scheduled) = self.next_due(until)? {
      trace!(frame = scheduled.frame, task_id = scheduled.task_id, "run scheduled task");
      let result = (scheduled.task)();
      match result {
        TaskState::Sleeping(frames) if !scheduled.handle.is_closed() => {
          let mut state = self.0.rc_deref_mut();
          let frame = state.virtual_time.saturating_add(frames);
          state.push(frame, scheduled.task, scheduled.handle);
        }
        _ => scheduled.handle.mark_finished(),
      }
    }
    Ok(())
  }

  /// Advances virtual time by `frames`, running every action due up to and
  /// including the target frame in order.
  pub fn advance_by(&self, frames: Frame) {
    let target = self.now().saturating_add(frames);
    // Only a full drain can time out.
    let _ = self.execute_tasks_until(Until::Frame(target));
    self.0.rc_deref_mut().virtual_time = target;
  }

  /// Runs every pending action, moving the clock to each action's frame.
  ///
  /// Actions that reschedule themselves keep running until they finish or
  /// are cancelled. Cancelled actions are discarded without moving the
  /// clock. Fails with [`MarbleError::DrainTimeout`] when a live action is
  /// queued past the frame bound; the clock then stays where the drain
  /// stopped.
  pub fn flush(&self) -> Result<(), MarbleError> {
    debug!(now = self.now(), pending = self.pending_count(), "flush start");
    self.execute_tasks_until(Until::Drained)?;
    debug!(now = self.now(), "flush end");
    Ok(())
  }
}

impl Default for TestScheduler {
  fn default() -> Self { Self::new(DEFAULT_MAX_FRAMES) }
}

impl fmt::Debug for TestScheduler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.0.rc_deref();
    f.debug_struct("TestScheduler")
      .field("now", &state.virtual_time)
      .field("queued", &state.task_queue.len())
      .field("max_frames", &state.max_frames)
      .finish()
  }
}
