use std::fmt;

use crate::{
  notification::{Frame, SubscriptionWindow},
  rc::MutRc,
};

/// Windows of every subscription a marble producer has seen, in
/// subscription order.
///
/// Cloning gives another handle on the same log.
#[derive(Clone, Default)]
pub struct SubscriptionLog(MutRc<Vec<SubscriptionWindow>>);

impl SubscriptionLog {
  /// Opens a window at `frame` and returns its slot.
  pub(crate) fn open(&self, frame: Frame) -> usize {
    let mut windows = self.0.rc_deref_mut();
    windows.push(SubscriptionWindow::open(frame));
    windows.len() - 1
  }

  /// Closes the window in `slot` at `frame`. Returns whether it was still
  /// open.
  pub(crate) fn close(&self, slot: usize, frame: Frame) -> bool {
    let mut windows = self.0.rc_deref_mut();
    match windows.get_mut(slot) {
      Some(window) if window.is_open() => {
        window.unsubscribed = Some(frame.max(window.subscribed));
        true
      }
      _ => false,
    }
  }

  pub(crate) fn is_closed(&self, slot: usize) -> bool {
    self.0.rc_deref().get(slot).is_none_or(|w| !w.is_open())
  }

  /// Snapshot of the windows recorded so far.
  pub fn windows(&self) -> Vec<SubscriptionWindow> { self.0.rc_deref().clone() }

  pub fn len(&self) -> usize { self.0.rc_deref().len() }

  pub fn is_empty(&self) -> bool { self.0.rc_deref().is_empty() }
}

impl fmt::Debug for SubscriptionLog {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.0.rc_deref().iter()).finish()
  }
}
