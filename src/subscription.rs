//! Subscription handles.
//!
//! A subscription is a control handle returned from `subscribe`. Dropping it
//! does nothing; calling [`Subscription::unsubscribe`] stops delivery and
//! runs teardown, which is how a marble run records the `!` frame of a
//! producer.

use std::{
  cell::Cell,
  fmt::{Debug, Formatter},
  rc::Rc,
};

use smallvec::SmallVec;

use crate::rc::MutRc;

pub trait Subscription {
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;
}

impl Subscription for () {
  fn unsubscribe(self) {}

  fn is_closed(&self) -> bool { true }
}

impl<S: Subscription> Subscription for Option<S> {
  fn unsubscribe(self) {
    if let Some(inner) = self {
      inner.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().is_none_or(Subscription::is_closed) }
}

// ==================== BoxedSubscription ====================

/// Helper trait for calling unsubscribe on boxed trait objects.
///
/// `Subscription::unsubscribe(self)` requires `Sized`, so boxes go through
/// this object-safe mirror.
pub trait BoxedSubscriptionInner {
  fn boxed_unsubscribe(self: Box<Self>);
  fn boxed_is_closed(&self) -> bool;
}

impl<T: Subscription> BoxedSubscriptionInner for T {
  #[inline]
  fn boxed_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn boxed_is_closed(&self) -> bool { self.is_closed() }
}

/// Type-erased subscription, so heterogeneous teardowns can share a list.
pub struct BoxedSubscription(Box<dyn BoxedSubscriptionInner>);

impl BoxedSubscription {
  pub fn new(subscription: impl Subscription + 'static) -> Self { Self(Box::new(subscription)) }
}

impl Subscription for BoxedSubscription {
  #[inline]
  fn unsubscribe(self) { self.0.boxed_unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.boxed_is_closed() }
}

impl Debug for BoxedSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BoxedSubscription").field("is_closed", &self.is_closed()).finish()
  }
}

// ==================== Teardown ====================

/// Runs a closure once on unsubscribe.
pub struct Teardown<F: FnOnce()>(F);

impl<F: FnOnce()> Teardown<F> {
  pub fn new(f: F) -> Self { Self(f) }
}

impl<F: FnOnce()> Subscription for Teardown<F> {
  fn unsubscribe(self) { (self.0)() }

  fn is_closed(&self) -> bool { false }
}

// ==================== CompositeSubscription ====================

#[derive(Default)]
struct CompositeState {
  closed: bool,
  teardown: SmallVec<[BoxedSubscription; 1]>,
}

/// A group of subscriptions torn down together.
///
/// Adding to a composite that is already closed unsubscribes the newcomer
/// immediately, so a synchronous source that terminates before its
/// subscription is registered is still cleaned up.
#[derive(Clone, Default)]
pub struct CompositeSubscription(MutRc<CompositeState>);

impl CompositeSubscription {
  pub fn add(&self, subscription: impl Subscription + 'static) {
    if subscription.is_closed() && !self.is_closed() {
      return;
    }
    let rejected = {
      let mut state = self.0.rc_deref_mut();
      if state.closed {
        Some(subscription)
      } else {
        state.teardown.retain(|s| !s.is_closed());
        state.teardown.push(BoxedSubscription::new(subscription));
        None
      }
    };
    if let Some(subscription) = rejected {
      subscription.unsubscribe();
    }
  }

  /// Registers a closure to run on unsubscribe.
  pub fn add_teardown(&self, f: impl FnOnce() + 'static) { self.add(Teardown::new(f)) }

  pub fn teardown_size(&self) -> usize { self.0.rc_deref().teardown.len() }
}

impl Subscription for CompositeSubscription {
  fn unsubscribe(self) {
    let teardown = {
      let mut state = self.0.rc_deref_mut();
      if state.closed {
        return;
      }
      state.closed = true;
      std::mem::take(&mut state.teardown)
    };
    for subscription in teardown {
      subscription.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

impl Debug for CompositeSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let state = self.0.rc_deref();
    f.debug_struct("CompositeSubscription")
      .field("closed", &state.closed)
      .field("teardown_count", &state.teardown.len())
      .finish()
  }
}

// ==================== TaskHandle ====================

/// Handle of an action queued on the virtual-time scheduler.
///
/// Unsubscribing cancels the action if it has not run yet.
#[derive(Clone, Default, Debug)]
pub struct TaskHandle {
  closed: Rc<Cell<bool>>,
}

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  pub(crate) fn mark_finished(&self) { self.closed.set(true); }
}

impl Subscription for TaskHandle {
  fn unsubscribe(self) { self.closed.set(true); }

  fn is_closed(&self) -> bool { self.closed.get() }
}
