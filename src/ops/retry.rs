//! Retry operator implementation
//!
//! Resubscribes to the source when it errors, based on a [`RetryPolicy`].
//! Every retry is an ordinary new subscription, so a cold marble source
//! replays from the frame of the error and its subscription log gains one
//! window per attempt.
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//!
//! use rxmarble::{observable::create, observer::Emitter, prelude::*};
//!
//! let attempts = Rc::new(Cell::new(0));
//! let a = attempts.clone();
//! let completed = Rc::new(Cell::new(false));
//! let c = completed.clone();
//!
//! create(move |emitter: &mut dyn Emitter<i32, &'static str>| {
//!   a.set(a.get() + 1);
//!   if a.get() < 3 { emitter.error("flaky") } else { emitter.complete() }
//! })
//! .retry(RetryConfig::new().count(5))
//! .subscribe(TerminalProbe::new(move |_: Option<&'static str>| c.set(true)));
//!
//! assert_eq!(attempts.get(), 3);
//! assert!(completed.get());
//! # struct TerminalProbe<F>(F);
//! # impl<F> TerminalProbe<F> { fn new(f: F) -> Self { Self(f) } }
//! # impl<F: FnOnce(Option<&'static str>)> Observer<i32, &'static str> for TerminalProbe<F> {
//! #   fn next(&mut self, _: i32) {}
//! #   fn error(self, e: &'static str) { (self.0)(Some(e)) }
//! #   fn complete(self) { (self.0)(None) }
//! #   fn is_closed(&self) -> bool { false }
//! # }
//! ```

use tracing::debug;

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  subscription::{BoxedSubscription, CompositeSubscription, Subscription},
};

/// Policy for determining whether to retry an error.
///
/// `usize` (count) and [`RetryConfig`] cover the common cases; implement the
/// trait for anything that depends on the error value.
pub trait RetryPolicy<Err>: Clone {
  /// Whether to resubscribe after `err`.
  ///
  /// `attempt` is the number of retries already made, so 0 for the first
  /// error.
  fn should_retry(&self, err: &Err, attempt: usize) -> bool;

  /// Whether a `next` value resets the attempt counter to 0.
  fn reset_on_success(&self) -> bool { false }
}

impl<Err> RetryPolicy<Err> for usize {
  fn should_retry(&self, _err: &Err, attempt: usize) -> bool { attempt < *self }
}

/// Builder for a retry policy.
///
/// ```rust
/// use rxmarble::ops::retry::{RetryConfig, RetryPolicy};
///
/// let config = RetryConfig::new().count(2);
/// assert!(RetryPolicy::<()>::should_retry(&config, &(), 1));
/// assert!(!RetryPolicy::<()>::should_retry(&config, &(), 2));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryConfig {
  count: Option<usize>,
  reset_on_success: bool,
}

impl RetryConfig {
  /// No limit, no reset.
  pub fn new() -> Self { Self::default() }

  /// Sets the maximum number of retry attempts.
  ///
  /// `count(3)` allows for 3 retries, a maximum of 4 subscriptions in
  /// total.
  pub fn count(mut self, count: usize) -> Self {
    self.count = Some(count);
    self
  }

  /// Resets the retry count whenever a value is emitted.
  pub fn reset_on_success(mut self) -> Self {
    self.reset_on_success = true;
    self
  }
}

impl<Err> RetryPolicy<Err> for RetryConfig {
  fn should_retry(&self, _err: &Err, attempt: usize) -> bool {
    self.count.is_none_or(|count| attempt < count)
  }

  fn reset_on_success(&self) -> bool { self.reset_on_success }
}

/// The Retry operator struct.
#[derive(Clone)]
pub struct RetryOp<S, P> {
  source: S,
  policy: P,
}

impl<S, P> RetryOp<S, P> {
  pub(crate) fn new(source: S, policy: P) -> Self { Self { source, policy } }
}

impl<S, P> Observable for RetryOp<S, P>
where
  S: Observable + Clone + 'static,
  P: RetryPolicy<S::Err> + 'static,
{
  type Item = S::Item;
  type Err = S::Err;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    let outer = CompositeSubscription::default();
    let serial: MutRc<Option<BoxedSubscription>> = MutRc::own(None);
    {
      let serial = serial.clone();
      outer.add_teardown(move || serial.take().unsubscribe());
    }
    let retry = RetryObserver {
      source: self.source,
      policy: self.policy,
      observer,
      attempts: 0,
      serial,
      outer: outer.clone(),
    };
    retry.subscribe_source();
    outer
  }
}

/// Observer for the retry operator.
///
/// Public only to satisfy trait bounds; it is created by `retry`.
pub struct RetryObserver<S, P, O> {
  source: S,
  policy: P,
  observer: O,
  attempts: usize,
  serial: MutRc<Option<BoxedSubscription>>,
  outer: CompositeSubscription,
}

impl<S, P, O> RetryObserver<S, P, O>
where
  S: Observable + Clone + 'static,
  P: RetryPolicy<S::Err> + 'static,
  O: Observer<S::Item, S::Err> + 'static,
{
  fn subscribe_source(self) {
    let serial = self.serial.clone();
    serial.take().unsubscribe();
    let unsub = self.source.clone().actual_subscribe(self);
    // A synchronous source that already retried has registered its own
    // subscription; ours is finished then.
    let mut slot = serial.rc_deref_mut();
    if slot.is_none() {
      *slot = Some(BoxedSubscription::new(unsub));
    }
  }
}

impl<S, P, O> Observer<S::Item, S::Err> for RetryObserver<S, P, O>
where
  S: Observable + Clone + 'static,
  P: RetryPolicy<S::Err> + 'static,
  O: Observer<S::Item, S::Err> + 'static,
{
  fn next(&mut self, value: S::Item) {
    if self.attempts > 0 && self.policy.reset_on_success() {
      self.attempts = 0;
    }
    self.observer.next(value);
  }

  fn error(mut self, err: S::Err) {
    if !self.outer.is_closed() && self.policy.should_retry(&err, self.attempts) {
      self.attempts += 1;
      debug!(attempt = self.attempts, "retry resubscribing");
      self.subscribe_source();
    } else {
      self.observer.error(err);
    }
  }

  fn complete(self) { self.observer.complete(); }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
