//! The `Observable` contract, its safe `subscribe` entry point and the
//! operator methods every observable gets for free.

use crate::{
  observer::Observer,
  ops::{
    concat::ConcatOp,
    filter::FilterOp,
    map::MapOp,
    retry::{RetryOp, RetryPolicy},
    take::TakeOp,
    tap::TapOp,
  },
  subscription::{CompositeSubscription, Subscription},
};

mod create;
mod from_iter;
mod interval;
mod trivial;

pub use create::{Create, create};
pub use from_iter::{ObservableIter, from_iter, of};
pub use interval::{IntervalObservable, interval, interval_at};
pub use trivial::{Empty, Never, ThrowErr, empty, never, throw_err};

/// A producer of `Next*` followed by at most one `Error` or `Complete`.
///
/// Implementors only provide [`actual_subscribe`](Self::actual_subscribe);
/// consumers call [`subscribe`](Self::subscribe), which guarantees nothing is
/// delivered after a terminal notification or after unsubscribing.
pub trait Observable: Sized {
  type Item;
  type Err;
  type Unsub: Subscription + 'static;

  /// Attaches `observer` without any protection. Operators call this on
  /// their source; everything else goes through `subscribe`.
  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Self::Item, Self::Err> + 'static;

  fn subscribe<O>(self, observer: O) -> CompositeSubscription
  where
    O: Observer<Self::Item, Self::Err> + 'static,
  {
    let subscription = CompositeSubscription::default();
    let subscriber = Subscriber { observer: Some(observer), subscription: subscription.clone() };
    let unsub = self.actual_subscribe(subscriber);
    subscription.add(unsub);
    subscription
  }

  /// Transforms every value with `f`.
  fn map<B, F>(self, f: F) -> MapOp<Self, F, B>
  where
    F: FnMut(Self::Item) -> B,
  {
    MapOp::new(self, f)
  }

  /// Passes through only the values satisfying `predicate`.
  fn filter<F>(self, predicate: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    FilterOp::new(self, predicate)
  }

  /// Runs `f` on every value before passing it on unchanged.
  fn tap<F>(self, f: F) -> TapOp<Self, F>
  where
    F: FnMut(&Self::Item),
  {
    TapOp::new(self, f)
  }

  /// Emits the first `count` values, then completes and unsubscribes from
  /// the source.
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp::new(self, count) }

  /// Resubscribes to the source on error as long as `policy` allows it.
  ///
  /// A plain `usize` allows that many retries.
  fn retry<P>(self, policy: P) -> RetryOp<Self, P>
  where
    P: RetryPolicy<Self::Err>,
  {
    RetryOp::new(self, policy)
  }

  /// Emits everything from `self`, then everything from `next`.
  fn concat<S>(self, next: S) -> ConcatOp<Self, S>
  where
    S: Observable<Item = Self::Item, Err = Self::Err>,
  {
    ConcatOp::new(self, next)
  }
}

/// Observer wrapper installed by [`Observable::subscribe`].
///
/// Drops events once the subscription is closed and tears the subscription
/// down after forwarding a terminal notification.
pub struct Subscriber<O> {
  observer: Option<O>,
  subscription: CompositeSubscription,
}

impl<O, Item, Err> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if !self.subscription.is_closed() {
      self.observer.next(value);
    }
  }

  fn error(mut self, err: Err) {
    if !self.subscription.is_closed() {
      self.observer.take().error(err);
    }
    self.subscription.unsubscribe();
  }

  fn complete(mut self) {
    if !self.subscription.is_closed() {
      self.observer.take().complete();
    }
    self.subscription.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.subscription.is_closed() || self.observer.is_closed() }
}


#[cfg(test)]
mod tests {
  use super::{test_util::Collect, *};
  use crate::{notification::Notification, observer::Emitter};

  #[rxmarble_macro::test]
  fn nothing_is_delivered_after_terminal() {
    let (observer, log) = Collect::<i32, &str>::new();
    let subscription = create(|emitter: &mut dyn Emitter<i32, &str>| {
      emitter.next(1);
      emitter.complete();
      emitter.next(2);
      emitter.error("late");
    })
    .subscribe(observer);

    assert_eq!(*log.borrow(), vec![Notification::Next(1), Notification::Complete]);
    assert!(subscription.is_closed());
  }

  #[rxmarble_macro::test]
  fn operators_chain() {
    let (observer, log) = Collect::new();
    from_iter::<_, &str>(1..=6).filter(|v| v % 2 == 0).map(|v| v * 10).subscribe(observer);

    assert_eq!(
      *log.borrow(),
      vec![
        Notification::Next(20),
        Notification::Next(40),
        Notification::Next(60),
        Notification::Complete
      ]
    );
  }
}
