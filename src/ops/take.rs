use crate::{
  observable::Observable,
  observer::Observer,
  subscription::{CompositeSubscription, Subscription},
};

/// Emits only the first `count` values emitted by the source Observable.
///
/// If the source emits fewer than `count` values then all of its values are
/// emitted. Once `count` is reached the result completes and the source is
/// unsubscribed in the same frame, regardless if the source completes.
#[derive(Clone)]
pub struct TakeOp<S> {
  source: S,
  count: usize,
}

impl<S> TakeOp<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { Self { source, count } }
}

impl<S> Observable for TakeOp<S>
where
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    let upstream = CompositeSubscription::default();
    if self.count == 0 {
      observer.complete();
      upstream.clone().unsubscribe();
      return upstream;
    }
    let take =
      TakeObserver { observer: Some(observer), remaining: self.count, upstream: upstream.clone() };
    upstream.add(self.source.actual_subscribe(take));
    upstream
  }
}

pub struct TakeObserver<O> {
  observer: Option<O>,
  remaining: usize,
  upstream: CompositeSubscription,
}

impl<O, Item, Err> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else { return };
    self.remaining -= 1;
    observer.next(value);
    if self.remaining == 0 {
      self.observer.take().complete();
      self.upstream.clone().unsubscribe();
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    notification::Notification,
    observable::{from_iter, never, test_util::Collect},
  };

  #[rxmarble_macro::test]
  fn base_function() {
    let (observer, log) = Collect::new();
    from_iter::<_, ()>(0..100).take(3).subscribe(observer);
    assert_eq!(
      *log.borrow(),
      vec![
        Notification::Next(0),
        Notification::Next(1),
        Notification::Next(2),
        Notification::Complete
      ]
    );
  }

  #[rxmarble_macro::test]
  fn take_zero_completes_without_subscribing() {
    let (observer, log) = Collect::<i32, ()>::new();
    let subscription = never().take(0).subscribe(observer);
    assert_eq!(*log.borrow(), vec![Notification::Complete]);
    assert!(subscription.is_closed());
  }

  #[rxmarble_macro::test]
  fn shorter_source_completes_on_its_own() {
    let (observer, log) = Collect::new();
    from_iter::<_, ()>([1, 2]).take(5).subscribe(observer);
    assert_eq!(log.borrow().last(), Some(&Notification::Complete));
    assert_eq!(log.borrow().len(), 3);
  }
}
