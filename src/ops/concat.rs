use crate::{
  observable::Observable,
  observer::Observer,
  subscription::{CompositeSubscription, Subscription},
};

/// Emits everything from the first source, then subscribes to the second
/// when the first completes. An error from the first source ends the
/// stream without touching the second.
#[derive(Clone)]
pub struct ConcatOp<S1, S2> {
  first: S1,
  second: S2,
}

impl<S1, S2> ConcatOp<S1, S2> {
  pub(crate) fn new(first: S1, second: S2) -> Self { Self { first, second } }
}

impl<S1, S2> Observable for ConcatOp<S1, S2>
where
  S1: Observable,
  S2: Observable<Item = S1::Item, Err = S1::Err> + 'static,
{
  type Item = S1::Item;
  type Err = S1::Err;
  type Unsub = CompositeSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<S1::Item, S1::Err> + 'static,
  {
    let subscription = CompositeSubscription::default();
    let concat =
      ConcatObserver { observer, second: self.second, subscription: subscription.clone() };
    subscription.add(self.first.actual_subscribe(concat));
    subscription
  }
}

pub struct ConcatObserver<O, S2> {
  observer: O,
  second: S2,
  subscription: CompositeSubscription,
}

impl<O, S2> Observer<S2::Item, S2::Err> for ConcatObserver<O, S2>
where
  O: Observer<S2::Item, S2::Err> + 'static,
  S2: Observable,
{
  fn next(&mut self, value: S2::Item) { self.observer.next(value) }

  fn error(self, err: S2::Err) { self.observer.error(err) }

  fn complete(self) {
    if !self.subscription.is_closed() {
      self.subscription.add(self.second.actual_subscribe(self.observer));
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use crate::{
    notification::Notification,
    observable::{Observable, empty, from_iter, of, test_util::Collect, throw_err},
  };

  #[rxmarble_macro::test]
  fn second_follows_first() {
    let (observer, log) = Collect::new();
    from_iter::<_, ()>([1, 2]).concat(of(3)).concat(empty()).subscribe(observer);
    assert_eq!(
      *log.borrow(),
      vec![
        Notification::Next(1),
        Notification::Next(2),
        Notification::Next(3),
        Notification::Complete
      ]
    );
  }

  #[rxmarble_macro::test]
  fn error_skips_second() {
    let (observer, log) = Collect::new();
    throw_err("boom").concat(of(1)).subscribe(observer);
    assert_eq!(*log.borrow(), vec![Notification::Error("boom")]);
  }
}
