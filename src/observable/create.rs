use std::marker::PhantomData;

use crate::{
  observable::Observable,
  observer::{Emitter, Observer},
  subscription::Subscription,
};

/// Creates an observable from a function.
///
/// The function runs once per subscription with an [`Emitter`] feeding the
/// subscriber, and returns the teardown of that subscription (`()` when
/// there is nothing to release). It must be `Clone` to be resubscribed by
/// operators such as `retry`.
pub fn create<F, Item, Err, U>(f: F) -> Create<F, Item, Err>
where
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
  U: Subscription + 'static,
{
  Create { f, _marker: PhantomData }
}

/// Observable created from a function.
pub struct Create<F, Item, Err> {
  f: F,
  _marker: PhantomData<(Item, Err)>,
}

impl<F: Clone, Item, Err> Clone for Create<F, Item, Err> {
  fn clone(&self) -> Self { Self { f: self.f.clone(), _marker: PhantomData } }
}

/// Wrapper to implement Emitter for Option<O>
struct CreateEmitter<O>(Option<O>);

impl<O, Item, Err> Emitter<Item, Err> for CreateEmitter<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) {
    if let Some(observer) = &mut self.0 {
      observer.next(value);
    }
  }

  #[inline]
  fn error(&mut self, err: Err) {
    if let Some(observer) = self.0.take() {
      observer.error(err);
    }
  }

  #[inline]
  fn complete(&mut self) {
    if let Some(observer) = self.0.take() {
      observer.complete();
    }
  }
}

impl<F, Item, Err, U> Observable for Create<F, Item, Err>
where
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
  U: Subscription + 'static,
{
  type Item = Item;
  type Err = Err;
  type Unsub = U;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item, Err> + 'static,
  {
    let mut emitter = CreateEmitter(Some(observer));
    (self.f)(&mut emitter)
  }
}
