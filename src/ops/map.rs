use std::marker::PhantomData;

use crate::{observable::Observable, observer::Observer};

/// Creates a new stream which calls a closure on each element and uses
/// its return as the value.
pub struct MapOp<S, F, B> {
  source: S,
  func: F,
  _p: PhantomData<B>,
}

impl<S, F, B> MapOp<S, F, B> {
  pub(crate) fn new(source: S, func: F) -> Self { Self { source, func, _p: PhantomData } }
}

impl<S: Clone, F: Clone, B> Clone for MapOp<S, F, B> {
  fn clone(&self) -> Self { Self::new(self.source.clone(), self.func.clone()) }
}

impl<S, F, B> Observable for MapOp<S, F, B>
where
  S: Observable,
  F: FnMut(S::Item) -> B + 'static,
{
  type Item = B;
  type Err = S::Err;
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<B, S::Err> + 'static,
  {
    self.source.actual_subscribe(MapObserver { observer, map: self.func })
  }
}

pub struct MapObserver<O, F> {
  observer: O,
  map: F,
}

impl<Item, Err, O, F, B> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  fn next(&mut self, value: Item) { self.observer.next((self.map)(value)) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
