use std::marker::PhantomData;

use crate::{observable::Observable, observer::Observer};

/// Creates an observable that produces values from an iterator.
///
/// Emits synchronously on subscribe and completes when all elements have
/// been emitted. Stops early once the observer is closed.
///
/// ```
/// use std::convert::Infallible;
///
/// use rxmarble::{observable, observer::FnMutObserver, prelude::*};
///
/// let mut sum = 0;
/// observable::from_iter::<_, Infallible>(vec![0, 1, 2, 3])
///   .subscribe(FnMutObserver(move |v| sum += v));
/// ```
pub fn from_iter<Iter, Err>(iter: Iter) -> ObservableIter<Iter, Err>
where
  Iter: IntoIterator,
{
  ObservableIter(iter, PhantomData)
}

/// Creates an observable that emits a single value, then completes.
pub fn of<Item, Err>(v: Item) -> ObservableIter<std::iter::Once<Item>, Err> {
  from_iter(std::iter::once(v))
}

pub struct ObservableIter<Iter, Err>(Iter, PhantomData<Err>);

impl<Iter: Clone, Err> Clone for ObservableIter<Iter, Err> {
  fn clone(&self) -> Self { Self(self.0.clone(), PhantomData) }
}

impl<Iter, Err> Observable for ObservableIter<Iter, Err>
where
  Iter: IntoIterator,
{
  type Item = Iter::Item;
  type Err = Err;
  type Unsub = ();

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Iter::Item, Err> + 'static,
  {
    for v in self.0 {
      if observer.is_closed() {
        return;
      }
      observer.next(v);
    }
    observer.complete();
  }
}
