use std::{
  cell::{Ref, RefCell, RefMut},
  rc::Rc,
};

/// Shared mutable cell for the single-threaded virtual-time world.
///
/// Every producer, observer chain and scheduler handle of a marble run lives
/// on one thread, so `Rc<RefCell<_>>` is the only sharing primitive needed.
#[derive(Default)]
pub struct MutRc<T>(Rc<RefCell<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  #[inline]
  pub fn rc_deref(&self) -> Ref<'_, T> { self.0.borrow() }

  #[inline]
  pub fn rc_deref_mut(&self) -> RefMut<'_, T> { self.0.borrow_mut() }

  /// Replaces the inner value, returning the old one.
  pub fn replace(&self, value: T) -> T { self.0.replace(value) }

  /// Whether both handles point at the same cell.
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl<T: Default> MutRc<T> {
  pub fn take(&self) -> T { self.0.take() }
}

impl<T> From<T> for MutRc<T> {
  fn from(value: T) -> Self { Self::own(value) }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: std::fmt::Debug> std::fmt::Debug for MutRc<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("MutRc").field(&*self.rc_deref()).finish()
  }
}
