use std::convert::Infallible;

use crate::{
  notification::Frame,
  observable::Observable,
  observer::Observer,
  scheduler::{TaskHandle, TaskState, TestScheduler},
};

/// Creates an observable which will fire `period` frames into the future,
/// and will repeat every `period` frames after, emitting `0, 1, 2, ...`.
///
/// It never completes; bound it with `take` or an unsubscription, or the
/// drain of a marble run fails with `DrainTimeout`. A period of 0 is raised
/// to 1.
pub fn interval(period: Frame, scheduler: &TestScheduler) -> IntervalObservable {
  IntervalObservable { period: period.max(1), delay: None, scheduler: scheduler.clone() }
}

/// Like [`interval`], but the first value fires at the absolute frame `at`
/// (or immediately if `at` has passed).
pub fn interval_at(at: Frame, period: Frame, scheduler: &TestScheduler) -> IntervalObservable {
  IntervalObservable { period: period.max(1), delay: Some(at), scheduler: scheduler.clone() }
}

#[derive(Clone)]
pub struct IntervalObservable {
  scheduler: TestScheduler,
  period: Frame,
  delay: Option<Frame>,
}

impl Observable for IntervalObservable {
  type Item = usize;
  type Err = Infallible;
  type Unsub = TaskHandle;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<usize, Infallible> + 'static,
  {
    let Self { scheduler, period, delay } = self;
    let mut seq = 0;
    let task = move || {
      if observer.is_closed() {
        return TaskState::Finished;
      }
      observer.next(seq);
      seq += 1;
      TaskState::Sleeping(period)
    };
    match delay {
      Some(at) => scheduler.schedule_at(at, task),
      None => scheduler.schedule(period, task),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::{observer::FnMutObserver, subscription::Subscription};

  type Seen = Rc<RefCell<Vec<(Frame, usize)>>>;

  fn recorder(scheduler: &TestScheduler) -> (impl FnMut(usize) + 'static, Seen) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let (s, clock) = (seen.clone(), scheduler.clone());
    (move |v| s.borrow_mut().push((clock.now(), v)), seen)
  }

  #[rxmarble_macro::test]
  fn fires_every_period() {
    let scheduler = TestScheduler::default();
    let (next, seen) = recorder(&scheduler);
    let subscription = interval(20, &scheduler).subscribe(FnMutObserver(next));

    scheduler.advance_by(65);
    assert_eq!(*seen.borrow(), vec![(20, 0), (40, 1), (60, 2)]);

    subscription.unsubscribe();
    scheduler.advance_by(100);
    assert_eq!(seen.borrow().len(), 3);
    assert!(scheduler.is_empty());
  }

  #[rxmarble_macro::test]
  fn first_value_at_absolute_frame() {
    let scheduler = TestScheduler::default();
    let (next, seen) = recorder(&scheduler);
    interval_at(5, 10, &scheduler).take(2).subscribe(FnMutObserver(next));

    scheduler.flush().unwrap();
    assert_eq!(*seen.borrow(), vec![(5, 0), (15, 1)]);
  }
}
