use std::rc::Rc;

use tracing::debug;

use super::log::SubscriptionLog;
use crate::{
  notification::{Notification, TimedRecord},
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  scheduler::{TaskHandle, TaskState, TestScheduler},
  subscription::Subscription,
};

/// A marble producer that replays its diagram for every subscriber,
/// relative to the frame that subscriber attached at.
pub struct ColdObservable<T, E> {
  records: Rc<[TimedRecord<T, E>]>,
  scheduler: TestScheduler,
  log: SubscriptionLog,
}

impl<T, E> ColdObservable<T, E> {
  pub(crate) fn new(records: Vec<TimedRecord<T, E>>, scheduler: TestScheduler) -> Self {
    Self { records: records.into(), scheduler, log: SubscriptionLog::default() }
  }

  /// Log of every subscription made to this producer.
  pub fn subscriptions(&self) -> SubscriptionLog { self.log.clone() }
}

impl<T, E> Clone for ColdObservable<T, E> {
  fn clone(&self) -> Self {
    Self { records: self.records.clone(), scheduler: self.scheduler.clone(), log: self.log.clone() }
  }
}

impl<T, E> Observable for ColdObservable<T, E>
where
  T: Clone + 'static,
  E: Clone + 'static,
{
  type Item = T;
  type Err = E;
  type Unsub = ColdSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<T, E> + 'static,
  {
    let now = self.scheduler.now();
    let slot = self.log.open(now);
    debug!(frame = now, slot, records = self.records.len(), "cold subscribe");

    let observer = MutRc::own(Some(observer));
    let handles = (0..self.records.len())
      .map(|idx| {
        let records = self.records.clone();
        let mut observer = observer.clone();
        let (log, scheduler) = (self.log.clone(), self.scheduler.clone());
        self.scheduler.schedule(records[idx].frame, move || {
          match records[idx].notification.clone() {
            Notification::Next(v) => observer.next(v),
            Notification::Error(e) => {
              log.close(slot, scheduler.now());
              observer.clone().error(e);
            }
            Notification::Complete => {
              log.close(slot, scheduler.now());
              observer.clone().complete();
            }
          }
          TaskState::Finished
        })
      })
      .collect();

    ColdSubscription { handles, log: self.log, slot, scheduler: self.scheduler }
  }
}

/// Subscription to a [`ColdObservable`]; unsubscribing cancels the pending
/// emissions and closes the window at the current frame.
pub struct ColdSubscription {
  handles: Vec<TaskHandle>,
  log: SubscriptionLog,
  slot: usize,
  scheduler: TestScheduler,
}

impl Subscription for ColdSubscription {
  fn unsubscribe(self) {
    for handle in self.handles {
      handle.unsubscribe();
    }
    let now = self.scheduler.now();
    if self.log.close(self.slot, now) {
      debug!(frame = now, slot = self.slot, "cold unsubscribe");
    }
  }

  fn is_closed(&self) -> bool { self.log.is_closed(self.slot) }
}
