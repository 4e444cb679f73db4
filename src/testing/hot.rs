use tracing::debug;

use super::log::SubscriptionLog;
use crate::{
  notification::{Frame, Notification, TimedRecord},
  observable::Observable,
  observer::{BoxedObserver, Observer},
  rc::MutRc,
  scheduler::{TaskState, TestScheduler},
  subscription::Subscription,
};

type SharedObserver<T, E> = MutRc<Option<BoxedObserver<'static, T, E>>>;

struct HotSubscriber<T, E> {
  id: usize,
  slot: usize,
  observer: SharedObserver<T, E>,
}

struct HotState<T, E> {
  subscribers: Vec<HotSubscriber<T, E>>,
  next_id: usize,
  terminal: Option<Notification<T, E>>,
}

/// A marble producer that emits on a fixed timeline whether or not anyone
/// listens. Subscribers only see what happens while they are attached.
pub struct HotObservable<T, E> {
  state: MutRc<HotState<T, E>>,
  scheduler: TestScheduler,
  log: SubscriptionLog,
}

impl<T, E> HotObservable<T, E>
where
  T: Clone + 'static,
  E: Clone + 'static,
{
  /// A producer with nothing queued yet; see [`start`](Self::start).
  pub(crate) fn new(scheduler: TestScheduler) -> Self {
    let state = MutRc::own(HotState { subscribers: Vec::new(), next_id: 0, terminal: None });
    Self { state, scheduler, log: SubscriptionLog::default() }
  }

  /// Queues every record at its absolute frame.
  ///
  /// Subscriptions queued before this call run ahead of emissions sharing
  /// their frame, so a subscriber attaching at frame F sees what is emitted
  /// at F.
  pub(crate) fn start(&self, records: Vec<TimedRecord<T, E>>) {
    debug!(records = records.len(), now = self.scheduler.now(), "hot start");
    for TimedRecord { frame, notification } in records {
      let (state, log, clock) = (self.state.clone(), self.log.clone(), self.scheduler.clone());
      let mut pending = Some(notification);
      self.scheduler.schedule_at(frame, move || {
        if let Some(notification) = pending.take() {
          broadcast(&state, &log, clock.now(), notification);
        }
        TaskState::Finished
      });
    }
  }
}

impl<T, E> HotObservable<T, E> {
  /// Log of every subscription made to this producer.
  pub fn subscriptions(&self) -> SubscriptionLog { self.log.clone() }
}

fn broadcast<T: Clone, E: Clone>(
  state: &MutRc<HotState<T, E>>, log: &SubscriptionLog, now: Frame,
  notification: Notification<T, E>,
) {
  match notification {
    Notification::Next(v) => {
      let targets: Vec<_> =
        state.rc_deref().subscribers.iter().map(|s| (s.id, s.observer.clone())).collect();
      for (id, mut observer) in targets {
        // An earlier subscriber may have unsubscribed this one.
        if state.rc_deref().subscribers.iter().any(|s| s.id == id) {
          observer.next(v.clone());
        }
      }
    }
    terminal => {
      let drained = {
        let mut state = state.rc_deref_mut();
        state.terminal = Some(terminal.clone());
        std::mem::take(&mut state.subscribers)
      };
      for subscriber in drained {
        log.close(subscriber.slot, now);
        deliver_terminal(subscriber.observer, terminal.clone());
      }
    }
  }
}

fn deliver_terminal<T, E, O: Observer<T, E>>(observer: O, terminal: Notification<T, E>) {
  match terminal {
    Notification::Error(e) => observer.error(e),
    Notification::Complete => observer.complete(),
    Notification::Next(_) => {}
  }
}

impl<T, E> Clone for HotObservable<T, E> {
  fn clone(&self) -> Self {
    Self { state: self.state.clone(), scheduler: self.scheduler.clone(), log: self.log.clone() }
  }
}

impl<T, E> Observable for HotObservable<T, E>
where
  T: Clone + 'static,
  E: Clone + 'static,
{
  type Item = T;
  type Err = E;
  type Unsub = HotSubscription<T, E>;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<T, E> + 'static,
  {
    let now = self.scheduler.now();
    let slot = self.log.open(now);
    debug!(frame = now, slot, "hot subscribe");

    let finished = self.state.rc_deref().terminal.clone();
    if let Some(terminal) = finished {
      self.log.close(slot, now);
      deliver_terminal(observer, terminal);
      let Self { state, scheduler, log } = self;
      return HotSubscription { state, id: None, slot, log, scheduler };
    }

    let observer: BoxedObserver<'static, T, E> = Box::new(observer);
    let id = {
      let mut state = self.state.rc_deref_mut();
      let id = state.next_id;
      state.next_id += 1;
      state.subscribers.push(HotSubscriber { id, slot, observer: MutRc::own(Some(observer)) });
      id
    };
    let Self { state, scheduler, log } = self;
    HotSubscription { state, id: Some(id), slot, log, scheduler }
  }
}

/// Subscription to a [`HotObservable`]; unsubscribing detaches the
/// subscriber and closes its window at the current frame.
pub struct HotSubscription<T, E> {
  state: MutRc<HotState<T, E>>,
  id: Option<usize>,
  slot: usize,
  log: SubscriptionLog,
  scheduler: TestScheduler,
}

impl<T, E> Subscription for HotSubscription<T, E> {
  fn unsubscribe(self) {
    if let Some(id) = self.id {
      let removed = {
        let mut state = self.state.rc_deref_mut();
        let idx = state.subscribers.iter().position(|s| s.id == id);
        idx.map(|idx| state.subscribers.remove(idx))
      };
      drop(removed);
    }
    let now = self.scheduler.now();
    if self.log.close(self.slot, now) {
      debug!(frame = now, slot = self.slot, "hot unsubscribe");
    }
  }

  fn is_closed(&self) -> bool { self.log.is_closed(self.slot) }
}
