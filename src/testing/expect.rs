use std::fmt::Debug;

use super::{
  log::SubscriptionLog,
  marbles::Marbles,
  report::{render_records, render_windows},
  runner::RunHelpers,
};
use crate::{
  error::{MarbleError, Mismatch},
  marble::{ErrorMarker, MarbleValue},
  notification::{Notification, SubscriptionWindow, TimedRecord},
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  scheduler::{TaskState, TestScheduler},
  subscription::{CompositeSubscription, Subscription},
};

/// Stamps every notification with the frame it arrived at.
struct RecordingObserver<T, E> {
  records: MutRc<Vec<TimedRecord<T, E>>>,
  scheduler: TestScheduler,
}

impl<T, E> RecordingObserver<T, E> {
  fn push(&self, notification: Notification<T, E>) {
    let frame = self.scheduler.now();
    self.records.rc_deref_mut().push(TimedRecord { frame, notification });
  }
}

impl<T, E> Observer<T, E> for RecordingObserver<T, E> {
  fn next(&mut self, value: T) { self.push(Notification::Next(value)) }

  fn error(self, err: E) { self.push(Notification::Error(err)) }

  fn complete(self) { self.push(Notification::Complete) }

  fn is_closed(&self) -> bool { false }
}

/// Pending assertion on what an observable emits, created by
/// [`RunHelpers::expect_observable`].
#[must_use = "nothing is checked until `to_be` is called"]
pub struct ExpectObservable<'h, S> {
  helpers: &'h RunHelpers,
  source: S,
  window: SubscriptionWindow,
}

impl<'h, S> ExpectObservable<'h, S> {
  pub(crate) fn new(helpers: &'h RunHelpers, source: S, window: SubscriptionWindow) -> Self {
    Self { helpers, source, window }
  }
}

impl<'h, S> ExpectObservable<'h, S>
where
  S: Observable + 'static,
  S::Item: MarbleValue + PartialEq + Clone + Debug + 'static,
  S::Err: ErrorMarker + Debug + 'static,
{
  /// Registers the expectation that the captured timeline equals
  /// `expected`.
  pub fn to_be<'a>(
    self, expected: impl Into<Marbles<'a, S::Item, S::Err>>,
  ) -> Result<(), MarbleError>
  where
    S::Err: PartialEq,
  {
    self.to_be_with(expected, |actual, expected| actual == expected)
  }

  /// Like [`to_be`](Self::to_be), deciding equality with `eq(actual,
  /// expected)` instead of `PartialEq`.
  pub fn to_be_with<'a, F>(
    self, expected: impl Into<Marbles<'a, S::Item, S::Err>>, eq: F,
  ) -> Result<(), MarbleError>
  where
    F: Fn(&[TimedRecord<S::Item, S::Err>], &[TimedRecord<S::Item, S::Err>]) -> bool + 'static,
  {
    let Self { helpers, source, window } = self;
    let expected: Marbles<'a, S::Item, S::Err> = expected.into();
    let values = expected.value_map().cloned();
    let expected = expected.parse(helpers.parser())?.relative_to_origin().into_records();

    let scheduler = helpers.scheduler().clone();
    let records = MutRc::own(Vec::new());
    let slot: MutRc<Option<CompositeSubscription>> = MutRc::default();

    let recorder = RecordingObserver { records: records.clone(), scheduler: scheduler.clone() };
    let (mut source, mut recorder, subscribed) = (Some(source), Some(recorder), slot.clone());
    scheduler.schedule_at(window.subscribed, move || {
      if let (Some(source), Some(recorder)) = (source.take(), recorder.take()) {
        let subscription = source.subscribe(recorder);
        *subscribed.rc_deref_mut() = Some(subscription);
      }
      TaskState::Finished
    });
    if let Some(end) = window.unsubscribed {
      scheduler.schedule_at(end, move || {
        let subscription = slot.rc_deref_mut().take();
        subscription.unsubscribe();
        TaskState::Finished
      });
    }

    let label = helpers.label("expect_observable");
    let tick = helpers.parser().config().tick_frames();
    helpers.register(move || {
      let actual = records.rc_deref();
      if eq(actual.as_slice(), &expected) {
        return None;
      }
      Some(Mismatch::SequenceMismatch {
        label: label.clone(),
        expected: render_records(&expected, tick, values.as_ref()),
        actual: render_records(actual.as_slice(), tick, values.as_ref()),
      })
    });
    Ok(())
  }
}

/// Pending assertion on the subscription windows a producer saw, created by
/// [`RunHelpers::expect_subscriptions`].
#[must_use = "nothing is checked until `to_be` is called"]
pub struct ExpectSubscriptions<'h> {
  helpers: &'h RunHelpers,
  log: SubscriptionLog,
}

impl<'h> ExpectSubscriptions<'h> {
  pub(crate) fn new(helpers: &'h RunHelpers, log: SubscriptionLog) -> Self { Self { helpers, log } }

  /// Registers the expectation that the log holds exactly one window per
  /// diagram, in subscription order.
  pub fn to_be<'a>(self, diagrams: impl IntoIterator<Item = &'a str>) -> Result<(), MarbleError> {
    let Self { helpers, log } = self;
    let expected = diagrams
      .into_iter()
      .map(|d| helpers.parser().parse_subscription_window(d))
      .collect::<Result<Vec<_>, _>>()?;

    let label = helpers.label("expect_subscriptions");
    let tick = helpers.parser().config().tick_frames();
    helpers.register(move || {
      let actual = log.windows();
      if actual == expected {
        return None;
      }
      Some(Mismatch::SubscriptionMismatch {
        label: label.clone(),
        expected: render_windows(&expected, tick),
        actual: render_windows(&actual, tick),
      })
    });
    Ok(())
  }
}
