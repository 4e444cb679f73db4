//! Prelude module for convenient imports

pub use crate::{
  config::{MarbleConfig, MarkerPolicy},
  error::{MarbleError, Mismatch, MismatchReport},
  marble::{ErrorMarker, MarbleParser, MarbleValue, ValueMap},
  notification::{Frame, MarbleSequence, Notification, SubscriptionWindow, TimedRecord},
  observable::{
    Observable, create, empty, from_iter, interval, interval_at, never, of, throw_err,
  },
  observer::{Emitter, FnMutObserver, Observer},
  ops::retry::{RetryConfig, RetryPolicy},
  scheduler::{TaskHandle, TaskState, TestScheduler},
  subscription::{CompositeSubscription, Subscription},
  testing::{
    ColdObservable, HotObservable, MarbleRunner, Marbles, RunHelpers, SubscriptionLog, marbles,
  },
};
