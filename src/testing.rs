//! Marble testing: hot and cold producers built from diagrams, expectations
//! on what an observable emits and on when producers were subscribed, and
//! the runner that drains virtual time and checks them.
//!
//! ```rust
//! use rxmarble::prelude::*;
//!
//! MarbleRunner::default().run(|h| {
//!   let values = ValueMap::from([('a', 1), ('b', 2), ('c', 3)]);
//!   let source: ColdObservable<i32, &str> = h.cold(marbles("-a-b-c-|").values(&values))?;
//!
//!   let expected = ValueMap::from([('x', 10), ('z', 30)]);
//!   h.expect_observable(source.clone().filter(|v| v % 2 == 1).map(|v| v * 10))
//!     .to_be(marbles("-x---z-|").values(&expected))?;
//!   h.expect_subscriptions(source.subscriptions()).to_be(["^------!"])
//! });
//! ```

mod cold;
mod expect;
mod hot;
mod log;
mod marbles;
mod report;
mod runner;

pub use cold::{ColdObservable, ColdSubscription};
pub use expect::{ExpectObservable, ExpectSubscriptions};
pub use hot::{HotObservable, HotSubscription};
pub use log::SubscriptionLog;
pub use marbles::{Marbles, marbles};
pub use runner::{MarbleRunner, RunHelpers};
