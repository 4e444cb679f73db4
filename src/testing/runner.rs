use std::cell::{Cell, RefCell};

use tracing::{debug, info_span, warn};

use super::{
  cold::ColdObservable,
  expect::{ExpectObservable, ExpectSubscriptions},
  hot::HotObservable,
  log::SubscriptionLog,
  marbles::Marbles,
};
use crate::{
  config::MarbleConfig,
  error::{MarbleError, Mismatch, MismatchReport},
  marble::{ErrorMarker, MarbleParser, MarbleValue},
  notification::{Frame, SubscriptionWindow},
  observable::Observable,
  scheduler::TestScheduler,
};

type Check = Box<dyn Fn() -> Option<Mismatch>>;
type HotStart = Box<dyn FnOnce()>;

/// Runs marble tests on a private virtual clock.
///
/// Every run starts from frame 0 with an empty queue, so one runner can be
/// reused across runs.
#[derive(Debug, Clone)]
pub struct MarbleRunner {
  config: MarbleConfig,
  scheduler: TestScheduler,
}

impl MarbleRunner {
  pub fn new(config: MarbleConfig) -> Self {
    Self { config, scheduler: TestScheduler::new(config.frame_bound()) }
  }

  pub fn config(&self) -> &MarbleConfig { &self.config }

  pub fn scheduler(&self) -> &TestScheduler { &self.scheduler }

  /// Sets up the run with `body`, drains virtual time and checks every
  /// registered expectation.
  ///
  /// An error from `body` aborts the run before anything is drained. A drain
  /// that does not settle reports `DrainTimeout` instead of assertions. All
  /// failing expectations are reported together as
  /// [`MarbleError::Assertion`].
  pub fn try_run<F>(&self, body: F) -> Result<(), MarbleError>
  where
    F: FnOnce(&RunHelpers) -> Result<(), MarbleError>,
  {
    let span = info_span!("marble_run", tick = self.config.tick_frames());
    let _enter = span.enter();

    self.scheduler.reset();
    self.scheduler.set_max_frames(self.config.frame_bound());
    let helpers = RunHelpers::new(self.scheduler.clone(), MarbleParser::new(self.config));
    body(&helpers)?;
    helpers.flush()?;

    let mismatches: Vec<_> = helpers.checks.borrow().iter().filter_map(|check| check()).collect();
    let expectations = helpers.checks.borrow().len();
    debug!(expectations, failed = mismatches.len(), "marble run done");
    if mismatches.is_empty() {
      return Ok(());
    }
    for mismatch in &mismatches {
      warn!(label = mismatch.label(), "marble expectation failed");
    }
    Err(MarbleError::Assertion(MismatchReport(mismatches)))
  }

  /// [`try_run`](Self::try_run) for `#[test]` bodies: panics with the full
  /// report on any error.
  pub fn run<F>(&self, body: F)
  where
    F: FnOnce(&RunHelpers) -> Result<(), MarbleError>,
  {
    if let Err(err) = self.try_run(body) {
      panic!("{err}");
    }
  }
}

impl Default for MarbleRunner {
  fn default() -> Self { Self::new(MarbleConfig::default()) }
}

/// What a run body uses to build producers and register expectations.
pub struct RunHelpers {
  scheduler: TestScheduler,
  parser: MarbleParser,
  checks: RefCell<Vec<Check>>,
  hot_starts: RefCell<Vec<HotStart>>,
  labels: Cell<usize>,
}

impl RunHelpers {
  fn new(scheduler: TestScheduler, parser: MarbleParser) -> Self {
    Self {
      scheduler,
      parser,
      checks: RefCell::new(Vec::new()),
      hot_starts: RefCell::new(Vec::new()),
      labels: Cell::new(0),
    }
  }

  /// A producer that replays `marbles` for every subscriber, starting at
  /// that subscriber's frame. A `^` is rejected.
  pub fn cold<'a, T, E>(
    &self, marbles: impl Into<Marbles<'a, T, E>>,
  ) -> Result<ColdObservable<T, E>, MarbleError>
  where
    T: MarbleValue + Clone + 'static,
    E: ErrorMarker + Clone + 'static,
  {
    let marbles: Marbles<'a, T, E> = marbles.into();
    let diagram = marbles.diagram();
    let sequence = marbles.parse(&self.parser)?;
    if sequence.origin().is_some() {
      return Err(MarbleError::ColdSubscriptionOffset { diagram: diagram.to_owned() });
    }
    Ok(ColdObservable::new(sequence.into_records(), self.scheduler.clone()))
  }

  /// A producer emitting `marbles` on the shared clock. A `^` marks frame 0;
  /// anything before it is never delivered.
  ///
  /// Emissions are queued when the run drains, behind every subscription
  /// the body registered, so a subscriber attaching at frame F still sees
  /// what is emitted at F.
  pub fn hot<'a, T, E>(
    &self, marbles: impl Into<Marbles<'a, T, E>>,
  ) -> Result<HotObservable<T, E>, MarbleError>
  where
    T: MarbleValue + Clone + 'static,
    E: ErrorMarker + Clone + 'static,
  {
    let marbles: Marbles<'a, T, E> = marbles.into();
    let records = marbles.parse(&self.parser)?.relative_to_origin().into_records();
    let hot = HotObservable::new(self.scheduler.clone());
    let starter = hot.clone();
    self.hot_starts.borrow_mut().push(Box::new(move || starter.start(records)));
    Ok(hot)
  }

  /// Subscribes to `source` at frame 0 and keeps the subscription until the
  /// run drains.
  pub fn expect_observable<S: Observable>(&self, source: S) -> ExpectObservable<'_, S> {
    ExpectObservable::new(self, source, SubscriptionWindow::open(0))
  }

  /// Subscribes at the `^` and unsubscribes at the `!` of `window`.
  pub fn expect_observable_with<S: Observable>(
    &self, source: S, window: &str,
  ) -> Result<ExpectObservable<'_, S>, MarbleError> {
    let window = self.parser.parse_subscription_window(window)?;
    Ok(ExpectObservable::new(self, source, window))
  }

  pub fn expect_subscriptions(&self, log: SubscriptionLog) -> ExpectSubscriptions<'_> {
    ExpectSubscriptions::new(self, log)
  }

  /// Drains virtual time now instead of at the end of the run.
  ///
  /// Hot producers defined so far start emitting first.
  pub fn flush(&self) -> Result<(), MarbleError> {
    let starts = std::mem::take(&mut *self.hot_starts.borrow_mut());
    for start in starts {
      start();
    }
    self.scheduler.flush()
  }

  /// Frame of the `|` in `diagram`.
  pub fn time(&self, diagram: &str) -> Result<Frame, MarbleError> { self.parser.time(diagram) }

  /// The run's clock, for operators that schedule on their own.
  pub fn scheduler(&self) -> &TestScheduler { &self.scheduler }

  pub(crate) fn parser(&self) -> &MarbleParser { &self.parser }

  pub(crate) fn label(&self, kind: &str) -> String {
    let n = self.labels.get();
    self.labels.set(n + 1);
    format!("{kind} #{n}")
  }

  pub(crate) fn register(&self, check: impl Fn() -> Option<Mismatch> + 'static) {
    self.checks.borrow_mut().push(Box::new(check));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxmarble_macro::test]
  fn passing_run() {
    MarbleRunner::default().run(|h| {
      let source: ColdObservable<char, &str> = h.cold("-a-b|")?;
      h.expect_observable(source.clone()).to_be("-a-b|")?;
      h.expect_subscriptions(source.subscriptions()).to_be(["^---!"])
    });
  }

  #[rxmarble_macro::test]
  fn every_failing_expectation_is_reported() {
    let err = MarbleRunner::default()
      .try_run(|h| {
        let source: ColdObservable<char, &str> = h.cold("-a|")?;
        h.expect_observable(source.clone()).to_be("--a|")?;
        h.expect_observable(source.clone()).to_be("-a|")?;
        h.expect_subscriptions(source.subscriptions()).to_be(["^-!"])
      })
      .unwrap_err();

    let report = match err {
      MarbleError::Assertion(report) => report,
      other => panic!("unexpected {other:?}"),
    };
    let labels: Vec<_> = report.mismatches().iter().map(Mismatch::label).collect();
    assert_eq!(labels, ["expect_observable #0", "expect_subscriptions #2"]);
    assert_eq!(report.mismatches()[0], Mismatch::SequenceMismatch {
      label: "expect_observable #0".into(),
      expected: "  --a|\n  @20 Next('a')\n  @30 Complete".into(),
      actual: "  -a|\n  @10 Next('a')\n  @20 Complete".into(),
    });
  }

  #[rxmarble_macro::test]
  fn setup_errors_abort_before_draining() {
    let runner = MarbleRunner::default();
    let err = runner
      .try_run(|h| {
        let source: ColdObservable<char, &str> = h.cold("-a|")?;
        h.expect_observable(source).to_be("-a|")?;
        let _broken: ColdObservable<char, &str> = h.cold("-a-(b")?;
        Ok(())
      })
      .unwrap_err();
    assert!(matches!(err, MarbleError::MalformedDiagram { .. }));
    assert_eq!(runner.scheduler().now(), 0);
  }

  #[rxmarble_macro::test]
  fn caret_in_cold_diagram() {
    let err = MarbleRunner::default()
      .try_run(|h| {
        let _: ColdObservable<char, &str> = h.cold("--^-a|")?;
        Ok(())
      })
      .unwrap_err();
    assert_eq!(err, MarbleError::ColdSubscriptionOffset { diagram: "--^-a|".into() });
  }

  #[rxmarble_macro::test]
  fn runs_start_from_a_fresh_clock() {
    let runner = MarbleRunner::default();
    for _ in 0..2 {
      runner.run(|h| {
        assert_eq!(h.scheduler().now(), 0);
        let source: ColdObservable<char, &str> = h.cold("---a|")?;
        h.expect_observable(source.map(|c| c.to_ascii_uppercase())).to_be("---A|")
      });
    }
  }

  #[rxmarble_macro::test]
  fn time_measures_to_the_pipe() {
    MarbleRunner::new(MarbleConfig::new().tick(1)).run(|h| {
      assert_eq!(h.time("---|")?, 3);
      Ok(())
    });
  }

  #[rxmarble_macro::test]
  #[should_panic(expected = "1 marble expectation(s) failed")]
  fn run_panics_with_the_report() {
    MarbleRunner::default().run(|h| {
      let source: ColdObservable<char, &str> = h.cold("a|")?;
      h.expect_observable(source).to_be("b|")
    });
  }
}
