use std::{cell::RefCell, rc::Rc};

use float_cmp::approx_eq;
use rxmarble::prelude::*;

#[rxmarble_macro::test]
fn map_and_filter() {
  MarbleRunner::default().run(|h| {
    let values = ValueMap::from([('a', 1), ('b', 2), ('c', 3), ('d', 4)]);
    let source: ColdObservable<i32, &str> = h.cold(marbles("-a-b-c-d-|").values(&values))?;

    let expected = ValueMap::from([('x', 20), ('y', 40)]);
    h.expect_observable(source.clone().filter(|v| v % 2 == 0).map(|v| v * 10))
      .to_be(marbles("---x---y-|").values(&expected))?;
    h.expect_subscriptions(source.subscriptions()).to_be(["^--------!"])
  });
}

#[rxmarble_macro::test]
fn concat_subscribes_the_second_source_on_completion() {
  MarbleRunner::default().run(|h| {
    let e1: ColdObservable<char, &str> = h.cold("--a--b-|")?;
    let e2: ColdObservable<char, &str> = h.cold("--x---y-|")?;

    h.expect_observable(e1.clone().concat(e2.clone())).to_be("--a--b---x---y-|")?;
    h.expect_subscriptions(e1.subscriptions()).to_be(["^------!"])?;
    h.expect_subscriptions(e2.subscriptions()).to_be(["-------^-------!"])
  });
}

#[rxmarble_macro::test]
fn hot_emissions_before_the_caret_are_never_seen() {
  MarbleRunner::default().run(|h| {
    let source: HotObservable<char, &str> = h.hot("---a--^-b-|")?;
    h.expect_observable(source.clone()).to_be("--b-|")?;
    h.expect_subscriptions(source.subscriptions()).to_be(["^---!"])
  });
}

#[rxmarble_macro::test]
fn late_hot_subscriber_misses_earlier_values() {
  MarbleRunner::default().run(|h| {
    let source: HotObservable<char, &str> = h.hot("-a-b-c-d-|")?;
    h.expect_observable_with(source.clone(), "---^---!")?.to_be("---b-c")?;
    h.expect_subscriptions(source.subscriptions()).to_be(["---^---!"])
  });
}

#[rxmarble_macro::test]
fn hot_subscriber_sees_emissions_at_its_own_frame() {
  MarbleRunner::default().run(|h| {
    let source: HotObservable<char, &str> = h.hot("a-b|")?;
    h.expect_observable(source.clone()).to_be("a-b|")?;
    h.expect_subscriptions(source.subscriptions()).to_be(["^--!"])
  });
}

#[rxmarble_macro::test]
fn hot_emission_at_the_caret_is_delivered() {
  MarbleRunner::default().run(|h| {
    let source: HotObservable<char, &str> = h.hot("--(^a)-b|")?;
    h.expect_observable(source).to_be("a-b|")
  });
}

#[rxmarble_macro::test]
fn cold_replays_from_each_subscription() {
  MarbleRunner::default().run(|h| {
    let source: ColdObservable<char, &str> = h.cold("-a-b|")?;
    h.expect_observable(source.clone()).to_be("-a-b|")?;
    h.expect_observable_with(source.clone(), "---^")?.to_be("----a-b|")?;
    h.expect_subscriptions(source.subscriptions()).to_be(["^---!", "---^---!"])
  });
}

#[rxmarble_macro::test]
fn retry_resubscribes_within_the_same_frame() {
  MarbleRunner::default().run(|h| {
    let values = ValueMap::from([('a', 1), ('b', 2)]);
    let source: ColdObservable<i32, &str> =
      h.cold(marbles("(ab#)").values(&values).error("Number too high!"))?;

    h.expect_observable(source.clone().retry(2))
      .to_be(marbles("(ababab#)").values(&values).error("Number too high!"))?;
    h.expect_subscriptions(source.subscriptions()).to_be(["(^!)", "(^!)", "(^!)"])
  });
}

#[rxmarble_macro::test]
fn retry_resubscribes_a_source_that_fails_on_its_third_value() {
  MarbleRunner::default().run(|h| {
    let source = create(|emitter: &mut dyn Emitter<i32, &'static str>| {
      for v in [1, 2, 3] {
        if v > 2 {
          emitter.error("Number too high!");
          return;
        }
        emitter.next(v);
      }
    });

    let values = ValueMap::from([('a', 1), ('b', 2)]);
    h.expect_observable(source.retry(2))
      .to_be(marbles("(ababab#)").values(&values).error("Number too high!"))
  });
}

#[rxmarble_macro::test]
fn retry_recovers_before_the_count_runs_out() {
  MarbleRunner::default().run(|h| {
    let source: ColdObservable<char, &str> = h.cold("-a#")?;
    h.expect_observable(source.clone().retry(RetryConfig::new().count(5)).take(3))
      .to_be("-a-a-(a|)")?;
    h.expect_subscriptions(source.subscriptions()).to_be(["^-!", "--^-!", "----^!"])
  });
}

#[rxmarble_macro::test]
fn interval_bounded_by_take() {
  MarbleRunner::default().run(|h| {
    let period = h.time("--|")?;
    h.expect_observable(interval(period, h.scheduler()).take(3)).to_be("--0-1-(2|)")
  });
}

#[rxmarble_macro::test]
fn take_unsubscribes_from_its_source() {
  MarbleRunner::default().run(|h| {
    let source: ColdObservable<char, &str> = h.cold("-a-b-c-d|")?;
    h.expect_observable(source.clone().take(2)).to_be("-a-(b|)")?;
    h.expect_subscriptions(source.subscriptions()).to_be(["^--!"])
  });
}

#[rxmarble_macro::test]
fn flush_runs_side_effects_before_the_run_ends() {
  let seen = Rc::new(RefCell::new(Vec::new()));
  MarbleRunner::default().run(|h| {
    let source: ColdObservable<char, &str> = h.cold("--a--b--c|")?;
    let s = seen.clone();
    h.expect_observable(source.tap(move |v| s.borrow_mut().push(*v))).to_be("--a--b--c|")?;

    assert!(seen.borrow().is_empty());
    h.flush()?;
    assert_eq!(*seen.borrow(), ['a', 'b', 'c']);
    assert_eq!(h.scheduler().now(), 90);
    Ok(())
  });
}

#[rxmarble_macro::test]
fn synchronous_sources_emit_in_one_frame() {
  MarbleRunner::default().run(|h| {
    h.expect_observable(of::<char, &str>('x')).to_be("(x|)")?;
    h.expect_observable(from_iter::<_, &str>(1..=3)).to_be("(123|)")?;
    h.expect_observable(empty::<char, &str>()).to_be("|")?;
    h.expect_observable(throw_err::<char, &str>("error")).to_be("#")?;
    h.expect_observable(never::<char, &str>()).to_be("")
  });
}

#[rxmarble_macro::test]
fn unbounded_interval_does_not_settle() {
  let err = MarbleRunner::new(MarbleConfig::new().max_frames(100))
    .try_run(|h| h.expect_observable(interval(10, h.scheduler())).to_be("-0-1-2"))
    .unwrap_err();
  assert_eq!(err, MarbleError::DrainTimeout { max_frames: 100, next_frame: 110, pending: 1 });
  assert!(!err.is_assertion());
}

#[rxmarble_macro::test]
fn every_mismatch_is_collected() {
  let err = MarbleRunner::default()
    .try_run(|h| {
      let source: ColdObservable<char, &str> = h.cold("-a-b|")?;
      h.expect_observable(source.clone()).to_be("-a-c|")?;
      h.expect_observable(source.clone().map(|c| c.to_ascii_uppercase())).to_be("-A-B|")?;
      h.expect_subscriptions(source.subscriptions()).to_be(["^---!"])
    })
    .unwrap_err();

  let report = match &err {
    MarbleError::Assertion(report) => report,
    other => panic!("unexpected {other:?}"),
  };
  assert_eq!(report.len(), 2);
  assert!(matches!(report.mismatches()[0], Mismatch::SequenceMismatch { .. }));
  assert!(matches!(report.mismatches()[1], Mismatch::SubscriptionMismatch { .. }));

  let text = err.to_string();
  assert!(text.contains("expect_observable #0: notifications differ"));
  assert!(text.contains("@30 Next('c')"));
  assert!(text.contains("@30 Next('b')"));
  assert!(text.contains("expect_subscriptions #2: subscriptions differ"));
  assert!(text.contains("[0, 40] ^---!"));
}

fn approx_records(
  actual: &[TimedRecord<f64, &'static str>], expected: &[TimedRecord<f64, &'static str>],
) -> bool {
  actual.len() == expected.len()
    && actual.iter().zip(expected).all(|(a, e)| {
      a.frame == e.frame
        && match (&a.notification, &e.notification) {
          (Notification::Next(a), Notification::Next(e)) => approx_eq!(f64, *a, *e, ulps = 4),
          (a, e) => a == e,
        }
    })
}

#[rxmarble_macro::test]
fn custom_equality_for_floats() {
  let values = ValueMap::from([('a', 0.1), ('b', 0.2)]);
  let expected = ValueMap::from([('x', 0.3), ('y', 0.6)]);

  MarbleRunner::default().run(|h| {
    let source: ColdObservable<f64, &str> = h.cold(marbles("-a-b|").values(&values))?;
    h.expect_observable(source.map(|v| v * 3.))
      .to_be_with(marbles("-x-y|").values(&expected), approx_records)
  });

  let strict = MarbleRunner::default().try_run(|h| {
    let source: ColdObservable<f64, &str> = h.cold(marbles("-a-b|").values(&values))?;
    h.expect_observable(source.map(|v| v * 3.)).to_be(marbles("-x-y|").values(&expected))
  });
  assert!(strict.is_err_and(|e| e.is_assertion()));
}

#[rxmarble_macro::test]
fn custom_tick() {
  MarbleRunner::new(MarbleConfig::new().tick(1)).run(|h| {
    let source: ColdObservable<char, &str> = h.cold("--a|")?;
    assert_eq!(h.time("--a|")?, 3);
    h.expect_observable(source).to_be("--a|")?;
    h.expect_observable(interval(h.time("--|")?, h.scheduler()).take(1)).to_be("--(0|)")
  });
}

#[rxmarble_macro::test]
fn strict_markers_reject_carets() {
  let err = MarbleRunner::new(MarbleConfig::new().strict_markers())
    .try_run(|h| {
      let _: HotObservable<char, &str> = h.hot("--^-a|")?;
      Ok(())
    })
    .unwrap_err();
  assert!(matches!(err, MarbleError::MalformedDiagram { .. }));
}
