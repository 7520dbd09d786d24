// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use pretty_assertions::assert_eq;
use suite_scoreboard::{
    expectation::{Expectation, ExpectationFlags},
    metadata::{SuiteCounts, TestStatus},
    reporter::NoopObserver,
    result::TestMethodResult,
    scoreboard::{Scoreboard, SuitePhase},
};
use test_case::test_case;

const NONE: [&str; 0] = [];

#[test_case(ExpectationFlags::PASS, TestMethodResult::pass, TestStatus::ExpectedPass ; "expected pass")]
#[test_case(ExpectationFlags::FAIL, TestMethodResult::pass, TestStatus::UnexpectedPass ; "unexpected pass")]
#[test_case(ExpectationFlags::FAIL, TestMethodResult::fail, TestStatus::ExpectedFail ; "expected fail")]
#[test_case(ExpectationFlags::PASS, TestMethodResult::fail, TestStatus::UnexpectedFail ; "unexpected fail")]
#[test_case(ExpectationFlags::FLAKY, TestMethodResult::pass, TestStatus::ExpectedPass ; "flake pass")]
#[test_case(ExpectationFlags::FLAKY, TestMethodResult::fail, TestStatus::UnexpectedFail ; "flake fail")]
fn single_test(
    flags: ExpectationFlags,
    result: fn(&'static str) -> TestMethodResult,
    expected: TestStatus,
) {
    let mut sb = registered(&[("test", flags)], NoopObserver);
    sb.start(["test"]);
    sb.update([result("test")]);
    sb.finalize();

    let counts = sb.counts();
    assert_eq!(counts.total, 1);
    assert_eq!(counts.completed, 1);
    assert_eq!(sb.tests_with_status(expected), ["test"]);
    assert_eq!(sb.overall_status(), expected);
}

#[test]
fn skipped() {
    let mut sb = registered(&[("test", ExpectationFlags::NOT_SUPPORTED)], NoopObserver);
    sb.start(NONE);
    sb.finalize();

    assert_eq!(
        sb.counts(),
        SuiteCounts {
            total: 1,
            completed: 1,
            skipped: 1,
            ..SuiteCounts::default()
        }
    );
    assert_eq!(sb.skipped_tests(), ["test"]);
    assert_eq!(sb.overall_status(), TestStatus::Skipped);
}

#[test]
fn started_but_never_reported() {
    let mut sb = registered(&[("test", ExpectationFlags::PASS)], NoopObserver);
    sb.start(["test"]);
    sb.finalize();

    assert_eq!(sb.incompleted(), 1);
    assert_eq!(sb.completed(), 0);
    assert_eq!(sb.incomplete_tests(), ["test"]);
    assert_eq!(sb.overall_status(), TestStatus::Incomplete);
}

#[test]
fn mixed_suite() {
    let mut sb = registered(
        &[
            ("expected-pass", ExpectationFlags::PASS),
            ("unexpected-pass", ExpectationFlags::FAIL),
            ("expected-fail", ExpectationFlags::FAIL),
            ("unexpected-fail", ExpectationFlags::PASS),
            ("skipped", ExpectationFlags::TIMEOUT),
        ],
        NoopObserver,
    );
    sb.start([
        "expected-pass",
        "unexpected-pass",
        "expected-fail",
        "unexpected-fail",
    ]);
    sb.update([
        TestMethodResult::pass("expected-pass").with_duration_secs(0.5),
        TestMethodResult::pass("unexpected-pass"),
        TestMethodResult::fail("expected-fail"),
        TestMethodResult::fail("unexpected-fail"),
    ]);
    sb.finalize();

    assert_eq!(
        sb.counts(),
        SuiteCounts {
            total: 5,
            completed: 5,
            passed: 2,
            failed: 2,
            skipped: 1,
            expected_passed: 1,
            unexpected_passed: 1,
            expected_failed: 1,
            unexpected_failed: 1,
            ..SuiteCounts::default()
        }
    );
    assert_eq!(sb.expected_passing_tests(), ["expected-pass"]);
    assert_eq!(sb.unexpected_passing_tests(), ["unexpected-pass"]);
    assert_eq!(sb.expected_failing_tests(), ["expected-fail"]);
    assert_eq!(sb.unexpected_failing_tests(), ["unexpected-fail"]);
    assert_eq!(sb.skipped_tests(), ["skipped"]);
    assert_eq!(sb.overall_status(), TestStatus::UnexpectedFail);
}

#[test]
fn flake_restart_pass() {
    let mut sb = registered(&[("flake", ExpectationFlags::FLAKY)], NoopObserver);
    sb.start(["flake"]);
    sb.update([TestMethodResult::fail("flake")]);

    assert_eq!(sb.completed(), 1);
    assert_eq!(sb.flaky_tests(), ["flake"]);
    assert_eq!(sb.overall_status(), TestStatus::ExpectedPass);

    sb.restart(0);
    let retries: Vec<String> = sb.flaky_tests().into_iter().map(str::to_owned).collect();
    sb.start(&retries);
    assert!(sb.flaky_tests().is_empty(), "the retry has been used");
    sb.update([TestMethodResult::pass("flake")]);
    sb.finalize();

    let counts = sb.counts();
    assert_eq!(counts.restarts, 1);
    assert_eq!(counts.passed, 1);
    assert_eq!(counts.expected_passed, 1);
    assert_eq!(counts.completed, 1);
    assert_eq!(sb.expected_passing_tests(), ["flake"]);
    assert_eq!(sb.overall_status(), TestStatus::ExpectedPass);
}

#[test]
fn flake_restart_fail() {
    let mut sb = registered(&[("flake", ExpectationFlags::FLAKY)], NoopObserver);
    sb.start(["flake"]);
    sb.update([TestMethodResult::fail("flake")]);
    sb.restart(0);
    sb.start(["flake"]);
    sb.update([TestMethodResult::fail("flake")]);

    assert_eq!(
        sb.unexpected_failing_tests(),
        ["flake"],
        "a second failure is final without waiting for settlement"
    );
    assert!(sb.flaky_tests().is_empty());

    sb.finalize();
    let counts = sb.counts();
    assert_eq!(counts.restarts, 1);
    assert_eq!(counts.failed, 1);
    assert_eq!(counts.unexpected_failed, 1);
    assert_eq!(sb.overall_status(), TestStatus::UnexpectedFail);
}

#[test]
fn flake_abandoned_by_restart() {
    let mut sb = registered(
        &[("flake", ExpectationFlags::FLAKY), ("hang", ExpectationFlags::PASS)],
        NoopObserver,
    );
    sb.start(["flake", "hang"]);
    assert!(
        sb.flaky_tests().is_empty(),
        "a flaky test that is still running isn't a retry candidate"
    );
    sb.restart(2);
    assert_eq!(sb.flaky_tests(), ["flake"]);
}

#[test]
fn flake_never_completed() {
    let mut sb = registered(&[("flake", ExpectationFlags::FLAKY)], NoopObserver);
    sb.start(["flake"]);
    assert_eq!(sb.incompleted(), 1);
    sb.finalize();
    assert_eq!(sb.incomplete_tests(), ["flake"]);
}

#[test]
fn blacklist() {
    let mut sb = registered(
        &[
            ("alpha", ExpectationFlags::PASS),
            ("beta", ExpectationFlags::PASS),
            ("gamma", ExpectationFlags::PASS),
        ],
        RecordingObserver::default(),
    );

    sb.start(["alpha", "beta", "gamma"]);
    sb.update([TestMethodResult::pass("alpha")]);
    assert_eq!(sb.completed(), 1);
    assert_eq!(sb.incompleted(), 2);
    assert_eq!(sb.incomplete_tests(), ["beta", "gamma"]);
    assert_eq!(sb.overall_status(), TestStatus::Incomplete);

    sb.restart(2);
    assert_eq!(sb.restarts(), 1);
    assert_eq!(sb.incomplete_tests(), ["beta", "gamma"]);
    assert!(
        sb.incomplete_blacklist().is_empty(),
        "one incomplete restart is tolerated"
    );

    sb.start(["beta", "gamma"]);
    sb.update([TestMethodResult::pass("beta")]);
    assert_eq!(sb.expected_passing_tests(), ["alpha", "beta"]);
    assert_eq!(sb.incomplete_tests(), ["gamma"]);

    sb.restart(1);
    assert_eq!(sb.restarts(), 2);
    assert_eq!(sb.incomplete_blacklist(), ["gamma"]);
    assert_eq!(sb.overall_status(), TestStatus::Incomplete);

    sb.start(["gamma"]);
    assert!(
        sb.incomplete_blacklist().is_empty(),
        "hidden while running in the current epoch"
    );
    sb.update([TestMethodResult::pass("gamma")]);
    assert!(sb.incomplete_blacklist().is_empty());
    assert_eq!(sb.overall_status(), TestStatus::ExpectedPass);

    sb.finalize();
    assert_eq!(
        sb.counts(),
        SuiteCounts {
            total: 3,
            completed: 3,
            passed: 3,
            expected_passed: 3,
            restarts: 2,
            ..SuiteCounts::default()
        }
    );
    assert!(sb.incomplete_blacklist().is_empty());
    assert_eq!(sb.overall_status(), TestStatus::ExpectedPass);

    let observer = sb.into_observer();
    assert_eq!(
        observer.updates_for("gamma"),
        [TestStatus::ExpectedPass],
        "gamma was already settled when the suite finished"
    );
}

#[test]
fn blacklisted_test_that_never_completes() {
    let mut sb = registered(&[("hang", ExpectationFlags::PASS)], NoopObserver);
    sb.start(["hang"]);
    sb.restart(1);
    sb.start(["hang"]);
    sb.restart(1);
    assert_eq!(sb.incomplete_blacklist(), ["hang"]);

    sb.finalize();
    assert_eq!(sb.incomplete_blacklist(), ["hang"]);
    assert_eq!(sb.incomplete_tests(), ["hang"]);
    assert_eq!(sb.summary().incomplete_blacklist, ["hang"]);
}

#[test]
fn restart_mismatch_is_tolerated() {
    let mut sb = registered(&[("a", ExpectationFlags::PASS)], NoopObserver);
    sb.start(["a"]);
    sb.restart(5);
    assert_eq!(sb.restarts(), 1);
    assert_eq!(sb.phase(), SuitePhase::Restarted);
    assert_eq!(sb.epoch(), 1);
}

#[test]
fn empty_suite() {
    let mut sb = Scoreboard::new("suite", Vec::<(String, ExpectationFlags)>::new());
    sb.register_tests(NONE);
    sb.finalize();

    assert_eq!(sb.total(), 0);
    assert_eq!(sb.incompleted(), 0);
    assert_eq!(sb.overall_status(), TestStatus::ExpectedPass);
}

#[test]
fn finalize_without_registering() {
    let mut sb = Scoreboard::new("suite", [("a", ExpectationFlags::PASS)]);
    sb.finalize();
    assert_eq!(sb.total(), 0);
    assert_eq!(sb.overall_status(), TestStatus::ExpectedPass);
}

#[test]
fn abort_settles_like_finalize() {
    let run = |abort: bool| {
        let mut sb = registered(
            &[
                ("done", ExpectationFlags::PASS),
                ("flake", ExpectationFlags::FLAKY),
                ("running", ExpectationFlags::PASS),
                ("never", ExpectationFlags::TIMEOUT),
            ],
            NoopObserver,
        );
        sb.start(["done", "flake", "running"]);
        sb.update([TestMethodResult::pass("done"), TestMethodResult::fail("flake")]);
        if abort {
            sb.abort();
            assert_eq!(sb.phase(), SuitePhase::Aborted);
        } else {
            sb.finalize();
            assert_eq!(sb.phase(), SuitePhase::Finalized);
        }
        sb.summary()
    };

    let finalized = run(false);
    let aborted = run(true);
    assert_eq!(finalized, aborted);
    assert_eq!(aborted.status, TestStatus::Incomplete);
    assert_eq!(
        aborted
            .tests_with_status(TestStatus::UnexpectedFail)
            .collect::<Vec<_>>(),
        ["flake"]
    );
    assert_eq!(
        aborted.tests_with_status(TestStatus::Skipped).collect::<Vec<_>>(),
        ["never"]
    );
}

#[test]
fn expectations() {
    let sb = Scoreboard::new(
        "suite",
        [
            ("testPasses", ExpectationFlags::PASS),
            ("testFails", ExpectationFlags::FAIL),
            ("testTimesOut", ExpectationFlags::TIMEOUT),
            ("testFlaky", ExpectationFlags::FLAKY),
        ],
    );
    let expectations = sb.expectations();
    assert_eq!(expectations.len(), 4);
    assert_eq!(expectations["testPasses"], Expectation::ExpectedPass);
    assert_eq!(expectations["testFails"], Expectation::ExpectedFail);
    assert_eq!(expectations["testTimesOut"], Expectation::Skipped);
    assert_eq!(expectations["testFlaky"], Expectation::ExpectedFlake);
}

#[test]
fn summary_serializes() {
    let mut sb = registered(
        &[("a", ExpectationFlags::PASS), ("b", ExpectationFlags::FAIL)],
        NoopObserver,
    );
    sb.start(["a", "b"]);
    sb.update([TestMethodResult::pass("a"), TestMethodResult::fail("b")]);
    sb.finalize();

    let summary = sb.summary();
    let json = summary.to_json_string().expect("summary serializes");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(value["suite-name"], "suite");
    assert_eq!(value["status"], "expected-fail");
    assert_eq!(value["counts"]["expected-failed"], 1);
    assert_eq!(value["tests"][1]["expectation"], "expected-fail");
    assert!(
        value.get("incomplete-blacklist").is_none(),
        "empty blacklist is omitted"
    );

    let parsed =
        suite_scoreboard::metadata::ScoreboardSummary::parse_json(&json).expect("summary parses");
    assert_eq!(parsed, summary);
}
