// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use pretty_assertions::assert_eq;
use std::time::Duration;
use suite_scoreboard::{
    expectation::ExpectationFlags,
    metadata::TestStatus,
    reporter::{ConsoleReporter, SummaryStyle},
    result::TestMethodResult,
};

#[test]
fn event_sequence() {
    let mut sb = registered(
        &[
            ("alpha", ExpectationFlags::PASS),
            ("flake", ExpectationFlags::FLAKY),
            ("skip", ExpectationFlags::NOT_SUPPORTED),
        ],
        RecordingObserver::default(),
    );
    sb.start(["alpha", "flake"]);
    sb.update([TestMethodResult::fail("flake")]);
    sb.restart(1);
    sb.start(["alpha", "flake"]);
    sb.update([TestMethodResult::pass("alpha")]);
    sb.finalize();

    use RecordedEvent::*;
    let observer = sb.into_observer();
    assert_eq!(
        observer.events(),
        [
            SuiteStarted {
                epoch: 0,
                test_count: 2
            },
            TestStarted {
                name: "alpha".to_owned(),
                attempt: 1
            },
            TestStarted {
                name: "flake".to_owned(),
                attempt: 1
            },
            TestUpdated {
                name: "flake".to_owned(),
                status: TestStatus::ExpectedFlake
            },
            SuiteRestarted { restarts: 1 },
            SuiteStarted {
                epoch: 1,
                test_count: 2
            },
            TestStarted {
                name: "alpha".to_owned(),
                attempt: 2
            },
            TestStarted {
                name: "flake".to_owned(),
                attempt: 2
            },
            TestUpdated {
                name: "alpha".to_owned(),
                status: TestStatus::ExpectedPass
            },
            TestUpdated {
                name: "flake".to_owned(),
                status: TestStatus::Incomplete
            },
            TestUpdated {
                name: "skip".to_owned(),
                status: TestStatus::Skipped
            },
            SuiteFinished {
                status: TestStatus::Incomplete
            },
        ]
    );

    // Counts attached to each event include the event's own effects.
    let (last, counts) = observer.events.last().expect("at least one event");
    assert_eq!(
        *last,
        SuiteFinished {
            status: TestStatus::Incomplete
        }
    );
    assert_eq!(counts.total, 3);
    assert_eq!(counts.incompleted, 1);
    assert_eq!(counts.skipped, 1);
    assert_eq!(counts.expected_passed, 1);
    assert_eq!(counts.restarts, 1);

    let (_, counts) = &observer.events[3];
    assert_eq!(counts.flaky, 1, "flake is waiting on its retry");
    assert_eq!(counts.completed, 1);
}

#[test]
fn console_output() {
    let mut reporter = ConsoleReporter::new(Vec::new());
    reporter.set_summary_style(SummaryStyle::Full);

    let mut sb = registered(
        &[
            ("testBuild", ExpectationFlags::PASS),
            ("testBroken", ExpectationFlags::FAIL),
            ("testHang", ExpectationFlags::PASS),
        ],
        &mut reporter,
    );
    sb.start(["testBuild", "testBroken", "testHang"]);
    sb.update([
        TestMethodResult::pass("testBuild").with_duration(Duration::from_millis(1250)),
        TestMethodResult::fail("testBroken").with_duration(Duration::from_millis(30)),
    ]);
    sb.restart(1);
    sb.abort();
    drop(sb);

    assert!(reporter.take_error().is_none());
    let output = String::from_utf8(reporter.into_inner()).expect("output is UTF-8");
    assert_eq!(
        output,
        "    Starting 3 tests in suite\n\
         \x20       PASS [   1.250s] suite:testBuild\n\
         \x20      XFAIL [   0.030s] suite:testBroken\n\
         \x20 Restarting suite with 1 incomplete test (restart 1)\n\
         \x20   Aborting suite\n\
         \x20 INCOMPLETE [   0.000s] suite:testHang\n\
         \x20    Summary INCOMPLETE suite: 2/3   66%  1 Passed  1 Expected Failed  1 Incomplete \n"
    );
}
