// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::TestStatus;
use serde::{Deserialize, Serialize};

/// Aggregate counters for a suite run.
///
/// The counters always satisfy `passed == expected_passed + unexpected_passed` and
/// `failed == expected_failed + unexpected_failed`. Once a scoreboard has been finalized, every
/// registered test is exactly one of passed, failed, skipped or incomplete, so
/// `passed + failed + skipped + incompleted == total`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SuiteCounts {
    /// The number of registered tests.
    pub total: usize,

    /// The number of tests whose latest attempt finished, or that were skipped.
    ///
    /// Before finalization this includes flaky tests that are waiting on a retry, so it is not
    /// necessarily `passed + failed + skipped`.
    pub completed: usize,

    /// The number of tests that were started but have not produced a result.
    pub incompleted: usize,

    /// The number of tests that passed. Includes `expected_passed` and `unexpected_passed`.
    pub passed: usize,

    /// The number of tests that failed. Includes `expected_failed` and `unexpected_failed`.
    pub failed: usize,

    /// The number of tests that were skipped.
    pub skipped: usize,

    /// The number of tests that passed and were expected to.
    pub expected_passed: usize,

    /// The number of tests that passed but were expected to fail.
    pub unexpected_passed: usize,

    /// The number of tests that failed and were expected to.
    pub expected_failed: usize,

    /// The number of tests that failed but were expected to pass.
    pub unexpected_failed: usize,

    /// The number of flaky tests that failed and are waiting on a retry.
    ///
    /// Always zero after finalization.
    pub flaky: usize,

    /// The number of times the suite was restarted.
    pub restarts: usize,
}

impl SuiteCounts {
    /// Accounts for a single test with the given status.
    ///
    /// `total` is not changed: it reflects registration, not classification.
    pub fn record(&mut self, status: TestStatus) {
        self.adjust(status, |count| *count += 1);
    }

    /// Stops accounting for a single test that was previously recorded with the given status.
    ///
    /// Together with [`record`](Self::record), this moves a test from one classification to
    /// another without recounting every test.
    ///
    /// # Panics
    ///
    /// With debug assertions enabled, panics if no test with `status` was recorded.
    pub fn unrecord(&mut self, status: TestStatus) {
        self.adjust(status, |count| *count -= 1);
    }

    fn adjust(&mut self, status: TestStatus, apply: impl Fn(&mut usize)) {
        match status {
            TestStatus::ExpectedPass => {
                apply(&mut self.passed);
                apply(&mut self.expected_passed);
            }
            TestStatus::UnexpectedPass => {
                apply(&mut self.passed);
                apply(&mut self.unexpected_passed);
            }
            TestStatus::ExpectedFail => {
                apply(&mut self.failed);
                apply(&mut self.expected_failed);
            }
            TestStatus::UnexpectedFail => {
                apply(&mut self.failed);
                apply(&mut self.unexpected_failed);
            }
            TestStatus::Skipped => apply(&mut self.skipped),
            TestStatus::Incomplete => {
                apply(&mut self.incompleted);
                return;
            }
            TestStatus::ExpectedFlake => apply(&mut self.flaky),
        }
        apply(&mut self.completed);
    }

    /// Returns the overall verdict for the suite.
    ///
    /// The first matching rule wins:
    ///
    /// 1. no registered tests: [`ExpectedPass`](TestStatus::ExpectedPass)
    /// 2. every registered test skipped: [`Skipped`](TestStatus::Skipped)
    /// 3. any incomplete test: [`Incomplete`](TestStatus::Incomplete)
    /// 4. any unexpected failure: [`UnexpectedFail`](TestStatus::UnexpectedFail)
    /// 5. any unexpected pass: [`UnexpectedPass`](TestStatus::UnexpectedPass)
    /// 6. any expected failure: [`ExpectedFail`](TestStatus::ExpectedFail)
    /// 7. otherwise: [`ExpectedPass`](TestStatus::ExpectedPass)
    pub fn overall_status(&self) -> TestStatus {
        if self.total == 0 {
            TestStatus::ExpectedPass
        } else if self.skipped == self.total {
            TestStatus::Skipped
        } else if self.incompleted > 0 {
            TestStatus::Incomplete
        } else if self.unexpected_failed > 0 {
            TestStatus::UnexpectedFail
        } else if self.unexpected_passed > 0 {
            TestStatus::UnexpectedPass
        } else if self.expected_failed > 0 {
            TestStatus::ExpectedFail
        } else {
            TestStatus::ExpectedPass
        }
    }
}

/// A test as recorded in a [`ScoreboardSummary`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestSummary {
    /// The name of the test.
    pub name: String,

    /// What the test was expected to do.
    ///
    /// This is one of `expected-pass`, `expected-fail`, `skipped` or `expected-flake`.
    pub expectation: TestStatus,

    /// The current classification of the test, or `None` if the test has not been started yet.
    ///
    /// Always present after finalization.
    pub status: Option<TestStatus>,
}

/// A frozen picture of a scoreboard.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScoreboardSummary {
    /// The name of the suite.
    pub suite_name: String,

    /// The overall verdict, as computed by [`SuiteCounts::overall_status`].
    pub status: TestStatus,

    /// True if the scoreboard was finalized when this summary was taken.
    pub finalized: bool,

    /// Aggregate counters.
    pub counts: SuiteCounts,

    /// Every registered test, in registration order.
    pub tests: Vec<TestSummary>,

    /// Tests that the driving loop should not retry again.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incomplete_blacklist: Vec<String>,
}

impl ScoreboardSummary {
    /// Parses a summary from JSON.
    pub fn parse_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes this summary to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Returns the names of tests with the given status, in registration order.
    pub fn tests_with_status(&self, status: TestStatus) -> impl Iterator<Item = &str> + '_ {
        self.tests
            .iter()
            .filter(move |test| test.status == Some(status))
            .map(|test| test.name.as_str())
    }
}
