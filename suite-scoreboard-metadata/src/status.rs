// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::TestStatusParseError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The classification of a single test, or of a whole suite, relative to its expectation.
///
/// A test's status describes how its latest outcome relates to what was declared for it, not
/// whether it is correct in some absolute sense: a test that is declared to fail and does fail is
/// [`ExpectedFail`](Self::ExpectedFail).
///
/// The same type is used for the overall verdict of a suite; see
/// [`SuiteCounts::overall_status`](crate::SuiteCounts::overall_status).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestStatus {
    /// The test passed, and was expected to.
    ExpectedPass,

    /// The test passed, but was expected to fail.
    UnexpectedPass,

    /// The test failed, and was expected to.
    ExpectedFail,

    /// The test failed, but was expected to pass.
    UnexpectedFail,

    /// The test was not run, and was not expected to be.
    Skipped,

    /// The test was started but never produced a result.
    Incomplete,

    /// The test is marked flaky and failed: it is waiting on its one retry before it is judged.
    ExpectedFlake,
}

impl TestStatus {
    const VARIANTS: &'static [&'static str] = &[
        "expected-pass",
        "unexpected-pass",
        "expected-fail",
        "unexpected-fail",
        "skipped",
        "incomplete",
        "expected-flake",
    ];

    /// Returns the string values this type can be parsed from.
    pub fn variants() -> &'static [&'static str] {
        Self::VARIANTS
    }

    /// Returns the kebab-case name for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExpectedPass => "expected-pass",
            Self::UnexpectedPass => "unexpected-pass",
            Self::ExpectedFail => "expected-fail",
            Self::UnexpectedFail => "unexpected-fail",
            Self::Skipped => "skipped",
            Self::Incomplete => "incomplete",
            Self::ExpectedFlake => "expected-flake",
        }
    }

    /// Returns true if this status counts towards the number of passed tests.
    pub fn is_pass(self) -> bool {
        matches!(self, Self::ExpectedPass | Self::UnexpectedPass)
    }

    /// Returns true if this status counts towards the number of failed tests.
    pub fn is_fail(self) -> bool {
        matches!(self, Self::ExpectedFail | Self::UnexpectedFail)
    }

    /// Returns true if the outcome disagrees with the declared expectation.
    ///
    /// Incomplete tests are considered unexpected: nothing declares a test as never finishing
    /// without also having it skipped.
    pub fn is_unexpected(self) -> bool {
        matches!(
            self,
            Self::UnexpectedPass | Self::UnexpectedFail | Self::Incomplete
        )
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestStatus {
    type Err = TestStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s {
            "expected-pass" => Self::ExpectedPass,
            "unexpected-pass" => Self::UnexpectedPass,
            "expected-fail" => Self::ExpectedFail,
            "unexpected-fail" => Self::UnexpectedFail,
            "skipped" => Self::Skipped,
            "incomplete" => Self::Incomplete,
            "expected-flake" => Self::ExpectedFlake,
            other => return Err(TestStatusParseError::new(other)),
        };
        Ok(status)
    }
}
