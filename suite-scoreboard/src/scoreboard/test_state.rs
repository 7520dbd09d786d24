// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{expectation::Expectation, result::TestOutcome};
use suite_scoreboard_metadata::TestStatus;

/// The number of consecutive restarts a test can be incomplete for before it is blacklisted.
pub(super) const BLACKLIST_THRESHOLD: usize = 2;

/// Bookkeeping for a single test that has been started at least once.
#[derive(Clone, Debug)]
pub(super) struct TestState {
    pub(super) times_started: usize,
    pub(super) times_completed: usize,
    pub(super) latest: Option<TestOutcome>,
    pub(super) flaky_retry_used: bool,
    pub(super) blacklisted: bool,
    consecutive_incomplete: usize,
    /// True if the latest attempt hasn't produced a result. Survives restarts: an attempt that
    /// was abandoned by a restart is still the latest one.
    in_flight: bool,
    started_epoch: usize,
}

impl TestState {
    pub(super) fn new() -> Self {
        Self {
            times_started: 0,
            times_completed: 0,
            latest: None,
            flaky_retry_used: false,
            blacklisted: false,
            consecutive_incomplete: 0,
            in_flight: false,
            started_epoch: 0,
        }
    }

    /// Returns true if the test was started in `epoch` and hasn't produced a result since.
    #[inline]
    pub(super) fn is_in_flight_in(&self, epoch: usize) -> bool {
        self.in_flight && self.started_epoch == epoch
    }

    pub(super) fn on_start(&mut self, expectation: Expectation, epoch: usize) {
        self.times_started += 1;
        if expectation.is_flaky() && self.times_started > 1 {
            self.flaky_retry_used = true;
        }
        self.in_flight = true;
        self.started_epoch = epoch;
    }

    pub(super) fn on_complete(&mut self, outcome: TestOutcome) {
        self.times_completed += 1;
        self.latest = Some(outcome);
        self.in_flight = false;
        self.consecutive_incomplete = 0;
        self.blacklisted = false;
    }

    /// Called when the suite restarts. Returns true if this caused the test to be blacklisted.
    pub(super) fn on_restart(&mut self) -> bool {
        if !self.in_flight {
            return false;
        }
        self.consecutive_incomplete += 1;
        if self.consecutive_incomplete >= BLACKLIST_THRESHOLD && !self.blacklisted {
            self.blacklisted = true;
            return true;
        }
        false
    }

    #[inline]
    pub(super) fn consecutive_incomplete(&self) -> usize {
        self.consecutive_incomplete
    }

    /// Returns the classification of this test.
    ///
    /// If `settled` is true, the suite is over: a failing flaky test no longer has a retry
    /// coming.
    pub(super) fn status(&self, expectation: Expectation, settled: bool) -> TestStatus {
        if self.in_flight {
            return TestStatus::Incomplete;
        }
        match self.latest {
            // Only reachable if the state was created without being started.
            None => TestStatus::Incomplete,
            Some(TestOutcome::Fail)
                if expectation.is_flaky() && !self.flaky_retry_used && !settled =>
            {
                TestStatus::ExpectedFlake
            }
            Some(outcome) => expectation.judge(outcome),
        }
    }

    /// Returns true if this is a flaky test that the driving loop may start again.
    pub(super) fn is_retry_eligible(&self, expectation: Expectation, epoch: usize) -> bool {
        if !expectation.is_flaky() || self.flaky_retry_used {
            return false;
        }
        let abandoned = self.in_flight && self.started_epoch < epoch;
        let failed = !self.in_flight && self.latest == Some(TestOutcome::Fail);
        abandoned || failed
    }
}

/// Returns the classification of a registered test that was never started.
pub(super) fn unstarted_status(expectation: Expectation, settled: bool) -> Option<TestStatus> {
    if !settled {
        return None;
    }
    match expectation {
        Expectation::Skipped => Some(TestStatus::Skipped),
        Expectation::ExpectedPass | Expectation::ExpectedFail | Expectation::ExpectedFlake => {
            Some(TestStatus::Incomplete)
        }
    }
}
