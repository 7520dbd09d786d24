// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::test_state::{TestState, unstarted_status};
use crate::{
    errors::ProtocolViolation,
    expectation::{Expectation, ExpectationFlags},
    reporter::{NoopObserver, ScoreboardEvent, ScoreboardEventKind, ScoreboardObserver},
    result::TestMethodResult,
};
use indexmap::{IndexMap, IndexSet};
use std::{collections::HashMap, time::Duration};
use suite_scoreboard_metadata::{ScoreboardSummary, SuiteCounts, TestStatus, TestSummary};
use tracing::{debug, info, warn};

/// Where a suite is in its lifecycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SuitePhase {
    /// Nothing has happened yet.
    Fresh,

    /// Tests have been registered, but none have been started.
    Registered,

    /// An epoch is in progress.
    Running,

    /// The previous epoch ended with a restart and the next one hasn't started yet.
    Restarted,

    /// The suite was finalized. The scoreboard is frozen.
    Finalized,

    /// The suite was aborted. The scoreboard is frozen.
    Aborted,
}

impl SuitePhase {
    /// Returns true if the scoreboard is frozen.
    #[inline]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Finalized | Self::Aborted)
    }

    fn settled_str(self) -> &'static str {
        match self {
            Self::Aborted => "aborted",
            _ => "finalized",
        }
    }
}

/// How many times a test has been attempted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TestAttempts {
    /// The number of times the test was started.
    pub started: usize,

    /// The number of times the test produced a result.
    pub completed: usize,
}

/// The aggregate state for one suite run, across any number of restarts.
///
/// The driving loop calls [`register_tests`](Self::register_tests) once, then for each epoch
/// [`start`](Self::start), any number of [`update`](Self::update) calls and optionally
/// [`restart`](Self::restart), and finally [`finalize`](Self::finalize) (or
/// [`abort`](Self::abort)). Queries are valid at any point and frozen once the suite is settled.
///
/// # Panics
///
/// Call-sequence mistakes panic with a [`ProtocolViolation`]; see the individual methods.
/// Inconsistencies that can come from racing real processes are logged instead.
#[derive(Debug)]
pub struct Scoreboard<O = NoopObserver> {
    suite_name: String,
    expectations: IndexMap<String, ExpectationFlags>,
    registered: IndexSet<String>,
    states: HashMap<String, TestState>,
    phase: SuitePhase,
    epoch: usize,
    restarts: usize,
    counts: SuiteCounts,
    observer: O,
}

impl Scoreboard<NoopObserver> {
    /// Creates a new scoreboard that doesn't report events anywhere.
    pub fn new<I, K>(suite_name: impl Into<String>, expectations: I) -> Self
    where
        I: IntoIterator<Item = (K, ExpectationFlags)>,
        K: Into<String>,
    {
        Self::with_observer(suite_name, expectations, NoopObserver)
    }
}

impl<O: ScoreboardObserver> Scoreboard<O> {
    /// Creates a new scoreboard that reports events to `observer`.
    pub fn with_observer<I, K>(suite_name: impl Into<String>, expectations: I, observer: O) -> Self
    where
        I: IntoIterator<Item = (K, ExpectationFlags)>,
        K: Into<String>,
    {
        Self {
            suite_name: suite_name.into(),
            expectations: expectations
                .into_iter()
                .map(|(name, flags)| (name.into(), flags))
                .collect(),
            registered: IndexSet::new(),
            states: HashMap::new(),
            phase: SuitePhase::Fresh,
            epoch: 0,
            restarts: 0,
            counts: SuiteCounts::default(),
            observer,
        }
    }

    /// Returns the name of the suite.
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Returns the observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Returns the observer mutably.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consumes the scoreboard, returning the observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Returns where the suite is in its lifecycle.
    pub fn phase(&self) -> SuitePhase {
        self.phase
    }

    /// Returns the current epoch. The first epoch is 0, and each restart begins a new one.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    // ---
    // Transitions
    // ---

    /// Declares the full set of tests that belong to this suite run.
    ///
    /// Duplicate names are only registered once. Tests missing from the expectation table are
    /// expected to pass.
    ///
    /// # Panics
    ///
    /// Panics if called more than once, or after [`start`](Self::start).
    #[track_caller]
    pub fn register_tests<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self.phase {
            SuitePhase::Fresh => {}
            SuitePhase::Registered => self.violation(ProtocolViolation::RegisteredTwice),
            SuitePhase::Running | SuitePhase::Restarted => {
                self.violation(ProtocolViolation::RegisteredAfterStart)
            }
            SuitePhase::Finalized | SuitePhase::Aborted => {
                self.violation(ProtocolViolation::AlreadySettled {
                    operation: "register_tests",
                    settled: self.phase.settled_str(),
                })
            }
        }

        for name in names {
            let name = name.as_ref();
            if !self.expectations.contains_key(name) {
                warn!(
                    suite = %self.suite_name,
                    test = name,
                    "test has no entry in the expectation table, expecting it to pass"
                );
            }
            if !self.registered.insert(name.to_owned()) {
                warn!(suite = %self.suite_name, test = name, "test registered more than once");
            }
        }
        self.counts.total = self.registered.len();
        self.phase = SuitePhase::Registered;
        debug!(
            suite = %self.suite_name,
            total = self.registered.len(),
            "registered tests"
        );
    }

    /// Begins attempting the named tests.
    ///
    /// Tests that already completed are attempted again: their previous result stops counting
    /// until the new attempt finishes. Tests not named here keep whatever state they are in. A
    /// test that is already running in the current epoch is logged and left alone.
    ///
    /// # Panics
    ///
    /// Panics if any name wasn't registered, or if the suite is settled.
    #[track_caller]
    pub fn start<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.phase.is_settled() {
            self.violation(ProtocolViolation::AlreadySettled {
                operation: "start",
                settled: self.phase.settled_str(),
            });
        }

        let owned: Vec<S> = names.into_iter().collect();
        let names: Vec<&str> = owned.iter().map(|name| name.as_ref()).collect();
        if let Some(&name) = names
            .iter()
            .find(|name| !self.registered.contains(**name))
        {
            self.violation(ProtocolViolation::UnregisteredTest {
                name: name.to_owned(),
            });
        }

        self.phase = SuitePhase::Running;
        self.emit(ScoreboardEventKind::SuiteStarted {
            epoch: self.epoch,
            test_count: names.len(),
        });

        for name in names {
            let expectation = self.expectation(name);
            let epoch = self.epoch;
            let previous = self.status_of(name);
            let state = self
                .states
                .entry(name.to_owned())
                .or_insert_with(TestState::new);
            if state.is_in_flight_in(epoch) {
                warn!(
                    suite = %self.suite_name,
                    test = name,
                    epoch,
                    "test started twice in the same epoch, ignoring the second start"
                );
                continue;
            }
            state.on_start(expectation, epoch);
            let attempt = state.times_started;
            let status = state.status(expectation, false);
            self.reclassify(previous, status);

            self.emit(ScoreboardEventKind::TestStarted { name, attempt });
        }
    }

    /// Records the results of one or more test attempts.
    ///
    /// Only the latest result for a test counts. A result for a test that isn't running in the
    /// current epoch is logged and recorded anyway; a result for a test that was never
    /// registered is logged and ignored.
    ///
    /// # Panics
    ///
    /// Panics if no tests have been started yet, or if the suite is settled.
    #[track_caller]
    pub fn update<I>(&mut self, results: I)
    where
        I: IntoIterator<Item = TestMethodResult>,
    {
        match self.phase {
            SuitePhase::Fresh | SuitePhase::Registered => {
                self.violation(ProtocolViolation::UpdateBeforeStart)
            }
            SuitePhase::Finalized | SuitePhase::Aborted => {
                self.violation(ProtocolViolation::AlreadySettled {
                    operation: "update",
                    settled: self.phase.settled_str(),
                })
            }
            SuitePhase::Running | SuitePhase::Restarted => {}
        }

        for result in results {
            if !self.registered.contains(&result.name) {
                warn!(
                    suite = %self.suite_name,
                    test = %result.name,
                    "result reported for a test that was never registered, ignoring it"
                );
                continue;
            }

            let expectation = self.expectation(&result.name);
            let epoch = self.epoch;
            let previous = self.status_of(&result.name);
            let state = self
                .states
                .entry(result.name.clone())
                .or_insert_with(TestState::new);
            if !state.is_in_flight_in(epoch) {
                warn!(
                    suite = %self.suite_name,
                    test = %result.name,
                    epoch,
                    "result reported for a test that isn't running in this epoch"
                );
                if state.times_started == 0 {
                    state.on_start(expectation, epoch);
                }
            }
            state.on_complete(result.outcome);
            let status = state.status(expectation, false);
            self.reclassify(previous, status);
            debug!(
                suite = %self.suite_name,
                test = %result.name,
                %status,
                "test completed"
            );

            self.emit(ScoreboardEventKind::TestUpdated {
                name: &result.name,
                status,
                duration: result.duration,
            });
        }
    }

    /// Ends the current epoch before all of its tests completed.
    ///
    /// `remaining` is the number of tests the caller believes were still running. A mismatch is
    /// logged, since it can come from output racing with process exit.
    ///
    /// Every test that is still incomplete is counted towards the blacklist: a test that is
    /// incomplete across two consecutive restarts is reported by
    /// [`incomplete_blacklist`](Self::incomplete_blacklist) until it completes. Deciding what to
    /// start next, including flaky retries (see [`flaky_tests`](Self::flaky_tests)), is up to
    /// the caller.
    ///
    /// # Panics
    ///
    /// Panics if no tests have been started yet, or if the suite is settled.
    #[track_caller]
    pub fn restart(&mut self, remaining: usize) {
        match self.phase {
            SuitePhase::Fresh | SuitePhase::Registered => {
                self.violation(ProtocolViolation::RestartBeforeStart)
            }
            SuitePhase::Finalized | SuitePhase::Aborted => {
                self.violation(ProtocolViolation::AlreadySettled {
                    operation: "restart",
                    settled: self.phase.settled_str(),
                })
            }
            SuitePhase::Running | SuitePhase::Restarted => {}
        }

        let running = self
            .states
            .values()
            .filter(|state| state.is_in_flight_in(self.epoch))
            .count();
        if running != remaining {
            warn!(
                suite = %self.suite_name,
                expected = remaining,
                actual = running,
                "restart count mismatch: number of tests still running differs"
            );
        }

        self.restarts += 1;
        self.counts.restarts = self.restarts;
        self.epoch += 1;
        for name in &self.registered {
            let Some(state) = self.states.get_mut(name) else {
                continue;
            };
            if state.on_restart() {
                info!(
                    suite = %self.suite_name,
                    test = %name,
                    "blacklisting test after {} consecutive incomplete restarts",
                    state.consecutive_incomplete(),
                );
            }
        }
        self.phase = SuitePhase::Restarted;

        self.emit(ScoreboardEventKind::SuiteRestarted {
            restarts: self.restarts,
        });
    }

    /// Settles the suite and freezes the scoreboard.
    ///
    /// Tests that were started but never completed their latest attempt are incomplete. Tests
    /// that were never started are skipped if their expectation says so, and incomplete
    /// otherwise. Flaky tests waiting on a retry are unexpected failures.
    ///
    /// # Panics
    ///
    /// Panics if the suite is already settled.
    #[track_caller]
    pub fn finalize(&mut self) {
        self.settle(SuitePhase::Finalized, "finalize");
    }

    /// Gives up on the suite: reports the abort, then settles exactly like
    /// [`finalize`](Self::finalize).
    ///
    /// # Panics
    ///
    /// Panics if the suite is already settled.
    #[track_caller]
    pub fn abort(&mut self) {
        if self.phase.is_settled() {
            self.violation(ProtocolViolation::AlreadySettled {
                operation: "abort",
                settled: self.phase.settled_str(),
            });
        }
        self.emit(ScoreboardEventKind::SuiteAborted);
        self.settle(SuitePhase::Aborted, "abort");
    }

    #[track_caller]
    fn settle(&mut self, settled: SuitePhase, operation: &'static str) {
        if self.phase.is_settled() {
            self.violation(ProtocolViolation::AlreadySettled {
                operation,
                settled: self.phase.settled_str(),
            });
        }

        // Report every test whose latest attempt never produced a result, along with every test
        // whose classification changes now that there are no retries left.
        let to_report: Vec<(String, TestStatus)> = self
            .registered
            .iter()
            .filter_map(|name| {
                let expectation = self.expectation(name);
                match self.states.get(name) {
                    Some(state) => {
                        let before = state.status(expectation, false);
                        let after = state.status(expectation, true);
                        (before != after || after == TestStatus::Incomplete)
                            .then(|| (name.clone(), after))
                    }
                    None => unstarted_status(expectation, true).map(|after| (name.clone(), after)),
                }
            })
            .collect();

        debug_assert_eq!(
            self.counts,
            self.tally(),
            "suite `{}`: live counters drifted",
            self.suite_name
        );
        self.phase = settled;
        self.counts = self.tally();
        for (name, status) in &to_report {
            self.emit(ScoreboardEventKind::TestUpdated {
                name,
                status: *status,
                duration: Duration::ZERO,
            });
        }

        let status = self.overall_status();
        debug!(suite = %self.suite_name, %status, "suite {}", settled.settled_str());
        self.emit(ScoreboardEventKind::SuiteFinished { status });
    }

    // ---
    // Queries
    // ---

    /// Returns the classified expectation for every entry in the expectation table, in table
    /// order.
    pub fn expectations(&self) -> IndexMap<&str, Expectation> {
        self.expectations
            .iter()
            .map(|(name, flags)| (name.as_str(), flags.classify()))
            .collect()
    }

    /// Returns the current classification of a test, or `None` if it isn't registered or hasn't
    /// been started yet.
    pub fn test_status(&self, name: &str) -> Option<TestStatus> {
        if !self.registered.contains(name) {
            return None;
        }
        self.status_of(name)
    }

    /// Returns how many times a test was started and completed, or `None` if it was never
    /// started.
    pub fn attempts(&self, name: &str) -> Option<TestAttempts> {
        self.states.get(name).map(|state| TestAttempts {
            started: state.times_started,
            completed: state.times_completed,
        })
    }

    /// Returns the flaky tests that may be started again: their retry is unused, and their
    /// latest attempt failed or was abandoned by a restart.
    ///
    /// Always empty once the suite is settled.
    pub fn flaky_tests(&self) -> Vec<&str> {
        if self.phase.is_settled() {
            return Vec::new();
        }
        self.registered
            .iter()
            .filter(|name| {
                self.states.get(name.as_str()).is_some_and(|state| {
                    state.is_retry_eligible(self.expectation(name), self.epoch)
                })
            })
            .map(String::as_str)
            .collect()
    }

    /// Returns the tests that have been incomplete across consecutive restarts, and that the
    /// driving loop shouldn't retry again.
    ///
    /// A blacklisted test that is running in the current epoch isn't listed; it leaves the
    /// blacklist for good once it completes.
    pub fn incomplete_blacklist(&self) -> Vec<&str> {
        let settled = self.phase.is_settled();
        self.registered
            .iter()
            .filter(|name| {
                self.states.get(name.as_str()).is_some_and(|state| {
                    state.blacklisted && (settled || !state.is_in_flight_in(self.epoch))
                })
            })
            .map(String::as_str)
            .collect()
    }

    /// Returns the tests with the given classification, in registration order.
    pub fn tests_with_status(&self, status: TestStatus) -> Vec<&str> {
        self.registered
            .iter()
            .filter(|name| self.status_of(name) == Some(status))
            .map(String::as_str)
            .collect()
    }

    /// Returns the skipped tests.
    pub fn skipped_tests(&self) -> Vec<&str> {
        self.tests_with_status(TestStatus::Skipped)
    }

    /// Returns the incomplete tests.
    pub fn incomplete_tests(&self) -> Vec<&str> {
        self.tests_with_status(TestStatus::Incomplete)
    }

    /// Returns the tests that passed and were expected to.
    pub fn expected_passing_tests(&self) -> Vec<&str> {
        self.tests_with_status(TestStatus::ExpectedPass)
    }

    /// Returns the tests that passed but were expected to fail.
    pub fn unexpected_passing_tests(&self) -> Vec<&str> {
        self.tests_with_status(TestStatus::UnexpectedPass)
    }

    /// Returns the tests that failed and were expected to.
    pub fn expected_failing_tests(&self) -> Vec<&str> {
        self.tests_with_status(TestStatus::ExpectedFail)
    }

    /// Returns the tests that failed but were expected to pass.
    pub fn unexpected_failing_tests(&self) -> Vec<&str> {
        self.tests_with_status(TestStatus::UnexpectedFail)
    }

    /// Returns the aggregate counters.
    pub fn counts(&self) -> SuiteCounts {
        self.counts
    }

    /// Returns the overall verdict for the suite.
    ///
    /// See [`SuiteCounts::overall_status`] for the rules.
    pub fn overall_status(&self) -> TestStatus {
        self.counts.overall_status()
    }

    /// Returns the number of registered tests.
    pub fn total(&self) -> usize {
        self.registered.len()
    }

    /// Returns the number of tests whose latest attempt finished, or that were skipped.
    pub fn completed(&self) -> usize {
        self.counts.completed
    }

    /// Returns the number of incomplete tests.
    pub fn incompleted(&self) -> usize {
        self.counts.incompleted
    }

    /// Returns the number of tests that passed.
    pub fn passed(&self) -> usize {
        self.counts.passed
    }

    /// Returns the number of tests that failed.
    pub fn failed(&self) -> usize {
        self.counts.failed
    }

    /// Returns the number of skipped tests.
    pub fn skipped(&self) -> usize {
        self.counts.skipped
    }

    /// Returns the number of tests that passed and were expected to.
    pub fn expected_passed(&self) -> usize {
        self.counts.expected_passed
    }

    /// Returns the number of tests that passed but were expected to fail.
    pub fn unexpected_passed(&self) -> usize {
        self.counts.unexpected_passed
    }

    /// Returns the number of tests that failed and were expected to.
    pub fn expected_failed(&self) -> usize {
        self.counts.expected_failed
    }

    /// Returns the number of tests that failed but were expected to pass.
    pub fn unexpected_failed(&self) -> usize {
        self.counts.unexpected_failed
    }

    /// Returns the number of restarts.
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    /// Returns a serializable picture of the scoreboard.
    pub fn summary(&self) -> ScoreboardSummary {
        let counts = self.counts;
        ScoreboardSummary {
            suite_name: self.suite_name.clone(),
            status: counts.overall_status(),
            finalized: self.phase.is_settled(),
            counts,
            tests: self
                .registered
                .iter()
                .map(|name| TestSummary {
                    name: name.clone(),
                    expectation: self.expectation(name).into(),
                    status: self.status_of(name),
                })
                .collect(),
            incomplete_blacklist: self
                .incomplete_blacklist()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }

    // ---
    // Helpers
    // ---

    fn expectation(&self, name: &str) -> Expectation {
        self.expectations
            .get(name)
            .copied()
            .unwrap_or(ExpectationFlags::PASS)
            .classify()
    }

    fn status_of(&self, name: &str) -> Option<TestStatus> {
        let expectation = self.expectation(name);
        let settled = self.phase.is_settled();
        match self.states.get(name) {
            Some(state) => Some(state.status(expectation, settled)),
            None => unstarted_status(expectation, settled),
        }
    }

    /// Moves one test from `previous` to `status` in the live counters.
    fn reclassify(&mut self, previous: Option<TestStatus>, status: TestStatus) {
        if let Some(previous) = previous {
            self.counts.unrecord(previous);
        }
        self.counts.record(status);
    }

    /// Recounts every registered test from scratch.
    fn tally(&self) -> SuiteCounts {
        let mut counts = SuiteCounts {
            total: self.registered.len(),
            restarts: self.restarts,
            ..SuiteCounts::default()
        };
        for name in &self.registered {
            if let Some(status) = self.status_of(name) {
                counts.record(status);
            }
        }
        counts
    }

    fn emit(&mut self, kind: ScoreboardEventKind<'_>) {
        self.observer.on_event(ScoreboardEvent {
            suite_name: &self.suite_name,
            counts: self.counts,
            kind,
        });
    }

    #[track_caller]
    fn violation(&self, violation: ProtocolViolation) -> ! {
        panic!("suite `{}`: {violation}", self.suite_name)
    }
}
