// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;
use suite_scoreboard_metadata::{SuiteCounts, TestStatus};

/// A scoreboard event.
///
/// Events are produced by a [`Scoreboard`](crate::scoreboard::Scoreboard) and consumed by a
/// [`ScoreboardObserver`].
#[derive(Clone, Debug)]
pub struct ScoreboardEvent<'a> {
    /// The name of the suite the scoreboard is tracking.
    pub suite_name: &'a str,

    /// Aggregate counters as of this event, including its effects.
    pub counts: SuiteCounts,

    /// The kind of event this is.
    pub kind: ScoreboardEventKind<'a>,
}

/// The kind of scoreboard event this is.
///
/// Forms part of [`ScoreboardEvent`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScoreboardEventKind<'a> {
    /// A set of tests is about to be attempted.
    SuiteStarted {
        /// The epoch the tests are being started in. The first epoch is 0.
        epoch: usize,

        /// The number of tests about to be attempted.
        test_count: usize,
    },

    /// The current epoch ended without all of its tests completing.
    SuiteRestarted {
        /// The number of restarts so far, including this one.
        restarts: usize,
    },

    /// The driving loop gave up on the suite.
    ///
    /// Followed by the same events as finalization.
    SuiteAborted,

    /// A test is about to be attempted.
    TestStarted {
        /// The name of the test.
        name: &'a str,

        /// The attempt number, starting from 1.
        attempt: usize,
    },

    /// A test's classification changed, either because a result arrived or because the suite
    /// was settled.
    TestUpdated {
        /// The name of the test.
        name: &'a str,

        /// The new classification.
        status: TestStatus,

        /// The duration of the attempt, or zero if the test was settled without a result.
        duration: Duration,
    },

    /// The suite was settled. No further events are produced.
    SuiteFinished {
        /// The overall verdict.
        status: TestStatus,
    },
}

/// Receives [`ScoreboardEvent`]s as a scoreboard transitions.
///
/// Observers are called synchronously and must not block for long.
pub trait ScoreboardObserver {
    /// Called for each event.
    fn on_event(&mut self, event: ScoreboardEvent<'_>);
}

/// An observer that ignores all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ScoreboardObserver for NoopObserver {
    #[inline]
    fn on_event(&mut self, _event: ScoreboardEvent<'_>) {}
}

impl<T: ScoreboardObserver + ?Sized> ScoreboardObserver for &mut T {
    fn on_event(&mut self, event: ScoreboardEvent<'_>) {
        (**self).on_event(event)
    }
}

impl<T: ScoreboardObserver + ?Sized> ScoreboardObserver for Box<T> {
    fn on_event(&mut self, event: ScoreboardEvent<'_>) {
        (**self).on_event(event)
    }
}
