// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declared expectations for individual tests.
//!
//! Every test carries an [`ExpectationFlags`] value, loaded once from an expectation table. The
//! scoreboard only cares about the coarse [`Expectation`] those flags classify to; the run filter
//! (see [`TestRunFilter`](crate::test_filter::TestRunFilter)) looks at the individual flags.

use crate::{errors::ExpectationParseError, result::TestOutcome};
use bitflags::bitflags;
use std::{fmt, str::FromStr};
use suite_scoreboard_metadata::TestStatus;

bitflags! {
    /// The set of flags describing how a test is expected to behave.
    ///
    /// Flags combine with `|`. A test's flags are fixed once expectations are loaded.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct ExpectationFlags: u32 {
        /// The test is expected to pass.
        const PASS = 1 << 0;

        /// The test is expected to fail.
        const FAIL = 1 << 1;

        /// The test is expected to never complete, so it is always skipped.
        const TIMEOUT = 1 << 2;

        /// The test is nondeterministic: it gets one retry before it is judged.
        const FLAKY = 1 << 3;

        /// The test is excluded from default runs unless large tests are included.
        const LARGE = 1 << 4;

        /// The test is not supported, so it is always skipped.
        const NOT_SUPPORTED = 1 << 5;
    }
}

impl ExpectationFlags {
    /// Creates a flag set from raw bits.
    ///
    /// # Panics
    ///
    /// Panics if `bits` contains anything other than the known flags. Unknown flags can only come
    /// from a bug in the code producing them.
    #[track_caller]
    pub fn new(bits: u32) -> Self {
        Self::from_bits(bits).unwrap_or_else(|| {
            panic!(
                "unknown expectation flag bits {:#x} (in {bits:#x})",
                bits & !Self::all().bits()
            )
        })
    }

    /// Looks up a single flag by name.
    ///
    /// Names are matched case-insensitively, and `-` is accepted in place of `_`.
    pub fn from_flag_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_uppercase().replace('-', "_");
        Self::from_name(&normalized)
    }

    /// Returns the names of all known flags.
    pub fn known_names() -> Vec<&'static str> {
        Self::all().iter_names().map(|(name, _)| name).collect()
    }

    /// Returns the coarse expectation for this set of flags.
    #[inline]
    pub fn classify(self) -> Expectation {
        classify_expectation(self)
    }
}

impl fmt::Display for ExpectationFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, _)) in self.iter_names().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl FromStr for ExpectationFlags {
    type Err = ExpectationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::empty();
        for name in s.split('|').map(str::trim).filter(|name| !name.is_empty()) {
            flags |= Self::from_flag_name(name).ok_or_else(|| ExpectationParseError::new(s, name))?;
        }
        Ok(flags)
    }
}

/// The coarse expectation a set of [`ExpectationFlags`] classifies to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Expectation {
    /// The test is expected to pass.
    ExpectedPass,

    /// The test is expected to fail.
    ExpectedFail,

    /// The test is not expected to run.
    Skipped,

    /// The test is expected to pass, possibly after a single retry.
    ExpectedFlake,
}

impl Expectation {
    /// Judges a completed attempt against this expectation.
    ///
    /// This is the final judgement: a failing flaky test is an unexpected failure here. Whether
    /// a flaky test still has a retry available is tracked by the scoreboard.
    ///
    /// A test that is expected to be skipped but runs anyway is held to the same standard as an
    /// expected failure, since nothing declared it working.
    pub fn judge(self, outcome: TestOutcome) -> TestStatus {
        match (self, outcome) {
            (Self::ExpectedPass | Self::ExpectedFlake, TestOutcome::Pass) => {
                TestStatus::ExpectedPass
            }
            (Self::ExpectedFail | Self::Skipped, TestOutcome::Pass) => TestStatus::UnexpectedPass,
            (Self::ExpectedFail | Self::Skipped, TestOutcome::Fail) => TestStatus::ExpectedFail,
            (Self::ExpectedPass | Self::ExpectedFlake, TestOutcome::Fail) => {
                TestStatus::UnexpectedFail
            }
        }
    }

    #[inline]
    pub(crate) fn is_flaky(self) -> bool {
        self == Self::ExpectedFlake
    }
}

impl From<Expectation> for TestStatus {
    fn from(expectation: Expectation) -> Self {
        match expectation {
            Expectation::ExpectedPass => TestStatus::ExpectedPass,
            Expectation::ExpectedFail => TestStatus::ExpectedFail,
            Expectation::Skipped => TestStatus::Skipped,
            Expectation::ExpectedFlake => TestStatus::ExpectedFlake,
        }
    }
}

/// Classifies a set of flags into an [`Expectation`].
///
/// `TIMEOUT` and `NOT_SUPPORTED` take priority, followed by `FLAKY` and then `FAIL`. `LARGE` has
/// no bearing here: it only decides whether a run filter picks the test up at all.
pub fn classify_expectation(flags: ExpectationFlags) -> Expectation {
    if flags.intersects(ExpectationFlags::TIMEOUT | ExpectationFlags::NOT_SUPPORTED) {
        Expectation::Skipped
    } else if flags.contains(ExpectationFlags::FLAKY) {
        Expectation::ExpectedFlake
    } else if flags.contains(ExpectationFlags::FAIL) {
        Expectation::ExpectedFail
    } else {
        Expectation::ExpectedPass
    }
}
