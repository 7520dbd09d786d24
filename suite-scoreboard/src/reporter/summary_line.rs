// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use suite_scoreboard_metadata::SuiteCounts;

/// How the counts in a [`SummaryLine`] are labeled.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SummaryStyle {
    /// One or two letter labels: `P`, `XF`, `F`, `I`, `S`.
    #[default]
    Terse,

    /// Full labels: `Passed`, `Expected Failed`, `Failed`, `Incomplete`, `Skipped`.
    Full,
}

/// A single-line progress summary for a suite.
///
/// The line starts with `completed/total` and the percentage of completed tests, followed by
/// each nonzero count in a fixed order: passed, expected failed, failed, incomplete, skipped.
/// For example, `70/70  100%  20 P  50 XF `.
///
/// "Failed" here means unexpected failures; unexpected passes are included in "passed".
#[derive(Copy, Clone, Debug)]
pub struct SummaryLine {
    counts: SuiteCounts,
    style: SummaryStyle,
}

impl SummaryLine {
    /// Creates a new summary line for these counts.
    pub fn new(counts: SuiteCounts, style: SummaryStyle) -> Self {
        Self { counts, style }
    }

    fn fields(&self) -> [(usize, &'static str, &'static str); 5] {
        [
            (self.counts.passed, "P", "Passed"),
            (self.counts.expected_failed, "XF", "Expected Failed"),
            (self.counts.unexpected_failed, "F", "Failed"),
            (self.counts.incompleted, "I", "Incomplete"),
            (self.counts.skipped, "S", "Skipped"),
        ]
    }
}

impl fmt::Display for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let SuiteCounts {
            total, completed, ..
        } = self.counts;
        let percent = if total == 0 {
            100
        } else {
            completed * 100 / total
        };
        write!(f, "{completed}/{total} {percent:>4}% ")?;

        for (count, terse, full) in self.fields() {
            if count == 0 {
                continue;
            }
            let label = match self.style {
                SummaryStyle::Terse => terse,
                SummaryStyle::Full => full,
            };
            write!(f, " {count} {label} ")?;
        }
        Ok(())
    }
}
