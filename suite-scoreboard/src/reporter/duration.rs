// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display helpers for durations.

use std::{fmt, time::Duration};

/// Width of the seconds column, including the decimal point and milliseconds.
const SECONDS_WIDTH: usize = 8;

/// How long a test attempt took, as printed next to its result: `[   1.250s] `.
///
/// Sub-millisecond precision is truncated.
pub(super) struct DisplayTestDuration(pub(super) Duration);

impl fmt::Display for DisplayTestDuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let seconds = format!("{}.{:03}", self.0.as_secs(), self.0.subsec_millis());
        write!(f, "[{seconds:>SECONDS_WIDTH$}s] ")
    }
}
