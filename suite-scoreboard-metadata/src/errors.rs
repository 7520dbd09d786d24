// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::TestStatus;
use std::{error, fmt};

/// An error that occurs while parsing a [`TestStatus`] from a string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestStatusParseError {
    input: String,
}

impl TestStatusParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the input that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for TestStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unrecognized test status: {}\n(known values: {})",
            self.input,
            TestStatus::variants().join(", ")
        )
    }
}

impl error::Error for TestStatusParseError {}
