// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deciding which tests to attempt.
//!
//! [`TestListFilter`] selects tests by name, and [`TestRunFilter`] selects them by their
//! expectation flags.

use crate::{errors::GlobConstructError, expectation::ExpectationFlags};
use serde::Deserialize;

/// A glob pattern over test names.
///
/// `globset::GlobMatcher` has path-like semantics, so the glob is compiled into a regex instead.
/// The regex is anchored at both ends, and `*` matches any sequence of characters.
#[derive(Clone, Debug)]
pub struct NameGlob {
    glob_str: String,
    regex: regex::bytes::Regex,
}

impl NameGlob {
    /// Creates a new glob.
    pub fn new(glob_str: impl Into<String>) -> Result<Self, GlobConstructError> {
        let glob_str = glob_str.into();
        let glob = globset::GlobBuilder::new(&glob_str)
            // Only allow escapes via [].
            .backslash_escape(false)
            .empty_alternates(true)
            .build()
            .map_err(|error| GlobConstructError::InvalidGlob {
                pattern: glob_str.clone(),
                error,
            })?;

        let regex = regex::bytes::Regex::new(glob.regex()).map_err(|error| {
            GlobConstructError::RegexError {
                pattern: glob_str.clone(),
                message: error.to_string(),
            }
        })?;

        Ok(Self { glob_str, regex })
    }

    /// Returns the glob string.
    pub fn as_str(&self) -> &str {
        &self.glob_str
    }

    /// Returns true if this glob matches the whole of `name`.
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name.as_bytes())
    }
}

/// Selects tests by name using include and exclude globs.
#[derive(Clone, Debug, Default)]
pub struct TestListFilter {
    include: Option<Vec<NameGlob>>,
    exclude: Vec<NameGlob>,
}

impl TestListFilter {
    /// Creates a new filter.
    ///
    /// If `include` is `None`, every test not matched by `exclude` is included.
    pub fn new<I, E, S, T>(include: Option<I>, exclude: E) -> Result<Self, GlobConstructError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        E: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let include = include
            .map(|patterns| {
                patterns
                    .into_iter()
                    .map(NameGlob::new)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        let exclude = exclude
            .into_iter()
            .map(NameGlob::new)
            .collect::<Result<_, _>>()?;
        Ok(Self { include, exclude })
    }

    /// Returns true if the test should be included.
    ///
    /// Exclude patterns take priority over include patterns.
    pub fn should_include(&self, name: &str) -> bool {
        let included = match &self.include {
            Some(include) => include.iter().any(|glob| glob.is_match(name)),
            None => true,
        };
        included && !self.exclude.iter().any(|glob| glob.is_match(name))
    }
}

/// Selects tests by their expectation flags.
///
/// Tests that are not supported never run. Tests expected to fail, time out or take a long time
/// only run if the corresponding switch is set.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct TestRunFilter {
    /// Run tests expected to fail.
    pub include_fail: bool,

    /// Run tests marked as large.
    pub include_large: bool,

    /// Run tests expected to time out.
    pub include_timeout: bool,
}

impl TestRunFilter {
    /// Returns true if a test with these flags should be attempted.
    pub fn should_run(&self, flags: ExpectationFlags) -> bool {
        if flags.contains(ExpectationFlags::NOT_SUPPORTED) {
            return false;
        }
        let gated = [
            (ExpectationFlags::FAIL, self.include_fail),
            (ExpectationFlags::LARGE, self.include_large),
            (ExpectationFlags::TIMEOUT, self.include_timeout),
        ];
        gated
            .into_iter()
            .all(|(flag, include)| include || !flags.contains(flag))
    }
}
