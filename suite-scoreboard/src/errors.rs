// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the scoreboard and its configuration.

use crate::expectation::ExpectationFlags;
use thiserror::Error;

/// Error returned while parsing [`ExpectationFlags`] from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized expectation flag `{flag}` in `{input}`\n(known flags: {})",
    ExpectationFlags::known_names().join(", "),
)]
pub struct ExpectationParseError {
    input: String,
    flag: String,
}

impl ExpectationParseError {
    pub(crate) fn new(input: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            flag: flag.into(),
        }
    }

    /// Returns the flag name that wasn't recognized.
    pub fn flag(&self) -> &str {
        &self.flag
    }
}

/// An error that occurred while constructing a test name glob.
#[derive(Debug, Error)]
pub enum GlobConstructError {
    /// The glob was invalid.
    #[error("invalid glob `{pattern}`")]
    InvalidGlob {
        /// The pattern that failed to parse.
        pattern: String,

        /// The underlying error.
        #[source]
        error: globset::Error,
    },

    /// The glob could not be converted to a regex.
    #[error("glob `{pattern}` could not be converted to a regex: {message}")]
    RegexError {
        /// The pattern that failed to convert.
        pattern: String,

        /// The error message from the regex engine.
        message: String,
    },
}

/// An error that occurred while loading a [`SuiteConfig`](crate::config::SuiteConfig).
#[derive(Debug, Error)]
#[error("failed to parse suite config from {origin}")]
pub struct ConfigParseError {
    origin: String,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(origin: impl Into<String>, kind: ConfigParseErrorKind) -> Self {
        Self {
            origin: origin.into(),
            kind,
        }
    }

    /// Returns where the config was loaded from: a path, or `<string>`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns the kind of error that occurred.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while loading a suite config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// The config file couldn't be read.
    #[error("error reading config file")]
    Read(#[source] std::io::Error),

    /// The config wasn't valid TOML, or didn't match the expected schema.
    #[error("error deserializing config")]
    Deserialize(#[source] toml::de::Error),

    /// An include or exclude pattern was invalid.
    #[error("invalid test name filter")]
    Filter(#[source] GlobConstructError),
}

/// A call-sequence error made by the code driving a scoreboard.
///
/// These indicate a bug in the driving harness rather than a condition in the environment, so
/// the scoreboard panics with this as the message instead of returning it: continuing would
/// corrupt the verdict of the run.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum ProtocolViolation {
    /// `register_tests` was called more than once.
    #[error("tests were registered more than once")]
    RegisteredTwice,

    /// `register_tests` was called after `start`.
    #[error("tests were registered after the suite was started")]
    RegisteredAfterStart,

    /// `start` named a test that was never registered.
    #[error("test `{name}` was started but was never registered")]
    UnregisteredTest {
        /// The name of the test.
        name: String,
    },

    /// `update` was called before any `start`.
    #[error("results were reported before the suite was started")]
    UpdateBeforeStart,

    /// `restart` was called before any `start`.
    #[error("the suite was restarted before it was started")]
    RestartBeforeStart,

    /// An operation was attempted on a suite that was already settled.
    #[error("`{operation}` was called after the suite was {settled}")]
    AlreadySettled {
        /// The operation that was attempted.
        operation: &'static str,

        /// How the suite was settled: `finalized` or `aborted`.
        settled: &'static str,
    },
}
