// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Suite configuration, loaded from TOML.
//!
//! ```toml
//! default-expectation = "PASS"
//!
//! [filter]
//! include = ["android.os.cts.*"]
//! exclude = ["*#testSlow*"]
//!
//! [run]
//! include-fail = true
//!
//! [expectations]
//! "android.os.cts.BuildTest#testBuild" = "FLAKY | LARGE"
//! "android.os.cts.BuildTest#testHang" = ["TIMEOUT"]
//! ```

use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind},
    expectation::{Expectation, ExpectationFlags},
    scoreboard::Scoreboard,
    test_filter::{TestListFilter, TestRunFilter},
};
use camino::Utf8Path;
use indexmap::IndexMap;
use serde::{Deserialize, de::Error as _};
use std::fmt;
use tracing::debug;

/// Configuration for a suite: expectations and which tests to run.
#[derive(Clone, Debug)]
pub struct SuiteConfig {
    default_expectation: ExpectationFlags,
    list_filter: TestListFilter,
    run_filter: TestRunFilter,
    expectations: IndexMap<String, ExpectationFlags>,
}

impl SuiteConfig {
    /// Parses a config from a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigParseError> {
        Self::parse(toml, "<string>")
    }

    /// Reads and parses a config from a TOML file.
    pub fn from_path(path: &Utf8Path) -> Result<Self, ConfigParseError> {
        let toml = std::fs::read_to_string(path)
            .map_err(|error| ConfigParseError::new(path.as_str(), ConfigParseErrorKind::Read(error)))?;
        Self::parse(&toml, path.as_str())
    }

    fn parse(toml: &str, origin: &str) -> Result<Self, ConfigParseError> {
        let deserialized: SuiteConfigDeserialize = toml::from_str(toml)
            .map_err(|error| ConfigParseError::new(origin, ConfigParseErrorKind::Deserialize(error)))?;
        let list_filter =
            TestListFilter::new(deserialized.filter.include, deserialized.filter.exclude)
                .map_err(|error| ConfigParseError::new(origin, ConfigParseErrorKind::Filter(error)))?;

        debug!(
            origin,
            expectations = deserialized.expectations.len(),
            "loaded suite config"
        );
        Ok(Self {
            default_expectation: deserialized.default_expectation,
            list_filter,
            run_filter: deserialized.run,
            expectations: deserialized.expectations,
        })
    }

    /// Returns the expectation used for tests without an entry in the expectation table.
    pub fn default_expectation(&self) -> ExpectationFlags {
        self.default_expectation
    }

    /// Returns the name filter.
    pub fn list_filter(&self) -> &TestListFilter {
        &self.list_filter
    }

    /// Returns the expectation filter.
    pub fn run_filter(&self) -> &TestRunFilter {
        &self.run_filter
    }

    /// Returns the expectation for a single test.
    pub fn expectation(&self, name: &str) -> ExpectationFlags {
        self.expectations
            .get(name)
            .copied()
            .unwrap_or(self.default_expectation)
    }

    /// Returns an expectation table covering exactly `names`, in order.
    pub fn expectations_for<'a, I>(&self, names: I) -> IndexMap<String, ExpectationFlags>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .map(|name| (name.to_owned(), self.expectation(name)))
            .collect()
    }

    /// Returns the tests among `names` that should be attempted, in order.
    pub fn tests_to_run<'a, I>(&self, names: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter(|name| {
                self.list_filter.should_include(name)
                    && self.run_filter.should_run(self.expectation(name))
            })
            .collect()
    }

    /// Builds a scoreboard for `names` with tests already registered.
    ///
    /// Tests excluded by name are left out. So are tests the run filter rejects, unless their
    /// expectation says they are skipped: those are registered so that they are reported as
    /// skipped once the suite is finalized.
    pub fn scoreboard<'a, I>(&self, suite_name: impl Into<String>, names: I) -> Scoreboard
    where
        I: IntoIterator<Item = &'a str>,
    {
        let registered: Vec<&str> = names
            .into_iter()
            .filter(|name| self.list_filter.should_include(name))
            .filter(|name| {
                let flags = self.expectation(name);
                self.run_filter.should_run(flags)
                    || flags.classify() == Expectation::Skipped
            })
            .collect();

        let mut scoreboard =
            Scoreboard::new(suite_name, self.expectations_for(registered.iter().copied()));
        scoreboard.register_tests(&registered);
        scoreboard
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct SuiteConfigDeserialize {
    #[serde(default = "default_expectation")]
    default_expectation: ExpectationFlags,
    #[serde(default)]
    filter: FilterDeserialize,
    #[serde(default)]
    run: TestRunFilter,
    #[serde(default)]
    expectations: IndexMap<String, ExpectationFlags>,
}

fn default_expectation() -> ExpectationFlags {
    ExpectationFlags::PASS
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FilterDeserialize {
    #[serde(default)]
    include: Option<Vec<String>>,
    #[serde(default)]
    exclude: Vec<String>,
}

/// Flags are written either as a string (`"FLAKY | LARGE"`) or as an array of flag names
/// (`["FLAKY", "LARGE"]`).
impl<'de> Deserialize<'de> for ExpectationFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;

        impl<'v> serde::de::Visitor<'v> for V {
            type Value = ExpectationFlags;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    formatter,
                    "a string like \"FLAKY | LARGE\" or an array of flag names"
                )
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'v>,
            {
                let mut flags = ExpectationFlags::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    let flag = ExpectationFlags::from_flag_name(&name).ok_or_else(|| {
                        A::Error::invalid_value(serde::de::Unexpected::Str(&name), &self)
                    })?;
                    flags |= flag;
                }
                Ok(flags)
            }
        }

        deserializer.deserialize_any(V)
    }
}
