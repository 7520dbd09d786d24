// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    ScoreboardEvent, ScoreboardEventKind, ScoreboardObserver, SummaryLine, SummaryStyle,
    duration::DisplayTestDuration,
};
use owo_colors::{OwoColorize, Style};
use std::io::{self, Write};
use suite_scoreboard_metadata::TestStatus;
use tracing::warn;

/// An observer that writes human-readable status lines.
///
/// Writing stops at the first I/O error, which is logged and can be retrieved with
/// [`take_error`](Self::take_error).
pub struct ConsoleReporter<W> {
    writer: W,
    styles: Styles,
    summary_style: SummaryStyle,
    verbose: bool,
    error: Option<io::Error>,
}

impl<W: Write> ConsoleReporter<W> {
    /// Creates a new reporter writing to `writer`, without colors.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            styles: Styles::default(),
            summary_style: SummaryStyle::default(),
            verbose: false,
            error: None,
        }
    }

    /// Set to true if the reporter should colorize output.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.styles = Styles::default();
        if should_colorize {
            self.styles.colorize();
        }
        self
    }

    /// Sets verbose output: in verbose mode, a line is also written when each test starts.
    pub fn set_verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = verbose;
        self
    }

    /// Sets how the final summary line labels its counts.
    pub fn set_summary_style(&mut self, summary_style: SummaryStyle) -> &mut Self {
        self.summary_style = summary_style;
        self
    }

    /// Returns the first error encountered while writing, if any, and resumes writing.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Consumes the reporter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: &ScoreboardEvent<'_>) -> io::Result<()> {
        let suite_name = event.suite_name.style(self.styles.suite);
        match &event.kind {
            ScoreboardEventKind::SuiteStarted { epoch, test_count } => {
                write!(
                    self.writer,
                    "{:>12} {} {} in {}",
                    "Starting".style(self.styles.pass),
                    test_count.style(self.styles.count),
                    plural_tests(*test_count),
                    suite_name,
                )?;
                if *epoch > 0 {
                    write!(self.writer, " (epoch {epoch})")?;
                }
                writeln!(self.writer)?;
            }
            ScoreboardEventKind::SuiteRestarted { restarts } => {
                writeln!(
                    self.writer,
                    "{:>12} {} with {} incomplete {} (restart {restarts})",
                    "Restarting".style(self.styles.retry),
                    suite_name,
                    event.counts.incompleted.style(self.styles.count),
                    plural_tests(event.counts.incompleted),
                )?;
            }
            ScoreboardEventKind::SuiteAborted => {
                writeln!(
                    self.writer,
                    "{:>12} {}",
                    "Aborting".style(self.styles.fail),
                    suite_name
                )?;
            }
            ScoreboardEventKind::TestStarted { name, attempt } => {
                if self.verbose {
                    let label = if *attempt > 1 { "RETRY" } else { "START" };
                    writeln!(
                        self.writer,
                        "{:>12} {}:{}",
                        label.style(self.styles.retry),
                        suite_name,
                        name.style(self.styles.test_name),
                    )?;
                }
            }
            ScoreboardEventKind::TestUpdated {
                name,
                status,
                duration,
            } => {
                let (label, style) = self.styles.for_status(*status);
                writeln!(
                    self.writer,
                    "{:>12} {}{}:{}",
                    label.style(style),
                    DisplayTestDuration(*duration),
                    suite_name,
                    name.style(self.styles.test_name),
                )?;
            }
            ScoreboardEventKind::SuiteFinished { status } => {
                let (label, style) = self.styles.for_status(*status);
                writeln!(
                    self.writer,
                    "{:>12} {} {}: {}",
                    "Summary".style(self.styles.count),
                    label.style(style),
                    suite_name,
                    SummaryLine::new(event.counts, self.summary_style),
                )?;
            }
        }
        Ok(())
    }
}

impl<W: Write> ScoreboardObserver for ConsoleReporter<W> {
    fn on_event(&mut self, event: ScoreboardEvent<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.write_event(&event) {
            warn!(
                suite = event.suite_name,
                "error writing scoreboard event, further output suppressed: {error}"
            );
            self.error = Some(error);
        }
    }
}

fn plural_tests(count: usize) -> &'static str {
    if count == 1 { "test" } else { "tests" }
}

#[derive(Debug, Default)]
struct Styles {
    count: Style,
    pass: Style,
    retry: Style,
    fail: Style,
    skip: Style,
    suite: Style,
    test_name: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.count = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.retry = Style::new().magenta().bold();
        self.fail = Style::new().red().bold();
        self.skip = Style::new().yellow().bold();
        self.suite = Style::new().blue().bold();
        self.test_name = Style::new().bold();
    }

    fn for_status(&self, status: TestStatus) -> (&'static str, Style) {
        match status {
            TestStatus::ExpectedPass => ("PASS", self.pass),
            // Use the skip color for outcomes that aren't failures but need a look.
            TestStatus::UnexpectedPass => ("XPASS", self.skip),
            TestStatus::ExpectedFail => ("XFAIL", self.skip),
            TestStatus::UnexpectedFail => ("FAIL", self.fail),
            TestStatus::Skipped => ("SKIP", self.skip),
            TestStatus::Incomplete => ("INCOMPLETE", self.fail),
            TestStatus::ExpectedFlake => ("FLAKY", self.retry),
        }
    }
}
