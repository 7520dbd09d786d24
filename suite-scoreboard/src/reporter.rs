// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live reporting of scoreboard transitions.
//!
//! A [`Scoreboard`](crate::scoreboard::Scoreboard) owns a [`ScoreboardObserver`] and hands it a
//! [`ScoreboardEvent`] at every transition. [`ConsoleReporter`] is an observer that prints a
//! status line per test and a [`SummaryLine`] at the end.

mod console;
mod duration;
mod events;
mod summary_line;

pub use console::*;
pub use events::*;
pub use summary_line::*;
