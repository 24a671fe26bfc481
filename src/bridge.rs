// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A bridge to forward logs from the `log` crate to an [`Append`].

use log::LevelFilter;

use crate::Append;
use crate::Error;
use crate::Trap;
use crate::trap::DefaultTrap;

/// A [`log::Log`] implementation writing each record's message through an [`Append`].
///
/// Each record becomes `<args>\n`; the appender adds its own timestamp prefix.
#[derive(Debug)]
pub struct WeekendLog<A> {
    append: A,
    max_level: LevelFilter,
    trap: Box<dyn Trap>,
}

impl<A: Append> WeekendLog<A> {
    /// Creates a new [`WeekendLog`] accepting records of every level.
    pub fn new(append: A) -> Self {
        Self {
            append,
            max_level: LevelFilter::Trace,
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Only forward records at or above `level`.
    pub fn max_level(mut self, level: LevelFilter) -> Self {
        self.max_level = level;
        self
    }

    /// Set the trap for errors raised while appending.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }
}

impl<A: Append> log::Log for WeekendLog<A> {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = format!("{}\n", record.args());
        if let Err(err) = self.append.append(&message) {
            let err = Error::new("failed to append log record")
                .with_context("target", record.target())
                .with_source(err);
            self.trap.trap(&err);
        }
    }

    fn flush(&self) {}
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_boxed_logger`] with `logger`, and sets the global maximum log
/// level to the logger's own.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// use weekendlog::RotatingLogWriter;
/// use weekendlog::bridge::WeekendLog;
///
/// let dir = tempfile::tempdir().unwrap();
/// let writer = RotatingLogWriter::builder(dir.path()).build().unwrap();
/// if let Err(err) = weekendlog::bridge::try_setup_log_crate(WeekendLog::new(writer)) {
///     eprintln!("failed to setup log crate: {err}");
/// }
/// ```
pub fn try_setup_log_crate<A: Append>(logger: WeekendLog<A>) -> Result<(), log::SetLoggerError> {
    let max_level = logger.max_level;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}

/// Set up the log crate global logger.
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
pub fn setup_log_crate<A: Append>(logger: WeekendLog<A>) {
    try_setup_log_crate(logger).expect(
        "weekendlog::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}
