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

//! UTC calendar fields of an instant.

use std::fmt;

use jiff::Timestamp;
use jiff::civil::Date;
use jiff::civil::DateTime;
use jiff::civil::Weekday;
use jiff::tz::TimeZone;

use crate::Error;

/// A snapshot of the UTC calendar fields of a [`Timestamp`].
///
/// No local time zone is ever consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    datetime: DateTime,
}

impl CalendarFields {
    /// Derive the calendar fields of `ts` in UTC.
    pub fn from_timestamp(ts: Timestamp) -> Self {
        let datetime = ts.to_zoned(TimeZone::UTC).datetime();
        Self { datetime }
    }

    pub fn year(&self) -> i16 {
        self.datetime.year()
    }

    pub fn month(&self) -> i8 {
        self.datetime.month()
    }

    pub fn day(&self) -> i8 {
        self.datetime.day()
    }

    pub fn hour(&self) -> i8 {
        self.datetime.hour()
    }

    pub fn minute(&self) -> i8 {
        self.datetime.minute()
    }

    pub fn second(&self) -> i8 {
        self.datetime.second()
    }

    pub fn weekday(&self) -> Weekday {
        self.datetime.weekday()
    }

    /// Saturday or Sunday.
    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Saturday | Weekday::Sunday)
    }

    pub fn is_sunday(&self) -> bool {
        self.weekday() == Weekday::Sunday
    }

    /// The calendar date of these fields.
    pub fn date(&self) -> Date {
        self.datetime.date()
    }

    /// The fields of the preceding calendar day, keeping the time of day.
    ///
    /// # Errors
    ///
    /// Return an error if the date is the first day [`Date`] can represent.
    pub fn previous_day(&self) -> Result<Self, Error> {
        let date = self.date().yesterday().map_err(|err| {
            Error::new("failed to step back one calendar day")
                .with_context("date", self.date())
                .with_source(err)
        })?;
        Ok(Self {
            datetime: date.to_datetime(self.datetime.time()),
        })
    }

    /// Compact date stamp, `YYYYMMDD`.
    pub fn date_stamp(&self) -> DateStamp<'_> {
        DateStamp(self)
    }

    /// Line prefix, `YYYY-MM-DD HH:MM:SS`.
    pub fn line_prefix(&self) -> LinePrefix<'_> {
        LinePrefix(self)
    }
}

/// Display adapter returned by [`CalendarFields::date_stamp`].
#[derive(Debug)]
pub struct DateStamp<'a>(&'a CalendarFields);

impl fmt::Display for DateStamp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.0;
        write!(
            f,
            "{:04}{:02}{:02}",
            fields.year(),
            fields.month(),
            fields.day()
        )
    }
}

/// Display adapter returned by [`CalendarFields::line_prefix`].
#[derive(Debug)]
pub struct LinePrefix<'a>(&'a CalendarFields);

impl fmt::Display for LinePrefix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.0;
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            fields.year(),
            fields.month(),
            fields.day(),
            fields.hour(),
            fields.minute(),
            fields.second()
        )
    }
}
