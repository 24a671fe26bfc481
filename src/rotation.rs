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

//! File selection and weekend archival rules.

use std::fmt;

use jiff::SignedDuration;
use jiff::Timestamp;

use crate::Error;
use crate::calendar::CalendarFields;

/// Name of the rolling file that collects every message logged on a Saturday or Sunday.
pub const WEEKEND_FILENAME: &str = "weekend.txt";

/// A weekend file last modified at most this long ago still belongs to the ongoing weekend.
///
/// The boundary is inclusive.
pub const ARCHIVE_THRESHOLD: SignedDuration = SignedDuration::from_hours(48);

/// The file a log call appends to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFile {
    /// `log<YYYYMMDD>.txt`, one per weekday date.
    Dated(CalendarFields),
    /// `weekend.txt`.
    Weekend,
}

impl LogFile {
    /// Resolve the target file for a call made at `fields`.
    pub fn for_fields(fields: &CalendarFields) -> Self {
        if fields.is_weekend() {
            LogFile::Weekend
        } else {
            LogFile::Dated(*fields)
        }
    }

    /// The file name, relative to the log directory.
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LogFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFile::Dated(fields) => write!(f, "log{}.txt", fields.date_stamp()),
            LogFile::Weekend => f.write_str(WEEKEND_FILENAME),
        }
    }
}

/// Whether a weekend file last modified at `modified` belongs to an earlier weekend than `now`.
///
/// A negative gap (a modification time in the future) never triggers archival.
pub fn should_archive(modified: Timestamp, now: Timestamp) -> bool {
    now.duration_since(modified) > ARCHIVE_THRESHOLD
}

/// The name a stale weekend file is archived under, `weekend-<YYYYMMDD>.txt`.
///
/// The date is the Saturday of the weekend the file belonged to: a file last modified on a
/// Sunday is filed under the day before.
///
/// # Errors
///
/// Return an error if the day before a Sunday cannot be represented.
pub fn archive_filename(modified: Timestamp) -> Result<String, Error> {
    let mut fields = CalendarFields::from_timestamp(modified);
    if fields.is_sunday() {
        fields = fields.previous_day()?;
    }
    Ok(format!("weekend-{}.txt", fields.date_stamp()))
}
