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

use std::path::PathBuf;
use std::sync::Arc;

use jiff::Timestamp;

use crate::Error;
use crate::calendar::CalendarFields;
use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::rotation::LogFile;
use crate::rotation::WEEKEND_FILENAME;
use crate::rotation::archive_filename;
use crate::rotation::should_archive;
use crate::storage::FileStorage;
use crate::storage::Storage;

/// A writer that appends timestamped messages to date-partitioned files.
///
/// Messages logged on a weekday go to `log<YYYYMMDD>.txt`. Messages logged on a Saturday or
/// Sunday (UTC) go to `weekend.txt`, which is renamed to `weekend-<YYYYMMDD>.txt` once it is
/// found to belong to an earlier weekend.
///
/// Calls are not synchronized with each other: the archival check and the append of one call
/// are not atomic as a pair.
#[derive(Debug)]
pub struct RotatingLogWriter<S = FileStorage> {
    storage: S,
    clock: Arc<dyn Clock>,
}

impl RotatingLogWriter<FileStorage> {
    /// Creates a new [`RotatingLogWriterBuilder`] writing files under `basedir`.
    #[must_use]
    pub fn builder(basedir: impl Into<PathBuf>) -> RotatingLogWriterBuilder<FileStorage> {
        RotatingLogWriterBuilder::new(basedir)
    }
}

impl<S: Storage> RotatingLogWriter<S> {
    /// Append `message` to the file selected for the current instant.
    ///
    /// The line written is `YYYY-MM-DD HH:MM:SS <message>`. No newline is added.
    ///
    /// # Errors
    ///
    /// Return an error if any storage operation fails. Effects that happened before the failure
    /// are kept: a weekend file that was already archived stays archived.
    pub fn log(&self, message: &str) -> Result<(), Error> {
        let now = self.clock.now();
        self.log_at(now, message)
    }

    /// Same as [`log`](Self::log), with the instant already captured by the caller.
    pub fn log_at(&self, now: Timestamp, message: &str) -> Result<(), Error> {
        let fields = CalendarFields::from_timestamp(now);
        if fields.is_weekend() {
            self.archive_stale_weekend(now)?;
        }

        let file = LogFile::for_fields(&fields);
        let line = format!("{} {message}", fields.line_prefix());
        self.storage.append(&file.filename(), line.as_bytes())
    }

    /// Rename `weekend.txt` away if it was last written too long before `now`.
    fn archive_stale_weekend(&self, now: Timestamp) -> Result<(), Error> {
        if !self.storage.exists(WEEKEND_FILENAME)? {
            return Ok(());
        }

        let modified = self.storage.modified(WEEKEND_FILENAME)?;
        if !should_archive(modified, now) {
            return Ok(());
        }

        let archived = archive_filename(modified)?;
        self.storage.rename(WEEKEND_FILENAME, &archived)
    }

    /// The clock this writer reads the current instant from.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn shared_clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

/// A builder for configuring [`RotatingLogWriter`].
#[derive(Debug)]
pub struct RotatingLogWriterBuilder<S = FileStorage> {
    // required
    storage: S,

    // has default
    clock: Box<dyn Clock>,
}

impl RotatingLogWriterBuilder<FileStorage> {
    /// Creates a new builder writing files under `basedir`.
    #[must_use]
    pub fn new(basedir: impl Into<PathBuf>) -> Self {
        Self::with_storage(FileStorage::new(basedir))
    }
}

impl<S: Storage> RotatingLogWriterBuilder<S> {
    /// Creates a new builder over any [`Storage`].
    #[must_use]
    pub fn with_storage(storage: S) -> Self {
        Self {
            storage,
            clock: Box::new(SystemClock::default()),
        }
    }

    /// Set the time source. Default to [`SystemClock`].
    #[must_use]
    pub fn clock(mut self, clock: impl Into<Box<dyn Clock>>) -> Self {
        self.clock = clock.into();
        self
    }

    /// Builds the [`RotatingLogWriter`].
    ///
    /// # Errors
    ///
    /// Return an error if the storage cannot be prepared, e.g. the log directory cannot be
    /// created.
    pub fn build(self) -> Result<RotatingLogWriter<S>, Error> {
        let Self { storage, clock } = self;
        storage.prepare()?;
        let clock = Arc::from(clock);
        Ok(RotatingLogWriter { storage, clock })
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::str::FromStr;
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;

    use jiff::SignedDuration;

    use super::*;
    use crate::clock::ManualClock;
    use crate::rotation::ARCHIVE_THRESHOLD;
    use crate::storage::MemoryStorage;

    const MONDAY: i64 = 1629724415000;
    const TUESDAY: i64 = 1629810815000;
    const SATURDAY: i64 = 1629551615000;
    const SUNDAY: i64 = 1629638015000;

    fn ms(ms: i64) -> Timestamp {
        Timestamp::from_millisecond(ms).unwrap()
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::from_str(s).unwrap()
    }

    fn memory_writer(now: Timestamp) -> (RotatingLogWriter<MemoryStorage>, ManualClock) {
        let clock = ManualClock::new(now);
        let writer = RotatingLogWriterBuilder::with_storage(MemoryStorage::new(clock.clone()))
            .clock(clock.clone())
            .build()
            .unwrap();
        (writer, clock)
    }

    #[test]
    fn test_weekday_appends_to_dated_file() {
        let (writer, _) = memory_writer(ms(MONDAY));
        writer.log("should be in a dated file").unwrap();

        let storage = writer.storage();
        assert_eq!(storage.file_names(), vec!["log20210823.txt"]);
        insta::assert_snapshot!(
            storage.read_to_string("log20210823.txt").unwrap(),
            @"2021-08-23 13:13:35 should be in a dated file"
        );
    }

    #[test]
    fn test_sequential_calls_append_without_newline() {
        let (writer, _) = memory_writer(ms(MONDAY));
        writer.log("first\n").unwrap();
        writer.log("second").unwrap();
        writer.log("").unwrap();

        assert_eq!(
            writer.storage().read_to_string("log20210823.txt").unwrap(),
            "2021-08-23 13:13:35 first\n2021-08-23 13:13:35 second2021-08-23 13:13:35 "
        );
    }

    #[test]
    fn test_two_weekdays_make_two_files() {
        let (writer, clock) = memory_writer(ms(MONDAY));
        writer.log("log on day 1").unwrap();
        assert_eq!(writer.storage().file_names().len(), 1);

        clock.set_now(ms(TUESDAY));
        writer.log("log on day 2").unwrap();
        assert_eq!(
            writer.storage().file_names(),
            vec!["log20210823.txt", "log20210824.txt"]
        );
        assert_eq!(
            writer.storage().read_to_string("log20210824.txt").unwrap(),
            "2021-08-24 13:13:35 log on day 2"
        );
    }

    #[test]
    fn test_saturday_and_sunday_share_weekend_file() {
        let (writer, clock) = memory_writer(ms(SATURDAY));
        writer.log("log on saturday").unwrap();
        clock.set_now(ms(SUNDAY));
        writer.log("log on sunday").unwrap();

        let storage = writer.storage();
        assert_eq!(storage.file_names(), vec![WEEKEND_FILENAME]);
        insta::assert_snapshot!(
            storage.read_to_string(WEEKEND_FILENAME).unwrap(),
            @"2021-08-21 13:13:35 log on saturday2021-08-22 13:13:35 log on sunday"
        );
    }

    #[test]
    fn test_recent_weekend_file_is_kept() {
        let (writer, _) = memory_writer(ms(SUNDAY));
        writer
            .storage()
            .insert(WEEKEND_FILENAME, "saturday ", ts("2021-08-21T00:00:00Z"));

        writer.log("log on sunday").unwrap();

        let storage = writer.storage();
        assert_eq!(storage.file_names(), vec![WEEKEND_FILENAME]);
        assert_eq!(
            storage.read_to_string(WEEKEND_FILENAME).unwrap(),
            "saturday 2021-08-22 13:13:35 log on sunday"
        );
    }

    #[test]
    fn test_stale_saturday_file_is_archived() {
        let (writer, _) = memory_writer(ms(SATURDAY));
        writer
            .storage()
            .insert(WEEKEND_FILENAME, "old weekend", ts("2004-02-28T00:00:00Z"));

        writer.log("log on later saturday").unwrap();

        let storage = writer.storage();
        assert_eq!(
            storage.file_names(),
            vec!["weekend-20040228.txt", WEEKEND_FILENAME]
        );
        assert_eq!(
            storage.read_to_string("weekend-20040228.txt").unwrap(),
            "old weekend"
        );
        assert_eq!(
            storage.read_to_string(WEEKEND_FILENAME).unwrap(),
            "2021-08-21 13:13:35 log on later saturday"
        );
    }

    #[test]
    fn test_stale_sunday_file_is_archived_under_saturday() {
        let (writer, _) = memory_writer(ms(SATURDAY));
        writer
            .storage()
            .insert(WEEKEND_FILENAME, "old weekend", ts("2004-02-29T00:00:00Z"));

        writer.log("log on later saturday").unwrap();

        assert_eq!(
            writer.storage().file_names(),
            vec!["weekend-20040228.txt", WEEKEND_FILENAME]
        );
    }

    #[test]
    fn test_following_weekend_archives_previous_sunday() {
        // Sunday 2021-08-01, then Saturday 2021-08-07 00:00:00.
        let (writer, _) = memory_writer(ms(1628294400000));
        writer
            .storage()
            .insert(WEEKEND_FILENAME, "", ts("2021-08-01T00:00:00Z"));

        writer.log("log on later saturday").unwrap();

        let storage = writer.storage();
        assert_eq!(
            storage.file_names(),
            vec!["weekend-20210731.txt", WEEKEND_FILENAME]
        );
        assert_eq!(
            storage.read_to_string(WEEKEND_FILENAME).unwrap(),
            "2021-08-07 00:00:00 log on later saturday"
        );
    }

    #[test]
    fn test_archive_boundary() {
        let saturday = ts("2021-07-31T00:00:00Z");
        let thursday = ts("2021-08-05T00:00:00Z");
        let just_over = SignedDuration::from_millis(172_800_001);

        for (modified, now, archived) in [
            // Sunday 2021-08-01 00:00:00
            (saturday, ms(1627776000000), None),
            // last millisecond of Sunday 2021-08-01
            (saturday, ms(1627862399999), None),
            // exactly 48 hours, landing on Saturday 2021-08-07 00:00:00
            (thursday, thursday + ARCHIVE_THRESHOLD, None),
            // just over 48 hours
            (thursday, thursday + just_over, Some("weekend-20210805.txt")),
            // just over 48 hours, but on a Monday: no archival check at all
            (saturday, saturday + just_over, None),
        ] {
            let (writer, _) = memory_writer(now);
            writer.storage().insert(WEEKEND_FILENAME, "", modified);
            writer.log("x").unwrap();

            let names = writer.storage().file_names();
            let found = names.iter().find(|name| name.starts_with("weekend-"));
            assert_eq!(found.map(String::as_str), archived, "now = {now}");
        }
    }

    #[test]
    fn test_weekday_never_archives() {
        let (writer, _) = memory_writer(ms(MONDAY));
        writer
            .storage()
            .insert(WEEKEND_FILENAME, "old weekend", ts("2004-02-28T00:00:00Z"));

        writer.log("weekday").unwrap();
        assert_eq!(
            writer.storage().file_names(),
            vec!["log20210823.txt", WEEKEND_FILENAME]
        );
    }

    #[test]
    fn test_log_captures_time_once() {
        #[derive(Debug)]
        struct SteppingClock {
            stepped: AtomicBool,
        }

        // First reading is a Saturday, any later reading is a Monday.
        impl Clock for SteppingClock {
            fn now(&self) -> Timestamp {
                if self.stepped.swap(true, Ordering::SeqCst) {
                    ms(MONDAY)
                } else {
                    ms(SATURDAY)
                }
            }
        }

        let storage = MemoryStorage::new(ManualClock::new(ms(SATURDAY)));
        let writer = RotatingLogWriterBuilder::with_storage(storage)
            .clock(SteppingClock {
                stepped: AtomicBool::new(false),
            })
            .build()
            .unwrap();

        writer.log("one reading").unwrap();
        assert_eq!(
            writer.storage().read_to_string(WEEKEND_FILENAME).unwrap(),
            "2021-08-21 13:13:35 one reading"
        );
    }

    #[derive(Debug)]
    struct FailingStorage {
        inner: MemoryStorage,
        fail_rename: bool,
        fail_append: bool,
    }

    impl Storage for FailingStorage {
        fn exists(&self, name: &str) -> Result<bool, Error> {
            self.inner.exists(name)
        }

        fn modified(&self, name: &str) -> Result<Timestamp, Error> {
            self.inner.modified(name)
        }

        fn rename(&self, from: &str, to: &str) -> Result<(), Error> {
            if self.fail_rename {
                let err = io::Error::from(io::ErrorKind::PermissionDenied);
                return Err(Error::new("failed to archive log file").with_source(err));
            }
            self.inner.rename(from, to)
        }

        fn append(&self, name: &str, bytes: &[u8]) -> Result<(), Error> {
            if self.fail_append {
                let err = io::Error::from(io::ErrorKind::StorageFull);
                return Err(Error::new("failed to append log file").with_source(err));
            }
            self.inner.append(name, bytes)
        }
    }

    fn failing_writer(fail_rename: bool, fail_append: bool) -> RotatingLogWriter<FailingStorage> {
        let clock = ManualClock::new(ms(SATURDAY));
        let inner = MemoryStorage::new(clock.clone());
        inner.insert(WEEKEND_FILENAME, "old weekend", ts("2004-02-28T00:00:00Z"));
        let storage = FailingStorage {
            inner,
            fail_rename,
            fail_append,
        };
        RotatingLogWriterBuilder::with_storage(storage)
            .clock(clock)
            .build()
            .unwrap()
    }

    #[test]
    fn test_rename_failure_keeps_weekend_file() {
        let writer = failing_writer(true, false);
        let err = writer.log("lost").unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));

        let inner = &writer.storage().inner;
        assert_eq!(inner.file_names(), vec![WEEKEND_FILENAME]);
        assert_eq!(inner.read_to_string(WEEKEND_FILENAME).unwrap(), "old weekend");
    }

    #[test]
    fn test_append_failure_keeps_archive() {
        let writer = failing_writer(false, true);
        let err = writer.log("lost").unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::StorageFull));

        let inner = &writer.storage().inner;
        assert_eq!(inner.file_names(), vec!["weekend-20040228.txt"]);
    }
}
