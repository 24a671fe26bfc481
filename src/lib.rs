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

//! Weekendlog appends timestamped messages to date-partitioned files, folding every Saturday
//! and Sunday into a single rolling weekend file.
//!
//! # Overview
//!
//! All dates are UTC calendar dates.
//!
//! * A message logged on a weekday goes to `log<YYYYMMDD>.txt`.
//! * A message logged on a Saturday or Sunday goes to `weekend.txt`.
//! * When a weekend message arrives and `weekend.txt` was last modified more than 48 hours
//!   earlier, the old file is first renamed to `weekend-<YYYYMMDD>.txt`, dated after the
//!   Saturday of the weekend it belonged to.
//!
//! Each message is written as `YYYY-MM-DD HH:MM:SS <message>`, with no newline added.
//!
//! # Examples
//!
//! ```
//! use weekendlog::RotatingLogWriter;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let writer = RotatingLogWriter::builder(dir.path()).build().unwrap();
//!
//! writer.log("service started\n").unwrap();
//! ```
//!
//! Deterministic time and in-memory files:
//!
//! ```
//! use jiff::Timestamp;
//! use weekendlog::RotatingLogWriterBuilder;
//! use weekendlog::clock::ManualClock;
//! use weekendlog::storage::MemoryStorage;
//!
//! let clock = ManualClock::new(Timestamp::from_millisecond(1629724415000).unwrap());
//! let writer = RotatingLogWriterBuilder::with_storage(MemoryStorage::new(clock.clone()))
//!     .clock(clock)
//!     .build()
//!     .unwrap();
//!
//! writer.log("hello").unwrap();
//! assert_eq!(
//!     writer.storage().read_to_string("log20210823.txt").unwrap(),
//!     "2021-08-23 13:13:35 hello"
//! );
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod calendar;
pub mod clock;
pub mod rotation;
pub mod storage;
pub mod trap;

#[cfg(feature = "bridge-log")]
pub mod bridge;
#[cfg(feature = "non-blocking")]
pub mod non_blocking;

mod append;
mod error;
mod writer;

pub use self::append::Append;
pub use self::error::Error;
pub use self::trap::Trap;
pub use self::writer::RotatingLogWriter;
pub use self::writer::RotatingLogWriterBuilder;
