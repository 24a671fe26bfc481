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

//! A [`RotatingLogWriter`](crate::RotatingLogWriter) driven by a background thread.
//!
//! The instant of each message is captured on the calling thread when it is sent, and a single
//! worker applies messages in the order they were sent. Every decision for one message is made
//! with that one captured instant, exactly as in the blocking writer.
//!
//! # Example
//!
//! ```
//! use weekendlog::RotatingLogWriter;
//! use weekendlog::non_blocking::NonBlockingBuilder;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let writer = RotatingLogWriter::builder(dir.path()).build().unwrap();
//! let (non_blocking, guard) = NonBlockingBuilder::new("weekendlog", writer).build().unwrap();
//!
//! non_blocking.log("written by the worker thread\n").unwrap();
//! drop(guard);
//! ```

mod builder;
mod worker;

pub use builder::NonBlocking;
pub use builder::NonBlockingBuilder;
pub use builder::WorkerGuard;

use jiff::Timestamp;

#[derive(Debug)]
enum Message {
    Record { timestamp: Timestamp, message: String },
    Shutdown,
}
