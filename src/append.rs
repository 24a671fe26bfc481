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

use std::fmt;

use crate::Error;
use crate::RotatingLogWriter;
use crate::storage::Storage;

/// A trait representing a destination that accepts log messages.
///
/// Implemented by [`RotatingLogWriter`], which writes in the caller's thread, and by
/// [`NonBlocking`](crate::non_blocking::NonBlocking), which hands messages to a worker thread.
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Processes a log message.
    fn append(&self, message: &str) -> Result<(), Error>;
}

impl<S: Storage> Append for RotatingLogWriter<S> {
    fn append(&self, message: &str) -> Result<(), Error> {
        self.log(message)
    }
}
