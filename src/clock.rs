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

//! Time sources for the writer.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;

use jiff::SignedDuration;
use jiff::Timestamp;

/// A source of the current instant.
pub trait Clock: fmt::Debug + Send + Sync + 'static {
    /// Return the current instant.
    fn now(&self) -> Timestamp;
}

impl<T: Clock> From<T> for Box<dyn Clock> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// The wall clock.
#[derive(Debug, Default, Clone, Copy)]
#[non_exhaustive]
pub struct SystemClock {}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// The time could be reset.
///
/// Clones share the same instant, so one handle can be given to the writer while another one
/// moves time forward.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: Timestamp) -> ManualClock {
        ManualClock {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Reset the clock to `now`.
    pub fn set_now(&self, now: Timestamp) {
        *self.lock() = now;
    }

    /// Move the clock by `span`, which may be negative.
    ///
    /// The clock is left unchanged if the result falls outside the range of [`Timestamp`].
    pub fn advance(&self, span: SignedDuration) {
        let mut now = self.lock();
        if let Ok(next) = now.checked_add(span) {
            *now = next;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Timestamp> {
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.lock()
    }
}
