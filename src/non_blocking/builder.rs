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
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::SendTimeoutError;
use crossbeam_channel::Sender;
use crossbeam_channel::bounded;
use crossbeam_channel::unbounded;

use super::Message;
use super::worker::Worker;
use crate::Append;
use crate::Error;
use crate::RotatingLogWriter;
use crate::Trap;
use crate::clock::Clock;
use crate::storage::Storage;
use crate::trap::DefaultTrap;

/// A guard that flushes pending messages when dropped.
///
/// Keep it alive for as long as messages are sent.
#[derive(Debug)]
pub struct WorkerGuard {
    _guard: Option<JoinHandle<()>>,
    sender: Sender<Message>,
    shutdown: Sender<()>,
    shutdown_timeout: Duration,
}

impl WorkerGuard {
    fn new(
        handle: JoinHandle<()>,
        sender: Sender<Message>,
        shutdown: Sender<()>,
        shutdown_timeout: Option<Duration>,
    ) -> Self {
        const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

        WorkerGuard {
            _guard: Some(handle),
            sender,
            shutdown,
            shutdown_timeout: shutdown_timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT),
        }
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        let shutdown_timeout = self.shutdown_timeout;
        match self
            .sender
            .send_timeout(Message::Shutdown, shutdown_timeout)
        {
            Ok(()) => {
                // Wait for the worker to drain the queue. It calls `recv()` on the zero-capacity
                // shutdown channel once done; `send_timeout` keeps drop from blocking forever.
                let _ = self.shutdown.send_timeout((), shutdown_timeout);
            }
            Err(SendTimeoutError::Disconnected(_)) => (),
            Err(SendTimeoutError::Timeout(_)) => {
                eprintln!("failed to send shutdown signal to the log writer thread");
            }
        }
    }
}

/// A cloneable handle that sends messages to the worker thread.
#[derive(Clone)]
pub struct NonBlocking {
    sender: Sender<Message>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for NonBlocking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonBlocking")
            .field("pending", &self.sender.len())
            .field("clock", &self.clock)
            .finish()
    }
}

impl NonBlocking {
    /// Capture the current instant and queue `message` for the worker.
    ///
    /// # Errors
    ///
    /// Return an error if the worker thread has gone away.
    pub fn log(&self, message: impl Into<String>) -> Result<(), Error> {
        let timestamp = self.clock.now();
        let message = message.into();
        self.sender
            .send(Message::Record { timestamp, message })
            .map_err(|err| Error::new("failed to send log message").with_source(err))
    }
}

impl Append for NonBlocking {
    fn append(&self, message: &str) -> Result<(), Error> {
        self.log(message)
    }
}

/// A builder for [`NonBlocking`].
#[derive(Debug)]
pub struct NonBlockingBuilder<S: Storage> {
    thread_name: String,
    buffered_lines_limit: Option<usize>,
    shutdown_timeout: Option<Duration>,
    trap: Box<dyn Trap>,
    writer: RotatingLogWriter<S>,
}

impl<S: Storage> NonBlockingBuilder<S> {
    /// Creates a new [`NonBlockingBuilder`] that moves `writer` onto a thread named `thread_name`.
    pub fn new(thread_name: impl Into<String>, writer: RotatingLogWriter<S>) -> Self {
        Self {
            thread_name: thread_name.into(),
            buffered_lines_limit: None,
            shutdown_timeout: None,
            trap: Box::new(DefaultTrap::default()),
            writer,
        }
    }

    /// Sets the buffer size of pending messages. Unbounded by default.
    pub fn buffered_lines_limit(mut self, buffered_lines_limit: Option<usize>) -> Self {
        self.buffered_lines_limit = buffered_lines_limit;
        self
    }

    /// Sets the shutdown timeout before the worker guard dropped.
    pub fn shutdown_timeout(mut self, shutdown_timeout: Option<Duration>) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    /// Set the trap for errors raised on the worker thread.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Spawns the worker thread, returning the handle and its guard.
    ///
    /// # Errors
    ///
    /// Return an error if the thread cannot be spawned.
    pub fn build(self) -> Result<(NonBlocking, WorkerGuard), Error> {
        let Self {
            thread_name,
            buffered_lines_limit,
            shutdown_timeout,
            trap,
            writer,
        } = self;

        let (sender, receiver) = match buffered_lines_limit {
            Some(cap) => bounded(cap),
            None => unbounded(),
        };
        let (shutdown_sender, shutdown_receiver) = bounded(0);

        let clock = writer.shared_clock();
        let worker = Worker::new(writer, receiver, shutdown_receiver, trap);
        let guard = WorkerGuard::new(
            worker.make_thread(thread_name)?,
            sender.clone(),
            shutdown_sender,
            shutdown_timeout,
        );

        Ok((NonBlocking { sender, clock }, guard))
    }
}
