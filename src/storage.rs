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

//! Storage backends the writer appends to.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use jiff::Timestamp;

use crate::Error;
use crate::clock::Clock;

/// The file operations a [`RotatingLogWriter`](crate::RotatingLogWriter) needs.
///
/// Names are bare file names relative to the storage root.
pub trait Storage: fmt::Debug + Send + Sync + 'static {
    /// Called once when the writer is built.
    fn prepare(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Whether a file with this name exists.
    fn exists(&self, name: &str) -> Result<bool, Error>;

    /// The last modification time of the file.
    fn modified(&self, name: &str) -> Result<Timestamp, Error>;

    /// Move the file `from` to `to`, replacing `to` if it exists.
    fn rename(&self, from: &str, to: &str) -> Result<(), Error>;

    /// Append `bytes` to the file, creating it if absent.
    fn append(&self, name: &str, bytes: &[u8]) -> Result<(), Error>;
}

impl<T: Storage + ?Sized> Storage for Box<T> {
    fn prepare(&self) -> Result<(), Error> {
        (**self).prepare()
    }

    fn exists(&self, name: &str) -> Result<bool, Error> {
        (**self).exists(name)
    }

    fn modified(&self, name: &str) -> Result<Timestamp, Error> {
        (**self).modified(name)
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), Error> {
        (**self).rename(from, to)
    }

    fn append(&self, name: &str, bytes: &[u8]) -> Result<(), Error> {
        (**self).append(name, bytes)
    }
}

impl<T: Storage + ?Sized> Storage for Arc<T> {
    fn prepare(&self) -> Result<(), Error> {
        (**self).prepare()
    }

    fn exists(&self, name: &str) -> Result<bool, Error> {
        (**self).exists(name)
    }

    fn modified(&self, name: &str) -> Result<Timestamp, Error> {
        (**self).modified(name)
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), Error> {
        (**self).rename(from, to)
    }

    fn append(&self, name: &str, bytes: &[u8]) -> Result<(), Error> {
        (**self).append(name, bytes)
    }
}

/// Files in a directory on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    log_dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `dir`. Nothing is touched on disk until the first append.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: dir.into(),
        }
    }

    /// Create the log directory if it does not exist yet.
    pub fn create_dir(&self) -> Result<(), Error> {
        fs::create_dir_all(&self.log_dir).map_err(|err| {
            Error::new("failed to create log directory")
                .with_context("dir", self.log_dir.display())
                .with_source(err)
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.log_dir.join(name)
    }
}

impl Storage for FileStorage {
    fn prepare(&self) -> Result<(), Error> {
        self.create_dir()
    }

    fn exists(&self, name: &str) -> Result<bool, Error> {
        let path = self.path(name);
        fs::exists(&path).map_err(|err| {
            Error::new("failed to check log file")
                .with_context("file", path.display())
                .with_source(err)
        })
    }

    fn modified(&self, name: &str) -> Result<Timestamp, Error> {
        let path = self.path(name);
        let mtime = fs::metadata(&path)
            .and_then(|metadata| metadata.modified())
            .map_err(|err| {
                Error::new("failed to read log file modification time")
                    .with_context("file", path.display())
                    .with_source(err)
            })?;
        Timestamp::try_from(mtime).map_err(|err| {
            Error::new("log file modification time is out of range")
                .with_context("file", path.display())
                .with_source(err)
        })
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), Error> {
        let from = self.path(from);
        let to = self.path(to);
        fs::rename(&from, &to).map_err(|err| {
            Error::new("failed to archive log file")
                .with_context("from", from.display())
                .with_context("to", to.display())
                .with_source(err)
        })
    }

    fn append(&self, name: &str, bytes: &[u8]) -> Result<(), Error> {
        self.create_dir()?;

        let path = self.path(name);
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|err| {
                Error::new("failed to open log file")
                    .with_context("file", path.display())
                    .with_source(err)
            })?;
        file.write_all(bytes).map_err(|err| {
            Error::new("failed to append log file")
                .with_context("file", path.display())
                .with_source(err)
        })
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    content: Vec<u8>,
    modified: Timestamp,
}

/// Files held in memory, for tests and dry runs.
///
/// Appends stamp the file with the time of the given clock, renames keep the stamp.
#[derive(Debug)]
pub struct MemoryStorage {
    files: Mutex<BTreeMap<String, MemoryFile>>,
    clock: Box<dyn Clock>,
}

impl MemoryStorage {
    /// Create an empty storage whose modification times come from `clock`.
    pub fn new(clock: impl Into<Box<dyn Clock>>) -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
            clock: clock.into(),
        }
    }

    /// Create or replace a file with the given content and modification time.
    pub fn insert(&self, name: impl Into<String>, content: impl Into<Vec<u8>>, modified: Timestamp) {
        let file = MemoryFile {
            content: content.into(),
            modified,
        };
        self.files().insert(name.into(), file);
    }

    /// Override the modification time of an existing file.
    pub fn set_modified(&self, name: &str, modified: Timestamp) -> Result<(), Error> {
        let mut files = self.files();
        let file = files.get_mut(name).ok_or_else(|| not_found(name))?;
        file.modified = modified;
        Ok(())
    }

    /// The content of a file, if it exists.
    pub fn read(&self, name: &str) -> Option<Vec<u8>> {
        self.files().get(name).map(|file| file.content.clone())
    }

    /// The content of a file as UTF-8, if it exists.
    pub fn read_to_string(&self, name: &str) -> Option<String> {
        self.read(name)
            .map(|content| String::from_utf8_lossy(&content).into_owned())
    }

    /// All file names, sorted.
    pub fn file_names(&self) -> Vec<String> {
        self.files().keys().cloned().collect()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<String, MemoryFile>> {
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn not_found(name: &str) -> Error {
    Error::new("log file does not exist")
        .with_context("file", name)
        .with_source(io::Error::from(io::ErrorKind::NotFound))
}

impl Storage for MemoryStorage {
    fn exists(&self, name: &str) -> Result<bool, Error> {
        Ok(self.files().contains_key(name))
    }

    fn modified(&self, name: &str) -> Result<Timestamp, Error> {
        self.files()
            .get(name)
            .map(|file| file.modified)
            .ok_or_else(|| not_found(name))
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), Error> {
        let mut files = self.files();
        let file = files.remove(from).ok_or_else(|| not_found(from))?;
        files.insert(to.to_string(), file);
        Ok(())
    }

    fn append(&self, name: &str, bytes: &[u8]) -> Result<(), Error> {
        let modified = self.clock.now();
        let mut files = self.files();
        let file = files.entry(name.to_string()).or_insert_with(|| MemoryFile {
            content: vec![],
            modified,
        });
        file.content.extend_from_slice(bytes);
        file.modified = modified;
        Ok(())
    }
}
