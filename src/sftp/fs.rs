// Copyright 2025 Lablup Inc. and Jeongkyu Shin
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

//! The file-transfer collaborator seam.
//!
//! [`RemoteFs`] is the narrow set of operations the synchronizer needs from an
//! SFTP server. [`super::SftpSession`] implements it over russh; tests use an
//! in-memory implementation.

use async_trait::async_trait;
use std::path::Path;

use super::error::TransportResult;

/// Type tag of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

impl EntryKind {
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
}

/// A node met while walking a tree; `path` is relative to the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub kind: EntryKind,
    pub path: String,
}

/// Byte-level progress sink for a single file: `(transferred, total)`.
pub type ByteProgress<'a> = &'a mut (dyn FnMut(u64, u64) + Send);

/// Operations consumed from the remote file-transfer service.
///
/// One value is one connection. Implementations are not required to be safe
/// for concurrent use.
#[async_trait]
pub trait RemoteFs: Send {
    /// Type of the entry at `path`, following symbolic links. `Ok(None)` when
    /// nothing exists there.
    async fn stat(&mut self, path: &str) -> TransportResult<Option<EntryKind>>;

    /// Entries directly under `path`, without `.` and `..`. Entry kinds are not
    /// resolved through symbolic links.
    async fn list(&mut self, path: &str) -> TransportResult<Vec<DirEntry>>;

    /// Copy the remote file `remote` to `local`, returning the byte count.
    async fn get(
        &mut self,
        remote: &str,
        local: &Path,
        progress: ByteProgress<'_>,
    ) -> TransportResult<u64>;

    /// Copy the local file `local` to `remote`, returning the byte count.
    async fn put(
        &mut self,
        local: &Path,
        remote: &str,
        progress: ByteProgress<'_>,
    ) -> TransportResult<u64>;

    /// Create one directory. Succeeds if it already exists.
    async fn make_directory(&mut self, path: &str) -> TransportResult<()>;

    /// Release the connection.
    async fn close(&mut self) -> TransportResult<()>;
}
