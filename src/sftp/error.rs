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

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by the file-transfer collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    #[error("SFTP error: {0}")]
    Sftp(#[from] russh_sftp::client::error::Error),

    #[error("authentication failed for user '{0}'")]
    AuthenticationFailed(String),

    #[error("host key verification failed: {0}")]
    HostKeyVerification(String),

    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether the remote side reported that the path does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == io::ErrorKind::NotFound,
            Self::Sftp(russh_sftp::client::error::Error::Status(status)) => {
                status.status_code == russh_sftp::protocol::StatusCode::NoSuchFile
            }
            _ => false,
        }
    }
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Errors surfaced by the directory synchronizer.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("local path does not exist: {}", .0.display())]
    LocalNotFound(PathBuf),

    #[error("destination {path} already exists: {reason}")]
    Conflict { path: String, reason: String },

    #[error("remote path does not exist: {0}")]
    RemoteNotFound(String),

    #[error("failed to transfer {path}: {source}")]
    Transfer {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("remote operation on {path} failed: {source}")]
    Remote {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("unsupported entry type at {path}")]
    UnknownEntryType { path: String },

    #[error("local I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    pub(crate) fn conflict(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Conflict {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn remote(path: impl Into<String>) -> impl FnOnce(TransportError) -> Self {
        let path = path.into();
        move |source| Self::Remote { path, source }
    }

    pub(crate) fn transfer(path: impl Into<String>) -> impl FnOnce(TransportError) -> Self {
        let path = path.into();
        move |source| Self::Transfer { path, source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;
