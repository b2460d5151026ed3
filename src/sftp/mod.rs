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

//! Vault file transfer over SFTP.
//!
//! - [`RemoteFs`]: the transport seam
//! - [`SftpSession`]: russh-backed implementation with host key checking
//! - [`DirectorySync`]: plan resolution and tree copy in both directions
//! - [`progress`]: per-file progress helpers and the indicatif renderer

pub mod error;
pub mod fs;
pub mod host_verification;
pub mod path;
pub mod progress;
pub mod session;
pub mod sync;

pub use error::{SyncError, SyncResult, TransportError, TransportResult};
pub use fs::{ByteProgress, DirEntry, EntryKind, RemoteEntry, RemoteFs};
pub use host_verification::{HostKeyVerifier, StrictHostKeyChecking};
pub use progress::{format_status, percent, ProgressCallback, ProgressRenderer};
pub use session::{ConnectOptions, SftpSession, DEFAULT_VAULT_HOST, DEFAULT_VAULT_PORT};
pub use sync::{DirectorySync, SkippedEntry, TransferPlan, TransferReport};
