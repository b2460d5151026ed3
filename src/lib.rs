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

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod poller;
pub mod sftp;
pub mod utils;

pub use api::{JarviceClient, JobApi, JobHandle, JobStatus};
pub use cli::Cli;
pub use config::Config;
pub use poller::{JobPoller, WaitError};
pub use sftp::{DirectorySync, RemoteFs, SftpSession, SyncError};
