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

//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::sftp::StrictHostKeyChecking;

/// Contents of `config.yaml`. Every key is optional; command-line flags and
/// environment variables take precedence.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub username: Option<String>,
    pub apikey: Option<String>,
    pub api_url: Option<String>,
    pub vault: Option<String>,
    /// Vault SSH port.
    pub port: Option<u16>,
    /// Seconds between job status polls.
    pub poll_interval: Option<u64>,
    pub strict_host_key_checking: Option<StrictHostKeyChecking>,
}
