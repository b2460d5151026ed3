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

pub mod download;
pub mod jobs;
pub mod list;
pub mod upload;
pub mod wait;

use anyhow::{Context, Result};

use crate::api::Credentials;
use crate::config::Settings;
use crate::sftp::{ConnectOptions, HostKeyVerifier, SftpSession, StrictHostKeyChecking};

/// Everything needed to open a vault session.
#[derive(Debug)]
pub struct VaultParams {
    pub host: String,
    pub port: u16,
    pub strict_mode: StrictHostKeyChecking,
    pub credentials: Credentials,
}

impl VaultParams {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            host: settings.vault.clone(),
            port: settings.port,
            strict_mode: settings.strict_host_key_checking,
            credentials: settings.credentials()?,
        })
    }

    pub async fn connect(&self) -> Result<SftpSession> {
        let options = ConnectOptions::new(self.host.as_str())
            .with_port(self.port)
            .with_verifier(HostKeyVerifier::new(self.strict_mode));
        SftpSession::connect(&options, &self.credentials)
            .await
            .with_context(|| format!("Failed to connect to vault {}:{}", self.host, self.port))
    }
}
