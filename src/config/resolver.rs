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

//! Merging command-line overrides with the loaded configuration.

use anyhow::{bail, Result};
use std::fmt;
use std::time::Duration;
use zeroize::Zeroizing;

use super::types::Config;
use crate::api::{Credentials, DEFAULT_API_URL};
use crate::poller::DEFAULT_POLL_INTERVAL;
use crate::sftp::{StrictHostKeyChecking, DEFAULT_VAULT_HOST, DEFAULT_VAULT_PORT};

/// Values given on the command line or through the environment.
#[derive(Default, Clone)]
pub struct Overrides {
    pub username: Option<String>,
    pub apikey: Option<String>,
    pub api_url: Option<String>,
    pub vault: Option<String>,
    pub strict_host_key_checking: Option<StrictHostKeyChecking>,
}

/// Fully resolved client settings.
#[derive(Clone)]
pub struct Settings {
    pub username: Option<String>,
    apikey: Option<Zeroizing<String>>,
    pub api_url: String,
    pub vault: String,
    pub port: u16,
    pub poll_interval: Duration,
    pub strict_host_key_checking: StrictHostKeyChecking,
}

impl Config {
    /// Apply `overrides` on top of this configuration, then the defaults.
    pub fn resolve(&self, overrides: &Overrides) -> Settings {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        Settings {
            username: non_empty(&overrides.username).or_else(|| non_empty(&self.username)),
            apikey: non_empty(&overrides.apikey)
                .or_else(|| non_empty(&self.apikey))
                .map(Zeroizing::new),
            api_url: non_empty(&overrides.api_url)
                .or_else(|| non_empty(&self.api_url))
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            vault: non_empty(&overrides.vault)
                .or_else(|| non_empty(&self.vault))
                .unwrap_or_else(|| DEFAULT_VAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_VAULT_PORT),
            poll_interval: self
                .poll_interval
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            strict_host_key_checking: overrides
                .strict_host_key_checking
                .or(self.strict_host_key_checking)
                .unwrap_or_default(),
        }
    }
}

impl Settings {
    /// Credentials for the API and the vault. Both parts are required.
    pub fn credentials(&self) -> Result<Credentials> {
        let Some(username) = &self.username else {
            bail!("JARVICE username is required. Use --username, JARVICE_USER or the config file.");
        };
        let Some(apikey) = &self.apikey else {
            bail!("JARVICE API key is required. Use --apikey, JARVICE_APIKEY or the config file.");
        };
        Ok(Credentials::new(username.as_str(), apikey.as_str()))
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("username", &self.username)
            .field("apikey", &self.apikey.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("vault", &self.vault)
            .field("port", &self.port)
            .field("poll_interval", &self.poll_interval)
            .field("strict_host_key_checking", &self.strict_host_key_checking)
            .finish()
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("username", &self.username)
            .field("apikey", &self.apikey.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("vault", &self.vault)
            .field("strict_host_key_checking", &self.strict_host_key_checking)
            .finish()
    }
}
