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

use directories::BaseDirs;
use russh::keys::PublicKey;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::{TransportError, TransportResult};

/// Mode for host key checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrictHostKeyChecking {
    /// Always verify host keys (fail on unknown/changed)
    Yes,
    /// Never verify host keys (accept all)
    No,
    /// Verify known hosts, add new ones automatically (TOFU)
    #[default]
    AcceptNew,
}

impl FromStr for StrictHostKeyChecking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "true" => Ok(Self::Yes),
            "no" | "false" => Ok(Self::No),
            "accept-new" | "tofu" => Ok(Self::AcceptNew),
            other => Err(format!(
                "invalid host key checking mode '{other}' (expected yes, no or accept-new)"
            )),
        }
    }
}

/// Get the default known_hosts file path
pub fn default_known_hosts_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".ssh").join("known_hosts"))
}

/// Checks vault host keys against a known_hosts file.
#[derive(Debug, Clone)]
pub struct HostKeyVerifier {
    mode: StrictHostKeyChecking,
    known_hosts_path: Option<PathBuf>,
}

impl HostKeyVerifier {
    pub fn new(mode: StrictHostKeyChecking) -> Self {
        Self {
            mode,
            known_hosts_path: default_known_hosts_path(),
        }
    }

    pub fn with_known_hosts_path(mode: StrictHostKeyChecking, path: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            known_hosts_path: Some(path.into()),
        }
    }

    pub fn mode(&self) -> StrictHostKeyChecking {
        self.mode
    }

    /// Verify `key` for `host:port` according to the configured mode.
    pub fn verify(&self, host: &str, port: u16, key: &PublicKey) -> TransportResult<bool> {
        if self.mode == StrictHostKeyChecking::No {
            tracing::debug!("Host key checking disabled (strict mode = no)");
            return Ok(true);
        }

        let Some(path) = self.known_hosts_path.as_deref() else {
            return Err(TransportError::HostKeyVerification(
                "could not determine known_hosts file path".to_string(),
            ));
        };

        match self.mode {
            StrictHostKeyChecking::Yes => verify_strict(host, port, key, path),
            StrictHostKeyChecking::AcceptNew => verify_accept_new(host, port, key, path),
            StrictHostKeyChecking::No => Ok(true),
        }
    }
}

fn check(host: &str, port: u16, key: &PublicKey, path: &Path) -> TransportResult<bool> {
    russh::keys::check_known_hosts_path(host, port, key, path).map_err(|e| {
        TransportError::HostKeyVerification(format!(
            "host key for {host}:{port} does not match {}: {e}",
            path.display()
        ))
    })
}

fn verify_strict(host: &str, port: u16, key: &PublicKey, path: &Path) -> TransportResult<bool> {
    tracing::debug!("Using known_hosts file: {:?} (strict mode)", path);
    if check(host, port, key, path)? {
        Ok(true)
    } else {
        Err(TransportError::HostKeyVerification(format!(
            "host {host}:{port} is not in {}",
            path.display()
        )))
    }
}

fn verify_accept_new(host: &str, port: u16, key: &PublicKey, path: &Path) -> TransportResult<bool> {
    tracing::debug!("Using known_hosts file: {:?} (accept-new mode)", path);
    if check(host, port, key, path)? {
        return Ok(true);
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    russh::keys::known_hosts::learn_known_hosts_path(host, port, key, path).map_err(|e| {
        TransportError::HostKeyVerification(format!("failed to record host key: {e}"))
    })?;
    tracing::info!("Added host key for {}:{} to {:?}", host, port, path);
    Ok(true)
}
