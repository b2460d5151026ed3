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

//! SFTP session against the JARVICE vault, built on russh.

use async_trait::async_trait;
use russh::client::{self, Handle, Handler};
use russh::keys::PublicKey;
use russh::Disconnect;
use russh_sftp::client::SftpSession as RawSftp;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::error::{TransportError, TransportResult};
use super::fs::{ByteProgress, DirEntry, EntryKind, RemoteFs};
use super::host_verification::{HostKeyVerifier, StrictHostKeyChecking};
use crate::api::Credentials;

pub const DEFAULT_VAULT_HOST: &str = "drop.jarvice.com";
pub const DEFAULT_VAULT_PORT: u16 = 22;

const CHUNK_SIZE: usize = 32 * 1024;

/// Where and how to reach the vault.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub verifier: HostKeyVerifier,
    pub connect_timeout: Duration,
}

impl ConnectOptions {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_VAULT_PORT,
            verifier: HostKeyVerifier::new(StrictHostKeyChecking::default()),
            connect_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_verifier(mut self, verifier: HostKeyVerifier) -> Self {
        self.verifier = verifier;
        self
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self::new(DEFAULT_VAULT_HOST)
    }
}

struct VaultHandler {
    host: String,
    port: u16,
    verifier: HostKeyVerifier,
}

impl Handler for VaultHandler {
    type Error = TransportError;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        self.verifier
            .verify(&self.host, self.port, server_public_key)
    }
}

/// One authenticated SFTP connection to the vault.
pub struct SftpSession {
    handle: Handle<VaultHandler>,
    sftp: RawSftp,
    host: String,
}

impl SftpSession {
    /// Connect, authenticate with the API key as password and open the sftp
    /// subsystem.
    pub async fn connect(options: &ConnectOptions, credentials: &Credentials) -> TransportResult<Self> {
        tracing::debug!(
            "Connecting to vault {}:{} as {}",
            options.host,
            options.port,
            credentials.username
        );

        let config = Arc::new(client::Config {
            inactivity_timeout: Some(Duration::from_secs(300)),
            ..Default::default()
        });
        let handler = VaultHandler {
            host: options.host.clone(),
            port: options.port,
            verifier: options.verifier.clone(),
        };

        let connect = client::connect(config, (options.host.as_str(), options.port), handler);
        let mut handle = tokio::time::timeout(options.connect_timeout, connect)
            .await
            .map_err(|_| {
                TransportError::other(format!(
                    "timed out connecting to {}:{} after {:?}",
                    options.host, options.port, options.connect_timeout
                ))
            })??;

        let auth = handle
            .authenticate_password(credentials.username.as_str(), credentials.apikey())
            .await?;
        if !auth.success() {
            return Err(TransportError::AuthenticationFailed(
                credentials.username.clone(),
            ));
        }

        let channel = handle.channel_open_session().await?;
        channel.request_subsystem(true, "sftp").await?;
        let sftp = RawSftp::new(channel.into_stream()).await?;

        tracing::info!("SFTP session established with {}", options.host);
        Ok(Self {
            handle,
            sftp,
            host: options.host.clone(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

fn kind_of(is_dir: bool, is_file: bool, is_symlink: bool) -> EntryKind {
    if is_symlink {
        EntryKind::Symlink
    } else if is_dir {
        EntryKind::Directory
    } else if is_file {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

#[async_trait]
impl RemoteFs for SftpSession {
    async fn stat(&mut self, path: &str) -> TransportResult<Option<EntryKind>> {
        match self.sftp.metadata(path).await {
            Ok(attrs) => Ok(Some(kind_of(
                attrs.is_dir(),
                attrs.is_regular(),
                attrs.is_symlink(),
            ))),
            Err(e) => {
                let err = TransportError::from(e);
                if err.is_not_found() {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn list(&mut self, path: &str) -> TransportResult<Vec<DirEntry>> {
        let entries = self.sftp.read_dir(path).await?;
        Ok(entries
            .filter(|entry| {
                let name = entry.file_name();
                name != "." && name != ".."
            })
            .map(|entry| {
                let file_type = entry.file_type();
                DirEntry {
                    name: entry.file_name(),
                    kind: kind_of(file_type.is_dir(), file_type.is_file(), file_type.is_symlink()),
                    size: entry.metadata().size,
                }
            })
            .collect())
    }

    async fn get(
        &mut self,
        remote: &str,
        local: &Path,
        progress: ByteProgress<'_>,
    ) -> TransportResult<u64> {
        let total = self.sftp.metadata(remote).await?.size.unwrap_or(0);
        let mut source = self.sftp.open(remote).await?;
        let mut target = tokio::fs::File::create(local).await?;

        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut transferred = 0u64;
        progress(0, total);
        loop {
            let n = source.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            target.write_all(&buffer[..n]).await?;
            transferred += n as u64;
            progress(transferred, total);
        }
        target.flush().await?;
        source.shutdown().await?;

        tracing::debug!("Downloaded {} ({} bytes)", remote, transferred);
        Ok(transferred)
    }

    async fn put(
        &mut self,
        local: &Path,
        remote: &str,
        progress: ByteProgress<'_>,
    ) -> TransportResult<u64> {
        let mut source = tokio::fs::File::open(local).await?;
        let total = source.metadata().await?.len();
        let mut target = self.sftp.create(remote).await?;

        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut transferred = 0u64;
        progress(0, total);
        loop {
            let n = source.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            target.write_all(&buffer[..n]).await?;
            transferred += n as u64;
            progress(transferred, total);
        }
        target.flush().await?;
        target.shutdown().await?;

        tracing::debug!("Uploaded {} ({} bytes)", remote, transferred);
        Ok(transferred)
    }

    async fn make_directory(&mut self, path: &str) -> TransportResult<()> {
        if let Err(e) = self.sftp.create_dir(path).await {
            // Lost a race or the directory was already there
            if self.stat(path).await? == Some(EntryKind::Directory) {
                return Ok(());
            }
            return Err(e.into());
        }
        Ok(())
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.sftp.close().await?;
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await?;
        tracing::debug!("Closed SFTP session with {}", self.host);
        Ok(())
    }
}
