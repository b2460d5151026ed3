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

//! Directory-tree synchronization between a local tree and the vault.
//!
//! Every top-level call first resolves an immutable [`TransferPlan`], checks
//! the destination against the overwrite policy without mutating anything,
//! and only then moves bytes. Trees are walked with an explicit work stack.
//! The synchronizer owns its transport and closes it when the call returns,
//! whatever the outcome.

use std::io;
use std::path::{Path, PathBuf};

use super::error::{SyncError, SyncResult};
use super::fs::{DirEntry, EntryKind, RemoteEntry, RemoteFs};
use super::path;
use super::progress::ProgressCallback;

/// Resolved endpoints of one top-level transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    local: PathBuf,
    remote: String,
    is_directory: bool,
    overwrite: bool,
}

impl TransferPlan {
    /// Local file or local tree root.
    pub fn local(&self) -> &Path {
        &self.local
    }

    /// Remote file or remote tree root.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

/// An entry left out of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// Outcome of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub plan: TransferPlan,
    pub files_transferred: usize,
    pub directories_created: usize,
    pub bytes_transferred: u64,
    pub skipped: Vec<SkippedEntry>,
}

impl TransferReport {
    fn new(plan: TransferPlan) -> Self {
        Self {
            plan,
            files_transferred: 0,
            directories_created: 0,
            bytes_transferred: 0,
            skipped: Vec::new(),
        }
    }

    fn skip(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        let entry = SkippedEntry {
            path: path.into(),
            reason: reason.into(),
        };
        tracing::warn!("Skipping {}. {}", entry.path, entry.reason);
        self.skipped.push(entry);
    }
}

/// Mirrors trees between the local filesystem and a [`RemoteFs`].
pub struct DirectorySync<T: RemoteFs> {
    transport: T,
    progress: Option<ProgressCallback>,
}

impl<T: RemoteFs> DirectorySync<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            progress: None,
        }
    }

    /// Report per-file progress as `(filename, bytes_so_far, total_bytes)`.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Upload a local file or directory.
    ///
    /// A directory's contents land directly under the remote root, which
    /// defaults to the local path's parent. A file defaults to
    /// `./<basename>`.
    pub async fn upload(
        mut self,
        local_path: impl AsRef<Path>,
        remote_path: Option<&str>,
        overwrite: bool,
    ) -> SyncResult<TransferReport> {
        let result = self
            .run_upload(local_path.as_ref(), remote_path, overwrite)
            .await;
        self.close(result).await
    }

    /// Download a remote file or directory.
    ///
    /// A directory's contents land directly under the local root, which
    /// defaults to the remote path's basename. A file defaults to
    /// `./<basename>`.
    pub async fn download(
        mut self,
        remote_path: &str,
        local_path: Option<&Path>,
        overwrite: bool,
    ) -> SyncResult<TransferReport> {
        let result = self.run_download(remote_path, local_path, overwrite).await;
        self.close(result).await
    }

    /// Entries directly under `remote_path`, sorted by name.
    pub async fn ls(mut self, remote_path: &str) -> SyncResult<Vec<DirEntry>> {
        let result = self
            .transport
            .list(remote_path)
            .await
            .map(|mut entries| {
                entries.retain(|e| e.name != "." && e.name != "..");
                entries.sort_by(|a, b| a.name.cmp(&b.name));
                entries
            })
            .map_err(SyncError::remote(remote_path));
        self.close(result).await
    }

    async fn close<R>(mut self, result: SyncResult<R>) -> SyncResult<R> {
        if let Err(e) = self.transport.close().await {
            tracing::warn!("Failed to close transfer session: {}", e);
        }
        result
    }

    async fn run_upload(
        &mut self,
        local: &Path,
        remote: Option<&str>,
        overwrite: bool,
    ) -> SyncResult<TransferReport> {
        let plan = self.resolve_upload(local, remote, overwrite).await?;
        let mut report = TransferReport::new(plan.clone());

        if plan.is_directory {
            tracing::info!("Uploading directory {:?} to {}", plan.local, plan.remote);
            self.ensure_remote_path(&plan.remote, &mut report).await?;
            self.upload_tree(&plan.local, &plan.remote, &mut report).await?;
        } else {
            tracing::info!("Uploading {:?} to {}", plan.local, plan.remote);
            if let Some(parent) = path::parent(&plan.remote) {
                self.ensure_remote_path(parent, &mut report).await?;
            }
            self.put_file(&plan.local, &plan.remote, &mut report).await?;
        }
        Ok(report)
    }

    async fn resolve_upload(
        &mut self,
        local: &Path,
        remote: Option<&str>,
        overwrite: bool,
    ) -> SyncResult<TransferPlan> {
        let metadata = match tokio::fs::metadata(local).await {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SyncError::LocalNotFound(local.to_path_buf()));
            }
            Err(e) => return Err(SyncError::io(local)(e)),
        };

        if metadata.is_dir() {
            let root = match remote {
                Some(r) => r.to_string(),
                None => local_parent(local)?,
            };
            match self.remote_kind(&root).await? {
                None | Some(EntryKind::Directory) => {}
                Some(EntryKind::File) => {
                    return Err(SyncError::conflict(
                        root,
                        "a regular file cannot be replaced by a directory",
                    ));
                }
                Some(_) => {
                    return Err(SyncError::conflict(root, "remote path is not a recognized type"));
                }
            }
            return Ok(TransferPlan {
                local: local.to_path_buf(),
                remote: root,
                is_directory: true,
                overwrite,
            });
        }

        let name = local_basename(local)?;
        let target = match remote {
            Some(r) => r.to_string(),
            None => path::join(".", &name),
        };
        let destination = match self.remote_kind(&target).await? {
            None => target,
            Some(EntryKind::Directory) => path::join(&target, &name),
            Some(EntryKind::File) if overwrite => target,
            Some(EntryKind::File) => {
                return Err(SyncError::conflict(
                    target,
                    "remote file exists and overwrite is off",
                ));
            }
            Some(_) => {
                return Err(SyncError::conflict(target, "remote path is not a recognized type"));
            }
        };

        Ok(TransferPlan {
            local: local.to_path_buf(),
            remote: destination,
            is_directory: false,
            overwrite,
        })
    }

    async fn upload_tree(
        &mut self,
        local_root: &Path,
        remote_root: &str,
        report: &mut TransferReport,
    ) -> SyncResult<()> {
        let root_entries = read_local_dir(local_root, "")
            .await
            .map_err(SyncError::io(local_root))?;
        let mut pending = vec![(root_entries, remote_root.to_string())];

        while let Some((entries, remote_dir)) = pending.pop() {
            for (entry, local) in entries {
                let destination = path::join(&remote_dir, &entry.name);
                match entry.kind {
                    EntryKind::File => {
                        if let Err(e) = tokio::fs::File::open(&local).await {
                            report.skip(entry.path, format!("Path is not readable: {e}"));
                            continue;
                        }
                        self.put_file(&local, &destination, report).await?;
                    }
                    EntryKind::Directory => {
                        let children = match read_local_dir(&local, &entry.path).await {
                            Ok(children) => children,
                            Err(e) => {
                                report.skip(entry.path, format!("Path is not readable: {e}"));
                                continue;
                            }
                        };
                        self.ensure_remote_dir(&destination, report).await?;
                        pending.push((children, destination));
                    }
                    EntryKind::Symlink => {
                        report.skip(entry.path, "Symbolic links are not uploaded.");
                    }
                    EntryKind::Other => {
                        report.skip(entry.path, "Path is invalid type.");
                    }
                }
            }
        }
        Ok(())
    }

    async fn run_download(
        &mut self,
        remote: &str,
        local: Option<&Path>,
        overwrite: bool,
    ) -> SyncResult<TransferReport> {
        let plan = self.resolve_download(remote, local, overwrite).await?;
        let mut report = TransferReport::new(plan.clone());

        if plan.is_directory {
            tracing::info!("Downloading directory {} to {:?}", plan.remote, plan.local);
            ensure_local_dir(&plan.local, &mut report).await?;
            self.download_tree(&plan.remote, &plan.local, &mut report).await?;
        } else {
            tracing::info!("Downloading {} to {:?}", plan.remote, plan.local);
            if let Some(parent) = plan.local.parent().filter(|p| !p.as_os_str().is_empty()) {
                ensure_local_dir(parent, &mut report).await?;
            }
            self.get_file(&plan.remote, &plan.local, &mut report).await?;
        }
        Ok(report)
    }

    async fn resolve_download(
        &mut self,
        remote: &str,
        local: Option<&Path>,
        overwrite: bool,
    ) -> SyncResult<TransferPlan> {
        let kind = self
            .remote_kind(remote)
            .await?
            .ok_or_else(|| SyncError::RemoteNotFound(remote.to_string()))?;

        let name = path::basename(remote);
        match kind {
            EntryKind::Directory => {
                let root = match local {
                    Some(l) => l.to_path_buf(),
                    None if name.is_empty() => PathBuf::from("."),
                    None => PathBuf::from(name),
                };
                if let Ok(m) = tokio::fs::metadata(&root).await {
                    if !m.is_dir() {
                        return Err(SyncError::conflict(
                            root.display().to_string(),
                            "local path exists and is not a directory",
                        ));
                    }
                }
                Ok(TransferPlan {
                    local: root,
                    remote: remote.to_string(),
                    is_directory: true,
                    overwrite,
                })
            }
            EntryKind::File | EntryKind::Symlink => {
                if name.is_empty() {
                    return Err(SyncError::InvalidArgument(format!(
                        "cannot derive a file name from '{remote}'"
                    )));
                }
                let mut destination = match local {
                    Some(l) => l.to_path_buf(),
                    None => PathBuf::from(name),
                };
                if tokio::fs::metadata(&destination)
                    .await
                    .is_ok_and(|m| m.is_dir())
                {
                    destination = destination.join(name);
                }
                if let Ok(m) = tokio::fs::metadata(&destination).await {
                    if m.is_dir() {
                        return Err(SyncError::conflict(
                            destination.display().to_string(),
                            "a directory cannot be replaced by a file",
                        ));
                    }
                    if !overwrite {
                        return Err(SyncError::conflict(
                            destination.display().to_string(),
                            "local file exists and overwrite is off",
                        ));
                    }
                }
                Ok(TransferPlan {
                    local: destination,
                    remote: remote.to_string(),
                    is_directory: false,
                    overwrite,
                })
            }
            EntryKind::Other => Err(SyncError::UnknownEntryType {
                path: remote.to_string(),
            }),
        }
    }

    async fn download_tree(
        &mut self,
        remote_root: &str,
        local_root: &Path,
        report: &mut TransferReport,
    ) -> SyncResult<()> {
        let mut pending = vec![(
            remote_root.to_string(),
            local_root.to_path_buf(),
            String::new(),
        )];

        while let Some((remote_dir, local_dir, relative)) = pending.pop() {
            let listing = self
                .transport
                .list(&remote_dir)
                .await
                .map_err(SyncError::remote(remote_dir.as_str()))?;

            for entry in remote_entries(&relative, listing) {
                let source = path::join(&remote_dir, &entry.name);
                if !is_safe_name(&entry.name) {
                    report.skip(source, "Entry name is not a plain file name.");
                    continue;
                }
                let local = local_dir.join(&entry.name);
                match entry.kind {
                    EntryKind::Directory => {
                        tracing::debug!("Copying {} to {:?}", source, local);
                        ensure_local_dir(&local, report).await?;
                        pending.push((source, local, entry.path));
                    }
                    EntryKind::File | EntryKind::Symlink => {
                        self.get_file(&source, &local, report).await?;
                    }
                    EntryKind::Other => {
                        return Err(SyncError::UnknownEntryType { path: source });
                    }
                }
            }
        }
        Ok(())
    }

    async fn remote_kind(&mut self, remote: &str) -> SyncResult<Option<EntryKind>> {
        self.transport
            .stat(remote)
            .await
            .map_err(SyncError::remote(remote))
    }

    /// Create every missing component of `remote`, shortest prefix first.
    async fn ensure_remote_path(
        &mut self,
        remote: &str,
        report: &mut TransferReport,
    ) -> SyncResult<()> {
        for prefix in path::prefixes(remote) {
            self.ensure_remote_dir(&prefix, report).await?;
        }
        Ok(())
    }

    async fn ensure_remote_dir(
        &mut self,
        remote: &str,
        report: &mut TransferReport,
    ) -> SyncResult<()> {
        match self.remote_kind(remote).await? {
            Some(EntryKind::Directory) => Ok(()),
            Some(_) => Err(SyncError::conflict(
                remote,
                "path component exists and is not a directory",
            )),
            None => {
                self.transport
                    .make_directory(remote)
                    .await
                    .map_err(SyncError::remote(remote))?;
                report.directories_created += 1;
                tracing::debug!("Created remote directory {}", remote);
                Ok(())
            }
        }
    }

    async fn put_file(
        &mut self,
        local: &Path,
        remote: &str,
        report: &mut TransferReport,
    ) -> SyncResult<()> {
        let label = local
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| local.display().to_string());
        let progress = self.progress.clone();
        let mut sink = move |current: u64, total: u64| {
            if let Some(cb) = &progress {
                cb(&label, current, total);
            }
        };

        tracing::info!("Uploading {:?} to {}", local, remote);
        let bytes = self
            .transport
            .put(local, remote, &mut sink)
            .await
            .map_err(SyncError::transfer(remote))?;
        report.files_transferred += 1;
        report.bytes_transferred += bytes;
        Ok(())
    }

    async fn get_file(
        &mut self,
        remote: &str,
        local: &Path,
        report: &mut TransferReport,
    ) -> SyncResult<()> {
        let label = path::basename(remote).to_string();
        let progress = self.progress.clone();
        let mut sink = move |current: u64, total: u64| {
            if let Some(cb) = &progress {
                cb(&label, current, total);
            }
        };

        tracing::info!("Downloading {} to {:?}", remote, local);
        let bytes = self
            .transport
            .get(remote, local, &mut sink)
            .await
            .map_err(SyncError::transfer(remote))?;
        report.files_transferred += 1;
        report.bytes_transferred += bytes;
        Ok(())
    }
}

/// Plain local directory entry paired with its full path.
type LocalEntry = (RemoteEntry, PathBuf);

/// List `dir` without following symbolic links, sorted by name. Entry paths
/// are `relative` joined with the entry name. Entries with non UTF-8 names are
/// left out with a warning.
async fn read_local_dir(dir: &Path, relative: &str) -> io::Result<Vec<LocalEntry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let full = entry.path();
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!("Skipping {:?}. File name is not valid UTF-8.", full);
            continue;
        };
        let kind = EntryKind::from_file_type(entry.file_type().await?);
        entries.push((
            RemoteEntry {
                path: relative_join(relative, &name),
                name,
                kind,
            },
            full,
        ));
    }
    entries.sort_by(|a, b| a.0.name.cmp(&b.0.name));
    Ok(entries)
}

fn relative_join(relative: &str, name: &str) -> String {
    if relative.is_empty() {
        name.to_string()
    } else {
        format!("{relative}/{name}")
    }
}

fn remote_entries(relative: &str, listing: Vec<DirEntry>) -> Vec<RemoteEntry> {
    let mut entries: Vec<RemoteEntry> = listing
        .into_iter()
        .filter(|e| e.name != "." && e.name != "..")
        .map(|e| RemoteEntry {
            path: relative_join(relative, &e.name),
            name: e.name,
            kind: e.kind,
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

async fn ensure_local_dir(dir: &Path, report: &mut TransferReport) -> SyncResult<()> {
    match tokio::fs::metadata(dir).await {
        Ok(m) if m.is_dir() => Ok(()),
        Ok(_) => Err(SyncError::conflict(
            dir.display().to_string(),
            "local path exists and is not a directory",
        )),
        Err(_) => {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(SyncError::io(dir))?;
            report.directories_created += 1;
            Ok(())
        }
    }
}

/// Default remote root for a directory upload: the local path's parent,
/// `.` when it has none.
fn local_parent(local: &Path) -> SyncResult<String> {
    let parent = match local.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(".".to_string()),
    };
    parent
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| SyncError::InvalidArgument(format!("{parent:?} is not valid UTF-8")))
}

fn local_basename(local: &Path) -> SyncResult<String> {
    local
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            SyncError::InvalidArgument(format!("cannot derive a file name from {local:?}"))
        })
}
