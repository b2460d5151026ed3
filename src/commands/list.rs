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

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::VaultParams;
use crate::sftp::{DirEntry, DirectorySync, EntryKind};
use crate::utils::fs::format_bytes;

pub async fn list_remote(params: &VaultParams, remote: &str) -> Result<()> {
    let session = params.connect().await?;
    let entries = DirectorySync::new(session)
        .ls(remote)
        .await
        .with_context(|| format!("Failed to list {remote}"))?;

    if entries.is_empty() {
        println!("{}", "(empty)".dimmed());
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn format_entry(entry: &DirEntry) -> String {
    match entry.kind {
        EntryKind::Directory => format!("{}/", entry.name.blue().bold()),
        EntryKind::Symlink => format!("{}@", entry.name.cyan()),
        _ => match entry.size {
            Some(size) => format!("{}  {}", entry.name, format_bytes(size).dimmed()),
            None => entry.name.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_entry_contains_name() {
        let file = DirEntry {
            name: "out.log".to_string(),
            kind: EntryKind::File,
            size: Some(2048),
        };
        let rendered = format_entry(&file);
        assert!(rendered.contains("out.log"));
        assert!(rendered.contains("2.00 KB"));

        let dir = DirEntry {
            name: "results".to_string(),
            kind: EntryKind::Directory,
            size: None,
        };
        assert!(format_entry(&dir).ends_with('/'));
    }
}
