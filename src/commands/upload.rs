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
use std::path::Path;

use super::VaultParams;
use crate::sftp::{DirectorySync, ProgressRenderer, TransferReport};
use crate::utils::fs::format_bytes;

pub async fn upload_path(
    params: &VaultParams,
    local: &Path,
    remote: Option<&str>,
    overwrite: bool,
) -> Result<TransferReport> {
    println!(
        "\n{} {} {} {} {} {}\n",
        "▶".cyan(),
        "Uploading".cyan().bold(),
        local.display(),
        "to".dimmed(),
        params.host.green(),
        "(SFTP)".dimmed()
    );

    let session = params.connect().await?;
    let progress = ProgressRenderer::new();
    let result = DirectorySync::new(session)
        .with_progress(progress.callback())
        .upload(local, remote, overwrite)
        .await;
    progress.finish();

    let report = result.with_context(|| format!("Upload of {} failed", local.display()))?;
    print_report(&report, "Uploaded", report.plan.remote());
    Ok(report)
}

/// Summary shared by uploads and downloads.
pub(crate) fn print_report(report: &TransferReport, verb: &str, destination: &str) {
    println!(
        "{} {} {} file(s) ({}) to {}",
        "✓".green(),
        verb.bold(),
        report.files_transferred.to_string().yellow(),
        format_bytes(report.bytes_transferred).yellow(),
        destination.green()
    );
    if report.directories_created > 0 {
        println!(
            "  {} {} director{} created",
            "•".dimmed(),
            report.directories_created,
            if report.directories_created == 1 { "y" } else { "ies" }
        );
    }
    for skipped in &report.skipped {
        eprintln!(
            "  {} skipped {}: {}",
            "!".yellow(),
            skipped.path,
            skipped.reason.dimmed()
        );
    }
}
