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

use super::upload::print_report;
use super::VaultParams;
use crate::sftp::{DirectorySync, ProgressRenderer, TransferReport};

pub async fn download_path(
    params: &VaultParams,
    remote: &str,
    local: Option<&Path>,
    overwrite: bool,
) -> Result<TransferReport> {
    println!(
        "\n{} {} {} {} {} {}\n",
        "▶".cyan(),
        "Downloading".cyan().bold(),
        remote.green(),
        "from".dimmed(),
        params.host.green(),
        "(SFTP)".dimmed()
    );

    let session = params.connect().await?;
    let progress = ProgressRenderer::new();
    let result = DirectorySync::new(session)
        .with_progress(progress.callback())
        .download(remote, local, overwrite)
        .await;
    progress.finish();

    let report = result.with_context(|| format!("Download of {remote} failed"))?;
    let destination = report.plan.local().display().to_string();
    print_report(&report, "Downloaded", &destination);
    Ok(report)
}
