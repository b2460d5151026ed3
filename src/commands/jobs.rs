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
use serde_json::Value;
use std::path::Path;

use crate::api::{JarviceClient, SweepReport};
use crate::cli::JobSelector;

/// Which per-job endpoint to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobQuery {
    Status,
    Info,
    Terminate,
    Shutdown,
    Connect,
}

/// Print an API result: plain text as-is, everything else as pretty JSON.
pub fn print_result(value: &Value) -> Result<()> {
    println!("{}", render_result(value)?);
    Ok(())
}

pub(crate) fn render_result(value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.trim_end_matches('\n').to_string()),
        other => serde_json::to_string_pretty(other).context("Failed to render API response"),
    }
}

pub async fn submit_job(client: &JarviceClient, file: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read job description {}", file.display()))?;
    let job: Value = serde_json::from_str(&content)
        .with_context(|| format!("Job description {} is not valid JSON", file.display()))?;

    let response = client.submit(job).await.context("Job submission failed")?;
    print_result(&response)
}

pub async fn query_job(client: &JarviceClient, query: JobQuery, job: &JobSelector) -> Result<()> {
    let handle = job.handle()?;
    let response = match query {
        JobQuery::Status => client.status(&handle).await,
        JobQuery::Info => client.info(&handle).await,
        JobQuery::Terminate => client.terminate(&handle).await,
        JobQuery::Shutdown => client.shutdown(&handle).await,
        JobQuery::Connect => client.connect(&handle).await,
    }
    .with_context(|| format!("Request for job {handle} failed"))?;
    print_result(&response)
}

pub async fn job_action(client: &JarviceClient, job: &JobSelector, action: &str) -> Result<()> {
    let handle = job.handle()?;
    let response = client
        .action(&handle, action)
        .await
        .with_context(|| format!("Action '{action}' on job {handle} failed"))?;
    print_result(&response)
}

/// `output` or `tail` of a job.
pub async fn job_output(
    client: &JarviceClient,
    job: &JobSelector,
    lines: Option<u32>,
    tail: bool,
) -> Result<()> {
    let handle = job.handle()?;
    let response = if tail {
        client.tail(&handle, lines).await
    } else {
        client.output(&handle, lines).await
    }
    .with_context(|| format!("Failed to fetch output of job {handle}"))?;
    print_result(&response)
}

/// Which catalog endpoint to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Jobs,
    Apps,
    Machines,
}

pub async fn list_catalog(client: &JarviceClient, listing: Listing, name: Option<&str>) -> Result<()> {
    let response = match listing {
        Listing::Jobs => client.jobs(name).await,
        Listing::Apps => client.apps(name).await,
        Listing::Machines => client.machines(name).await,
    }
    .context("Listing request failed")?;
    print_result(&response)
}

/// Terminate (or shut down) every current job and summarize.
pub async fn sweep_jobs(client: &JarviceClient, terminate: bool) -> Result<()> {
    let (report, verb) = if terminate {
        (client.terminate_all(None).await, "Terminated")
    } else {
        (client.shutdown_all(None).await, "Shut down")
    };
    let report = report.context("Failed to list current jobs")?;
    print_sweep(&report, verb);

    if !report.failed.is_empty() {
        anyhow::bail!("{} of {} job(s) failed", report.failed.len(), report.failed.len() + report.succeeded.len());
    }
    Ok(())
}

fn print_sweep(report: &SweepReport, verb: &str) {
    if report.succeeded.is_empty() && report.failed.is_empty() {
        println!("{}", "No current jobs".dimmed());
        return;
    }

    for (number, _) in &report.succeeded {
        println!("  {} {} job {}", "✓".green(), verb, number.to_string().bold());
    }
    for (number, error) in &report.failed {
        eprintln!("  {} job {}: {}", "✗".red(), number.to_string().bold(), error);
    }
}
