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
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::api::{JobApi, JobStatus};
use crate::cli::JobSelector;
use crate::poller::{JobPoller, PollOptions};

/// Poll settings from the `wait` flags. A zero interval falls back to
/// `default_interval`.
pub fn poll_options(
    interval_secs: Option<u64>,
    timeout_secs: Option<u64>,
    default_interval: Duration,
) -> PollOptions {
    PollOptions {
        interval: interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(default_interval),
        timeout: timeout_secs.map(Duration::from_secs),
        backoff: None,
    }
}

/// Block until the selected job ends. Ctrl-C stops waiting.
pub async fn wait_for_job<A: JobApi>(
    api: A,
    job: &JobSelector,
    options: PollOptions,
) -> Result<JobStatus> {
    let token = CancellationToken::new();
    let interrupt = token.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let poller = JobPoller::new(api)
        .with_options(options)
        .with_cancellation(token);
    let result = poller.wait_for_parts(job.number, job.name.clone()).await;
    ctrl_c.abort();

    result.context("Waiting for job failed")
}
