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

//! Blocking wait for a job to reach a terminal state.
//!
//! The poller queries the job API at a fixed interval (5 seconds unless
//! configured otherwise) until the job reports one of the terminal statuses:
//! completed, completed with error, terminated or canceled. Any other status,
//! including ones this client has never seen, keeps the loop going.
//!
//! A failed status query ends the wait immediately. It is not retried, since it
//! usually means the job or the credentials are invalid.
//!
//! Beyond the plain loop the poller supports an overall timeout, cooperative
//! cancellation through a [`CancellationToken`], and an optional multiplicative
//! backoff. All three are off by default.

pub mod observer;

use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, HandleError, JobApi, JobHandle, JobStatus};

pub use observer::{ConsoleObserver, PollObserver, StreamObserver};

/// Interval between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] HandleError),

    #[error("could not query status of job {job}: {source}")]
    Query {
        job: String,
        #[source]
        source: ApiError,
    },

    #[error("timed out after {elapsed:?} waiting for job {job} (last status: {last_status})")]
    Timeout {
        job: String,
        elapsed: Duration,
        last_status: JobStatus,
    },

    #[error("wait for job {job} was cancelled")]
    Cancelled { job: String },
}

/// Growth of the poll interval between consecutive non-terminal polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub multiplier: f64,
    pub max_interval: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Option<Duration>,
    pub backoff: Option<Backoff>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            backoff: None,
        }
    }
}

impl PollOptions {
    fn next_interval(&self, current: Duration) -> Duration {
        match self.backoff {
            Some(backoff) if backoff.multiplier > 1.0 => {
                current.mul_f64(backoff.multiplier).min(backoff.max_interval)
            }
            _ => current,
        }
    }
}

pub struct JobPoller<A, O = ConsoleObserver> {
    api: A,
    observer: O,
    options: PollOptions,
    cancel: CancellationToken,
}

impl<A: JobApi> JobPoller<A, ConsoleObserver> {
    /// Poller that reports progress on stdout.
    pub fn new(api: A) -> Self {
        Self {
            api,
            observer: ConsoleObserver::default(),
            options: PollOptions::default(),
            cancel: CancellationToken::new(),
        }
    }
}

impl<A: JobApi, O: PollObserver> JobPoller<A, O> {
    pub fn with_observer<P: PollObserver>(self, observer: P) -> JobPoller<A, P> {
        JobPoller {
            api: self.api,
            observer,
            options: self.options,
            cancel: self.cancel,
        }
    }

    pub fn with_options(mut self, options: PollOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Validate the selectors, then wait. Fails with
    /// [`WaitError::InvalidArgument`] before any API call when the selectors
    /// do not name exactly one job.
    pub async fn wait_for_parts(
        &self,
        number: Option<u64>,
        name: Option<String>,
    ) -> Result<JobStatus, WaitError> {
        let handle = JobHandle::from_parts(number, name)?;
        self.wait_for(&handle).await
    }

    /// Poll until `handle` reaches a terminal status and return that status.
    pub async fn wait_for(&self, handle: &JobHandle) -> Result<JobStatus, WaitError> {
        let started = Instant::now();
        let mut interval = self.options.interval;
        let mut ticks: u64 = 0;

        loop {
            let record =
                self.api
                    .query_status(handle)
                    .await
                    .map_err(|source| WaitError::Query {
                        job: handle.to_string(),
                        source,
                    })?;
            let status = record.status();

            if status.is_terminal() {
                tracing::info!(
                    "Job {} reached terminal status {} after {} poll(s)",
                    handle,
                    status,
                    ticks + 1
                );
                self.observer.on_finished(handle, &status, ticks);
                return Ok(status);
            }

            if let JobStatus::Unrecognized(raw) = &status {
                tracing::debug!("Job {} reported unrecognized status '{}'", handle, raw);
            }

            self.observer.on_tick(handle, &status);
            ticks += 1;

            let mut sleep_for = interval;
            if let Some(timeout) = self.options.timeout {
                let elapsed = started.elapsed();
                if elapsed >= timeout {
                    return Err(WaitError::Timeout {
                        job: handle.to_string(),
                        elapsed,
                        last_status: status,
                    });
                }
                sleep_for = sleep_for.min(timeout - elapsed);
            }

            tracing::trace!("Job {} is {}, next poll in {:?}", handle, status, sleep_for);
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    return Err(WaitError::Cancelled { job: handle.to_string() });
                }
                _ = tokio::time::sleep(sleep_for) => {}
            }

            interval = self.options.next_interval(interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_poll_every_five_seconds() {
        let options = PollOptions::default();
        assert_eq!(options.interval, Duration::from_secs(5));
        assert_eq!(options.next_interval(options.interval), options.interval);
    }

    #[test]
    fn test_backoff_is_capped() {
        let options = PollOptions {
            backoff: Some(Backoff {
                multiplier: 2.0,
                max_interval: Duration::from_secs(12),
            }),
            ..PollOptions::default()
        };
        let second = options.next_interval(Duration::from_secs(5));
        assert_eq!(second, Duration::from_secs(10));
        assert_eq!(options.next_interval(second), Duration::from_secs(12));
    }
}
