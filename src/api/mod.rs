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

//! JARVICE job API: data types, the [`JobApi`] seam used by the job poller,
//! and the reqwest-backed [`JarviceClient`].

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;

pub use client::{JarviceClient, SweepReport, DEFAULT_API_URL};
pub use error::{ApiError, HandleError};
pub use types::{Credentials, JobHandle, JobStatus, StatusRecord};

/// Status lookup consumed by the job poller.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Fetch the current status record for one job.
    async fn query_status(&self, handle: &JobHandle) -> Result<StatusRecord, ApiError>;
}
