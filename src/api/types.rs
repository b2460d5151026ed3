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

//! Job identifiers, job statuses and the status record returned by the platform.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use super::error::HandleError;

/// Identifies a submitted job by exactly one of its number or its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobHandle {
    Number(u64),
    Name(String),
}

impl JobHandle {
    /// Build a handle from the optional selectors a caller passes around.
    ///
    /// Exactly one selector must be present. Supplying neither, both, or an
    /// empty name is a caller error and is reported before any network call.
    pub fn from_parts(number: Option<u64>, name: Option<String>) -> Result<Self, HandleError> {
        match (number, name) {
            (Some(number), None) => Ok(Self::Number(number)),
            (None, Some(name)) => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(HandleError::EmptyName);
                }
                Ok(Self::Name(trimmed.to_string()))
            }
            (None, None) => Err(HandleError::Missing),
            (Some(number), Some(name)) => Err(HandleError::Ambiguous { number, name }),
        }
    }

    /// Query parameter pair identifying this job on the REST API.
    pub fn query_param(&self) -> (&'static str, String) {
        match self {
            Self::Number(number) => ("number", number.to_string()),
            Self::Name(name) => ("name", name.clone()),
        }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Job status as reported by the platform.
///
/// Values the client does not know are kept verbatim in `Unrecognized` and are
/// always treated as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Submitted,
    ProcessingStarting,
    Processing,
    Completed,
    CompletedWithError,
    Terminated,
    Canceled,
    Unrecognized(String),
}

impl JobStatus {
    /// Parse a wire status. Matching is case-insensitive and ignores
    /// surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "submitted" => Self::Submitted,
            "processing starting" => Self::ProcessingStarting,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "completed with error" => Self::CompletedWithError,
            "terminated" => Self::Terminated,
            "canceled" => Self::Canceled,
            _ => Self::Unrecognized(raw.to_string()),
        }
    }

    /// True for the closed set of states a job never leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::CompletedWithError | Self::Terminated | Self::Canceled
        )
    }
}

impl FromStr for JobStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Submitted => "SUBMITTED",
            Self::ProcessingStarting => "PROCESSING STARTING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::CompletedWithError => "COMPLETED WITH ERROR",
            Self::Terminated => "TERMINATED",
            Self::Canceled => "CANCELED",
            Self::Unrecognized(raw) => raw.as_str(),
        };
        f.write_str(text)
    }
}

/// One job's entry in a `/jarvice/status` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusRecord {
    pub job_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_walltime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_submit_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_end_time: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StatusRecord {
    pub fn status(&self) -> JobStatus {
        JobStatus::parse(&self.job_status)
    }
}

/// Platform credentials. The API key doubles as the vault password.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    apikey: Zeroizing<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, apikey: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            apikey: Zeroizing::new(apikey.into()),
        }
    }

    pub fn apikey(&self) -> &str {
        &self.apikey
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("apikey", &"<redacted>")
            .finish()
    }
}
