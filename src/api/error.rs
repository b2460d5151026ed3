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

//! Error types for the job API.

use thiserror::Error;

/// Error payload returned by the job API collaborator.
///
/// Mirrors the platform's `{"error": {"code": ..., "message": ...}}` object.
/// Transport failures that never produced an HTTP response carry no code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", self.describe())]
pub struct ApiError {
    pub code: Option<u16>,
    pub message: Option<String>,
}

impl ApiError {
    pub fn status(code: u16) -> Self {
        Self {
            code: Some(code),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: Some(message.into()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn describe(&self) -> String {
        match (self.code, self.message.as_deref()) {
            (Some(code), Some(message)) => format!("API error {code}: {message}"),
            (Some(code), None) => format!("API error {code}"),
            (None, Some(message)) => format!("API error: {message}"),
            (None, None) => "API error".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            code: e.status().map(|s| s.as_u16()),
            message: Some(e.to_string()),
        }
    }
}

/// Job selector validation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("job number or name is required")]
    Missing,

    #[error("job number ({number}) and name ('{name}') are mutually exclusive")]
    Ambiguous { number: u64, name: String },

    #[error("job name cannot be empty")]
    EmptyName,
}
