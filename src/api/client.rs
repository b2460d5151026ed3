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

//! REST client for the JARVICE job API.
//!
//! Every call is stateless: the username and API key are attached to each
//! request (query parameters for GET endpoints, a `user` object for submit).

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, Url};
use serde_json::{json, Value};
use std::time::Duration;

use super::error::ApiError;
use super::types::{Credentials, JobHandle, StatusRecord};
use super::JobApi;

/// Default public API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.jarvice.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of a bulk terminate or shutdown sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub succeeded: Vec<(u64, Value)>,
    pub failed: Vec<(u64, ApiError)>,
}

#[derive(Debug, Clone)]
pub struct JarviceClient {
    http: Client,
    base_url: Url,
    credentials: Credentials,
}

impl JarviceClient {
    pub fn new(base_url: Url, credentials: Credentials) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::message(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(http, base_url, credentials))
    }

    pub fn with_http_client(http: Client, base_url: Url, credentials: Credentials) -> Self {
        Self {
            http,
            base_url,
            credentials,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Submit a job description (the JSON body the web portal generates).
    pub async fn submit(&self, job: Value) -> Result<Value, ApiError> {
        let body = with_credentials(job, &self.credentials);
        self.post("/jarvice/submit", body).await
    }

    pub async fn status(&self, handle: &JobHandle) -> Result<Value, ApiError> {
        self.get("/jarvice/status", vec![handle.query_param()]).await
    }

    pub async fn info(&self, handle: &JobHandle) -> Result<Value, ApiError> {
        self.get("/jarvice/info", vec![handle.query_param()]).await
    }

    pub async fn terminate(&self, handle: &JobHandle) -> Result<Value, ApiError> {
        self.get("/jarvice/terminate", vec![handle.query_param()]).await
    }

    pub async fn shutdown(&self, handle: &JobHandle) -> Result<Value, ApiError> {
        self.get("/jarvice/shutdown", vec![handle.query_param()]).await
    }

    pub async fn connect(&self, handle: &JobHandle) -> Result<Value, ApiError> {
        self.get("/jarvice/connect", vec![handle.query_param()]).await
    }

    /// Run an application-defined action against a running job.
    pub async fn action(&self, handle: &JobHandle, action: &str) -> Result<Value, ApiError> {
        self.get(
            "/jarvice/action",
            vec![handle.query_param(), ("action", action.to_string())],
        )
        .await
    }

    pub async fn jobs(&self, name: Option<&str>) -> Result<Value, ApiError> {
        self.get("/jarvice/jobs", name_filter(name)).await
    }

    pub async fn apps(&self, name: Option<&str>) -> Result<Value, ApiError> {
        self.get("/jarvice/apps", name_filter(name)).await
    }

    pub async fn machines(&self, name: Option<&str>) -> Result<Value, ApiError> {
        self.get("/jarvice/machines", name_filter(name)).await
    }

    /// Job output. Returned as a JSON string when the server answers in plain text.
    pub async fn output(&self, handle: &JobHandle, lines: Option<u32>) -> Result<Value, ApiError> {
        self.get("/jarvice/output", lines_params(handle, lines)).await
    }

    pub async fn tail(&self, handle: &JobHandle, lines: Option<u32>) -> Result<Value, ApiError> {
        self.get("/jarvice/tail", lines_params(handle, lines)).await
    }

    /// Terminate every job returned by the jobs endpoint.
    ///
    /// A failure on one job is recorded and the sweep continues.
    pub async fn terminate_all(&self, name: Option<&str>) -> Result<SweepReport, ApiError> {
        let mut report = SweepReport::default();
        for number in self.job_numbers(name).await? {
            match self.terminate(&JobHandle::Number(number)).await {
                Ok(result) => report.succeeded.push((number, result)),
                Err(e) => {
                    tracing::warn!("Failed to terminate job {}: {}", number, e);
                    report.failed.push((number, e));
                }
            }
        }
        Ok(report)
    }

    /// Shut down every job returned by the jobs endpoint.
    pub async fn shutdown_all(&self, name: Option<&str>) -> Result<SweepReport, ApiError> {
        let mut report = SweepReport::default();
        for number in self.job_numbers(name).await? {
            match self.shutdown(&JobHandle::Number(number)).await {
                Ok(result) => report.succeeded.push((number, result)),
                Err(e) => {
                    tracing::warn!("Failed to shut down job {}: {}", number, e);
                    report.failed.push((number, e));
                }
            }
        }
        Ok(report)
    }

    async fn job_numbers(&self, name: Option<&str>) -> Result<Vec<u64>, ApiError> {
        let jobs = self.jobs(name).await?;
        let Some(map) = jobs.as_object() else {
            return Ok(Vec::new());
        };

        let mut numbers = Vec::with_capacity(map.len());
        for key in map.keys() {
            match key.parse::<u64>() {
                Ok(number) => numbers.push(number),
                Err(_) => tracing::warn!("Ignoring job entry with non-numeric key '{}'", key),
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::message(format!("invalid endpoint {path}: {e}")))
    }

    async fn get(
        &self,
        path: &str,
        params: Vec<(&'static str, String)>,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;
        let mut query = vec![
            ("username", self.credentials.username.clone()),
            ("apikey", self.credentials.apikey().to_string()),
        ];
        query.extend(params);

        tracing::debug!("GET {}", url);
        let response = self.http.get(url).query(&query).send().await?;
        decode(path, response).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!("POST {}", url);
        let response = self.http.post(url).json(&body).send().await?;
        decode(path, response).await
    }
}

#[async_trait]
impl JobApi for JarviceClient {
    async fn query_status(&self, handle: &JobHandle) -> Result<StatusRecord, ApiError> {
        let body = self.status(handle).await?;
        parse_status_body(body)
    }
}

/// Pick the single job record out of a status response, which is an object
/// keyed by job number.
pub fn parse_status_body(body: Value) -> Result<StatusRecord, ApiError> {
    let Value::Object(map) = body else {
        return Err(ApiError::message("status response is not a JSON object"));
    };
    let Some((_, record)) = map.into_iter().next() else {
        return Err(ApiError::message("status response contains no job"));
    };
    serde_json::from_value(record)
        .map_err(|e| ApiError::message(format!("malformed status record: {e}")))
}

/// Attach credentials to a submit body unless the caller already supplied them.
pub fn with_credentials(mut job: Value, credentials: &Credentials) -> Value {
    if let Value::Object(map) = &mut job {
        if !map.contains_key("user") {
            map.insert(
                "user".to_string(),
                json!({
                    "username": credentials.username,
                    "apikey": credentials.apikey(),
                }),
            );
        }
    }
    job
}

fn name_filter(name: Option<&str>) -> Vec<(&'static str, String)> {
    name.map(|n| vec![("name", n.to_string())]).unwrap_or_default()
}

fn lines_params(handle: &JobHandle, lines: Option<u32>) -> Vec<(&'static str, String)> {
    let mut params = vec![handle.query_param()];
    if let Some(lines) = lines {
        params.push(("lines", lines.to_string()));
    }
    params
}

async fn decode(path: &str, response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or("").trim().to_lowercase())
        .unwrap_or_default();
    let text = response.text().await?;

    if status.as_u16() >= 300 {
        tracing::error!("Failure to retrieve API data: {} (status {})", path, status);
        let error = ApiError::status(status.as_u16());
        let detail = text.trim();
        return Err(if detail.is_empty() {
            error
        } else {
            error.with_message(detail)
        });
    }

    match content_type.as_str() {
        "application/json" => serde_json::from_str(&text)
            .map_err(|e| ApiError::message(format!("invalid JSON from {path}: {e}"))),
        "text/plain" => Ok(Value::String(text)),
        other => {
            tracing::error!("Unknown content type ({})", other);
            Err(ApiError::message(format!("Unknown content type ({other})")))
        }
    }
}
