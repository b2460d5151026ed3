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

mod common;

use httpmock::prelude::*;
use httpmock::MockServer;

use common::RecordingObserver;
use jarvice::api::{Credentials, JarviceClient, JobStatus};
use jarvice::poller::{JobPoller, WaitError};

fn client_for(server: &MockServer) -> JarviceClient {
    let base = server.base_url().parse().unwrap();
    JarviceClient::new(base, Credentials::new("alice", "key123")).unwrap()
}

#[tokio::test]
async fn test_wait_for_finished_job_over_http() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/jarvice/status")
                .query_param("name", "alice-sim-7")
                .query_param("username", "alice");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "7": {"job_status": "COMPLETED WITH ERROR", "job_name": "alice-sim-7"}
                }));
        })
        .await;

    let poller = JobPoller::new(client_for(&server)).with_observer(RecordingObserver::default());
    let status = poller
        .wait_for_parts(None, Some("alice-sim-7".to_string()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(status, JobStatus::CompletedWithError);
    assert_eq!(poller.observer().tick_count(), 0);
}

#[tokio::test]
async fn test_wait_surfaces_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/jarvice/status");
            then.status(401).body("invalid credentials");
        })
        .await;

    let poller = JobPoller::new(client_for(&server)).with_observer(RecordingObserver::default());
    let err = poller.wait_for_parts(Some(7), None).await.unwrap_err();

    match err {
        WaitError::Query { source, .. } => assert_eq!(source.code, Some(401)),
        other => panic!("unexpected error: {other:?}"),
    }
}
