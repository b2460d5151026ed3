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

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use common::{RecordingObserver, ScriptedApi};
use jarvice::api::{ApiError, HandleError, JobHandle, JobStatus};
use jarvice::poller::{Backoff, JobPoller, PollOptions, WaitError};

fn poller(api: ScriptedApi) -> JobPoller<ScriptedApi, RecordingObserver> {
    JobPoller::new(api).with_observer(RecordingObserver::default())
}

#[tokio::test(start_paused = true)]
async fn test_terminal_status_returns_on_first_poll() {
    let cases = [
        ("COMPLETED", JobStatus::Completed),
        ("completed", JobStatus::Completed),
        ("Completed With Error", JobStatus::CompletedWithError),
        ("TERMINATED", JobStatus::Terminated),
        ("  canceled ", JobStatus::Canceled),
    ];

    for (raw, expected) in cases {
        let poller = poller(ScriptedApi::new(&[raw]));
        let status = poller.wait_for(&JobHandle::Number(7)).await.unwrap();

        assert_eq!(status, expected, "status {raw:?}");
        assert_eq!(poller.api().calls(), 1);
        assert_eq!(poller.observer().tick_count(), 0);
        assert_eq!(
            poller.observer().finished(),
            vec![("7".to_string(), expected, 0)]
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_non_terminal_polls_tick_once_each() {
    let api = ScriptedApi::new(&[
        "SUBMITTED",
        "PROCESSING STARTING",
        "PROCESSING",
        "QUEUED FOR MAINTENANCE",
        "COMPLETED",
    ]);
    let poller = poller(api);
    let started = Instant::now();

    let status = poller
        .wait_for(&JobHandle::Name("sim-42".to_string()))
        .await
        .unwrap();

    assert_eq!(status, JobStatus::Completed);
    assert_eq!(poller.api().calls(), 5);
    assert_eq!(poller.observer().tick_count(), 4);
    assert_eq!(
        poller.observer().ticks.lock().unwrap()[3],
        JobStatus::Unrecognized("QUEUED FOR MAINTENANCE".to_string())
    );
    assert_eq!(
        poller.observer().finished(),
        vec![("sim-42".to_string(), JobStatus::Completed, 4)]
    );
    // Four default-length sleeps between five polls
    assert_eq!(started.elapsed(), Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn test_missing_identifiers_fail_before_any_query() {
    let poller = poller(ScriptedApi::new(&["COMPLETED"]));

    let err = poller.wait_for_parts(None, None).await.unwrap_err();
    assert!(matches!(
        err,
        WaitError::InvalidArgument(HandleError::Missing)
    ));

    let err = poller
        .wait_for_parts(Some(1), Some("job".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WaitError::InvalidArgument(HandleError::Ambiguous { .. })
    ));

    let err = poller
        .wait_for_parts(None, Some("   ".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WaitError::InvalidArgument(HandleError::EmptyName)
    ));

    assert_eq!(poller.api().calls(), 0);
    assert!(poller.observer().finished().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_query_error_is_not_retried() {
    let api = ScriptedApi::with_answers(vec![
        Ok("PROCESSING".to_string()),
        Err(ApiError::status(404).with_message("no such job")),
    ]);
    let poller = poller(api);

    let err = poller.wait_for_parts(Some(99), None).await.unwrap_err();
    match err {
        WaitError::Query { job, source } => {
            assert_eq!(job, "99");
            assert_eq!(source.code, Some(404));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(poller.api().calls(), 2);
    assert!(poller.observer().finished().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_stops_polling() {
    let options = PollOptions {
        timeout: Some(Duration::from_secs(12)),
        ..PollOptions::default()
    };
    let poller = poller(ScriptedApi::new(&["PROCESSING"])).with_options(options);

    let err = poller.wait_for(&JobHandle::Number(3)).await.unwrap_err();
    match err {
        WaitError::Timeout {
            job,
            elapsed,
            last_status,
        } => {
            assert_eq!(job, "3");
            assert_eq!(elapsed, Duration::from_secs(12));
            assert_eq!(last_status, JobStatus::Processing);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // Polls at 0s, 5s, 10s and 12s
    assert_eq!(poller.api().calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_sleep() {
    let token = CancellationToken::new();
    token.cancel();
    let poller = poller(ScriptedApi::new(&["SUBMITTED"])).with_cancellation(token);

    let err = poller.wait_for(&JobHandle::Number(5)).await.unwrap_err();
    assert!(matches!(err, WaitError::Cancelled { ref job } if job == "5"));
    assert_eq!(poller.api().calls(), 1);
    assert_eq!(poller.observer().tick_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_grows_interval_up_to_cap() {
    let options = PollOptions {
        interval: Duration::from_secs(1),
        timeout: None,
        backoff: Some(Backoff {
            multiplier: 2.0,
            max_interval: Duration::from_secs(3),
        }),
    };
    let api = ScriptedApi::new(&["SUBMITTED", "PROCESSING", "PROCESSING", "PROCESSING", "TERMINATED"]);
    let poller = poller(api).with_options(options);
    let started = Instant::now();

    let status = poller.wait_for(&JobHandle::Number(1)).await.unwrap();

    assert_eq!(status, JobStatus::Terminated);
    // 1s + 2s + 3s + 3s
    assert_eq!(started.elapsed(), Duration::from_secs(9));
}
