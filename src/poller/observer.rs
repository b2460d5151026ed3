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

//! Progress reporting for the job poller.

use std::io::Write;
use std::sync::Mutex;

use crate::api::{JobHandle, JobStatus};

/// Receives the poller's progress.
///
/// `on_tick` fires once per non-terminal poll; `on_finished` fires exactly
/// once, when a terminal status is observed.
pub trait PollObserver: Send + Sync {
    fn on_tick(&self, handle: &JobHandle, status: &JobStatus);

    fn on_finished(&self, handle: &JobHandle, status: &JobStatus, ticks: u64);
}

/// Writes a dot per tick and one final status line to a stream.
#[derive(Debug)]
pub struct StreamObserver<W> {
    out: Mutex<W>,
}

/// Observer used by the CLI.
pub type ConsoleObserver = StreamObserver<std::io::Stdout>;

impl<W: Write + Send> StreamObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> PollObserver for StreamObserver<W> {
    fn on_tick(&self, _handle: &JobHandle, _status: &JobStatus) {
        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(b".");
            let _ = out.flush();
        }
    }

    fn on_finished(&self, handle: &JobHandle, status: &JobStatus, ticks: u64) {
        if let Ok(mut out) = self.out.lock() {
            if ticks > 0 {
                // terminate the row of dots
                let _ = out.write_all(b"\n");
            }
            let _ = writeln!(out, "Job {handle} ended with Status: {status}");
            let _ = out.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_observer_output() {
        let observer = StreamObserver::new(Vec::new());
        let handle = JobHandle::Number(9);
        observer.on_tick(&handle, &JobStatus::Submitted);
        observer.on_tick(&handle, &JobStatus::Processing);
        observer.on_finished(&handle, &JobStatus::Completed, 2);

        let text = String::from_utf8(observer.into_inner()).unwrap();
        assert_eq!(text, "..\nJob 9 ended with Status: COMPLETED\n");
    }

    #[test]
    fn test_no_blank_line_without_ticks() {
        let observer = StreamObserver::new(Vec::new());
        observer.on_finished(
            &JobHandle::Name("run-1".to_string()),
            &JobStatus::Canceled,
            0,
        );
        let text = String::from_utf8(observer.into_inner()).unwrap();
        assert_eq!(text, "Job run-1 ended with Status: CANCELED\n");
    }
}
