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

//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use jarvice::api::{ApiError, JobApi, JobHandle, JobStatus, StatusRecord};
use jarvice::poller::observer::PollObserver;
use jarvice::sftp::{
    ByteProgress, DirEntry, EntryKind, RemoteFs, TransportError, TransportResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Dir,
    File(Vec<u8>),
    Link(Vec<u8>),
    Special,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub nodes: BTreeMap<String, Node>,
    pub puts: Vec<String>,
    pub gets: Vec<String>,
    pub mkdirs: Vec<String>,
    pub close_calls: usize,
    pub fail_put: Option<String>,
    pub fail_get: Option<String>,
}

/// A vault held in memory. Clones share state, so a test keeps one clone
/// to inspect after the synchronizer has consumed the other.
#[derive(Debug, Clone, Default)]
pub struct FakeRemoteFs {
    state: Arc<Mutex<FakeState>>,
}

/// `./a/b/` and `a/b` name the same node; `.`, `/` and `` are the root.
pub fn normalize(path: &str) -> String {
    let mut s = path.trim_end_matches('/');
    while let Some(rest) = s.strip_prefix("./") {
        s = rest;
    }
    if s == "." {
        String::new()
    } else {
        s.to_string()
    }
}

fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl FakeRemoteFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(self, path: &str) -> Self {
        self.state.lock().unwrap().nodes.insert(normalize(path), Node::Dir);
        self
    }

    pub fn with_file(self, path: &str, contents: &[u8]) -> Self {
        self.state
            .lock()
            .unwrap()
            .nodes
            .insert(normalize(path), Node::File(contents.to_vec()));
        self
    }

    pub fn with_node(self, path: &str, node: Node) -> Self {
        self.state.lock().unwrap().nodes.insert(normalize(path), node);
        self
    }

    pub fn failing_put(self, path: &str) -> Self {
        self.state.lock().unwrap().fail_put = Some(normalize(path));
        self
    }

    pub fn failing_get(self, path: &str) -> Self {
        self.state.lock().unwrap().fail_get = Some(normalize(path));
        self
    }

    pub fn node(&self, path: &str) -> Option<Node> {
        self.state.lock().unwrap().nodes.get(&normalize(path)).cloned()
    }

    pub fn puts(&self) -> Vec<String> {
        self.state.lock().unwrap().puts.clone()
    }

    pub fn mkdirs(&self) -> Vec<String> {
        self.state.lock().unwrap().mkdirs.clone()
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }

    /// All nodes at or under `root`, keyed relative to it.
    pub fn snapshot(&self, root: &str) -> BTreeMap<String, Node> {
        let root = normalize(root);
        let prefix = if root.is_empty() {
            String::new()
        } else {
            format!("{root}/")
        };
        self.state
            .lock()
            .unwrap()
            .nodes
            .iter()
            .filter_map(|(path, node)| {
                path.strip_prefix(&prefix)
                    .map(|rel| (rel.to_string(), node.clone()))
            })
            .collect()
    }

    fn is_dir(state: &FakeState, path: &str) -> bool {
        path.is_empty() || state.nodes.get(path) == Some(&Node::Dir)
    }
}

#[async_trait]
impl RemoteFs for FakeRemoteFs {
    async fn stat(&mut self, path: &str) -> TransportResult<Option<EntryKind>> {
        let path = normalize(path);
        let state = self.state.lock().unwrap();
        if path.is_empty() {
            return Ok(Some(EntryKind::Directory));
        }
        Ok(state.nodes.get(&path).map(|node| match node {
            Node::Dir => EntryKind::Directory,
            Node::File(_) | Node::Link(_) => EntryKind::File,
            Node::Special => EntryKind::Other,
        }))
    }

    async fn list(&mut self, path: &str) -> TransportResult<Vec<DirEntry>> {
        let path = normalize(path);
        let state = self.state.lock().unwrap();
        if !Self::is_dir(&state, &path) {
            return Err(TransportError::NotFound(path));
        }
        Ok(state
            .nodes
            .iter()
            .filter(|(p, _)| parent_of(p) == path)
            .map(|(p, node)| DirEntry {
                name: name_of(p).to_string(),
                kind: match node {
                    Node::Dir => EntryKind::Directory,
                    Node::File(_) => EntryKind::File,
                    Node::Link(_) => EntryKind::Symlink,
                    Node::Special => EntryKind::Other,
                },
                size: match node {
                    Node::File(data) | Node::Link(data) => Some(data.len() as u64),
                    _ => None,
                },
            })
            .rev()
            .collect())
    }

    async fn get(
        &mut self,
        remote: &str,
        local: &Path,
        progress: ByteProgress<'_>,
    ) -> TransportResult<u64> {
        let remote = normalize(remote);
        let data = {
            let mut state = self.state.lock().unwrap();
            if state.fail_get.as_deref() == Some(remote.as_str()) {
                return Err(TransportError::other("connection reset"));
            }
            match state.nodes.get(&remote) {
                Some(Node::File(data)) | Some(Node::Link(data)) => {
                    let data = data.clone();
                    state.gets.push(remote.clone());
                    data
                }
                _ => return Err(TransportError::NotFound(remote)),
            }
        };
        let total = data.len() as u64;
        progress(0, total);
        tokio::fs::write(local, &data).await?;
        progress(total, total);
        Ok(total)
    }

    async fn put(
        &mut self,
        local: &Path,
        remote: &str,
        progress: ByteProgress<'_>,
    ) -> TransportResult<u64> {
        let remote = normalize(remote);
        let data = tokio::fs::read(local).await?;
        let total = data.len() as u64;
        progress(0, total);

        let mut state = self.state.lock().unwrap();
        if state.fail_put.as_deref() == Some(remote.as_str()) {
            return Err(TransportError::other("disk quota exceeded"));
        }
        if !Self::is_dir(&state, &parent_of(&remote)) {
            return Err(TransportError::NotFound(parent_of(&remote)));
        }
        if state.nodes.get(&remote) == Some(&Node::Dir) {
            return Err(TransportError::other(format!("{remote} is a directory")));
        }
        state.nodes.insert(remote.clone(), Node::File(data));
        state.puts.push(remote);
        drop(state);

        progress(total, total);
        Ok(total)
    }

    async fn make_directory(&mut self, path: &str) -> TransportResult<()> {
        let path = normalize(path);
        let mut state = self.state.lock().unwrap();
        if Self::is_dir(&state, &path) {
            return Ok(());
        }
        if !Self::is_dir(&state, &parent_of(&path)) {
            return Err(TransportError::NotFound(parent_of(&path)));
        }
        if state.nodes.contains_key(&path) {
            return Err(TransportError::other(format!("{path} exists")));
        }
        state.nodes.insert(path.clone(), Node::Dir);
        state.mkdirs.push(path);
        Ok(())
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.state.lock().unwrap().close_calls += 1;
        Ok(())
    }
}

/// Replays a fixed list of status answers, repeating the last one.
#[derive(Clone)]
pub struct ScriptedApi {
    answers: Arc<Mutex<VecDeque<Result<String, ApiError>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedApi {
    pub fn new<S: AsRef<str>>(statuses: &[S]) -> Self {
        Self::with_answers(
            statuses
                .iter()
                .map(|s| Ok(s.as_ref().to_string()))
                .collect(),
        )
    }

    pub fn with_answers(answers: Vec<Result<String, ApiError>>) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.into())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobApi for ScriptedApi {
    async fn query_status(&self, _handle: &JobHandle) -> Result<StatusRecord, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = {
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                answers.pop_front()
            } else {
                answers.front().cloned()
            }
        };
        match answer {
            Some(Ok(status)) => Ok(serde_json::from_value(serde_json::json!({
                "job_status": status,
            }))
            .unwrap()),
            Some(Err(e)) => Err(e),
            None => Err(ApiError::message("no scripted answer")),
        }
    }
}

/// Records every observer callback.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub ticks: Mutex<Vec<JobStatus>>,
    pub finished: Mutex<Vec<(String, JobStatus, u64)>>,
}

impl RecordingObserver {
    pub fn tick_count(&self) -> usize {
        self.ticks.lock().unwrap().len()
    }

    pub fn finished(&self) -> Vec<(String, JobStatus, u64)> {
        self.finished.lock().unwrap().clone()
    }
}

impl PollObserver for RecordingObserver {
    fn on_tick(&self, _handle: &JobHandle, status: &JobStatus) {
        self.ticks.lock().unwrap().push(status.clone());
    }

    fn on_finished(&self, handle: &JobHandle, status: &JobStatus, ticks: u64) {
        self.finished
            .lock()
            .unwrap()
            .push((handle.to_string(), status.clone(), ticks));
    }
}

/// Write `contents` at `root/rel`, creating parents.
pub fn write_file(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Local tree under `root` as relative path -> `None` (directory) or contents.
pub fn local_snapshot(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    let mut out = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            let rel = path
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            let file_type = entry.file_type().unwrap();
            if file_type.is_dir() {
                out.insert(rel, None);
                pending.push(path);
            } else if file_type.is_file() {
                out.insert(rel, Some(std::fs::read(&path).unwrap()));
            }
        }
    }
    out
}
