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

//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Expand tilde (~) in path to home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok();
    expand_tilde_with(path, home.as_deref())
}

pub(crate) fn expand_tilde_with(path: &Path, home: Option<&str>) -> PathBuf {
    match (path.to_str(), home) {
        (Some("~"), Some(home)) => PathBuf::from(home),
        (Some(s), Some(home)) if s.starts_with("~/") => PathBuf::from(home).join(&s[2..]),
        _ => path.to_path_buf(),
    }
}
