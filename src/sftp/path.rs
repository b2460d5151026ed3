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

//! Helpers for `/`-separated remote paths.

/// Join a directory and an entry name.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() || dir == "." {
        format!("./{name}")
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Final component of `path`, ignoring trailing slashes.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Everything before the final component. `None` for a bare name or the root.
pub fn parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(&trimmed[..idx]),
        None => None,
    }
}

/// Every directory prefix of `path`, shortest first, skipping `.` and empty
/// components. Absolute paths keep their leading `/`.
pub fn prefixes(path: &str) -> Vec<String> {
    let absolute = path.starts_with('/');
    let mut current = String::new();
    let mut out = Vec::new();

    for component in path.split('/').filter(|c| !c.is_empty() && *c != ".") {
        if current.is_empty() {
            current = if absolute {
                format!("/{component}")
            } else {
                component.to_string()
            };
        } else {
            current.push('/');
            current.push_str(component);
        }
        out.push(current.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join("data", "a.txt"), "data/a.txt");
        assert_eq!(join("data/", "a.txt"), "data/a.txt");
        assert_eq!(join(".", "a.txt"), "./a.txt");
        assert_eq!(join("", "a.txt"), "./a.txt");
        assert_eq!(join("/", "a.txt"), "/a.txt");
    }

    #[test]
    fn test_basename_and_parent() {
        assert_eq!(basename("/data/run1/out.log"), "out.log");
        assert_eq!(basename("results/"), "results");
        assert_eq!(basename("file"), "file");
        assert_eq!(parent("/data/run1/out.log"), Some("/data/run1"));
        assert_eq!(parent("/top"), Some("/"));
        assert_eq!(parent("file"), None);
        assert_eq!(parent("./file"), Some("."));
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(prefixes("a/b/c"), vec!["a", "a/b", "a/b/c"]);
        assert_eq!(prefixes("/a/b"), vec!["/a", "/a/b"]);
        assert_eq!(prefixes("./a//b/"), vec!["a", "a/b"]);
        assert!(prefixes(".").is_empty());
        assert!(prefixes("/").is_empty());
    }
}
