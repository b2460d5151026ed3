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

//! Per-file transfer progress.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};

/// Sampled progress readout: `(filename, bytes_so_far, total_bytes)`.
///
/// Called many times for one file. `total_bytes` may be zero.
pub type ProgressCallback = Arc<dyn Fn(&str, u64, u64) + Send + Sync>;

/// Completion percentage, 0 when `total` is 0 and never above 100.
pub fn percent(current: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (current as u128 * 100) / total as u128;
    pct.min(100) as u8
}

/// One-line textual readout, e.g. `data.bin 50 % (512 B of 1024 B)`.
pub fn format_status(filename: &str, current: u64, total: u64) -> String {
    format!(
        "{filename} {} % ({current} B of {total} B)",
        percent(current, total)
    )
}

fn create_transfer_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg:30!} [{bar:30.cyan/blue}] {percent:>3}% {bytes}/{total_bytes}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Renders transfer progress as an indicatif bar on stderr.
///
/// One bar is reused for every file; it is reset whenever the reported
/// filename changes.
#[derive(Clone)]
pub struct ProgressRenderer {
    bar: ProgressBar,
    current_file: Arc<Mutex<Option<String>>>,
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target);
        bar.set_style(create_transfer_style());
        Self {
            bar,
            current_file: Arc::new(Mutex::new(None)),
        }
    }

    /// Feed one progress sample.
    pub fn update(&self, filename: &str, current: u64, total: u64) {
        if let Ok(mut file) = self.current_file.lock() {
            if file.as_deref() != Some(filename) {
                *file = Some(filename.to_string());
                self.bar.reset();
                self.bar.set_message(filename.to_string());
            }
        }
        self.bar.set_length(total);
        self.bar.set_position(current.min(total));
    }

    /// Callback suitable for [`super::DirectorySync::with_progress`].
    pub fn callback(&self) -> ProgressCallback {
        let renderer = self.clone();
        Arc::new(move |filename, current, total| renderer.update(filename, current, total))
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Name of the file the bar currently tracks.
    pub fn current_file(&self) -> Option<String> {
        self.current_file.lock().ok().and_then(|f| f.clone())
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_zero_total() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(12345, 0), 0);
        assert_eq!(percent(u64::MAX, 0), 0);
    }

    #[test]
    fn test_percent_bounds() {
        assert_eq!(percent(0, 1024), 0);
        assert_eq!(percent(512, 1024), 50);
        assert_eq!(percent(1024, 1024), 100);
        assert_eq!(percent(4096, 1024), 100);
        assert_eq!(percent(u64::MAX, u64::MAX), 100);
    }

    #[test]
    fn test_format_status() {
        assert_eq!(
            format_status("data.bin", 512, 1024),
            "data.bin 50 % (512 B of 1024 B)"
        );
        assert_eq!(format_status("empty", 0, 0), "empty 0 % (0 B of 0 B)");
    }

    #[test]
    fn test_renderer_tracks_files() {
        let renderer = ProgressRenderer::hidden();
        let cb = renderer.callback();

        cb("a.txt", 10, 100);
        assert_eq!(renderer.current_file().as_deref(), Some("a.txt"));
        assert_eq!(renderer.position(), 10);

        cb("b.txt", 0, 0);
        assert_eq!(renderer.current_file().as_deref(), Some("b.txt"));
        assert_eq!(renderer.position(), 0);
        renderer.finish();
    }
}
