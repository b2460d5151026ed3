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

//! Configuration loading and priority management.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::types::Config;
use super::utils::expand_tilde;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/jarvice/config.yaml";
const LOCAL_CONFIG_FILE: &str = "jarvice.yaml";

impl Config {
    /// Load configuration from a file. A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_tilde(path);

        if !expanded_path.exists() {
            tracing::debug!(
                "Config file not found at {:?}, using defaults",
                expanded_path
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&expanded_path)
            .await
            .with_context(|| format!("Failed to read configuration file at {}. Please check file permissions and ensure the file is accessible.", expanded_path.display()))?;

        Self::parse(&content).with_context(|| {
            format!(
                "Failed to parse YAML configuration file at {}",
                expanded_path.display()
            )
        })
    }

    /// Parse YAML text. An empty document is the default configuration.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Invalid configuration YAML")
    }

    /// Load configuration with priority order:
    /// 1. Explicit --config path (if exists and different from default)
    /// 2. `./jarvice.yaml`
    /// 3. `$XDG_CONFIG_HOME/jarvice/config.yaml` or the platform config dir
    /// 4. Default path (~/.config/jarvice/config.yaml)
    pub async fn load_with_priority(cli_config_path: &Path) -> Result<Self> {
        let expanded_cli_path = expand_tilde(cli_config_path);
        let expanded_default_path = expand_tilde(Path::new(DEFAULT_CONFIG_PATH));

        let is_custom_config = expanded_cli_path != expanded_default_path;

        if is_custom_config && expanded_cli_path.exists() {
            tracing::debug!(
                "Using explicitly specified config file: {:?}",
                expanded_cli_path
            );
            return Self::load(&expanded_cli_path).await;
        } else if is_custom_config {
            tracing::debug!(
                "Custom config file not found, continuing with other sources: {:?}",
                expanded_cli_path
            );
        }

        for candidate in Self::standard_locations() {
            if candidate.exists() {
                tracing::debug!("Found config at {:?}", candidate);
                return Self::load(&candidate).await;
            }
        }

        tracing::debug!("No config file found, using default empty configuration");
        Self::load(&expanded_default_path).await
    }

    fn standard_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];

        if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
            locations.push(
                PathBuf::from(xdg_config_home)
                    .join("jarvice")
                    .join("config.yaml"),
            );
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", "jarvice") {
            locations.push(proj_dirs.config_dir().join("config.yaml"));
        }
        locations
    }

    /// Save the configuration to a file.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let expanded_path = expand_tilde(path);

        if let Some(parent) = expanded_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {parent:?}"))?;
        }

        let yaml =
            serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")?;

        fs::write(&expanded_path, yaml)
            .await
            .with_context(|| format!("Failed to write configuration to {expanded_path:?}"))?;

        Ok(())
    }
}
