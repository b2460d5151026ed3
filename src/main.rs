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

use anyhow::{Context, Result};
use clap::Parser;
use url::Url;

use jarvice::{
    api::JarviceClient,
    cli::{Cli, Commands},
    commands::{
        download::download_path,
        jobs::{job_action, job_output, list_catalog, query_job, submit_job, sweep_jobs, JobQuery, Listing},
        list::list_remote,
        upload::upload_path,
        wait::{poll_options, wait_for_job},
        VaultParams,
    },
    config::{Config, Overrides, Settings},
    utils::init_logging,
};

fn api_client(settings: &Settings) -> Result<JarviceClient> {
    let base_url = Url::parse(&settings.api_url)
        .with_context(|| format!("Invalid API URL: {}", settings.api_url))?;
    JarviceClient::new(base_url, settings.credentials()?).context("Failed to create API client")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load_with_priority(&cli.config).await?;
    let settings = config.resolve(&Overrides {
        username: cli.username.clone(),
        apikey: cli.apikey.clone(),
        api_url: cli.api_url.clone(),
        vault: cli.vault.clone(),
        strict_host_key_checking: cli.strict_host_key_checking,
    });
    tracing::debug!("Resolved settings: {:?}", settings);

    match &cli.command {
        Commands::Submit { file } => submit_job(&api_client(&settings)?, file).await,
        Commands::Status { job } => query_job(&api_client(&settings)?, JobQuery::Status, job).await,
        Commands::Info { job } => query_job(&api_client(&settings)?, JobQuery::Info, job).await,
        Commands::Terminate { job } => {
            query_job(&api_client(&settings)?, JobQuery::Terminate, job).await
        }
        Commands::Shutdown { job } => {
            query_job(&api_client(&settings)?, JobQuery::Shutdown, job).await
        }
        Commands::Connect { job } => {
            query_job(&api_client(&settings)?, JobQuery::Connect, job).await
        }
        Commands::Action { job, action } => job_action(&api_client(&settings)?, job, action).await,
        Commands::Output { job, lines } => {
            job_output(&api_client(&settings)?, job, *lines, false).await
        }
        Commands::Tail { job, lines } => job_output(&api_client(&settings)?, job, *lines, true).await,
        Commands::Jobs { name } => {
            list_catalog(&api_client(&settings)?, Listing::Jobs, name.as_deref()).await
        }
        Commands::Apps { name } => {
            list_catalog(&api_client(&settings)?, Listing::Apps, name.as_deref()).await
        }
        Commands::Machines { name } => {
            list_catalog(&api_client(&settings)?, Listing::Machines, name.as_deref()).await
        }
        Commands::TerminateAll => sweep_jobs(&api_client(&settings)?, true).await,
        Commands::ShutdownAll => sweep_jobs(&api_client(&settings)?, false).await,
        Commands::Wait {
            job,
            interval,
            timeout,
        } => {
            let options = poll_options(*interval, *timeout, settings.poll_interval);
            wait_for_job(api_client(&settings)?, job, options).await?;
            Ok(())
        }
        Commands::Upload {
            local,
            remote,
            overwrite,
        } => {
            let params = VaultParams::from_settings(&settings)?;
            upload_path(&params, local, remote.as_deref(), *overwrite).await?;
            Ok(())
        }
        Commands::Download {
            remote,
            local,
            overwrite,
        } => {
            let params = VaultParams::from_settings(&settings)?;
            download_path(&params, remote, local.as_deref(), *overwrite).await?;
            Ok(())
        }
        Commands::Ls { remote } => {
            let params = VaultParams::from_settings(&settings)?;
            list_remote(&params, remote).await
        }
    }
}
