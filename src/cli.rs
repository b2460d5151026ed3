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

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::api::{HandleError, JobHandle};
use crate::sftp::StrictHostKeyChecking;

#[derive(Parser, Debug)]
#[command(
    name = "jarvice",
    version,
    about = "JARVICE client - submit and track HPC jobs, move data to and from the vault",
    long_about = "jarvice talks to the JARVICE job API to submit, inspect and terminate compute jobs,\nand to the JARVICE vault over SFTP to upload and download files and directory trees.\nCredentials are the platform username and API key; they can come from flags,\nthe JARVICE_USER / JARVICE_APIKEY environment variables or the config file.",
    after_help = "EXAMPLES:\n  Submit a job:                 jarvice submit job.json\n  Wait for it to finish:        jarvice wait --name my-job-42\n  Stage input data:             jarvice upload ./inputs data/run1\n  Fetch results:                jarvice download data/run1/out ./results\n  List the vault:               jarvice ls data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'u',
        long,
        env = "JARVICE_USER",
        help = "JARVICE username"
    )]
    pub username: Option<String>,

    #[arg(
        short = 'k',
        long,
        env = "JARVICE_APIKEY",
        hide_env_values = true,
        help = "JARVICE API key"
    )]
    pub apikey: Option<String>,

    #[arg(
        long,
        help = "JARVICE API endpoint [default: https://api.jarvice.com]"
    )]
    pub api_url: Option<String>,

    #[arg(long, help = "Vault host for file transfers [default: drop.jarvice.com]")]
    pub vault: Option<String>,

    #[arg(
        long,
        default_value = "~/.config/jarvice/config.yaml",
        help = "Configuration file path [default: ~/.config/jarvice/config.yaml]\nConfig loading priority:\n  1. This flag's value (when changed)\n  2. Current directory (./jarvice.yaml)\n  3. User config (~/.config/jarvice/config.yaml)"
    )]
    pub config: PathBuf,

    #[arg(
        long,
        help = "Vault host key checking mode (yes/no/accept-new) [default: accept-new]\n  yes        - Strict checking against known_hosts\n  no         - Accept all host keys (insecure, testing only)\n  accept-new - Accept new hosts, reject changed keys"
    )]
    pub strict_host_key_checking: Option<StrictHostKeyChecking>,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

/// Job selector shared by every per-job command.
#[derive(Args, Debug, Clone, Default)]
pub struct JobSelector {
    #[arg(long, conflicts_with = "name", help = "Job number")]
    pub number: Option<u64>,

    #[arg(long, help = "Job name")]
    pub name: Option<String>,
}

impl JobSelector {
    pub fn handle(&self) -> Result<JobHandle, HandleError> {
        JobHandle::from_parts(self.number, self.name.clone())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Submit a job described by a JSON file",
        long_about = "Submits the job description in FILE to /jarvice/submit.\nThe user block is filled in from the configured credentials when the file has none.\nPrints the platform's response (job number and name)."
    )]
    Submit {
        #[arg(help = "Job description (JSON)")]
        file: PathBuf,
    },

    #[command(about = "Show the status of a job")]
    Status {
        #[command(flatten)]
        job: JobSelector,
    },

    #[command(about = "Show connection details and other information for a job")]
    Info {
        #[command(flatten)]
        job: JobSelector,
    },

    #[command(about = "Terminate a job immediately")]
    Terminate {
        #[command(flatten)]
        job: JobSelector,
    },

    #[command(about = "Request a graceful shutdown of a job")]
    Shutdown {
        #[command(flatten)]
        job: JobSelector,
    },

    #[command(about = "Run an application-defined action in a job")]
    Action {
        #[command(flatten)]
        job: JobSelector,

        #[arg(help = "Action name")]
        action: String,
    },

    #[command(about = "Show the network address and password for a job")]
    Connect {
        #[command(flatten)]
        job: JobSelector,
    },

    #[command(about = "Show the output of a completed job")]
    Output {
        #[command(flatten)]
        job: JobSelector,

        #[arg(long, help = "Number of lines to return (all if omitted)")]
        lines: Option<u32>,
    },

    #[command(about = "Show the tail of a running job's output")]
    Tail {
        #[command(flatten)]
        job: JobSelector,

        #[arg(long, help = "Number of lines to return (all if omitted)")]
        lines: Option<u32>,
    },

    #[command(about = "List current jobs")]
    Jobs {
        #[arg(help = "Only this job")]
        name: Option<String>,
    },

    #[command(about = "List applications")]
    Apps {
        #[arg(help = "Only this application")]
        name: Option<String>,
    },

    #[command(about = "List machine types")]
    Machines {
        #[arg(help = "Only this machine type")]
        name: Option<String>,
    },

    #[command(about = "Terminate every current job")]
    TerminateAll,

    #[command(about = "Gracefully shut down every current job")]
    ShutdownAll,

    #[command(
        about = "Block until a job reaches a terminal state",
        long_about = "Polls the job status until it is COMPLETED, COMPLETED WITH ERROR, TERMINATED or CANCELED.\nPrints one '.' per poll and a final status line.\n\nExit codes: 0 (job ended), 1 (query failure or timeout)"
    )]
    Wait {
        #[command(flatten)]
        job: JobSelector,

        #[arg(long, help = "Seconds between polls [default: 5 or poll_interval from config]")]
        interval: Option<u64>,

        #[arg(long, help = "Give up after this many seconds")]
        timeout: Option<u64>,
    },

    #[command(
        about = "Upload a file or directory to the vault",
        long_about = "Uploads LOCAL to the vault over SFTP.\nA directory's contents are mirrored under REMOTE (default: LOCAL's parent directory).\nA file goes to REMOTE, inside REMOTE when it is a directory, or to ./<name> when REMOTE is omitted.\nMissing remote directories are created.",
        after_help = "Examples:\n  jarvice upload input.dat                 # ./input.dat on the vault\n  jarvice upload input.dat data/run1       # into data/run1 (created if missing)\n  jarvice upload --overwrite a.csv b.csv   # replace an existing remote file\n  jarvice upload ./inputs data/run1        # mirror a directory"
    )]
    Upload {
        #[arg(help = "Local file or directory")]
        local: PathBuf,

        #[arg(help = "Remote destination")]
        remote: Option<String>,

        #[arg(long, help = "Replace an existing remote file")]
        overwrite: bool,
    },

    #[command(
        about = "Download a file or directory from the vault",
        after_help = "Examples:\n  jarvice download data/run1/out.log             # ./out.log\n  jarvice download data/run1 ./results           # mirror a directory\n  jarvice download --overwrite data/a.csv a.csv  # replace a local file"
    )]
    Download {
        #[arg(help = "Remote file or directory")]
        remote: String,

        #[arg(help = "Local destination")]
        local: Option<PathBuf>,

        #[arg(long, help = "Replace an existing local file")]
        overwrite: bool,
    },

    #[command(about = "List a vault directory")]
    Ls {
        #[arg(default_value = ".", help = "Remote directory")]
        remote: String,
    },
}
