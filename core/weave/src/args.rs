// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, about, long_about = None, disable_version_flag = true)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "CONFIGURATION", env = "WEAVE_CONFIG")]
    config: Option<String>,

    /// Print version information and exit
    #[arg(short, long)]
    version: bool,
}

impl Args {
    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn version(&self) -> bool {
        self.version
    }
}
