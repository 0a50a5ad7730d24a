// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use anyhow::Context;
use clap::Parser;

use weave::args;
use weave::build_info;
use weave::runner;

fn main() -> anyhow::Result<()> {
    let args = args::Args::parse();

    // If the version flag is set, print the build info and exit
    if args.version() {
        println!("{}", build_info::BUILD_INFO);
        return Ok(());
    }

    let config_file = args
        .config()
        .context("config file is required: pass --config or set WEAVE_CONFIG")?;

    runner::run(config_file)
}
