// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use epicscope_cli::logging::setup_logging;
use epicscope_cli::Cli;

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.global.verbose, cli.global.log_file.as_deref());
    if let Err(e) = epicscope_cli::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
