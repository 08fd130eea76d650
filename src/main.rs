// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

use std::path::PathBuf;
use std::process;

use clap::Parser;

use evban_rs::driver;

#[derive(Debug, Parser)]
#[command(
    name = "evban",
    about = "EVB analysis of LAMMPS trajectories",
    version
)]
struct Cli {
    /// Path to the yaml configuration file describing the analysis.
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    process::exit(driver::run(&cli.config).code());
}
