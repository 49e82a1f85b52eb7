use clap::Parser;
use dualtrend::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
