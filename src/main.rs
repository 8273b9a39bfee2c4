use clap::Parser;
use zenith::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
