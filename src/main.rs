//! unity-build - Command-line tool for generating unity build aggregate files

use std::process::ExitCode;

use unity_build::cli;

fn main() -> ExitCode {
    cli::run()
}
