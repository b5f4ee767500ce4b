use std::process::ExitCode;

use clap::Parser;
use niioverlay::cli::{print_help, Args};
use niioverlay::pipeline;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // no arguments at all shows the help, like `-h`
    if std::env::args_os().len() <= 1 {
        return match print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    let args = Args::parse();
    match pipeline::run(&args) {
        Ok(path) => {
            log::debug!("wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
