use std::io;
use std::process::ExitCode;

use aw_context_lib::cli::{self, Cli};
use aw_context_lib::exit_code;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli::run(cli, &mut out).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("command failed: {err:?}");
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
