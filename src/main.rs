use anyhow::Result;
use clap::Parser;
use split_check::cli;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args) {
        // Failures before logging is up (config, subscriber) only reach stderr here.
        if !tracing::dispatcher::has_been_set() {
            eprintln!("error: {:#}", err);
        }
        std::process::exit(cli::exit_code(&err));
    }
    Ok(())
}
