//! CLI argument parsing and dispatch: `wayfarer run` drives one Run to
//! completion in the foreground; `wayfarer serve` starts the HTTP/SSE
//! control surface.

pub mod args;
pub mod run_cmd;
pub mod runtime;

use anyhow::Result;
use clap::Parser;

use args::{CliArgs, Commands};
use runtime::{init_logging, load_config};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();
    init_logging(&cli.log_level, cli.debug)?;
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => run_cmd::cmd_run(args, config).await,
        Commands::Serve(args) => crate::server::serve(config, args.addr).await,
    }
}
