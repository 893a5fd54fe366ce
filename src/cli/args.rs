use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable debug-level logging regardless of --log-level
    #[arg(short, long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Drive a single Run to completion in this process and exit
    Run(RunArgs),

    /// Serve the HTTP/SSE operator control surface
    Serve(ServeArgs),
}

#[derive(Args, Clone)]
pub struct RunArgs {
    /// Page the Run starts on
    #[arg(long)]
    pub url: String,

    /// Persona name presented in the system prompt
    #[arg(long, default_value = "Wayfarer")]
    pub persona: String,

    /// Natural-language mission the decision engine pursues
    #[arg(long)]
    pub mission: String,

    /// Draw the Set-of-Marks overlay into the saved screenshots
    #[arg(long)]
    pub debug_marks: bool,

    /// Vision model id, recorded on the Run but not otherwise enforced here
    #[arg(long, default_value = "vision-1")]
    pub model: String,

    /// Synthesize and gate on speech for each thought
    #[arg(long)]
    pub voice: bool,

    /// Launch the browser headless
    #[arg(long, default_value_t = true)]
    pub headless: bool,

    #[arg(long)]
    pub save_trace: bool,

    #[arg(long)]
    pub save_thoughts: bool,

    #[arg(long)]
    pub save_screenshots: bool,

    /// Pick actions uniformly at random instead of calling the decision engine
    #[arg(long)]
    pub monkey_mode: bool,

    /// Suppress the loop-guard hint in the assembled prompt
    #[arg(long)]
    pub bare_mode: bool,
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Address the HTTP control surface binds to
    #[arg(long)]
    pub addr: Option<String>,
}
