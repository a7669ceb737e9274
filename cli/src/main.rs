use anyhow::Result;
use clap::Parser;
use phrasedex::commands::run;
use phrasedex::Cli;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}
