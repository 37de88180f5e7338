use tracing_subscriber::EnvFilter;
use xl_reader::{cli, errors::AppResult};

fn main() -> AppResult<()> {
    // Logs go to stderr so stdout carries only row output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    cli::cli()
}
