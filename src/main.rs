use anyhow::Result;
use clap::Parser;
use termdeck::cli::{self, Cli};
use termdeck_config::LogLevel;

fn main() -> Result<()> {
    let args = Cli::parse();

    // CLI --log-level wins, then RUST_LOG, then the config (applied below)
    let cli_level = args.log_level.map(LogLevel::from);
    termdeck::debug::init_log_bridge(cli_level);
    log::info!("Starting termdeck {}", termdeck::VERSION);

    let config = cli::load_config(&args)?;
    termdeck::debug::set_level(config.log_level, cli_level.is_some());

    let result = cli::run(&args, &config);
    if let Err(ref e) = result {
        eprintln!("termdeck: error: {e:#}");
    }
    log::logger().flush();
    result
}
