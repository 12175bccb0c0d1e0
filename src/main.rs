use bac_mapper::cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("bac_mapper=debug,info")
    } else {
        EnvFilter::new("bac_mapper=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Pairs(args) => {
            cli::pairs::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Assemble(args) => {
            cli::assemble::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Coverage(args) => {
            cli::coverage::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
