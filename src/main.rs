use clap::Parser;

use nanostat::cli::Cli;
use nanostat::{load_dataset, resolve_output, write_report, Config, Error, NativeLoader};

fn run(cli: Cli) -> Result<(), Error> {
    let config = Config::try_from(cli)?;
    let destination = resolve_output(&config)?;
    let reads = load_dataset(&config.source, &NativeLoader)?;
    write_report(&reads, &destination, config.format)
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
