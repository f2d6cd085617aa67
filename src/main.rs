mod cli;
mod config;
mod page_range;
mod paginate;
mod streams;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::Config;
use env_logger::{Builder, Env};
use log::debug;
use streams::{InputSource, OutputSink};

fn init_logger() {
    // Logs go to stderr; stdout only ever carries page data.
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}

fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();
    let config = Config::from_args(&cli)?;
    run(&config)
}

fn run(config: &Config) -> Result<()> {
    let source = InputSource::from(config.input.clone());
    let sink = OutputSink::from(config.destination.clone());
    debug!(
        "selecting {} page(s) [{}] from {} using {}",
        config.range.page_count(),
        config.range,
        source,
        config.delimiter
    );

    let input = streams::open_input(&source)?;
    let mut output = streams::open_output(&sink)?;

    let outcome = paginate::paginate(input, &mut output, config.delimiter, config.range)?;
    output.finish()?;

    debug!(
        "wrote {} page(s), {} byte(s); stopped: {:?}",
        outcome.pages_written, outcome.bytes_written, outcome.stop
    );
    Ok(())
}
