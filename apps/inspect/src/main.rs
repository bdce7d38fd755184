use anyhow::Context;
use arbor::kernel::config::load_config;
use arbor_inspect::{Cli, inspect};
use arbor_logger::Logger;
use clap::Parser;
use std::io::Write;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let builder = Logger::builder().name(env!("CARGO_PKG_NAME")).verbosity(cli.verbose);
    let _log = match &cli.log_dir {
        Some(dir) => builder.path(dir).init()?,
        None => builder.init()?,
    };

    let start = load_config(cli.config.as_deref()).context("Critical: Configuration is malformed")?;
    let report = inspect(&cli, start)?;

    let mut out = std::io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        write!(out, "{report}")?;
    }
    Ok(())
}
