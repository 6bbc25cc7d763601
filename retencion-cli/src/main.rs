use std::io;

use clap::Parser;

use retencion_cli::{app, cli::Cli, logging};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    app::run(&cli, &mut out)
}
