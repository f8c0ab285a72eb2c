//! QaStruct CLI: turns marker-annotated transcripts into structured Q/A
//! documents and regroups them by department.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::run(cli).await
}
