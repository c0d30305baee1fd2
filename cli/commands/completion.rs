use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

use crate::cli_args::Cli;

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    log::debug!("Generating {} completions for {}", shell, bin_name);

    let mut stdout = io::stdout();
    generate(shell, &mut command, bin_name, &mut stdout);
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}
