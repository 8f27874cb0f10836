use crate::Cli;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

pub fn run(shell: &Shell) -> Result<()> {
    write_completions(*shell, &mut io::stdout())
}

fn write_completions(shell: Shell, buf: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, buf);
    Ok(())
}
