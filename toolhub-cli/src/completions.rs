use crate::cli::Cli;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate_to, Shell};
use std::io::{self, Write};
use std::path::Path;

const BIN_NAME: &str = "toolhub";

/// Write completion scripts for every supported shell into `outdir`
pub fn generate_completions<P: AsRef<Path>>(outdir: P) -> Result<()> {
    let outdir = outdir.as_ref();
    let mut cmd = Cli::command();

    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
        generate_to(shell, &mut cmd, BIN_NAME, outdir)?;
    }

    Ok(())
}

/// Write the completion script for `shell` to `out`
pub fn write_completion<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, out);
}

/// Print shell completion script to stdout
pub fn print_completion(shell: Shell) -> Result<()> {
    let mut stdout = io::stdout();
    write_completion(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}
