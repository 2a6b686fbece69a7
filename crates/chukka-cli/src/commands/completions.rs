use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::aot::Generator;
use clap_complete::{generate, shells};

use crate::cli::{Cli, CompletionShell};
use crate::error::CliError;

/// Render the completion script for `shell` to stdout, or to a file when
/// an output path is given.
pub fn run_completions(shell: CompletionShell, output_path: Option<&Path>) -> Result<(), CliError> {
    let script = render_script(shell, &mut Cli::command());

    if let Some(path) = output_path {
        std::fs::write(path, &script)?;
        println!("Wrote completions to {}", path.display());
    } else {
        io::stdout().write_all(&script)?;
    }

    Ok(())
}

fn render_script(shell: CompletionShell, command: &mut clap::Command) -> Vec<u8> {
    let mut buffer = Vec::new();
    match shell {
        CompletionShell::Bash => fill(shells::Bash, command, &mut buffer),
        CompletionShell::Zsh => fill(shells::Zsh, command, &mut buffer),
        CompletionShell::Fish => fill(shells::Fish, command, &mut buffer),
        CompletionShell::PowerShell => fill(shells::PowerShell, command, &mut buffer),
    }
    buffer
}

fn fill<G: Generator>(generator: G, command: &mut clap::Command, buffer: &mut Vec<u8>) {
    generate(generator, command, "chukka", buffer);
}
