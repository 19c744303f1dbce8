//! completions command - Print a shell completion script

use std::io::Write;

use clap::{Args, Command};
use clap_complete::Shell;

use crate::exit_code::ExitCode;
use crate::profile::APP_NAME;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the completions command, writing to stdout
pub fn execute(args: CompletionsArgs, mut command: Command) -> ExitCode {
    render(args.shell, &mut command, &mut std::io::stdout());
    ExitCode::Success
}

fn render(shell: Shell, command: &mut Command, out: &mut dyn Write) {
    clap_complete::generate(shell, command, APP_NAME, out);
}
