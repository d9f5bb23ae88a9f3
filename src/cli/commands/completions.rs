//! Shell completions generation.
//!
//! The `devtools completions` command writes a completion script for the
//! given shell to stdout.

use crate::cli::args::{Cli, CompletionsArgs};
use crate::ui::UserInterface;
use clap::CommandFactory;

use super::dispatcher::{Command, CommandResult};

/// The completions command implementation.
pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    /// Create a new completions command.
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }

    /// Render the completion script.
    pub fn script(&self) -> String {
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        clap_complete::generate(self.args.shell, &mut cmd, "devtools", &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Command for CompletionsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        ui.emit(&self.script());
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap_complete::Shell;

    fn script(shell: Shell) -> String {
        CompletionsCommand::new(CompletionsArgs { shell }).script()
    }

    #[test]
    fn generates_bash_completions() {
        let output = script(Shell::Bash);
        assert!(output.contains("devtools"));
        assert!(output.contains("complete"));
        assert!(output.contains("--category"));
    }

    #[test]
    fn generates_zsh_completions() {
        assert!(script(Shell::Zsh).contains("devtools"));
    }

    #[test]
    fn generates_fish_completions() {
        assert!(script(Shell::Fish).contains("devtools"));
    }

    #[test]
    fn execute_emits_script() {
        let mut ui = MockUI::new();
        let result = CompletionsCommand::new(CompletionsArgs { shell: Shell::Bash })
            .execute(&mut ui)
            .unwrap();
        assert!(result.success);
        assert!(ui.emitted().contains("devtools"));
    }
}
