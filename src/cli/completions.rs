use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    scaffold-update completions bash > ~/.bash_completion.d/scaffold-update\n\n\
                  Generate zsh completions:\n    scaffold-update completions zsh > ~/.zfunc/_scaffold-update\n\n\
                  Generate fish completions:\n    scaffold-update completions fish > ~/.config/fish/completions/scaffold-update.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
