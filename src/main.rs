//! scaffold-update - upgrade a scaffolded project to a newer template version

use clap::Parser;
use miette::Diagnostic;

use scaffold_update::cli::{Cli, Commands};
use scaffold_update::{commands, logging};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Update(args) => commands::update::run(cli.project, cli.config, cli.verbose, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let Some(help) = e.help() {
            eprintln!("  help: {}", help);
        }
        std::process::exit(1);
    }
}
