use clap::Parser;
use std::path::PathBuf;

/// Arguments for the update command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Update using the version recorded in package.json:\n    scaffold-update update --to 2.14.1\n\n\
                  Update from an explicit version:\n    scaffold-update update --from 2.11.1 --to 2.14.1\n\n\
                  Use pre-rendered scaffolds in <DIR>/<version>/:\n    scaffold-update update --to 2.14.1 --templates ./scaffolds\n\n\
                  Preview the scaffold changes without touching the project:\n    scaffold-update update --to 2.14.1 --dry-run")]
pub struct UpdateArgs {
    /// Scaffold version to update to
    #[arg(long, value_name = "VERSION")]
    pub to: String,

    /// Scaffold version the project is at (detected from the manifest if omitted)
    #[arg(long, value_name = "VERSION")]
    pub from: Option<String>,

    /// Directory holding one pre-rendered scaffold per version
    #[arg(long, value_name = "DIR", env = "SCAFFOLD_UPDATE_TEMPLATES")]
    pub templates: Option<PathBuf>,

    /// Dependency that marks a project as scaffolded (default: ember-cli)
    #[arg(long, value_name = "NAME")]
    pub marker: Option<String>,

    /// Show the scaffold changes without merging them
    #[arg(long)]
    pub dry_run: bool,
}
