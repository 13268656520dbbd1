//! Update command implementation
//!
//! Builds the run configuration from flags, environment, and the optional
//! config file, runs the update, and prints the outcome.

use std::path::PathBuf;

use console::style;

use crate::cli::UpdateArgs;
use crate::config::{GeneratorConfig, UpdateConfig, find_config_file, load_config_file};
use crate::delta::{Delta, DiffKind};
use crate::error::Result;
use crate::progress::{ProgressReporter, SilentProgress, SpinnerProgress};
use crate::report::{Classification, StatusReport};
use crate::scaffold::VersionId;
use crate::update::{UpdateOutcome, run_update};

/// Run update command
pub fn run(
    project: Option<PathBuf>,
    config_path: Option<PathBuf>,
    verbose: bool,
    args: UpdateArgs,
) -> Result<()> {
    let project_root = match project {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let config = build_config(project_root, config_path, args)?;

    // The spinner would interleave with log lines
    let mut progress: Box<dyn ProgressReporter> = if verbose || !console::user_attended_stderr() {
        Box::new(SilentProgress)
    } else {
        Box::new(SpinnerProgress::new())
    };

    let outcome = run_update(&config, progress.as_mut())?;
    print_outcome(&outcome);
    Ok(())
}

/// Merge flags over the config file into an immutable run configuration
fn build_config(
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: UpdateArgs,
) -> Result<UpdateConfig> {
    let file = match config_path.or_else(|| find_config_file(&project_root)) {
        Some(path) => Some(load_config_file(&path)?),
        None => None,
    };

    let to = VersionId::parse(&args.to)?;
    let from = args.from.as_deref().map(VersionId::parse).transpose()?;

    let mut builder = UpdateConfig::builder(project_root, to);
    if let Some(file) = &file {
        builder = builder.apply_file(file);
    }
    if let Some(path) = args.templates {
        builder = builder.generator(GeneratorConfig::TemplateDir { path });
    }
    if let Some(marker) = args.marker {
        builder = builder.marker(marker);
    }

    Ok(builder.from(from).dry_run(args.dry_run).build())
}

fn print_outcome(outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::DryRun { range, delta } => print_dry_run(range, delta),
        UpdateOutcome::NoChanges { range } => {
            println!(
                "Scaffolds {} and {} are identical, nothing to update",
                range.from(),
                range.to()
            );
        }
        UpdateOutcome::Applied { report, .. } => print_report(report),
    }
}

fn print_dry_run(range: &crate::scaffold::VersionRange, delta: &Delta) {
    for entry in delta.entries() {
        let label = match entry.kind {
            DiffKind::Added => style(entry.kind).green(),
            DiffKind::Removed => style(entry.kind).red(),
            DiffKind::Changed => style(entry.kind).yellow(),
        };
        println!("{}:   {}", label, entry.path);
    }
    println!();
    println!(
        "{} files differ between {} and {} (dry run, nothing was changed)",
        delta.len(),
        range.from(),
        range.to()
    );
}

fn print_report(report: &StatusReport) {
    for entry in report.entries() {
        let label = match entry.classification {
            Classification::Added => style(entry.classification).green(),
            Classification::Modified => style(entry.classification).yellow(),
            Classification::Deleted => style(entry.classification).red(),
            Classification::Conflicted => style(entry.classification).red().bold(),
        };
        println!("{}:   {}", label, entry.path);
    }

    let conflicted = report.count(Classification::Conflicted);
    println!();
    println!(
        "{} files updated, {} conflicted",
        report.len() - conflicted,
        conflicted
    );
    if conflicted > 0 {
        println!(
            "{}",
            style("Resolve the conflict markers in the files above, then review and commit.")
                .yellow()
        );
    }
}
