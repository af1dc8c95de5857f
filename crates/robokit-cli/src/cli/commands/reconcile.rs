//! `robokit reconcile`: add a directory to Robocode's development path.

use anyhow::Result;
use robokit_core::install::InstallDir;
use robokit_core::properties::{self, Directive, ReconcileOutcome};
use std::path::Path;

use crate::cli::Context;

pub fn run_reconcile(ctx: &Context, file: Option<&Path>, path: Option<&Path>) -> Result<()> {
    let file = match file {
        Some(f) => f.to_path_buf(),
        None => InstallDir::new(&ctx.layout.robocode_dir).properties_file(),
    };
    let dir = match path {
        Some(p) => p.to_path_buf(),
        None => ctx.layout.robot_bin_dir(),
    };

    let outcome = properties::reconcile_file(&file, &Directive::development_path(&dir))?;
    let verb = match outcome {
        ReconcileOutcome::Unchanged => "Already listed",
        ReconcileOutcome::Appended => "Appended",
        ReconcileOutcome::Inserted => "Added",
    };
    println!("{}: {} in {}", verb, dir.display(), file.display());
    Ok(())
}
