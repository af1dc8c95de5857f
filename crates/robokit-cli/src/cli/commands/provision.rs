//! `robokit provision`: the full download, unpack, reconcile sequence.

use anyhow::Result;
use robokit_core::install::{self, ProvisionOptions, ProvisionOutcome};
use robokit_core::properties::ReconcileOutcome;
use robokit_core::Version;

use crate::cli::Context;

pub fn run_provision(ctx: &Context, version: Option<Version>, force: bool) -> Result<()> {
    let opts = ProvisionOptions { version, force };
    match install::provision(&ctx.cfg, &ctx.layout, &opts)? {
        ProvisionOutcome::Skipped { install_dir } => {
            println!(
                "Download disabled; using existing installation at {}",
                install_dir.display()
            );
        }
        ProvisionOutcome::Provisioned(report) => {
            match &report.download {
                Some(d) => println!("Downloaded {} ({} bytes)", d.path.display(), d.bytes),
                None => println!("Robocode {} already installed", report.version),
            }
            if let Some(u) = &report.unpack {
                println!("Unpacked {} files into {}", u.files, report.install_dir.display());
            }
            if report.reconcile != ReconcileOutcome::Unchanged {
                println!("Registered {}", ctx.layout.robot_bin_dir().display());
            }
            println!("Robocode {} ready at {}", report.version, report.install_dir.display());
        }
    }
    Ok(())
}
