//! `robokit package` and `robokit deploy`.

use anyhow::Result;
use robokit_core::install;
use robokit_core::package::PackageReport;

use crate::cli::Context;

fn print_reports(reports: &[PackageReport]) {
    if reports.is_empty() {
        println!("No robots configured.");
        return;
    }
    for r in reports {
        println!(
            "{:<20} {:>5} entries  {}",
            r.robot,
            r.entries,
            r.path.display()
        );
    }
}

pub fn run_package(ctx: &Context, robots: &[String]) -> Result<()> {
    let reports = install::package_robots(&ctx.cfg, &ctx.layout, robots)?;
    print_reports(&reports);
    Ok(())
}

pub fn run_deploy(ctx: &Context) -> Result<()> {
    let reports = install::deploy_robots(&ctx.cfg, &ctx.layout)?;
    print_reports(&reports);
    if !reports.is_empty() {
        println!("Deployed to {}", ctx.layout.robot_bin_dir().display());
    }
    Ok(())
}
