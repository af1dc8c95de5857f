//! `robokit download`: fetch the setup jar only.

use anyhow::{Context as _, Result};
use robokit_core::install::{self, InstallDir};
use robokit_core::{downloader, Version};
use std::path::Path;

use crate::cli::Context;

pub fn run_download(ctx: &Context, version: Option<&Version>, dest: Option<&Path>) -> Result<()> {
    let version = install::version_source(&ctx.cfg, version)?
        .resolve()
        .context("resolve version")?;
    let target = install::download_target(&ctx.cfg, version)?;
    let path = match dest {
        Some(dir) => dir.join(target.file_name()),
        None => InstallDir::new(&ctx.layout.robocode_dir).setup_jar(&target),
    };

    let report = downloader::download_artifact(&target, &path, &ctx.cfg.http.options())?;
    println!(
        "{}  {} ({} bytes)",
        report.sha256,
        report.path.display(),
        report.bytes
    );
    Ok(())
}
