//! `robokit unpack <archive>`: additive extraction.

use anyhow::Result;
use robokit_core::unpack;
use std::path::Path;

use crate::cli::Context;

pub fn run_unpack(ctx: &Context, archive: &Path, dest: Option<&Path>) -> Result<()> {
    let dest = dest.unwrap_or(ctx.layout.robocode_dir.as_path());
    let report = unpack::unpack_archive(archive, dest)?;
    println!(
        "Unpacked {} files ({} dirs) into {}",
        report.files,
        report.dirs,
        dest.display()
    );
    Ok(())
}
