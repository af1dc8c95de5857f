//! `robokit resolve`: print the latest version in the release feed.

use anyhow::{Context as _, Result};
use robokit_core::install;
use robokit_core::resolver::VersionSource;

use crate::cli::Context;

pub fn run_resolve(ctx: &Context) -> Result<()> {
    let source = install::feed_source(&ctx.cfg)?;
    let version = source
        .resolve()
        .with_context(|| format!("resolve latest {} release", ctx.cfg.feed.artifact))?;
    println!("{}", version);
    Ok(())
}
