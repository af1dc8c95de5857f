//! CLI command handlers, one file per command.

mod checksum;
mod completions;
mod download;
mod package;
mod provision;
mod reconcile;
mod resolve;
mod unpack;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use download::run_download;
pub use package::{run_deploy, run_package};
pub use provision::run_provision;
pub use reconcile::run_reconcile;
pub use resolve::run_resolve;
pub use unpack::run_unpack;
