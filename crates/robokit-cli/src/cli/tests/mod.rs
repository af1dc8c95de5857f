//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}


#[test]
fn cli_parse_global_options() {
    let cli = Cli::try_parse_from([
        "robokit",
        "provision",
        "--config",
        "/etc/robokit.toml",
        "--project",
        "bots",
    ])
    .unwrap();
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/etc/robokit.toml")));
    assert_eq!(cli.project.as_deref(), Some(std::path::Path::new("bots")));
}

#[test]
fn cli_requires_a_command() {
    assert!(Cli::try_parse_from(["robokit"]).is_err());
}
