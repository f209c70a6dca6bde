//! BookmarkUp CLI: regroup browser bookmarks into keyword folders.
//!
//! Reads a Chromium-family `Bookmarks` file, groups every bookmark by the
//! keywords of its title, backs the original up, and writes the new tree.

mod browser;
mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
