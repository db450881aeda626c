//! docconf CLI: inspect and check a documentation build configuration bundle.
//!
//! Resolves link templates and library versions, fills build-time version
//! placeholders, and gates the build on the accepted LLVM range.

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
