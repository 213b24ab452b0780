//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use archive_tools_core::Archive;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archive = add_archive_context(Archive::open(&args.archive), &args.archive)?;
    let manifest = archive
        .manifest()
        .context("opened archive has no manifest")?;

    if args.long {
        formatter.format_manifest_long(manifest)?;
    } else {
        formatter.format_manifest_short(manifest)?;
    }

    Ok(())
}
