//! Info command implementation

use crate::cli::InfoArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use archive_tools_core::Archive;

pub fn execute(args: &InfoArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archive = add_archive_context(Archive::open(&args.archive), &args.archive)?;
    let manifest = archive
        .manifest()
        .context("opened archive has no manifest")?;

    let entry = manifest.find(&args.path).ok_or_else(|| {
        anyhow!(
            "'{}' is not listed in the manifest of '{}'\n\
             HINT: Use `archive-tool list` to see the recorded paths.",
            args.path.display(),
            args.archive.display()
        )
    })?;

    formatter.format_entry_info(entry)
}
