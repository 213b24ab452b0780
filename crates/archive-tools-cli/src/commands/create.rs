//! Create command implementation.

use crate::cli::CreateArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use archive_tools_core::ArchiveCreator;
use archive_tools_core::ChecksumAlgorithm;
use archive_tools_core::NoopProgress;

pub fn execute(args: &CreateArgs, formatter: &dyn OutputFormatter, quiet: bool) -> Result<()> {
    let mut creator = ArchiveCreator::new()
        .output(&args.archive)
        .sources(&args.paths);

    if let Some(basedir) = &args.basedir {
        creator = creator.basedir(basedir);
    }
    for exclude in &args.excludes {
        creator = creator.exclude(exclude);
    }
    if let Some(compression) = args.compression {
        creator = creator.compression(compression.codec());
    }
    if let Some(level) = args.level {
        creator = creator.compression_level(level);
    }
    if !args.checksums.is_empty() {
        creator = creator.checksums(
            args.checksums
                .iter()
                .copied()
                .map(ChecksumAlgorithm::from)
                .collect(),
        );
    }
    if let Some(comment) = &args.comment {
        creator = creator.comment(comment);
    }

    // Progress bar only on an interactive terminal
    let report = if !quiet && CliProgress::should_show() {
        let mut progress = CliProgress::new("Creating");
        add_archive_context(creator.create_with_progress(&mut progress), &args.archive)?
    } else {
        let mut noop = NoopProgress;
        add_archive_context(creator.create_with_progress(&mut noop), &args.archive)?
    };

    formatter.format_creation_result(&args.archive, &report)?;

    Ok(())
}
