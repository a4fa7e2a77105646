//! Update command implementation.

use std::fs;

use colored::Colorize;

use crate::cli::UpdateArgs;
use crate::codec::ConvertOptions;
use crate::config;
use crate::error::Result;
use crate::format;
use crate::path::StorePath;
use crate::pipeline::{update_records, UpdateOptions};
use crate::validate::{CommandValidator, RecordValidator};

/// Execute the update command.
pub fn execute(args: &UpdateArgs, project: Option<&str>, database: &str) -> Result<()> {
    let collection = StorePath::parse_collection(&args.collection)?;

    let bytes = fs::read(&args.file)?;
    let file_format = format::detect(&bytes)?;
    let records = format::parse(&bytes, file_format)?;

    let validator = args
        .validator
        .as_deref()
        .map(CommandValidator::new)
        .transpose()?;

    let store = config::open_store(project, database)?;
    let opts = UpdateOptions {
        upsert: args.upsert,
        stamp_field: args.timestamp_field.clone(),
        convert: ConvertOptions {
            timestamps_as_strings: args.timestamp_convert,
            geopoints_as_maps: args.geopoint_convert,
        },
        dry_run: args.dry_run,
        validator: validator.as_ref().map(|v| v as &dyn RecordValidator),
    };

    let report = update_records(store.as_ref(), &collection, &records, &opts)?;
    let verb = if args.upsert { "upserted" } else { "updated" };
    if args.dry_run {
        println!(
            "{} {} records would be {verb} in '{collection}' ({} skipped)",
            "dry run:".yellow().bold(),
            report.records,
            report.skipped
        );
    } else {
        println!(
            "{} {} records {verb} in '{collection}' in {} commits ({} skipped)",
            "done:".green().bold(),
            report.records,
            report.commits,
            report.skipped
        );
    }
    Ok(())
}
