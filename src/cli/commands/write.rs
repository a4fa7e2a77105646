//! Write command implementation.

use std::fs;

use colored::Colorize;

use crate::cli::{InputFormat, WriteArgs};
use crate::codec::ConvertOptions;
use crate::config;
use crate::error::Result;
use crate::format::{self, FileFormat};
use crate::path::StorePath;
use crate::pipeline::{write_records, WriteOptions};
use crate::validate::{CommandValidator, RecordValidator};

/// Execute the write command.
pub fn execute(args: &WriteArgs, project: Option<&str>, database: &str) -> Result<()> {
    let collection = StorePath::parse_collection(&args.collection)?;

    let bytes = fs::read(&args.file)?;
    let file_format = match args.format {
        InputFormat::Auto => format::detect(&bytes)?,
        InputFormat::Json => FileFormat::Json,
        InputFormat::Jsonl => FileFormat::Jsonl,
    };
    let records = format::parse(&bytes, file_format)?;

    let validator = args
        .validator
        .as_deref()
        .map(CommandValidator::new)
        .transpose()?;

    let store = config::open_store(project, database)?;
    let opts = WriteOptions {
        stamp_field: args.timestamp_field.clone(),
        convert: ConvertOptions {
            timestamps_as_strings: args.timestamp_convert,
            geopoints_as_maps: args.geopoint_convert,
        },
        dry_run: args.dry_run,
        validator: validator.as_ref().map(|v| v as &dyn RecordValidator),
    };

    let report = write_records(store.as_ref(), &collection, &records, &opts)?;
    if args.dry_run {
        println!(
            "{} {} records would be written to '{collection}'",
            "dry run:".yellow().bold(),
            report.records
        );
    } else {
        println!(
            "{} {} records written to '{collection}' in {} commits",
            "done:".green().bold(),
            report.records,
            report.commits
        );
    }
    Ok(())
}
