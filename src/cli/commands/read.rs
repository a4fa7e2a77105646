//! Read command implementation.

use crate::cli::{ReadArgs, ReadFormat};
use crate::codec::ConvertOptions;
use crate::config;
use crate::error::Result;
use crate::format::FileFormat;
use crate::path::StorePath;
use crate::pipeline::{read_collection, ReadOptions};
use crate::query::parse_conditions;

/// Execute the read command.
pub fn execute(args: &ReadArgs, project: Option<&str>, database: &str) -> Result<()> {
    // validate all CLI-derived input before touching the network
    let collection = StorePath::parse_collection(&args.collection)?;
    let conditions = parse_conditions(&args.conditions)?;

    let store = config::open_store(project, database)?;
    let opts = ReadOptions {
        conditions,
        order_by: args.order_by.clone(),
        limit: args.limit,
        raw: args.raw,
        output: match args.format {
            ReadFormat::Json => FileFormat::Json,
            ReadFormat::Jsonl => FileFormat::Jsonl,
        },
        convert: ConvertOptions {
            timestamps_as_strings: args.timestamp_convert,
            geopoints_as_maps: args.geopoint_convert,
        },
    };

    let output = read_collection(store.as_ref(), &collection, &opts)?;
    println!("{output}");
    Ok(())
}
