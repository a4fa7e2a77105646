//! Delete command implementation.

use std::fs;

use colored::Colorize;

use crate::cli::DeleteArgs;
use crate::config;
use crate::error::{Error, Result};
use crate::format;
use crate::path::StorePath;
use crate::pipeline::{delete_documents, extract_doc_ids};

/// Execute the delete command.
pub fn execute(args: &DeleteArgs, project: Option<&str>, database: &str) -> Result<()> {
    let collection = StorePath::parse_collection(&args.collection)?;

    let ids: Vec<String> = if let Some(doc_ids) = &args.doc_ids {
        doc_ids.split_whitespace().map(String::from).collect()
    } else if let Some(file) = &args.file {
        let bytes = fs::read(file)?;
        let file_format = format::detect(&bytes)?;
        let records = format::parse(&bytes, file_format)?;
        extract_doc_ids(&records)?
    } else {
        // clap's arg group requires one of the two
        return Err(Error::Config(
            "provide --doc-ids or an input file".to_string(),
        ));
    };
    if ids.is_empty() {
        return Err(Error::MissingDocumentIds);
    }

    let store = config::open_store(project, database)?;
    let report = delete_documents(store.as_ref(), &collection, &ids, args.dry_run)?;

    if args.dry_run {
        println!(
            "{} {} documents would be deleted from '{collection}' (subcollections included)",
            "dry run:".yellow().bold(),
            report.documents
        );
    } else {
        println!(
            "{} {} documents deleted from '{collection}' in {} commits",
            "done:".green().bold(),
            report.documents,
            report.commits
        );
    }
    Ok(())
}
