//! Input container formats: a single JSON document or JSON Lines.
//!
//! Detection and parsing are separate stages. Detection classifies the raw
//! bytes; parsing produces the raw record objects, which the pipeline later
//! runs through the codec. Detection never silently falls back: bytes that
//! fit neither format fail the whole run before any work happens.

use serde_json::{Map, Value as Json};

use crate::error::{Error, Result};

/// A raw record object as parsed from input, before codec conversion.
pub type RawRecord = Map<String, Json>;

/// Container format of an input or output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// One JSON array of objects, or a single object.
    Json,
    /// One JSON object per non-blank line.
    #[default]
    Jsonl,
}

/// How many non-blank lines the detector samples.
const DETECT_SAMPLE_LINES: usize = 5;

/// Classify input bytes as [`FileFormat::Json`] or [`FileFormat::Jsonl`].
///
/// The first [`DETECT_SAMPLE_LINES`] non-blank lines are sampled: if every
/// one parses standalone as JSON the input is JSONL. Otherwise the whole
/// input must parse as one JSON document. Anything else is a
/// [`Error::FormatDetection`] failure.
pub fn detect(bytes: &[u8]) -> Result<FileFormat> {
    let text = std::str::from_utf8(bytes).map_err(|_| Error::FormatDetection)?;

    let sample: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(DETECT_SAMPLE_LINES)
        .collect();

    if !sample.is_empty()
        && sample
            .iter()
            .all(|line| serde_json::from_str::<Json>(line).is_ok())
    {
        return Ok(FileFormat::Jsonl);
    }

    if serde_json::from_str::<Json>(text).is_ok() {
        return Ok(FileFormat::Json);
    }

    Err(Error::FormatDetection)
}

/// Parse input bytes into raw record objects.
///
/// JSON input accepts a top-level array of objects or a single top-level
/// object (treated as a one-record sequence). JSONL input skips blank
/// lines; every remaining line must be one object. The first malformed
/// record aborts the parse with its line (or element) number.
pub fn parse(bytes: &[u8], format: FileFormat) -> Result<Vec<RawRecord>> {
    match format {
        FileFormat::Json => parse_json(bytes),
        FileFormat::Jsonl => parse_jsonl(bytes),
    }
}

fn parse_json(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let root: Json = serde_json::from_slice(bytes).map_err(|e| Error::MalformedRecord {
        line: 1,
        message: e.to_string(),
    })?;

    match root {
        Json::Object(obj) => Ok(vec![obj]),
        Json::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                match item {
                    Json::Object(obj) => records.push(obj),
                    other => {
                        return Err(Error::MalformedRecord {
                            line: index + 1,
                            message: format!("expected an object, found {}", kind_of(&other)),
                        });
                    }
                }
            }
            Ok(records)
        }
        other => Err(Error::MalformedRecord {
            line: 1,
            message: format!(
                "expected a top-level array or object, found {}",
                kind_of(&other)
            ),
        }),
    }
}

fn parse_jsonl(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let text = std::str::from_utf8(bytes).map_err(|_| Error::FormatDetection)?;
    let mut records = Vec::new();

    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed: Json =
            serde_json::from_str(line).map_err(|e| Error::MalformedRecord {
                line: number + 1,
                message: e.to_string(),
            })?;
        match parsed {
            Json::Object(obj) => records.push(obj),
            other => {
                return Err(Error::MalformedRecord {
                    line: number + 1,
                    message: format!("expected an object, found {}", kind_of(&other)),
                });
            }
        }
    }

    Ok(records)
}

fn kind_of(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
