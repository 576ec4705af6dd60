use super::record::CandidateRecord;
use csv::{StringRecord, Terminator};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Literal first line every batch must start with.
pub const EXPECTED_HEADER: &str = "id,full_name,phone_number,email,department,job_description";

/// Comma-separated fields per data line.
pub const FIELD_COUNT: usize = 6;

/// Batch-level rejection of an input file. No records are produced.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("header mismatch: expected '{}', found '{found}'", EXPECTED_HEADER)]
    HeaderMismatch { found: String },
    #[error("line {line} is not properly comma-delimited: expected {} fields, found {fields}", FIELD_COUNT)]
    MalformedLine { line: u64, fields: usize },
    #[error("line {line} has an empty id")]
    MissingId { line: u64 },
    #[error("failed to read batch: {0}")]
    Read(#[from] csv::Error),
    #[error("failed to open batch file: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns raw batch text into validated [`CandidateRecord`]s.
pub struct RecordParser;

impl RecordParser {
    /// Parses an already-split batch; the first line is the header.
    pub fn parse<I, S>(lines: I) -> Result<Vec<CandidateRecord>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut batch = String::new();
        for line in lines {
            batch.push_str(line.as_ref());
            batch.push('\n');
        }
        Self::from_reader(batch.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<CandidateRecord>, ParseError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Every physical line after the header is a data line, blank ones
    /// included. Fields are split on every comma; quotes carry no meaning.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CandidateRecord>, ParseError> {
        let mut lines = BufReader::new(reader).lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(ParseError::HeaderMismatch {
                    found: String::new(),
                })
            }
        };
        check_header(&header)?;

        let mut records = Vec::new();
        for (index, line) in lines.enumerate() {
            let line = line?;
            records.push(record_from_line(&line, index as u64 + 2)?);
        }

        debug!(records = records.len(), "parsed import batch");
        Ok(records)
    }
}

fn check_header(header: &str) -> Result<(), ParseError> {
    let found = header.strip_prefix('\u{feff}').unwrap_or(header);

    if found == EXPECTED_HEADER {
        Ok(())
    } else {
        Err(ParseError::HeaderMismatch {
            found: found.to_string(),
        })
    }
}

/// Splits one line on commas. Only `\n` ends a record, so a stray `\r`
/// stays inside its field; an empty line has no fields.
fn split_fields(line: &str) -> Result<StringRecord, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(line.as_bytes());

    let mut fields = StringRecord::new();
    reader.read_record(&mut fields)?;
    Ok(fields)
}

fn record_from_line(line: &str, number: u64) -> Result<CandidateRecord, ParseError> {
    let fields = split_fields(line)?;

    if fields.len() != FIELD_COUNT {
        return Err(ParseError::MalformedLine {
            line: number,
            fields: fields.len(),
        });
    }

    CandidateRecord::new(
        &fields[0], &fields[1], &fields[2], &fields[3], &fields[4], &fields[5],
    )
    .ok_or(ParseError::MissingId { line: number })
}
