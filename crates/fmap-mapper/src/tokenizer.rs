//! Delimited-text tokenizer.
//!
//! Reads an export under a [`Schema`] and produces one [`Record`] per data
//! line. Quoting follows the usual CSV rules: quoted fields may contain the
//! delimiter, and a doubled quote character stands for one literal quote.

use crate::error::{MapError, Result};
use crate::record::{Document, Record, Value};
use crate::schema::Schema;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Read and tokenize the file at `path`.
///
/// The file is read completely and closed before tokenizing starts.
pub fn tokenize_file(path: &Path, schema: &Schema) -> Result<Document> {
    let content = {
        let file = File::open(path).map_err(|e| MapError::io(path, e))?;
        let mut reader = BufReader::new(file);
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| MapError::io(path, e))?;
        content
    };
    tokenize_str(&content, schema, path)
}

/// Tokenize in-memory content. `source` only labels error messages.
pub fn tokenize_str(content: &str, schema: &Schema, source: impl Into<PathBuf>) -> Result<Document> {
    let source = source.into();
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .double_quote(true)
        .delimiter(ascii_byte(schema, schema.delimiter, "delimiter")?)
        .quote(ascii_byte(schema, schema.quote, "quote character")?)
        .from_reader(content.as_bytes());

    let template = Record::template(&schema.columns);
    let mut records = Vec::new();
    let mut lines = LineCounter::new(content.as_bytes());
    let mut fields = csv::StringRecord::new();
    let blank = csv::StringRecord::new();
    // Rows seen so far, blank lines included.
    let mut rows = 0usize;

    loop {
        let offset = reader.position().byte() as usize;
        let more = reader.read_record(&mut fields).map_err(|e| MapError::Csv {
            path: source.clone(),
            source: e,
        })?;

        // The reader drops blank lines; each one is still a row with no fields.
        let (blank_starts, record_start) = blank_lines(content.as_bytes(), offset);
        for blank_start in blank_starts {
            let line = lines.line_at(blank_start);
            if rows >= schema.header_lines {
                records.push(build_record(schema, &template, &source, line, &blank)?);
            }
            rows += 1;
        }

        if !more {
            break;
        }

        let line = lines.line_at(record_start);
        if rows >= schema.header_lines {
            records.push(build_record(schema, &template, &source, line, &fields)?);
        }
        rows += 1;
    }

    tracing::debug!(
        format = %schema.name,
        source = %source.display(),
        records = records.len(),
        "tokenized input"
    );

    Ok(Document {
        schema: schema.clone(),
        source,
        records,
    })
}

/// Copy `fields` over the template, positionally.
fn build_record(
    schema: &Schema,
    template: &Record,
    source: &Path,
    line: u64,
    fields: &csv::StringRecord,
) -> Result<Record> {
    if fields.len() < schema.columns.len() {
        return Err(MapError::RowTooShort {
            path: source.to_path_buf(),
            line,
            expected: schema.columns.len(),
            found: fields.len(),
        });
    }

    let mut record = template.clone();
    record.line = line;
    for (column, field) in schema.columns.iter().zip(fields.iter()) {
        let stored = record.set(*column, Value::Text(field.to_string()));
        debug_assert!(stored, "template is missing column {column}");
    }
    Ok(record)
}

/// Blank lines starting at byte `offset`, and the byte where the next
/// non-blank row begins.
///
/// A CRLF terminator leaves its `\n` behind for the next read; that byte
/// belongs to the previous row and is not a blank line.
fn blank_lines(bytes: &[u8], offset: usize) -> (Vec<usize>, usize) {
    let mut pos = offset.min(bytes.len());
    if pos > 0 && bytes.get(pos) == Some(&b'\n') && bytes[pos - 1] == b'\r' {
        pos += 1;
    }

    let mut starts = Vec::new();
    while let Some(&b) = bytes.get(pos) {
        match b {
            b'\r' => {
                starts.push(pos);
                pos += if bytes.get(pos + 1) == Some(&b'\n') { 2 } else { 1 };
            }
            b'\n' => {
                starts.push(pos);
                pos += 1;
            }
            _ => break,
        }
    }
    (starts, pos)
}

/// Maps increasing byte offsets to 1-based line numbers.
struct LineCounter<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: u64,
}

impl<'a> LineCounter<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> u64 {
        let offset = offset.min(self.bytes.len());
        if offset > self.offset {
            let newlines = self.bytes[self.offset..offset]
                .iter()
                .filter(|b| **b == b'\n')
                .count();
            self.line += newlines as u64;
            self.offset = offset;
        }
        self.line
    }
}

fn ascii_byte(schema: &Schema, c: char, what: &str) -> Result<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| MapError::InvalidSchema {
            name: schema.name.clone(),
            reason: format!("{what} {c:?} is not a single-byte character"),
        })
}
