use super::error::IngestError;
use std::path::Path;

/// A parsed tabular file: one header row plus the data rows as text tokens.
///
/// Rows are kept exactly as they arrive: shorter rows simply have missing
/// trailing fields, longer rows have their tail ignored by the consumer. No
/// row is dropped for content reasons; typing decides what each token means.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parses a comma-separated text blob with a mandatory header row.
    ///
    /// Double-quoted fields are honoured: embedded commas and newlines stay
    /// inside the field, and `""` collapses to a literal quote. This matches
    /// the reader the dashboard previously relied on.
    pub fn parse(text: &str) -> Result<Self, IngestError> {
        let mut records = split_records(text);
        if records.is_empty() {
            return Err(IngestError::MissingHeader);
        }
        let header = records.remove(0);
        if header.iter().all(|h| h.trim().is_empty()) {
            return Err(IngestError::EmptyHeader);
        }
        Ok(Self {
            header,
            rows: records,
        })
    }

    /// File convenience wrapper around [`RawTable::parse`].
    pub fn read_path(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a named column in the header, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

/// Splits the full text into records of fields, tracking quote state across
/// the whole stream so quoted fields may contain separators and newlines.
fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // True once the current record has any content (field text or a comma),
    // so blank lines produce nothing instead of a single empty row.
    let mut record_dirty = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                record_dirty = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                record_dirty = true;
            }
            '\r' => {
                // Swallowed; the paired '\n' terminates the record.
            }
            '\n' => {
                if record_dirty || !field.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                record_dirty = false;
            }
            _ => {
                field.push(c);
                record_dirty = true;
            }
        }
    }
    // Final record without a trailing newline.
    if record_dirty || !field.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
