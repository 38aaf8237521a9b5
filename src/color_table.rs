use std::path::Path;

use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{LoadError, RowViolation};

/// Columns every reference source must provide, in this order.
pub const COLUMNS: [&str; 5] = ["name", "r", "g", "b", "hex"];

/// File name of the compiled-in reference table under `data/`.
pub const EMBEDDED_TABLE: &str = "colors.csv";

/// Longest single field, in bytes after unescaping, a CSV source may hold.
/// Longer fields fail the row with [`RowViolation::FieldTooLong`].
pub const MAX_FIELD_LEN: usize = 256;

/// One unvalidated record of a tabular reference source.
///
/// Every field is kept as text so that validation can tell a missing value
/// from a malformed or out-of-range one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ColorRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub r: String,
    #[serde(default)]
    pub g: String,
    #[serde(default)]
    pub b: String,
    #[serde(default)]
    pub hex: String,
}

impl ColorRow {
    pub fn new(name: impl Into<String>, r: i64, g: i64, b: i64, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            r: r.to_string(),
            g: g.to_string(),
            b: b.to_string(),
            hex: hex.into(),
        }
    }
}

/// A validated reference color. `hex` is kept exactly as loaded and always decodes to `rgb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorEntry {
    name: String,
    #[serde(flatten)]
    rgb: Rgb,
    hex: String,
}

impl ColorEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rgb(&self) -> Rgb {
        self.rgb
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl TryFrom<ColorRow> for ColorEntry {
    type Error = RowViolation;

    fn try_from(row: ColorRow) -> Result<Self, RowViolation> {
        let name = row.name.trim();
        if name.is_empty() {
            return Err(RowViolation::MissingField("name"));
        }
        let r = channel("r", &row.r)?;
        let g = channel("g", &row.g)?;
        let b = channel("b", &row.b)?;

        let hex = row.hex.trim();
        if hex.is_empty() {
            return Err(RowViolation::MissingField("hex"));
        }
        let decoded = Rgb::from_hex(hex).ok_or_else(|| RowViolation::BadHex(hex.to_string()))?;
        let rgb = Rgb::new(r, g, b);
        if decoded != rgb {
            return Err(RowViolation::HexMismatch { hex: hex.to_string(), r, g, b });
        }

        Ok(Self {
            name: name.to_string(),
            rgb,
            hex: hex.to_string(),
        })
    }
}

fn channel(field: &'static str, raw: &str) -> Result<u8, RowViolation> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(RowViolation::MissingField(field));
    }
    let value: i64 = raw.parse().map_err(|_| RowViolation::NotAnInteger {
        field,
        value: raw.to_string(),
    })?;
    u8::try_from(value).map_err(|_| RowViolation::OutOfRange { field, value })
}

/// Immutable, non-empty reference set of named colors, in source order.
///
/// There is no write path: once loaded the table can be shared freely
/// between threads and queried concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    entries: Vec<ColorEntry>,
}

impl ColorTable {
    /// Validate `rows` in order. The first failing row aborts the load and is
    /// reported by its zero-based index.
    pub fn load<I>(rows: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = ColorRow>,
    {
        Self::load_records(rows.into_iter().map(Ok))
    }

    fn load_records<I>(records: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = Result<ColorRow, RowViolation>>,
    {
        let mut entries = Vec::new();
        for (row, record) in records.into_iter().enumerate() {
            let entry = record
                .and_then(ColorEntry::try_from)
                .map_err(|violation| LoadError::Row { row, violation })?;
            entries.push(entry);
        }
        if entries.is_empty() {
            return Err(LoadError::Empty);
        }
        tracing::debug!(entries = entries.len(), "color table loaded");
        Ok(Self { entries })
    }

    /// Parse delimited text with a `name,r,g,b,hex` header line. Blank lines are skipped.
    /// No field may exceed [`MAX_FIELD_LEN`] bytes.
    pub fn from_csv(text: &str) -> Result<Self, LoadError> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let header = lines.next().ok_or(LoadError::Empty)?;

        let mut reader = serde_csv_core::Reader::<MAX_FIELD_LEN>::new();
        check_header(&mut reader, header)?;
        Self::load_records(lines.map(move |line| {
            reader
                .deserialize::<ColorRow>(line.as_bytes())
                .map(|(row, _)| row)
                .map_err(|e| match e {
                    serde_csv_core::de::Error::Overflow => RowViolation::FieldTooLong { limit: MAX_FIELD_LEN },
                    e => RowViolation::Malformed(e.to_string()),
                })
        }))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        Self::from_csv(std::str::from_utf8(bytes)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "reading color table");
        Self::from_bytes(&bytes)
    }

    /// The CSS named colors compiled into the binary.
    pub fn embedded() -> Result<Self, LoadError> {
        let file = EmbeddedTables::get(EMBEDDED_TABLE).ok_or(LoadError::MissingEmbedded(EMBEDDED_TABLE))?;
        Self::from_bytes(file.data.as_ref())
    }

    pub fn entries(&self) -> &[ColorEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColorEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for the usual collection surface.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ColorTable {
    type Item = &'a ColorEntry;
    type IntoIter = std::slice::Iter<'a, ColorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// the header goes through the same reader as the rows, so quoting behaves alike
fn check_header(reader: &mut serde_csv_core::Reader<MAX_FIELD_LEN>, line: &str) -> Result<(), LoadError> {
    let line = line.trim_start_matches('\u{feff}');
    // terminated so the reader sees the record end instead of asking for more input
    let record = format!("{line}\n");
    let columns = reader.deserialize::<Vec<String>>(record.as_bytes()).map(|(columns, _)| columns);
    let matches = columns.is_ok_and(|columns| {
        columns.len() == COLUMNS.len() && columns.iter().zip(COLUMNS).all(|(found, want)| found.trim().eq_ignore_ascii_case(want))
    });
    if !matches {
        return Err(LoadError::Header { found: line.to_string() });
    }
    Ok(())
}

#[derive(RustEmbed)]
#[folder = "data"]
struct EmbeddedTables;
