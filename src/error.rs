use std::path::PathBuf;

use thiserror::Error;

/// Fatal, startup-time failure to build a [`crate::ColorTable`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read color table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("color table is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("embedded color table {0:?} is missing")]
    MissingEmbedded(&'static str),
    #[error("color table has no entries")]
    Empty,
    #[error("unexpected header {found:?}, expected \"name,r,g,b,hex\"")]
    Header { found: String },
    #[error("row {row}: {violation}")]
    Row { row: usize, violation: RowViolation },
}

impl LoadError {
    /// Index of the offending data row, if the failure is tied to one.
    pub fn row(&self) -> Option<usize> {
        match self {
            LoadError::Row { row, .. } => Some(*row),
            _ => None,
        }
    }
}

/// The specific constraint a reference row broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowViolation {
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("a field is longer than {limit} bytes")]
    FieldTooLong { limit: usize },
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("`{field}` is not an integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },
    #[error("`{field}` = {value} is outside 0..=255")]
    OutOfRange { field: &'static str, value: i64 },
    #[error("hex {0:?} is not of the form #RRGGBB")]
    BadHex(String),
    #[error("hex {hex} does not match ({r}, {g}, {b})")]
    HexMismatch { hex: String, r: u8, g: u8, b: u8 },
}

/// A query channel outside 0..=255 under strict validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("query channel `{channel}` = {value} is outside 0..=255")]
pub struct InvalidQuery {
    pub channel: char,
    pub value: i32,
}
