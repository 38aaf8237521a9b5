//! Name the color of a picked pixel by nearest match against a table of named colors.
//!
//! ```no_run
//! use color_namer::{ColorTable, closest};
//!
//! let table = ColorTable::embedded()?;
//! let hit = closest((250, 100, 70), &table);
//! println!("{} {}", hit.name, hit.hex);
//! # Ok::<(), color_namer::LoadError>(())
//! ```

pub mod color;
pub mod color_match;
pub mod color_table;
pub mod error;
pub mod image_io;

pub use color::Rgb;
pub use color_match::{MatchResult, Query, closest, closest_in, closest_or_unknown, try_closest};
pub use color_table::{ColorEntry, ColorRow, ColorTable};
pub use error::{InvalidQuery, LoadError, RowViolation};
