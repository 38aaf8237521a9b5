use serde::Serialize;

use crate::color::Rgb;
use crate::color_table::{ColorEntry, ColorTable};
use crate::error::InvalidQuery;

// Nearest reference color by flat Euclidean distance in RGB space.
// Squared integer distances are compared; sqrt is only taken for the winner.

pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_HEX: &str = "#000000";

/// A color to look up. Channels are wide so that out-of-range producers can
/// be either clamped or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Query {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl Query {
    pub const fn new(r: i32, g: i32, b: i32) -> Self {
        Self { r, g, b }
    }

    /// Saturate every channel into 0..=255.
    pub fn clamped(self) -> Rgb {
        let c = |v: i32| v.clamp(0, 255) as u8;
        Rgb::new(c(self.r), c(self.g), c(self.b))
    }

    /// Reject the first channel outside 0..=255.
    pub fn validate(self) -> Result<Rgb, InvalidQuery> {
        let c = |channel: char, value: i32| u8::try_from(value).map_err(|_| InvalidQuery { channel, value });
        Ok(Rgb::new(c('r', self.r)?, c('g', self.g)?, c('b', self.b)?))
    }
}

impl From<Rgb> for Query {
    fn from(c: Rgb) -> Self {
        Self::new(c.r.into(), c.g.into(), c.b.into())
    }
}

impl From<image::Rgb<u8>> for Query {
    fn from(p: image::Rgb<u8>) -> Self {
        Rgb::from(p).into()
    }
}

impl From<(i32, i32, i32)> for Query {
    fn from((r, g, b): (i32, i32, i32)) -> Self {
        Self::new(r, g, b)
    }
}

/// Winning entry's name and hex, plus the true Euclidean distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub name: String,
    pub hex: String,
    pub distance: f64,
}

impl MatchResult {
    /// Placeholder handed to display code when no match could be made.
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_NAME.to_string(),
            hex: UNKNOWN_HEX.to_string(),
            distance: f64::INFINITY,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.distance.is_infinite() && self.name == UNKNOWN_NAME
    }

    fn from_entry(entry: &ColorEntry, d2: u32) -> Self {
        Self {
            name: entry.name().to_string(),
            hex: entry.hex().to_string(),
            distance: f64::from(d2).sqrt(),
        }
    }
}

#[inline]
fn dist_rgb2(a: Rgb, b: Rgb) -> u32 {
    let dr = i32::from(a.r) - i32::from(b.r);
    let dg = i32::from(a.g) - i32::from(b.g);
    let db = i32::from(a.b) - i32::from(b.b);
    (dr * dr + dg * dg + db * db) as u32
}

/// Index of the entry nearest to `color` and its squared distance.
/// Ties go to the earliest entry; `None` only for an empty slice.
pub fn best_index(color: Rgb, entries: &[ColorEntry]) -> Option<(usize, u32)> {
    let mut best: Option<(usize, u32)> = None;
    for (i, entry) in entries.iter().enumerate() {
        let d = dist_rgb2(color, entry.rgb());
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((i, d));
            if d == 0 {
                break;
            }
        }
    }
    best
}

/// Nearest entry in an arbitrary slice. An empty slice yields [`MatchResult::unknown`].
pub fn closest_in(query: impl Into<Query>, entries: &[ColorEntry]) -> MatchResult {
    let color = query.into().clamped();
    match best_index(color, entries) {
        Some((i, d2)) => MatchResult::from_entry(&entries[i], d2),
        None => {
            tracing::warn!(%color, "no reference colors to match against");
            MatchResult::unknown()
        }
    }
}

/// Nearest entry in `table`, clamping out-of-range channels first.
pub fn closest(query: impl Into<Query>, table: &ColorTable) -> MatchResult {
    closest_in(query, table.entries())
}

/// Like [`closest`] but rejects out-of-range channels instead of clamping.
pub fn try_closest(query: impl Into<Query>, table: &ColorTable) -> Result<MatchResult, InvalidQuery> {
    let color = query.into().validate()?;
    Ok(closest_in(color, table.entries()))
}

/// Strict lookup that degrades to [`MatchResult::unknown`] on a bad query.
pub fn closest_or_unknown(query: impl Into<Query>, table: &ColorTable) -> MatchResult {
    try_closest(query, table).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "color lookup failed");
        MatchResult::unknown()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_table::ColorRow;

    fn black_white() -> ColorTable {
        ColorTable::load([
            ColorRow::new("Black", 0, 0, 0, "#000000"),
            ColorRow::new("White", 255, 255, 255, "#ffffff"),
        ])
        .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-2
    }

    #[test]
    fn near_black() {
        let m = closest((10, 10, 10), &black_white());
        assert_eq!(m.name, "Black");
        assert_eq!(m.hex, "#000000");
        assert!(approx(m.distance, 17.32), "{}", m.distance);
    }

    #[test]
    fn near_white() {
        let m = closest((250, 250, 250), &black_white());
        assert_eq!(m.name, "White");
        assert_eq!(m.hex, "#ffffff");
        assert!(approx(m.distance, 8.66), "{}", m.distance);
    }

    #[test]
    fn duplicate_rgb_keeps_first() {
        let table = ColorTable::load([
            ColorRow::new("Red", 255, 0, 0, "#ff0000"),
            ColorRow::new("AlsoRed", 255, 0, 0, "#ff0000"),
        ])
        .unwrap();
        let m = closest((255, 0, 0), &table);
        assert_eq!(m.name, "Red");
        assert_eq!(m.distance, 0.0);
    }

    #[test]
    fn equidistant_entries_keep_first() {
        // (100,0,0) is 100 away from both
        let table = ColorTable::load([
            ColorRow::new("Dark", 0, 0, 0, "#000000"),
            ColorRow::new("Bright", 200, 0, 0, "#c80000"),
        ])
        .unwrap();
        assert_eq!(closest((100, 0, 0), &table).name, "Dark");

        let reversed = ColorTable::load([
            ColorRow::new("Bright", 200, 0, 0, "#c80000"),
            ColorRow::new("Dark", 0, 0, 0, "#000000"),
        ])
        .unwrap();
        assert_eq!(closest((100, 0, 0), &reversed).name, "Bright");
    }

    #[test]
    fn repeated_queries_agree() {
        let table = ColorTable::embedded().unwrap();
        let first = closest((12, 200, 77), &table);
        for _ in 0..10 {
            assert_eq!(closest((12, 200, 77), &table), first);
        }
    }

    #[test]
    fn result_is_the_argmin() {
        let table = ColorTable::embedded().unwrap();
        for q in [Rgb::new(3, 140, 250), Rgb::new(90, 90, 10), Rgb::new(250, 10, 128)] {
            let m = closest(q, &table);
            for e in &table {
                assert!(m.distance <= f64::from(dist_rgb2(q, e.rgb())).sqrt());
            }
        }
    }

    #[test]
    fn reports_rooted_distance() {
        let m = closest((3, 4, 0), &black_white());
        assert_eq!(m.distance, 5.0);
    }

    #[test]
    fn clamps_out_of_range_channels() {
        let table = black_white();
        let m = closest((300, 260, 999), &table);
        assert_eq!(m.name, "White");
        assert_eq!(m.distance, 0.0);
        assert_eq!(closest((-20, -1, 0), &table).distance, 0.0);
    }

    #[test]
    fn strict_lookup_rejects_out_of_range() {
        let table = black_white();
        assert_eq!(
            try_closest((0, 256, -3), &table),
            Err(InvalidQuery { channel: 'g', value: 256 })
        );
        assert_eq!(try_closest((1, 1, 1), &table).unwrap().name, "Black");
    }

    #[test]
    fn strict_lookup_falls_back_to_unknown() {
        let m = closest_or_unknown((-1, 0, 0), &black_white());
        assert!(m.is_unknown());
        assert_eq!(m.name, "Unknown");
        assert_eq!(m.hex, "#000000");
        assert_eq!(m.distance, f64::INFINITY);

        assert_eq!(closest_or_unknown((255, 255, 255), &black_white()).name, "White");
    }

    #[test]
    fn empty_slice_yields_unknown() {
        assert_eq!(closest_in((1, 2, 3), &[]), MatchResult::unknown());
        assert_eq!(best_index(Rgb::BLACK, &[]), None);
    }

    #[test]
    fn exact_match_is_never_unknown() {
        // a genuine "Black" hit shares the sentinel's hex but not its distance
        let m = closest(Rgb::BLACK, &black_white());
        assert_eq!(m.hex, "#000000");
        assert!(!m.is_unknown());
    }

    #[test]
    fn query_conversions() {
        assert_eq!(Query::from(Rgb::new(1, 2, 3)), Query::new(1, 2, 3));
        assert_eq!(Query::from(image::Rgb([4u8, 5, 6])), Query::new(4, 5, 6));
        assert_eq!(Query::new(-5, 128, 900).clamped(), Rgb::new(0, 128, 255));
        assert_eq!(Query::new(0, 0, 256).validate(), Err(InvalidQuery { channel: 'b', value: 256 }));
    }
}
