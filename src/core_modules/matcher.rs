// THEORY:
// The `Matcher` answers one question: which reference color is closest to this pixel?
//
// It is a single linear scan with Manhattan distance. Only a strictly smaller distance
// replaces the current best, so when several entries tie the one that appears first in
// the table wins, and the answer for a given (query, table) pair never changes.
//
// A scan is O(n) in the table size. Named color tables run from tens to a few thousand
// rows, where a spatial index (k-d tree, grid) would cost more to build than it saves.
// That changes only if tables grow by orders of magnitude.

pub mod matcher {
    use crate::core_modules::color_table::color_table::{ColorEntry, ColorTable};
    use crate::core_modules::pixel::pixel::{Channel, ColorDistance, QueryPixel};
    use crate::error::{DetectError, Result};

    /// The winning entry of a scan and how far it is from the query.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ColorMatch<'a> {
        pub entry: &'a ColorEntry,
        pub distance: ColorDistance,
    }

    impl ColorMatch<'_> {
        pub fn name(&self) -> &str {
            &self.entry.name
        }

        pub fn is_exact(&self) -> bool {
            self.distance == 0
        }
    }

    pub fn closest_match<'a>(query: &QueryPixel, table: &'a ColorTable) -> Result<ColorMatch<'a>> {
        let mut entries = table.iter();
        let first = entries.next().ok_or(DetectError::EmptyTable)?;
        let mut best = ColorMatch {
            entry: first,
            distance: query.manhattan_distance(first.rgb()),
        };

        for entry in entries {
            if best.distance == 0 {
                break;
            }
            let distance = query.manhattan_distance(entry.rgb());
            if distance < best.distance {
                best = ColorMatch { entry, distance };
            }
        }

        Ok(best)
    }

    /// Name of the closest entry.
    pub fn closest<'a>(query: &QueryPixel, table: &'a ColorTable) -> Result<&'a str> {
        closest_match(query, table).map(|found| found.entry.name.as_str())
    }

    pub fn closest_rgb(red: Channel, green: Channel, blue: Channel, table: &ColorTable) -> Result<&str> {
        closest(&QueryPixel::new(red, green, blue), table)
    }
}

#[cfg(test)]
mod tests {
    use super::matcher::*;
    use crate::core_modules::color_table::color_table::{ColorEntry, ColorTable};
    use crate::core_modules::pixel::pixel::QueryPixel;
    use crate::error::DetectError;

    fn primaries() -> ColorTable {
        ColorTable::from_entries(vec![
            ColorEntry::new("red", 255, 0, 0),
            ColorEntry::new("green", 0, 255, 0),
        ])
    }

    fn palette() -> ColorTable {
        ColorTable::from_entries(vec![
            ColorEntry::new("black", 0, 0, 0),
            ColorEntry::new("white", 255, 255, 255),
            ColorEntry::new("red", 255, 0, 0),
            ColorEntry::new("lime", 0, 255, 0),
            ColorEntry::new("blue", 0, 0, 255),
            ColorEntry::new("gray", 128, 128, 128),
            ColorEntry::new("orange", 255, 165, 0),
            ColorEntry::new("teal", 0, 128, 128),
        ])
    }

    #[test]
    fn picks_red_for_a_reddish_pixel() {
        let table = primaries();
        let found = closest_match(&QueryPixel::new(250, 10, 5), &table).expect("non-empty table");
        assert_eq!(found.name(), "red");
        assert_eq!(found.distance, 15);
        assert_eq!(closest_rgb(250, 10, 5, &table).expect("non-empty table"), "red");
    }

    #[test]
    fn empty_table_is_an_error() {
        let table = ColorTable::default();
        assert!(matches!(
            closest(&QueryPixel::new(1, 2, 3), &table),
            Err(DetectError::EmptyTable)
        ));
    }

    #[test]
    fn first_entry_wins_ties() {
        let table = ColorTable::from_entries(vec![
            ColorEntry::new("first", 10, 0, 0),
            ColorEntry::new("second", 0, 10, 0),
            ColorEntry::new("third", 0, 0, 10),
        ]);
        let found = closest_match(&QueryPixel::new(0, 0, 0), &table).expect("non-empty");
        assert_eq!(found.name(), "first");
        assert_eq!(found.distance, 10);
    }

    #[test]
    fn exact_match_prefers_the_earliest_duplicate() {
        let table = ColorTable::from_entries(vec![
            ColorEntry::new("near", 10, 10, 11),
            ColorEntry::new("navy-ish", 10, 10, 10),
            ColorEntry::new("duplicate", 10, 10, 10),
        ]);
        let found = closest_match(&QueryPixel::new(10, 10, 10), &table).expect("non-empty");
        assert!(found.is_exact());
        assert_eq!(found.name(), "navy-ish");
    }

    #[test]
    fn result_is_in_table_and_no_entry_is_closer() {
        let table = palette();
        for red in (0..=255u16).step_by(17) {
            for green in (0..=255u16).step_by(51) {
                for blue in (0..=255u16).step_by(85) {
                    let query = QueryPixel::new(red as u8, green as u8, blue as u8);
                    let found = closest_match(&query, &table).expect("non-empty");

                    assert!(table.iter().any(|entry| std::ptr::eq(entry, found.entry)));
                    let best = table
                        .iter()
                        .map(|entry| query.manhattan_distance(entry.rgb()))
                        .min()
                        .expect("non-empty");
                    assert_eq!(found.distance, best);
                }
            }
        }
    }

    #[test]
    fn extreme_channel_values_never_look_like_a_match() {
        let csv = "name,R,G,B\nfar,2147483647,2147483647,2\nblack,0,0,0\n";
        let table = ColorTable::from_reader(csv.as_bytes()).expect("table loads");

        let found = closest_match(&QueryPixel::new(0, 0, 0), &table).expect("non-empty");
        assert_eq!(found.name(), "black");
        assert!(found.is_exact());

        let extremes = ColorTable::from_entries(vec![
            ColorEntry::new("min", i32::MIN, i32::MIN, i32::MIN),
            ColorEntry::new("max", i32::MAX, i32::MAX, i32::MAX),
        ]);
        let far = closest_match(&QueryPixel::new(255, 255, 255), &extremes).expect("non-empty");
        assert_eq!(far.name(), "max");
        assert_eq!(far.distance, 3 * (i32::MAX as u64 - 255));
    }

    #[test]
    fn repeated_lookups_agree() {
        let table = palette();
        let query = QueryPixel::new(200, 120, 30);
        let first = closest(&query, &table).expect("non-empty");
        let second = closest(&query, &table).expect("non-empty");
        assert_eq!(first, second);
        assert_eq!(first, "orange");
    }
}
