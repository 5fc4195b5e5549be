// THEORY:
// The `ColorTable` module is the reference side of a lookup: an ordered list of named
// colors read once from a CSV file.
//
// Column resolution is the only subtle part. Tables in the wild spell their headers
// differently ("R", " r ", "Color Name", "color_name"), so headers are trimmed and
// compared case-insensitively. The name column is resolved in two steps:
// 1.  **Exact**: the first header in `NAME_HEADERS` order that is present wins.
// 2.  **Fallback**: otherwise any header containing both "color" and "name" is taken,
//     first one in file order. This is logged. Whenever more than one header could be
//     the name column (an exact hit included) that is logged too, since the pick may
//     then be the wrong column.
//
// If anything is unresolved, every missing column is reported at once (in R, G, B,
// color_name order) and no table is produced.
//
// Channel cells are parsed as integers and kept as given; they are not clamped to
// 0..=255.

pub mod color_table {
    use crate::core_modules::pixel::pixel::ReferenceChannel;
    use crate::error::{DetectError, Result};
    use log::{debug, warn};
    use std::fmt;
    use std::fs::File;
    use std::io::Read;
    use std::path::Path;

    /// Exact (lowercased) spellings accepted for the name column, in priority order.
    pub const NAME_HEADERS: [&str; 4] = ["color_name", "colour_name", "colorname", "name"];

    /// One named reference color.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ColorEntry {
        pub name: String,
        pub red: ReferenceChannel,
        pub green: ReferenceChannel,
        pub blue: ReferenceChannel,
    }

    impl ColorEntry {
        pub fn new(
            name: impl Into<String>,
            red: ReferenceChannel,
            green: ReferenceChannel,
            blue: ReferenceChannel,
        ) -> Self {
            Self {
                name: name.into(),
                red,
                green,
                blue,
            }
        }

        pub fn rgb(&self) -> (ReferenceChannel, ReferenceChannel, ReferenceChannel) {
            (self.red, self.green, self.blue)
        }
    }

    /// The four columns every table must provide.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum RequiredColumn {
        Red,
        Green,
        Blue,
        ColorName,
    }

    impl fmt::Display for RequiredColumn {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                RequiredColumn::Red => "R",
                RequiredColumn::Green => "G",
                RequiredColumn::Blue => "B",
                RequiredColumn::ColorName => "color_name",
            })
        }
    }

    /// Positions of the required columns within a header row.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ColumnMap {
        pub red: usize,
        pub green: usize,
        pub blue: usize,
        pub color_name: usize,
        /// The header row with surrounding whitespace stripped.
        pub headers: Vec<String>,
    }

    impl ColumnMap {
        pub fn resolve<I, S>(headers: I) -> Result<Self>
        where
            I: IntoIterator<Item = S>,
            S: AsRef<str>,
        {
            let headers: Vec<String> = headers
                .into_iter()
                .map(|header| header.as_ref().trim().to_string())
                .collect();
            let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
            let exact = |wanted: &str| lowered.iter().position(|h| h == wanted);

            let red = exact("r");
            let green = exact("g");
            let blue = exact("b");
            let color_name = Self::resolve_name(&headers, &lowered);

            let mut missing = Vec::new();
            if red.is_none() {
                missing.push(RequiredColumn::Red);
            }
            if green.is_none() {
                missing.push(RequiredColumn::Green);
            }
            if blue.is_none() {
                missing.push(RequiredColumn::Blue);
            }
            if color_name.is_none() {
                missing.push(RequiredColumn::ColorName);
            }

            match (red, green, blue, color_name) {
                (Some(red), Some(green), Some(blue), Some(color_name)) => Ok(Self {
                    red,
                    green,
                    blue,
                    color_name,
                    headers,
                }),
                _ => Err(DetectError::MissingColumns(missing)),
            }
        }

        fn resolve_name(headers: &[String], lowered: &[String]) -> Option<usize> {
            let candidates: Vec<usize> = lowered
                .iter()
                .enumerate()
                .filter(|(_, h)| h.contains("color") && h.contains("name"))
                .map(|(index, _)| index)
                .collect();

            let exact = NAME_HEADERS
                .iter()
                .find_map(|wanted| lowered.iter().position(|h| h == wanted));

            let chosen = match exact {
                Some(index) => index,
                None => {
                    let first = *candidates.first()?;
                    warn!(
                        "no exact color name header found, falling back to {:?}",
                        headers[first]
                    );
                    first
                }
            };

            let mut qualifying = candidates;
            if !qualifying.contains(&chosen) {
                qualifying.insert(0, chosen);
            }
            if qualifying.len() > 1 {
                let names: Vec<&str> = qualifying.iter().map(|&i| headers[i].as_str()).collect();
                warn!(
                    "several headers could be the color name column {:?}, using {:?}",
                    names, headers[chosen]
                );
            }
            Some(chosen)
        }

        /// Header text of a resolved column.
        pub fn header(&self, column: RequiredColumn) -> &str {
            let index = match column {
                RequiredColumn::Red => self.red,
                RequiredColumn::Green => self.green,
                RequiredColumn::Blue => self.blue,
                RequiredColumn::ColorName => self.color_name,
            };
            &self.headers[index]
        }
    }

    /// An ordered, immutable list of reference colors.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct ColorTable {
        entries: Vec<ColorEntry>,
        columns: Option<ColumnMap>,
    }

    impl ColorTable {
        pub fn from_entries(entries: Vec<ColorEntry>) -> Self {
            Self {
                entries,
                columns: None,
            }
        }

        pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref();
            let file = File::open(path).map_err(|source| DetectError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let table = Self::from_reader(file)?;
            debug!("loaded {} colors from {}", table.len(), path.display());
            Ok(table)
        }

        pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .from_reader(reader);

            let columns = ColumnMap::resolve(reader.headers()?.iter())?;
            debug!(
                "color table columns {:?} resolved to R={:?} G={:?} B={:?} name={:?}",
                columns.headers,
                columns.header(RequiredColumn::Red),
                columns.header(RequiredColumn::Green),
                columns.header(RequiredColumn::Blue),
                columns.header(RequiredColumn::ColorName),
            );

            let mut entries = Vec::new();
            for (index, record) in reader.records().enumerate() {
                let record = record?;
                let row = index + 1;
                let cell = |position: usize| record.get(position).unwrap_or("");

                entries.push(ColorEntry {
                    name: cell(columns.color_name).to_string(),
                    red: parse_channel(cell(columns.red), row, RequiredColumn::Red)?,
                    green: parse_channel(cell(columns.green), row, RequiredColumn::Green)?,
                    blue: parse_channel(cell(columns.blue), row, RequiredColumn::Blue)?,
                });
            }

            Ok(Self {
                entries,
                columns: Some(columns),
            })
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }

        pub fn entries(&self) -> &[ColorEntry] {
            &self.entries
        }

        pub fn iter(&self) -> std::slice::Iter<'_, ColorEntry> {
            self.entries.iter()
        }

        /// Column resolution of the CSV this table came from, if any.
        pub fn columns(&self) -> Option<&ColumnMap> {
            self.columns.as_ref()
        }
    }

    impl<'a> IntoIterator for &'a ColorTable {
        type Item = &'a ColorEntry;
        type IntoIter = std::slice::Iter<'a, ColorEntry>;

        fn into_iter(self) -> Self::IntoIter {
            self.iter()
        }
    }

    // Whole-number floats ("255.0") are accepted, spreadsheets like to write them.
    fn parse_channel(cell: &str, row: usize, column: RequiredColumn) -> Result<ReferenceChannel> {
        let trimmed = cell.trim();
        if let Ok(value) = trimmed.parse::<ReferenceChannel>() {
            return Ok(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value)
                if value.is_finite()
                    && value.fract() == 0.0
                    && value >= ReferenceChannel::MIN as f64
                    && value <= ReferenceChannel::MAX as f64 =>
            {
                Ok(value as ReferenceChannel)
            }
            _ => Err(DetectError::InvalidChannel {
                row,
                column,
                value: cell.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::color_table::*;
    use crate::error::DetectError;
    use std::cell::RefCell;

    #[test]
    fn resolves_mixed_case_and_padded_headers() {
        let columns = ColumnMap::resolve(["r", "G", " B ", "Color Name"]).expect("all columns present");
        assert_eq!((columns.red, columns.green, columns.blue, columns.color_name), (0, 1, 2, 3));
        assert_eq!(columns.header(RequiredColumn::Blue), "B");
    }

    #[test]
    fn reports_only_the_missing_blue_column() {
        let err = ColumnMap::resolve(["R", "G", "color_name"]).unwrap_err();
        assert_eq!(err.missing_columns(), Some(&[RequiredColumn::Blue][..]));
        assert_eq!(err.to_string(), "missing columns in color table: B");
    }

    #[test]
    fn reports_every_missing_column_in_order() {
        let err = ColumnMap::resolve(["hex", "label"]).unwrap_err();
        assert_eq!(
            err.missing_columns(),
            Some(
                &[
                    RequiredColumn::Red,
                    RequiredColumn::Green,
                    RequiredColumn::Blue,
                    RequiredColumn::ColorName
                ][..]
            )
        );
    }

    #[test]
    fn exact_name_header_beats_substring_match() {
        let columns =
            ColumnMap::resolve(["Color Name Fr", "R", "G", "B", "color_name"]).expect("resolves");
        assert_eq!(columns.header(RequiredColumn::ColorName), "color_name");
    }

    fn warnings_while_resolving(headers: &[&str]) -> Vec<String> {
        testing_logger::setup();
        ColumnMap::resolve(headers.iter().copied()).expect("resolves");
        let warnings = RefCell::new(Vec::new());
        testing_logger::validate(|captured| {
            *warnings.borrow_mut() = captured
                .iter()
                .filter(|entry| entry.level == log::Level::Warn)
                .map(|entry| entry.body.clone())
                .collect();
        });
        warnings.into_inner()
    }

    #[test]
    fn substring_fallback_warns_about_fallback_and_ambiguity() {
        let warnings =
            warnings_while_resolving(&["R", "G", "B", "Pretty Color Name", "Color Name (French)"]);
        assert_eq!(warnings.len(), 2, "{warnings:?}");
        assert!(warnings[0].contains("falling back to \"Pretty Color Name\""));
        assert!(warnings[1].contains("several headers"));
        assert!(warnings[1].contains("Color Name (French)"));
    }

    #[test]
    fn single_substring_candidate_warns_only_about_fallback() {
        let warnings = warnings_while_resolving(&["R", "G", "B", "Color Name"]);
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert!(warnings[0].contains("falling back"));
    }

    #[test]
    fn exact_header_alone_resolves_silently() {
        let warnings = warnings_while_resolving(&["color", "color_name", "hex", "R", "G", "B"]);
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn exact_header_shadowing_other_candidates_warns() {
        let warnings = warnings_while_resolving(&["Color Name Fr", "R", "G", "B", "color_name"]);
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert!(warnings[0].contains("several headers"));
        assert!(warnings[0].contains("Color Name Fr"));
        assert!(!warnings[0].contains("falling back"));
    }

    #[test]
    fn plain_name_header_is_accepted() {
        let columns = ColumnMap::resolve(["Name", "R", "G", "B"]).expect("resolves");
        assert_eq!(columns.color_name, 0);
    }

    #[test]
    fn substring_fallback_takes_first_candidate() {
        let columns =
            ColumnMap::resolve(["R", "G", "B", "Pretty Color Name", "Color Name (French)"])
                .expect("resolves");
        assert_eq!(columns.header(RequiredColumn::ColorName), "Pretty Color Name");
    }

    #[test]
    fn channel_headers_must_match_exactly() {
        let err = ColumnMap::resolve(["Red", "G", "B", "name"]).unwrap_err();
        assert_eq!(err.missing_columns(), Some(&[RequiredColumn::Red][..]));
    }

    #[test]
    fn loads_rows_in_file_order() {
        let csv = "color, color_name ,hex,R,G,B\n\
                   red,Red,#ff0000,255,0,0\n\
                   green,Green,#00ff00,0, 255 ,0\n";
        let table = ColorTable::from_reader(csv.as_bytes()).expect("table loads");

        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0], ColorEntry::new("Red", 255, 0, 0));
        assert_eq!(table.entries()[1], ColorEntry::new("Green", 0, 255, 0));
        let columns = table.columns().expect("csv tables keep their columns");
        assert_eq!(columns.headers, vec!["color", "color_name", "hex", "R", "G", "B"]);
    }

    #[test]
    fn accepts_whole_number_floats_and_out_of_range_values() {
        let csv = "name,R,G,B\nodd,255.0,300,-1\n";
        let table = ColorTable::from_reader(csv.as_bytes()).expect("table loads");
        assert_eq!(table.entries()[0].rgb(), (255, 300, -1));
    }

    #[test]
    fn rejects_non_numeric_channels() {
        let csv = "name,R,G,B\nok,1,2,3\nbad,1,x,3\n";
        let err = ColorTable::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            DetectError::InvalidChannel { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, RequiredColumn::Green);
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_file_loads_as_empty_table() {
        let table = ColorTable::from_reader("R,G,B,color_name\n".as_bytes()).expect("loads");
        assert!(table.is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ColorTable::from_path("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DetectError::Io { .. }));
    }
}
