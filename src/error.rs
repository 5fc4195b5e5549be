// THEORY:
// Every failure the detector can hit while serving one interaction. None of them
// are retryable on their own: the caller has to fix the input (a table with the
// right columns, a decodable image, coordinates inside the image) and try again.

use crate::core_modules::color_table::color_table::RequiredColumn;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("missing columns in color table: {}", join_columns(.0))]
    MissingColumns(Vec<RequiredColumn>),

    #[error("color table has no entries")]
    EmptyTable,

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("could not parse color table: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("row {row}: column {column} holds {value:?}, expected an integer")]
    InvalidChannel {
        row: usize,
        column: RequiredColumn,
        value: String,
    },

    #[error("pixel ({x}, {y}) is outside the {width}x{height} image")]
    CoordinatesOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

impl DetectError {
    /// The required columns a table was missing, if that is what went wrong.
    pub fn missing_columns(&self) -> Option<&[RequiredColumn]> {
        match self {
            DetectError::MissingColumns(columns) => Some(columns),
            _ => None,
        }
    }
}

fn join_columns(columns: &[RequiredColumn]) -> String {
    columns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, DetectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_message_lists_each_column() {
        let err = DetectError::MissingColumns(vec![RequiredColumn::Blue, RequiredColumn::ColorName]);
        assert_eq!(err.to_string(), "missing columns in color table: B, color_name");
        assert_eq!(
            err.missing_columns(),
            Some(&[RequiredColumn::Blue, RequiredColumn::ColorName][..])
        );
    }

    #[test]
    fn other_errors_report_no_missing_columns() {
        assert!(DetectError::EmptyTable.missing_columns().is_none());
    }
}
