// THEORY:
// The reference table is static for a session, so it is read at most once. Instead of
// a process-wide cache, the memo lives in a `TableHandle` that the caller constructs and
// owns: whoever holds the handle decides how long the table lives, and dropping the
// handle is the only invalidation there is.
//
// The memo is a `OnceLock`. A load that fails is not stored, so the next access reads
// the file again and picks up a corrected table.

pub mod table_handle {
    use crate::core_modules::color_table::color_table::ColorTable;
    use crate::error::{DetectError, Result};
    use log::debug;
    use std::path::{Path, PathBuf};
    use std::sync::OnceLock;

    /// Where a handle gets its table from.
    #[derive(Debug, Clone)]
    pub enum TableSource {
        /// A CSV file, read on first access.
        Path(PathBuf),
        /// A table that is already in memory.
        Inline(ColorTable),
    }

    /// A load-once handle to a `ColorTable`.
    #[derive(Debug)]
    pub struct TableHandle {
        /// File to read on first access; `None` for handles built from an inline table.
        path: Option<PathBuf>,
        table: OnceLock<ColorTable>,
    }

    impl TableHandle {
        pub fn new(source: TableSource) -> Self {
            match source {
                TableSource::Path(path) => Self {
                    path: Some(path),
                    table: OnceLock::new(),
                },
                TableSource::Inline(table) => Self {
                    path: None,
                    table: OnceLock::from(table),
                },
            }
        }

        pub fn from_path(path: impl Into<PathBuf>) -> Self {
            Self::new(TableSource::Path(path.into()))
        }

        pub fn from_table(table: ColorTable) -> Self {
            Self::new(TableSource::Inline(table))
        }

        /// Returns the table, reading it on the first successful call only.
        pub fn table(&self) -> Result<&ColorTable> {
            if let Some(table) = self.table.get() {
                return Ok(table);
            }

            // Inline handles are filled at construction, only path handles get here.
            let path = self.path.as_deref().ok_or(DetectError::EmptyTable)?;
            debug!("reading color table from {}", path.display());
            let loaded = ColorTable::from_path(path)?;

            // Another thread may have won the race; either copy is the same table.
            Ok(self.table.get_or_init(|| loaded))
        }

        pub fn is_loaded(&self) -> bool {
            self.table.get().is_some()
        }

        /// The CSV file behind this handle, if it was built from one.
        pub fn path(&self) -> Option<&Path> {
            self.path.as_deref()
        }
    }
}
