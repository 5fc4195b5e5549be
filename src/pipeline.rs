// THEORY:
// The `pipeline` module is the top-level API of the detector. It wires the pieces of
// `core_modules` into the one interaction the tool supports:
//
//   image + (x, y) -> sampled pixel -> table (loaded once) -> closest name -> Detection
//
// The pipeline owns the `TableHandle`, so the table lives exactly as long as the
// pipeline does. `detect` takes `&self`, which lets a single pipeline be shared between
// request handlers; the table is read-only once loaded.

use crate::core_modules::color_table::color_table::ColorTable;
use crate::core_modules::image_probe::image_probe;
use crate::core_modules::matcher::matcher;
use crate::core_modules::table_handle::table_handle::TableHandle;
use crate::error::Result;
use image::RgbImage;
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

// Re-export key data structures for the public API.
pub use crate::core_modules::pixel::pixel::{ColorDistance, QueryPixel};

pub const DEFAULT_COLORS_PATH: &str = "colors.csv";

/// Configuration for the DetectionPipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// CSV file holding the reference colors.
    pub colors_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            colors_path: PathBuf::from(DEFAULT_COLORS_PATH),
        }
    }
}

/// The outcome of one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    /// Name of the closest reference color.
    pub name: String,
    /// The pixel that was sampled.
    pub pixel: QueryPixel,
    /// Manhattan distance between the pixel and the named color.
    pub distance: ColorDistance,
}

impl Detection {
    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.pixel.red, self.pixel.green, self.pixel.blue)
    }

    /// A 100x100 rounded block filled with the sampled color.
    pub fn swatch_html(&self) -> String {
        format!(
            "<div style='width:100px;height:100px;background-color:{};border-radius:10px'></div>",
            self.pixel.css_rgb()
        )
    }
}

/// The main, top-level struct of the detector.
#[derive(Debug)]
pub struct DetectionPipeline {
    table: TableHandle,
}

impl DetectionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            table: TableHandle::from_path(config.colors_path),
        }
    }

    pub fn with_table(table: ColorTable) -> Self {
        Self {
            table: TableHandle::from_table(table),
        }
    }

    /// The reference table, loading it if this is the first access.
    pub fn table(&self) -> Result<&ColorTable> {
        self.table.table()
    }

    pub fn detect(&self, image: &RgbImage, x: u32, y: u32) -> Result<Detection> {
        let pixel = image_probe::pixel_at(image, x, y)?;
        let table = self.table.table()?;
        let found = matcher::closest_match(&pixel, table)?;

        info!(
            "pixel ({}, {}) = {} named {:?} at distance {}",
            x,
            y,
            pixel.hex(),
            found.name(),
            found.distance
        );

        Ok(Detection {
            name: found.name().to_string(),
            pixel,
            distance: found.distance,
        })
    }

    pub fn detect_bytes(&self, encoded: &[u8], x: u32, y: u32) -> Result<Detection> {
        let image = image_probe::decode(encoded)?;
        self.detect(&image, x, y)
    }

    pub fn detect_path(&self, path: impl AsRef<Path>, x: u32, y: u32) -> Result<Detection> {
        let image = image_probe::open(path)?;
        self.detect(&image, x, y)
    }
}
