// THEORY:
// Entry point of the `color_namer` library. The public face is the `pipeline` module
// (`DetectionPipeline`, `PipelineConfig`, `Detection`) plus the error type. The pieces
// under `core_modules` stay public for callers that only need one of them, such as a
// bare table lookup without any image involved.

pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use core_modules::color_table::color_table::{ColorEntry, ColorTable, RequiredColumn};
pub use core_modules::matcher::matcher::{ColorMatch, closest, closest_match};
pub use core_modules::table_handle::table_handle::{TableHandle, TableSource};
pub use error::{DetectError, Result};
pub use pipeline::{Detection, DetectionPipeline, PipelineConfig, QueryPixel};
