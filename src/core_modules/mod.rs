pub mod color_table;
pub mod image_probe;
pub mod matcher;
pub mod pixel;
pub mod table_handle;
