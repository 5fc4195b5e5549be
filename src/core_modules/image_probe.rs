// THEORY:
// The `ImageProbe` module is the boundary with the image library. It decodes whatever
// raster format the user hands over into a plain RGB8 grid, reads a single pixel out of
// it, and writes solid-color swatches back out as PNG.
//
// Coordinates are checked here rather than trusted: x must lie in [0, width-1] and
// y in [0, height-1].

pub mod image_probe {
    use crate::core_modules::pixel::pixel::QueryPixel;
    use crate::error::{DetectError, Result};
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder, RgbImage};
    use std::fs::File;
    use std::io::{BufWriter, Write};
    use std::path::Path;

    pub const SWATCH_SIZE: u32 = 100;

    /// Decodes an encoded image (PNG, JPEG, ...) and drops any alpha channel.
    pub fn decode(bytes: &[u8]) -> Result<RgbImage> {
        Ok(image::load_from_memory(bytes)?.to_rgb8())
    }

    pub fn open(path: impl AsRef<Path>) -> Result<RgbImage> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| DetectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        decode(&bytes)
    }

    pub fn pixel_at(image: &RgbImage, x: u32, y: u32) -> Result<QueryPixel> {
        let (width, height) = image.dimensions();
        if x >= width || y >= height {
            return Err(DetectError::CoordinatesOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        Ok(QueryPixel::from(*image.get_pixel(x, y)))
    }

    /// Encodes `image` as PNG into `output`.
    pub fn write_png<W: Write>(output: W, image: &RgbImage) -> Result<()> {
        let encoder = PngEncoder::new(output);
        encoder
            .write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgb8)
            .map_err(DetectError::Encode)
    }

    /// Writes a `width` x `height` PNG filled with `pixel`.
    pub fn save_swatch(path: impl AsRef<Path>, pixel: QueryPixel, width: u32, height: u32) -> Result<()> {
        let path = path.as_ref();
        let output = File::create(path).map_err(|source| DetectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let swatch = RgbImage::from_pixel(width, height, pixel.into());
        write_png(BufWriter::new(output), &swatch)
    }
}
