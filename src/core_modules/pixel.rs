// THEORY:
// The `Pixel` module holds the query side of a lookup: the RGB triple read out of the
// image at the coordinate the user picked. It is a "dumb" data container that only
// knows how to measure itself against a reference color and how to print itself.
//
// Key principles:
// 1.  **Transient**: a `QueryPixel` lives for one interaction and is never stored.
// 2.  **Alpha is gone**: images are decoded to RGB8 before sampling, so there is no
//     alpha channel to carry around.
// 3.  **One metric**: closeness is the Manhattan (L1) distance in raw RGB space. It is
//     not perceptual; it is cheap and it is what the reference tables were built for.

pub mod pixel {
    use serde::Serialize;

    pub type Byte = u8;
    pub type Channel = Byte;
    /// Channel values of a reference color, taken as given from the table.
    pub type ReferenceChannel = i32;
    pub type ColorDistance = u64;

    pub const CHANNELS: usize = 3;

    /// The RGB triple sampled from an image.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct QueryPixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
    }

    impl QueryPixel {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }

        /// Sum of absolute per-channel differences to a reference color.
        pub fn manhattan_distance(
            &self,
            (red, green, blue): (ReferenceChannel, ReferenceChannel, ReferenceChannel),
        ) -> ColorDistance {
            // Each term is below 2^32 for i32 references, so the u64 sum cannot overflow.
            (self.red as i64 - red as i64).unsigned_abs()
                + (self.green as i64 - green as i64).unsigned_abs()
                + (self.blue as i64 - blue as i64).unsigned_abs()
        }

        /// `#rrggbb`
        pub fn hex(&self) -> String {
            format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        }

        /// `rgb(r,g,b)`, usable directly as a CSS color.
        pub fn css_rgb(&self) -> String {
            format!("rgb({},{},{})", self.red, self.green, self.blue)
        }
    }

    impl From<image::Rgb<Byte>> for QueryPixel {
        fn from(rgb: image::Rgb<Byte>) -> Self {
            let [red, green, blue] = rgb.0;
            Self::new(red, green, blue)
        }
    }

    impl From<[Byte; CHANNELS]> for QueryPixel {
        fn from([red, green, blue]: [Byte; CHANNELS]) -> Self {
            Self::new(red, green, blue)
        }
    }

    impl From<QueryPixel> for image::Rgb<Byte> {
        fn from(pixel: QueryPixel) -> Self {
            image::Rgb([pixel.red, pixel.green, pixel.blue])
        }
    }
}
