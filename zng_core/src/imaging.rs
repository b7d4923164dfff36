use crate::error::ZngResult;
use crate::pixels::PixelBuffer;

/// Conversion between standard image files and raw RGBA pixels.
///
/// Implementations decode whatever formats they support into RGBA8 and
/// encode to PNG. Decode failures must be reported as
/// [`ZngError::UnsupportedImageFormat`](crate::ZngError::UnsupportedImageFormat).
pub trait ImageCodec {
    /// Decode an encoded image into RGBA8 pixels.
    fn decode(&self, bytes: &[u8]) -> ZngResult<PixelBuffer>;

    /// Encode RGBA8 pixels as a PNG file in memory.
    fn encode(&self, image: &PixelBuffer) -> ZngResult<Vec<u8>>;
}
