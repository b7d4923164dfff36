use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use log::debug;
use zng_core::{ImageCodec, PixelBuffer, ZngError, ZngResult};

/// Image collaborator backed by the `image` crate.
///
/// Decodes any format the enabled `image` features recognize (PNG, JPEG,
/// BMP, GIF, TGA, PNM) into RGBA8, and always encodes PNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngImageCodec;

impl ImageCodec for PngImageCodec {
    fn decode(&self, bytes: &[u8]) -> ZngResult<PixelBuffer> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ZngError::UnsupportedImageFormat(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        debug!("decoded {width}x{height} image ({:?})", decoded.color());
        PixelBuffer::new(width, height, rgba.into_raw())
    }

    fn encode(&self, image: &PixelBuffer) -> ZngResult<Vec<u8>> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(
                image.as_bytes(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| ZngError::ImageEncode(e.to_string()))?;
        Ok(out)
    }
}
