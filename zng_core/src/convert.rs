use log::info;

use crate::codec::Codec;
use crate::container::{ContainerFile, Direction};
use crate::error::ZngResult;
use crate::imaging::ImageCodec;
use crate::pipeline::{self, Levels, PassArtifacts};

/// Options for one conversion run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Compression levels, used only when producing a ZNG file.
    pub levels: Levels,
    /// Keep the intermediate pass buffers in the result.
    pub keep_passes: bool,
}

/// Outcome of a conversion.
#[derive(Debug)]
pub struct Conversion {
    pub direction: Direction,
    pub width: u32,
    pub height: u32,
    /// Bytes of the output file: a ZNG container or a PNG image.
    pub output: Vec<u8>,
    /// Present when [`ConvertOptions::keep_passes`] was set.
    pub passes: Option<PassArtifacts>,
}

/// Runs a single image <-> ZNG conversion with the given collaborators.
pub struct Converter<'a> {
    codec: &'a dyn Codec,
    images: &'a dyn ImageCodec,
}

impl<'a> Converter<'a> {
    pub fn new(codec: &'a dyn Codec, images: &'a dyn ImageCodec) -> Self {
        Self { codec, images }
    }

    /// Detect the direction from `input` and convert it.
    pub fn convert(&self, input: &[u8], options: &ConvertOptions) -> ZngResult<Conversion> {
        let direction = Direction::detect(input);
        info!("{direction:?}: {} input bytes via {}", input.len(), self.codec.name());

        let (image, output, passes) = match direction {
            Direction::ToContainer => {
                let image = self.images.decode(input)?;
                let (file, passes) =
                    pipeline::encode_with_passes(self.codec, &image, options.levels)?;
                (image, file.to_bytes(), passes)
            }
            Direction::ToImage => {
                let file = ContainerFile::from_bytes(input)?;
                let (image, passes) = pipeline::decode_with_passes(self.codec, &file)?;
                let output = self.images.encode(&image)?;
                (image, output, passes)
            }
        };

        Ok(Conversion {
            direction,
            width: image.width(),
            height: image.height(),
            output,
            passes: options.keep_passes.then_some(passes),
        })
    }
}
