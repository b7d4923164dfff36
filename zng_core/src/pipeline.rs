//! The double-pass pipeline.
//!
//! Encode compresses the pixels (pass 1), then compresses the *serialized*
//! pass 1 block, header included (pass 2). The outer block's declared
//! uncompressed size is therefore the inner block's serialized length, not
//! the pixel count. Decode undoes the two passes in reverse order.

use log::debug;

use crate::block::{self, CompressedBlock};
use crate::codec::Codec;
use crate::container::ContainerFile;
use crate::error::{BlockError, Pass, ZngError, ZngResult};
use crate::format::ZngHeader;
use crate::pixels::PixelBuffer;

/// Compression levels for the two encode passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Levels {
    pub first: i32,
    pub second: i32,
}

impl Levels {
    pub const DEFAULT_LEVEL: i32 = 9;

    pub fn new(first: i32, second: i32) -> Self {
        Self { first, second }
    }
}

impl Default for Levels {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LEVEL, Self::DEFAULT_LEVEL)
    }
}

/// Intermediate buffers, kept for inspection.
///
/// After encode: `pass1` is the serialized inner block and `pass2` the
/// serialized outer block. After decode: `pass1` is the outer block
/// decompressed (the serialized inner block) and `pass2` the raw pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassArtifacts {
    pub pass1: Vec<u8>,
    pub pass2: Vec<u8>,
}

/// Compress `image` into a ZNG container.
pub fn encode(codec: &dyn Codec, image: &PixelBuffer, levels: Levels) -> ZngResult<ContainerFile> {
    encode_with_passes(codec, image, levels).map(|(file, _)| file)
}

/// Like [`encode`], also returning both serialized blocks.
pub fn encode_with_passes(
    codec: &dyn Codec,
    image: &PixelBuffer,
    levels: Levels,
) -> ZngResult<(ContainerFile, PassArtifacts)> {
    let inner = block::compress(codec, image.as_bytes(), levels.first).map_err(|source| {
        ZngError::Compression {
            pass: Pass::First,
            source,
        }
    })?;
    let pass1 = inner.to_bytes();
    debug!(
        "pass 1: {} pixel bytes -> {} byte block",
        image.as_bytes().len(),
        pass1.len()
    );

    let outer = block::compress(codec, &pass1, levels.second).map_err(|source| {
        ZngError::Compression {
            pass: Pass::Second,
            source,
        }
    })?;
    let pass2 = outer.to_bytes();
    debug!("pass 2: {} -> {} byte block", pass1.len(), pass2.len());

    let file = ContainerFile {
        header: ZngHeader::rgba(image.width(), image.height()),
        outer,
    };
    Ok((file, PassArtifacts { pass1, pass2 }))
}

/// Recover the pixels stored in `file`.
pub fn decode(codec: &dyn Codec, file: &ContainerFile) -> ZngResult<PixelBuffer> {
    unpack(codec, file).map(|(image, _)| image)
}

/// Like [`decode`], also returning both intermediate buffers.
pub fn decode_with_passes(
    codec: &dyn Codec,
    file: &ContainerFile,
) -> ZngResult<(PixelBuffer, PassArtifacts)> {
    let (image, pass1) = unpack(codec, file)?;
    let pass2 = image.as_bytes().to_vec();
    Ok((image, PassArtifacts { pass1, pass2 }))
}

/// Undo both passes, returning the pixels and the serialized inner block.
fn unpack(codec: &dyn Codec, file: &ContainerFile) -> ZngResult<(PixelBuffer, Vec<u8>)> {
    file.header.validate()?;
    let expected = file.header.pixel_len()?;

    let pass1 = file
        .outer
        .decompress(codec)
        .map_err(|source| ZngError::Decompression {
            pass: Pass::First,
            source,
        })?;
    debug!(
        "pass 1: {} byte payload -> {} byte block",
        file.outer.compressed_size(),
        pass1.len()
    );

    let second = |source| ZngError::Decompression {
        pass: Pass::Second,
        source,
    };
    let (inner, rest) = CompressedBlock::read(&pass1).map_err(second)?;
    if !rest.is_empty() {
        return Err(second(BlockError::TrailingBytes(rest.len())));
    }
    let pixels = inner.decompress(codec).map_err(second)?;
    debug!(
        "pass 2: {} byte payload -> {} pixel bytes",
        inner.compressed_size(),
        pixels.len()
    );

    if pixels.len() != expected {
        return Err(ZngError::SizeMismatch {
            expected,
            actual: pixels.len(),
        });
    }

    let image = PixelBuffer::new(file.header.width, file.header.height, pixels)?;
    Ok((image, pass1))
}
