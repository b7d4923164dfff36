use log::trace;

use crate::codec::Codec;
use crate::error::BlockError;
use crate::format::{read_u32, BLOCK_HEADER_SIZE};

/// The 8-byte prefix of every compressed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Exact byte length recovered by a successful decompression.
    pub uncompressed_size: u32,
    /// Length of the payload that follows the header.
    pub compressed_size: u32,
}

impl BlockHeader {
    /// Serialize to exactly `BLOCK_HEADER_SIZE` bytes.
    pub fn to_bytes(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut buf = [0u8; BLOCK_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.uncompressed_size.to_le_bytes());
        buf[4..8].copy_from_slice(&self.compressed_size.to_le_bytes());
        buf
    }

    /// Parse a block header from the front of `buf`.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, BlockError> {
        if buf.len() < BLOCK_HEADER_SIZE {
            return Err(BlockError::Truncated {
                needed: BLOCK_HEADER_SIZE,
                actual: buf.len(),
            });
        }
        Ok(Self {
            uncompressed_size: read_u32(buf, 0),
            compressed_size: read_u32(buf, 4),
        })
    }
}

/// A self-describing compressed record: declared uncompressed size plus payload.
///
/// The compressed size is always `payload.len()`, so a block can never
/// disagree with its own header once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedBlock {
    uncompressed_size: u32,
    payload: Vec<u8>,
}

impl CompressedBlock {
    /// Wrap an existing payload. Fails if the payload does not fit the u32 size field.
    pub fn new(uncompressed_size: u32, payload: Vec<u8>) -> Result<Self, BlockError> {
        u32::try_from(payload.len()).map_err(|_| BlockError::TooLarge(payload.len()))?;
        Ok(Self {
            uncompressed_size,
            payload,
        })
    }

    pub fn uncompressed_size(&self) -> u32 {
        self.uncompressed_size
    }

    pub fn compressed_size(&self) -> u32 {
        // `new` and `compress` guarantee the length fits.
        self.payload.len() as u32
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            uncompressed_size: self.uncompressed_size,
            compressed_size: self.compressed_size(),
        }
    }

    /// Length of [`CompressedBlock::to_bytes`] without building it.
    pub fn serialized_len(&self) -> usize {
        BLOCK_HEADER_SIZE + self.payload.len()
    }

    /// Header followed by payload, contiguous.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_len());
        buf.extend_from_slice(&self.header().to_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Parse a block from the front of `buf`, returning it and the unread remainder.
    pub fn read(buf: &[u8]) -> Result<(Self, &[u8]), BlockError> {
        let header = BlockHeader::from_bytes(buf)?;
        let end = BLOCK_HEADER_SIZE + header.compressed_size as usize;
        if buf.len() < end {
            return Err(BlockError::Truncated {
                needed: end,
                actual: buf.len(),
            });
        }
        let block = Self {
            uncompressed_size: header.uncompressed_size,
            payload: buf[BLOCK_HEADER_SIZE..end].to_vec(),
        };
        Ok((block, &buf[end..]))
    }

    /// Decompress this block's payload with `codec`.
    pub fn decompress(&self, codec: &dyn Codec) -> Result<Vec<u8>, BlockError> {
        decompress(
            codec,
            &self.payload,
            self.uncompressed_size,
            self.compressed_size(),
        )
    }
}

/// Compress `data` into a new block.
///
/// The output buffer is sized by the codec's worst-case bound. A primitive
/// that reports zero bytes written is a failure, not an empty block.
pub fn compress(codec: &dyn Codec, data: &[u8], level: i32) -> Result<CompressedBlock, BlockError> {
    let uncompressed_size =
        u32::try_from(data.len()).map_err(|_| BlockError::TooLarge(data.len()))?;

    let levels = codec.levels();
    if !levels.contains(&level) {
        return Err(BlockError::InvalidLevel {
            level,
            min: *levels.start(),
            max: *levels.end(),
        });
    }

    let bound = codec.max_compressed_len(data.len());
    let mut payload = vec![0u8; bound];
    let written = codec
        .compress_into(data, &mut payload, level)
        .map_err(|e| BlockError::Primitive(format!("{e:#}")))?;
    if written == 0 {
        return Err(BlockError::EmptyOutput);
    }
    payload.truncate(written);

    trace!(
        "{}: compressed {} -> {} bytes (bound {}, level {})",
        codec.name(),
        data.len(),
        written,
        bound,
        level
    );
    CompressedBlock::new(uncompressed_size, payload)
}

/// Decompress `payload` into exactly `uncompressed_size` bytes.
///
/// Success means the primitive produced exactly the declared length. A short
/// result or a primitive error (including output overflow) is a failure, so a
/// wrong size field never yields truncated or padded data. Sizes beyond what
/// the payload could expand to are rejected before allocating.
pub fn decompress(
    codec: &dyn Codec,
    payload: &[u8],
    uncompressed_size: u32,
    compressed_size: u32,
) -> Result<Vec<u8>, BlockError> {
    if payload.len() != compressed_size as usize {
        return Err(BlockError::PayloadLength {
            declared: compressed_size,
            actual: payload.len(),
        });
    }

    let limit = codec.max_decompressed_len(payload.len());
    if uncompressed_size as usize > limit {
        return Err(BlockError::ImplausibleSize {
            declared: uncompressed_size,
            limit,
        });
    }

    let mut out = vec![0u8; uncompressed_size as usize];
    let produced = codec
        .decompress_into(payload, &mut out)
        .map_err(|e| BlockError::Primitive(format!("{e:#}")))?;
    if produced != out.len() {
        return Err(BlockError::LengthMismatch {
            expected: uncompressed_size,
            actual: produced,
        });
    }

    trace!(
        "{}: decompressed {} -> {} bytes",
        codec.name(),
        payload.len(),
        produced
    );
    Ok(out)
}
