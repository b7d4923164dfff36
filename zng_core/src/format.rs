use crate::error::{ZngError, ZngResult};

/// Magic number stored in the first four bytes of every ZNG file.
/// Encoded little-endian this is the byte sequence `7A 00 00 00` ("z\0\0\0").
pub const MAGIC: u32 = 0x0000_007A;

/// Fixed size of the ZNG file header in bytes.
///   magic:u32 + bit_depth:u32 + width:u32 + height:u32 = 16
pub const HEADER_SIZE: usize = 16;

/// Size of a compressed block header in bytes.
///   uncompressed_size:u32 + compressed_size:u32 = 8
pub const BLOCK_HEADER_SIZE: usize = 8;

/// Bytes per pixel of the only supported layout (RGBA, 8 bits per channel).
pub const BYTES_PER_PIXEL: usize = 4;

// ── Bit depths ─────────────────────────────────────────────────────────────

/// Four 8-bit channels. The only layout this crate reads and writes.
pub const BIT_DEPTH_RGBA: u32 = 32;

/// Legacy paletted layout. Recognized so it can be reported distinctly.
pub const BIT_DEPTH_PALETTED: u32 = 8;

// ── Header ─────────────────────────────────────────────────────────────────

/// Decoded representation of the 16-byte ZNG file header.
///
/// All fields are little-endian on disk, which is also the native struct
/// layout of ZNG files written on x86 and ARM hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZngHeader {
    pub magic: u32,
    pub bit_depth: u32,
    pub width: u32,
    pub height: u32,
}

impl ZngHeader {
    /// Header for a 32-bit RGBA image of the given size.
    pub fn rgba(width: u32, height: u32) -> Self {
        Self {
            magic: MAGIC,
            bit_depth: BIT_DEPTH_RGBA,
            width,
            height,
        }
    }

    /// Serialize to exactly `HEADER_SIZE` bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.bit_depth.to_le_bytes());
        buf[8..12].copy_from_slice(&self.width.to_le_bytes());
        buf[12..16].copy_from_slice(&self.height.to_le_bytes());
        buf
    }

    /// Parse the header from the front of `buf`. No field is validated here;
    /// see [`ZngHeader::validate`].
    pub fn from_bytes(buf: &[u8]) -> ZngResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(ZngError::TruncatedInput {
                needed: HEADER_SIZE,
                actual: buf.len(),
            });
        }
        Ok(Self {
            magic: read_u32(buf, 0),
            bit_depth: read_u32(buf, 4),
            width: read_u32(buf, 8),
            height: read_u32(buf, 12),
        })
    }

    /// Check the magic and bit depth before any payload is touched.
    pub fn validate(&self) -> ZngResult<()> {
        if self.magic != MAGIC {
            return Err(ZngError::UnsupportedFormat(format!(
                "bad magic number {:#010x}, expected {:#010x}",
                self.magic, MAGIC
            )));
        }
        match self.bit_depth {
            BIT_DEPTH_RGBA => Ok(()),
            BIT_DEPTH_PALETTED => Err(ZngError::UnsupportedBitDepth8),
            other => Err(ZngError::UnsupportedFormat(format!(
                "unsupported image color format ({other} bits per pixel)"
            ))),
        }
    }

    /// Length in bytes of the RGBA pixel buffer this header describes.
    pub fn pixel_len(&self) -> ZngResult<usize> {
        expected_len(self.width, self.height)
    }
}

/// `width * height * 4`, or `InvalidDimensions` if that overflows `usize`.
pub fn expected_len(width: u32, height: u32) -> ZngResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .ok_or(ZngError::InvalidDimensions { width, height })
}

/// Read a little-endian u32 at `offset`. Callers check the length first.
pub(crate) fn read_u32(buf: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(word)
}
