use log::warn;

use crate::block::CompressedBlock;
use crate::error::{ZngError, ZngResult};
use crate::format::{read_u32, ZngHeader, BLOCK_HEADER_SIZE, HEADER_SIZE, MAGIC};

/// A whole ZNG file in memory: header plus the outer (pass 2) block.
///
/// # Layout
/// ```text
/// [HEADER: 16 bytes]            magic, bit_depth, width, height
/// [OUTER BLOCK HEADER: 8 bytes] uncompressed_size, compressed_size
/// [OUTER PAYLOAD]               compresses a serialized inner block, which
///                               in turn compresses the raw RGBA pixels
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerFile {
    pub header: ZngHeader,
    pub outer: CompressedBlock,
}

impl ContainerFile {
    /// Header fields followed immediately by the outer block's bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.outer.serialized_len());
        buf.extend_from_slice(&self.header.to_bytes());
        buf.extend_from_slice(&self.outer.to_bytes());
        buf
    }

    /// Parse a ZNG file. The header is validated before the block is read,
    /// so an unsupported layout is reported as such rather than as a
    /// malformed payload.
    pub fn from_bytes(bytes: &[u8]) -> ZngResult<Self> {
        let header = ZngHeader::from_bytes(bytes)?;
        header.validate()?;
        let body = &bytes[HEADER_SIZE..];
        let (outer, rest) = CompressedBlock::read(body).map_err(|_| {
            let needed = if body.len() < BLOCK_HEADER_SIZE {
                HEADER_SIZE + BLOCK_HEADER_SIZE
            } else {
                HEADER_SIZE + BLOCK_HEADER_SIZE + read_u32(body, 4) as usize
            };
            ZngError::TruncatedInput {
                needed,
                actual: bytes.len(),
            }
        })?;
        if !rest.is_empty() {
            warn!("ignoring {} trailing bytes after the ZNG payload", rest.len());
        }
        Ok(Self { header, outer })
    }
}

/// Which way a conversion runs, chosen once from the input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The input is a regular image; produce a ZNG file.
    ToContainer,
    /// The input is a ZNG file; produce a PNG.
    ToImage,
}

impl Direction {
    /// Route on the first four bytes: the ZNG magic means decode, anything
    /// else is handed to the image decoder.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.len() >= 4 && read_u32(bytes, 0) == MAGIC {
            Direction::ToImage
        } else {
            Direction::ToContainer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContainerFile {
        ContainerFile {
            header: ZngHeader::rgba(3, 5),
            outer: CompressedBlock::new(40, vec![1, 2, 3, 4]).unwrap(),
        }
    }

    #[test]
    fn layout_matches_on_disk_table() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes.len(), 16 + 8 + 4);
        assert_eq!(&bytes[0..4], &MAGIC.to_le_bytes());
        assert_eq!(&bytes[16..20], &40u32.to_le_bytes());
        assert_eq!(&bytes[20..24], &4u32.to_le_bytes());
        assert_eq!(&bytes[24..], &[1, 2, 3, 4]);
        assert_eq!(ContainerFile::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn short_buffers_are_truncated() {
        let bytes = sample().to_bytes();
        for len in [0, 4, 15, 16, 23, 24, 27] {
            assert!(
                matches!(
                    ContainerFile::from_bytes(&bytes[..len]),
                    Err(ZngError::TruncatedInput { .. })
                ),
                "len {len}"
            );
        }
    }

    #[test]
    fn header_is_validated_before_the_block() {
        let mut header = ZngHeader::rgba(4, 4);
        header.bit_depth = 8;
        let mut bytes = header.to_bytes().to_vec();
        bytes.extend_from_slice(&[0xFF; 32]);
        assert!(matches!(
            ContainerFile::from_bytes(&bytes),
            Err(ZngError::UnsupportedBitDepth8)
        ));

        header.bit_depth = 24;
        bytes[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
        assert!(matches!(
            ContainerFile::from_bytes(&bytes),
            Err(ZngError::UnsupportedFormat(_))
        ));
        // The header alone is still checked for length first.
        assert!(matches!(
            ContainerFile::from_bytes(&bytes[..HEADER_SIZE - 1]),
            Err(ZngError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut bytes = sample().to_bytes();
        bytes.extend_from_slice(&[0xEE; 3]);
        assert_eq!(ContainerFile::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn dispatch_on_magic() {
        assert_eq!(Direction::detect(&sample().to_bytes()), Direction::ToImage);
        assert_eq!(Direction::detect(b"\x89PNG\r\n\x1a\n"), Direction::ToContainer);
        assert_eq!(Direction::detect(&[0x7A, 0, 0]), Direction::ToContainer);
        assert_eq!(Direction::detect(&[]), Direction::ToContainer);
        assert_eq!(Direction::detect(&[0x7A, 0, 0, 1]), Direction::ToContainer);
    }
}
