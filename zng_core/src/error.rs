use std::fmt;

use thiserror::Error;

/// Result alias used throughout the ZNG crates.
pub type ZngResult<T> = Result<T, ZngError>;

/// Which of the two chained compression passes an error belongs to.
///
/// Encode runs `First` over the raw pixels and `Second` over the serialized
/// first block. Decode numbers its passes in its own order: `First` undoes the
/// outer block, `Second` undoes the inner one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    First,
    Second,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::First => f.write_str("pass 1"),
            Pass::Second => f.write_str("pass 2"),
        }
    }
}

/// Failure of a single compress/decompress call on one block.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BlockError {
    #[error("input of {0} bytes does not fit a u32 block size field")]
    TooLarge(usize),

    #[error("compression level {level} outside supported range {min}..={max}")]
    InvalidLevel { level: i32, min: i32, max: i32 },

    #[error("compressor produced no output")]
    EmptyOutput,

    #[error("payload is {actual} bytes but the block header declares {declared}")]
    PayloadLength { declared: u32, actual: usize },

    #[error("expected {expected} decompressed bytes but got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("declared size {declared} exceeds the {limit} bytes the payload can expand to")]
    ImplausibleSize { declared: u32, limit: usize },

    #[error("block needs {needed} bytes but only {actual} are available")]
    Truncated { needed: usize, actual: usize },

    #[error("{0} unexpected bytes after the block payload")]
    TrailingBytes(usize),

    #[error("primitive error: {0}")]
    Primitive(String),
}

/// Every way a ZNG conversion can fail. All of them are terminal.
#[derive(Error, Debug)]
pub enum ZngError {
    #[error("truncated input: need at least {needed} bytes, got {actual}")]
    TruncatedInput { needed: usize, actual: usize },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("8 bits per pixel ZNG files are not supported")]
    UnsupportedBitDepth8,

    #[error("image loading failed, the input is not a supported image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("image encoding failed: {0}")]
    ImageEncode(String),

    #[error("{pass} of compression failed: {source}")]
    Compression {
        pass: Pass,
        #[source]
        source: BlockError,
    },

    #[error("{pass} of decompression failed: {source}")]
    Decompression {
        pass: Pass,
        #[source]
        source: BlockError,
    },

    #[error("pixel buffer is {actual} bytes but {expected} were expected")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}
