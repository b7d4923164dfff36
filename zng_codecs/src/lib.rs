mod lz4_codec;
mod png;

pub use lz4_codec::Lz4Codec;
pub use png::PngImageCodec;
