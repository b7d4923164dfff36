pub mod block;
pub mod codec;
pub mod container;
pub mod convert;
pub mod error;
pub mod format;
pub mod imaging;
pub mod pipeline;
pub mod pixels;

pub use block::{BlockHeader, CompressedBlock};
pub use codec::Codec;
pub use container::{ContainerFile, Direction};
pub use convert::{Conversion, ConvertOptions, Converter};
pub use error::{BlockError, Pass, ZngError, ZngResult};
pub use format::{ZngHeader, HEADER_SIZE, MAGIC};
pub use imaging::ImageCodec;
pub use pipeline::{Levels, PassArtifacts};
pub use pixels::PixelBuffer;
