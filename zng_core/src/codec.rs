use std::ops::RangeInclusive;

/// Byte-oriented compression primitive used for both passes.
///
/// Each `Codec` implementation:
/// - Works on one independent block at a time. No state may carry over from
///   one call to the next; the two passes of a ZNG file are unrelated inputs.
/// - Writes into caller-provided buffers. The caller sizes the compression
///   output with [`Codec::max_compressed_len`] and the decompression output
///   with the size declared in the block header.
pub trait Codec: Send + Sync {
    /// Human-readable codec name for logs.
    fn name(&self) -> &'static str;

    /// Compression levels accepted by [`Codec::compress_into`].
    fn levels(&self) -> RangeInclusive<i32>;

    /// Worst-case compressed size for `raw_len` input bytes.
    fn max_compressed_len(&self, raw_len: usize) -> usize;

    /// Upper bound on what `compressed_len` bytes can legitimately expand to.
    /// Declared sizes above it are rejected before any buffer is allocated.
    fn max_decompressed_len(&self, compressed_len: usize) -> usize;

    /// Compress `raw` into `out` and return the number of bytes written.
    ///
    /// A return of `Ok(0)` means the primitive gave up on this input and is
    /// treated as a failure by the caller.
    fn compress_into(&self, raw: &[u8], out: &mut [u8], level: i32) -> anyhow::Result<usize>;

    /// Decompress `compressed` into `out` and return the number of bytes produced.
    ///
    /// Implementations must fail rather than write past `out`. Producing fewer
    /// bytes than `out.len()` is not an error here; the caller checks it.
    fn decompress_into(&self, compressed: &[u8], out: &mut [u8]) -> anyhow::Result<usize>;
}
