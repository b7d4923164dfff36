use std::ops::RangeInclusive;

use lz4::block::{compress_to_buffer, CompressionMode};
use lz4_flex::block::{decompress_into, get_maximum_output_size};
use zng_core::Codec;

/// LZ4 block codec.
///
/// Writes the raw LZ4 block format: no frame, no size prefix. Sizes live in
/// the ZNG block header instead, so any LZ4 block decoder can read the
/// payload given the declared uncompressed size.
///
/// Compression goes through LZ4-HC at the requested level (1 = fastest,
/// 12 = smallest). Decompression uses the pure-Rust `lz4_flex` decoder.
pub struct Lz4Codec;

impl Lz4Codec {
    /// Largest expansion a single LZ4 sequence can encode: one extra length
    /// byte per 255 output bytes, plus the final literal run.
    const MAX_RATIO: usize = 255;
    const MAX_EXPANSION_SLACK: usize = 16;

    pub const LEVELS: RangeInclusive<i32> = 1..=12;
}

impl Codec for Lz4Codec {
    fn name(&self) -> &'static str {
        "lz4"
    }

    fn levels(&self) -> RangeInclusive<i32> {
        Self::LEVELS
    }

    fn max_compressed_len(&self, raw_len: usize) -> usize {
        get_maximum_output_size(raw_len)
    }

    fn max_decompressed_len(&self, compressed_len: usize) -> usize {
        compressed_len
            .saturating_mul(Self::MAX_RATIO)
            .saturating_add(Self::MAX_EXPANSION_SLACK)
    }

    fn compress_into(&self, raw: &[u8], out: &mut [u8], level: i32) -> anyhow::Result<usize> {
        compress_to_buffer(raw, Some(CompressionMode::HIGHCOMPRESSION(level)), false, out)
            .map_err(|e| anyhow::anyhow!("lz4 compress error: {}", e))
    }

    fn decompress_into(&self, compressed: &[u8], out: &mut [u8]) -> anyhow::Result<usize> {
        decompress_into(compressed, out).map_err(|e| anyhow::anyhow!("lz4 decompress error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_roundtrip_without_size_prefix() {
        let raw = b"the quick brown fox jumps over the lazy dog. ".repeat(40);
        let mut packed = vec![0u8; Lz4Codec.max_compressed_len(raw.len())];
        let n = Lz4Codec.compress_into(&raw, &mut packed, 9).unwrap();
        assert!(n > 0 && n < raw.len());

        let mut out = vec![0u8; raw.len()];
        let produced = Lz4Codec.decompress_into(&packed[..n], &mut out).unwrap();
        assert_eq!(produced, raw.len());
        assert_eq!(out, raw);
    }

    /// Deterministic log-like text: repetitive, but with enough variety that
    /// a deeper match search pays off.
    fn log_text(lines: u64) -> Vec<u8> {
        const WORDS: &[&str] = &["GET", "POST", "/api/v1/items", "/health", "200", "404", "ok", "timeout"];
        let mut rng = 0x1234_5678u64;
        let mut text = Vec::new();
        for i in 0..lines {
            text.extend_from_slice(format!("{:06} ", i * 7).as_bytes());
            for _ in 0..6 {
                rng = rng
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                text.extend_from_slice(WORDS[(rng >> 59) as usize % WORDS.len()].as_bytes());
                text.push(b' ');
            }
            text.push(b'\n');
        }
        text
    }

    fn packed_len(raw: &[u8], level: i32) -> usize {
        let mut packed = vec![0u8; Lz4Codec.max_compressed_len(raw.len())];
        let n = Lz4Codec.compress_into(raw, &mut packed, level).unwrap();
        let mut out = vec![0u8; raw.len()];
        assert_eq!(Lz4Codec.decompress_into(&packed[..n], &mut out).unwrap(), raw.len());
        assert_eq!(out, raw, "level {level} must round-trip");
        n
    }

    #[test]
    fn higher_level_compresses_smaller() {
        let text = log_text(4000);
        let fast = packed_len(&text, 1);
        let default = packed_len(&text, 9);
        let best = packed_len(&text, 12);
        assert!(best <= default && default <= fast, "1: {fast}, 9: {default}, 12: {best}");
        assert!(best < fast, "level 12 ({best}) should beat level 1 ({fast})");

        let flat = vec![0u8; 50_000];
        assert!(packed_len(&flat, 12) <= packed_len(&flat, 1));
    }

    #[test]
    fn expansion_ceiling_covers_real_output() {
        let flat = vec![0u8; 100_000];
        let n = packed_len(&flat, 12);
        assert!(Lz4Codec.max_decompressed_len(n) >= flat.len());
        assert_eq!(Lz4Codec.max_decompressed_len(usize::MAX), usize::MAX);
    }

    #[test]
    fn undersized_output_is_an_error() {
        let raw = vec![7u8; 1000];
        let mut packed = vec![0u8; Lz4Codec.max_compressed_len(raw.len())];
        let n = Lz4Codec.compress_into(&raw, &mut packed, 1).unwrap();

        let mut out = vec![0u8; 999];
        assert!(Lz4Codec.decompress_into(&packed[..n], &mut out).is_err());
    }
}
