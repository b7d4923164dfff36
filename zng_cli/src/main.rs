use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::{info, warn, LevelFilter};

use zng_codecs::{Lz4Codec, PngImageCodec};
use zng_core::pipeline::PassArtifacts;
use zng_core::{ConvertOptions, Converter, Direction, Levels};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "zng",
    about = "Convert images to double-LZ4-compressed ZNG files and back to PNG",
    long_about = "Convert images to double-LZ4-compressed ZNG files and back to PNG.\n\n\
                  A ZNG input is decoded to PNG; any other input is decoded as an image \
                  (PNG, JPEG, BMP, GIF, TGA, PNM) and written as ZNG.",
    version
)]
struct Cli {
    /// Source file: a ZNG file or a regular image
    input: PathBuf,
    /// Destination file: PNG when the input is ZNG, ZNG otherwise
    output: PathBuf,
    /// Compression level of the first pass (over the raw pixels)
    #[arg(long, default_value_t = Levels::DEFAULT_LEVEL, value_parser = level_parser())]
    c1: i32,
    /// Compression level of the second pass (over the first pass block)
    #[arg(long, default_value_t = Levels::DEFAULT_LEVEL, value_parser = level_parser())]
    c2: i32,
    /// Also write the intermediate buffers to <OUTPUT>.pass1 and <OUTPUT>.pass2
    #[arg(long)]
    save_passes: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn level_parser() -> clap::builder::RangedI64ValueParser<i32> {
    let levels = Lz4Codec::LEVELS;
    clap::value_parser!(i32).range(i64::from(*levels.start())..=i64::from(*levels.end()))
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Byte count with a binary unit, e.g. `1.5 KiB`. Plain bytes stay exact.
fn human_bytes(n: u64) -> String {
    const SCALED: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if n < 1024 {
        return format!("{n} B");
    }
    let mut value = n as f64 / 1024.0;
    let mut unit = SCALED[0];
    for &next in &SCALED[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

/// `<output>` with `suffix` appended to the full file name.
fn sibling_path(output: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = output.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write the diagnostic pass buffers. Failures are logged, never fatal.
fn save_passes(output: &Path, passes: &PassArtifacts) {
    for (suffix, bytes) in [(".pass1", &passes.pass1), (".pass2", &passes.pass2)] {
        let path = sibling_path(output, suffix);
        match std::fs::write(&path, bytes) {
            Ok(()) => info!("  wrote {:?} ({})", path, human_bytes(bytes.len() as u64)),
            Err(e) => warn!("failed to write {:?}: {}", path, e),
        }
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────

fn run(cli: &Cli) -> anyhow::Result<()> {
    let input = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read input file {:?}", cli.input))?;

    let options = ConvertOptions {
        levels: Levels::new(cli.c1, cli.c2),
        keep_passes: cli.save_passes,
    };

    let t0 = Instant::now();
    let conversion = Converter::new(&Lz4Codec, &PngImageCodec).convert(&input, &options)?;
    let elapsed = t0.elapsed();

    std::fs::write(&cli.output, &conversion.output)
        .with_context(|| format!("failed to write output file {:?}", cli.output))?;

    if let Some(passes) = &conversion.passes {
        save_passes(&cli.output, passes);
    }

    let (raw, packed) = match conversion.direction {
        Direction::ToContainer => (input.len(), conversion.output.len()),
        Direction::ToImage => (conversion.output.len(), input.len()),
    };
    info!("  direction   : {:?}", conversion.direction);
    info!("  dimensions  : {}x{}", conversion.width, conversion.height);
    info!("  input       : {}", human_bytes(input.len() as u64));
    info!("  output      : {}", human_bytes(conversion.output.len() as u64));
    info!("  ratio       : {:.2}x", raw as f64 / packed.max(1) as f64);
    info!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    run(&cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zng_core::{ImageCodec, PixelBuffer, ZngError, MAGIC};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("zng_cli_test_{}", name))
    }

    fn cli(input: &Path, output: &Path, save_passes: bool) -> Cli {
        Cli {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            c1: 1,
            c2: 1,
            save_passes,
            verbose: 0,
        }
    }

    #[test]
    fn png_to_zng_to_png_with_passes() {
        let image = PixelBuffer::new(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 255]).unwrap();
        let png_in = temp_path("roundtrip_in.png");
        let zng = temp_path("roundtrip.zng");
        let png_out = temp_path("roundtrip_out.png");
        std::fs::write(&png_in, PngImageCodec.encode(&image).unwrap()).unwrap();

        run(&cli(&png_in, &zng, true)).unwrap();
        let zng_bytes = std::fs::read(&zng).unwrap();
        assert_eq!(&zng_bytes[..4], &MAGIC.to_le_bytes());
        let pass1 = std::fs::read(sibling_path(&zng, ".pass1")).unwrap();
        let pass2 = std::fs::read(sibling_path(&zng, ".pass2")).unwrap();
        assert_eq!(&zng_bytes[16..], pass2.as_slice());
        assert_eq!(
            u32::from_le_bytes(zng_bytes[16..20].try_into().unwrap()) as usize,
            pass1.len()
        );

        run(&cli(&zng, &png_out, false)).unwrap();
        let decoded = PngImageCodec.decode(&std::fs::read(&png_out).unwrap()).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn unknown_input_is_unsupported_image_format() {
        let input = temp_path("garbage.bin");
        std::fs::write(&input, b"no image header and no magic here").unwrap();
        let err = run(&cli(&input, &temp_path("garbage.zng"), false)).unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<ZngError>(),
                Some(ZngError::UnsupportedImageFormat(_))
            ),
            "{err:#}"
        );
    }

    #[test]
    fn missing_input_reports_path() {
        let missing = temp_path("does_not_exist.png");
        let _ = std::fs::remove_file(&missing);
        let err = run(&cli(&missing, &temp_path("unused.zng"), false)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read input file"));
    }

    #[test]
    fn levels_are_range_checked() {
        assert!(Cli::try_parse_from(["zng", "a", "b", "--c1", "12", "--c2", "1"]).is_ok());
        assert!(Cli::try_parse_from(["zng", "a", "b", "--c1", "13"]).is_err());
        assert!(Cli::try_parse_from(["zng", "a", "b", "--c2", "0"]).is_err());

        let parsed = Cli::try_parse_from(["zng", "in.png", "out.zng", "--save-passes", "-vv"]).unwrap();
        assert_eq!((parsed.c1, parsed.c2), (9, 9));
        assert!(parsed.save_passes);
        assert_eq!(parsed.verbose, 2);
    }

    #[test]
    fn human_bytes_picks_binary_units() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(1023), "1023 B");
        assert_eq!(human_bytes(1536), "1.5 KiB");
        assert_eq!(human_bytes(3 * 1024 * 1024), "3.0 MiB");
        assert_eq!(human_bytes(5 << 40), "5.0 TiB");
        assert_eq!(human_bytes(2048 << 40), "2048.0 TiB");
    }

    #[test]
    fn sibling_path_appends_suffix() {
        assert_eq!(
            sibling_path(Path::new("/tmp/out.zng"), ".pass1"),
            PathBuf::from("/tmp/out.zng.pass1")
        );
    }
}
