// In: src/main.rs

//! The `monovid` command-line tool.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;

use monovid::config::{CorpusPolicy, EncodingMode, MonovidConfig, ThresholdPolicy};
use monovid::pipeline::{reconstruct_frames, run, Artifact, EncodeReport};
use monovid::types::TileShape;

#[derive(Debug, Parser)]
#[command(name = "monovid", version, about = "Monochrome video encoder for embedded displays")]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode a GIF or a directory of numbered frames into an artifact.
    Encode(EncodeArgs),
    /// Print the header and array shapes of an artifact.
    Inspect {
        artifact: PathBuf,
    },
    /// Render an artifact as C source for the firmware.
    Emit {
        artifact: PathBuf,
        #[arg(short, long, default_value = "frames.c")]
        output: PathBuf,
    },
    /// Decode an artifact and write every frame as a PNG.
    Preview {
        artifact: PathBuf,
        #[arg(short, long, default_value = "decoded")]
        output_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Dictionary,
    Raw,
    Differential,
}

#[derive(Debug, clap::Args)]
struct EncodeArgs {
    /// A `.gif` file or a directory of images.
    input: PathBuf,
    /// Where to write the artifact.
    #[arg(short, long, default_value = "clip.mvaf")]
    output: PathBuf,
    /// JSON config file; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    /// Tile edge length (4 or 8).
    #[arg(long)]
    tile: Option<usize>,
    /// Number of codewords.
    #[arg(short = 'k', long)]
    codebook_size: Option<usize>,
    #[arg(long)]
    max_iterations: Option<usize>,
    #[arg(long)]
    n_init: Option<usize>,
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    max_frames: Option<usize>,
    #[arg(long)]
    frame_step: Option<usize>,
    #[arg(long)]
    count_bits: Option<u8>,
    /// Fixed luma threshold; Otsu's method is used when omitted.
    #[arg(long)]
    threshold: Option<u8>,
    #[arg(long)]
    invert: bool,
    /// Pad the codebook instead of failing when there are too few unique tiles.
    #[arg(long)]
    allow_degenerate: bool,
    /// Skip the zstd baseline in the report.
    #[arg(long)]
    no_baseline: bool,
    /// Also write the report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

impl EncodeArgs {
    fn to_config(&self) -> Result<MonovidConfig> {
        let mut config = match &self.config {
            Some(path) => MonovidConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => MonovidConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = match mode {
                ModeArg::Dictionary => EncodingMode::Dictionary,
                ModeArg::Raw => EncodingMode::RawPixels,
                ModeArg::Differential => EncodingMode::Differential,
            };
        }
        if let Some(width) = self.width {
            config.frame_width = width;
        }
        if let Some(height) = self.height {
            config.frame_height = height;
        }
        if let Some(edge) = self.tile {
            config.tile = TileShape::new(edge, edge)?;
        }
        let clustering = &mut config.clustering;
        if let Some(k) = self.codebook_size {
            clustering.codebook_size = k;
        }
        if let Some(n) = self.max_iterations {
            clustering.max_iterations = n;
        }
        if let Some(n) = self.n_init {
            clustering.n_init = n;
        }
        if let Some(n) = self.threads {
            clustering.threads = n;
        }
        if let Some(seed) = self.seed {
            clustering.seed = seed;
        }
        if self.allow_degenerate {
            clustering.corpus_policy = CorpusPolicy::Degenerate;
        }
        if let Some(n) = self.max_frames {
            config.max_frames = n;
        }
        if let Some(n) = self.frame_step {
            config.frame_step = n;
        }
        if self.count_bits.is_some() {
            config.count_bits = self.count_bits;
        }
        if let Some(level) = self.threshold {
            config.threshold = ThresholdPolicy::Fixed { level };
        }
        if self.invert {
            config.invert = true;
        }
        if self.no_baseline {
            config.baseline_zstd_level = None;
        }
        Ok(config)
    }
}

fn init_logger(verbose: u8) {
    let mut builder = env_logger::Builder::new();
    builder.is_test(false);
    builder.filter_level(match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });
    builder.parse_default_env();

    // Just print the level and message.
    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(buf, "[{}] {}", record.level(), record.args())
    });
    let _ = builder.try_init();
}

fn print_report(report: &EncodeReport, output: &Path) {
    println!("{}", "Encoding complete".green().bold());
    println!("  {:<22} {}", "mode", format!("{:?}", report.mode).cyan());
    println!(
        "  {:<22} {} ({}x{})",
        "frames", report.frames, report.frame_width, report.frame_height
    );
    if let Some(unique) = report.unique_tiles {
        println!("  {:<22} {}", "unique tiles", unique);
        println!("  {:<22} {}", "codewords", report.codebook_size);
    }
    if let Some(cost) = report.kmodes_cost {
        println!("  {:<22} {}", "k-modes cost", cost);
    }
    if report.degenerate_codebook {
        println!("  {}", "codebook was padded (corpus too small)".yellow());
    }
    println!(
        "  {:<22} {:.4}%",
        "pixel error",
        report.mean_quantization_error * 100.0
    );
    println!(
        "  {:<22} {} words / {} bytes ({:?})",
        "stream", report.stream_words, report.stream_bytes, report.element_type
    );
    println!("  {:<22} {} bytes", "packed codebook", report.packed_codebook_bytes);
    println!(
        "  {:<22} {} bytes ({:.2}x vs bit-packed {})",
        "payload",
        report.payload_bytes().to_string().bold(),
        report.compression_ratio(),
        report.packed_frame_bytes
    );
    if let Some(baseline) = report.zstd_baseline_bytes {
        println!("  {:<22} {} bytes", "zstd baseline", baseline);
    }
    println!("  {:<22} {}", "artifact", output.display());
}

fn encode(args: &EncodeArgs) -> Result<()> {
    let config = args.to_config()?;
    let report = run(&config, &args.input, &args.output)
        .with_context(|| format!("encoding {}", args.input.display()))?;
    print_report(&report, &args.output);
    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing report {}", path.display()))?;
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let info = Artifact::peek_info(&bytes)?;
    println!("{} {}", "artifact".bold(), path.display());
    println!("  format version {}", info.format_version);
    println!("{}", serde_json::to_string_pretty(&info.header)?);
    for array in &info.arrays {
        println!(
            "  {:<16} {:?} {:?} {} bytes",
            array.name, array.dtype, array.dims, array.byte_len
        );
    }
    Ok(())
}

fn preview(path: &Path, output_dir: &Path) -> Result<()> {
    let artifact = Artifact::read(path).with_context(|| format!("reading {}", path.display()))?;
    let frames = reconstruct_frames(&artifact)?;
    std::fs::create_dir_all(output_dir)?;
    for (i, frame) in frames.iter().enumerate() {
        let luma: Vec<u8> = frame.iter_pixels().map(|p| p * 255).collect();
        let image = image::GrayImage::from_raw(frame.width() as u32, frame.height() as u32, luma)
            .context("frame buffer size does not match its dimensions")?;
        image.save(output_dir.join(format!("{}.png", i + 1)))?;
    }
    println!(
        "{} {} frames to {}",
        "Decoded".green(),
        frames.len(),
        output_dir.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match &cli.command {
        Command::Encode(args) => encode(args),
        Command::Inspect { artifact } => inspect(artifact),
        Command::Emit { artifact, output } => {
            let artifact_data = Artifact::read(artifact)
                .with_context(|| format!("reading {}", artifact.display()))?;
            monovid::emit::write_c_source(&artifact_data, output)?;
            println!("{} {}", "Wrote".green(), output.display());
            Ok(())
        }
        Command::Preview {
            artifact,
            output_dir,
        } => preview(artifact, output_dir),
    }
}
