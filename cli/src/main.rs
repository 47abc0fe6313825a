use clap::{Parser, ValueEnum};
use glyph_metrics::{Coverage, FontFile, FontMetrics, MetricsError, MetricsExtractor};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CoverageArg {
    /// Every code point in the font's character map
    Complete,
    /// Printable ASCII (32-126) only
    Ascii,
}

impl From<CoverageArg> for Coverage {
    fn from(arg: CoverageArg) -> Self {
        match arg {
            CoverageArg::Complete => Coverage::Complete,
            CoverageArg::Ascii => Coverage::Ascii,
        }
    }
}

#[derive(Parser)]
#[command(name = "glyph-metrics", version)]
#[command(about = "Generate per-character metrics from a font file", long_about = None)]
struct Args {
    /// Font file (.ttf, .otf, .ttc) to extract metrics from
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Which code points to extract
    #[arg(short, long, value_enum, default_value_t = CoverageArg::Complete)]
    coverage: CoverageArg,

    /// Output file; derived from the font name when omitted
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Face index inside a font collection
    #[arg(short, long, default_value_t = 0)]
    index: u32,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Log filter used when `RUST_LOG` is not set.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn print_font_info(path: &Path, index: u32) -> Result<(), MetricsError> {
    let data = std::fs::read(path)?;
    let font = FontFile::parse(&data, index)?;
    println!("{}\n", font.info());
    Ok(())
}

fn print_summary(metrics: &FontMetrics) {
    println!("Generated metrics for {}", metrics.report());
    if let Some(stats) = glyph_metrics::WidthStats::of(metrics) {
        println!("  {}", stats);
    }
    let ranges = glyph_metrics::code_point_ranges(metrics);
    println!(
        "  {} code point ranges: {}",
        ranges.len(),
        glyph_metrics::format_ranges(&ranges)
    );

    println!("\nSample characters:");
    for (code_point, m) in glyph_metrics::samples(metrics) {
        let c = char::from_u32(code_point).unwrap_or('?');
        println!("  {} ('{}'): {}", code_point, c, m);
    }
}

fn run(args: &Args) -> Result<(FontMetrics, PathBuf), MetricsError> {
    let extractor = MetricsExtractor::builder()
        .coverage(args.coverage.into())
        .face_index(args.index)
        .build();
    let output = args.output.clone().unwrap_or_else(|| {
        glyph_metrics::output_file_name(&args.file, extractor.coverage()).into()
    });

    if args.verbose > 0 {
        print_font_info(&args.file, args.index)?;
    }
    let metrics = extractor.from_path(&args.file)?;
    let written = metrics.write_dart(&output)?;
    Ok((metrics, written))
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(args.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = run(&args);
    let (metrics, written) = match result {
        Ok(done) => done,
        Err(e) => {
            eprintln!("Error generating metrics for {:?}: {}", args.file, e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            std::process::exit(1);
        }
    };

    print_summary(&metrics);
    println!("\nDart code saved to {}", written.display());
}
