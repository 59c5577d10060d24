mod loader;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use datareport::config::{DEFAULT_HISTOGRAM_COLUMNS, DEFAULT_OUTPUT_PATH};
use datareport::fonts::FONTS_DIR_ENV;
use datareport::{ReportConfig, ReportGenerator};
use log::LevelFilter;

/// Generates a data analysis PDF report for a CSV file.
///
/// Fonts are looked up in `DATAREPORT_FONTS_DIR`, `assets/fonts` next to the
/// binary, or the crate's `assets/fonts` directory; a system sans-serif family
/// is used when none of them holds the Roboto family.
#[derive(Parser)]
#[command(author, version, about = "Data analysis PDF reports for CSV files")]
struct Cli {
    /// CSV file with a header row.
    input: PathBuf,

    /// Where to write the PDF.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Seed for the histogram column sample.
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of columns drawn in the histogram section.
    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_COLUMNS)]
    histogram_columns: usize,

    /// Continue histogram rows on a new page instead of skipping rows that do not fit.
    #[arg(long)]
    paginate_histograms: bool,

    /// Directory holding the Roboto font family.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Warn)
        .parse_env(env_logger::Env::default().filter_or("DATAREPORT_LOG", "warn"))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = &cli.fonts_dir {
        std::env::set_var(FONTS_DIR_ENV, dir);
    }

    let table = loader::load_table(&cli.input)?;
    let config = ReportConfig::new()
        .with_output_path(cli.output)
        .with_seed(cli.seed)
        .with_histogram_columns(cli.histogram_columns)
        .paginate_histograms(cli.paginate_histograms);

    let (path, report) = ReportGenerator::new(config).generate(&table)?;
    println!("Generated {} ({} bytes)", path.display(), report.bytes.len());
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
