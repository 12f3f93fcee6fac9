use anyhow::Result;
use clap::Parser;
use episodic::config::{self, SourceSet};
use episodic::dataset::Discard;
use episodic::extract::{run_extraction, ExtractConfig};
use episodic::stats::{ExtractionStats, PassStats};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "episodic")]
#[command(about = "Build static TV series JSON documents from the IMDb dumps")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Series output directory (cleared before the run)
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Ratings dump (URL or local .tsv.gz path)
    #[arg(long, default_value = config::DEFAULT_RATINGS_URL)]
    ratings: String,

    /// Episode link dump (URL or local .tsv.gz path)
    #[arg(long, default_value = config::DEFAULT_EPISODES_URL)]
    episodes: String,

    /// Title basics dump (URL or local .tsv.gz path)
    #[arg(long, default_value = config::DEFAULT_TITLES_URL)]
    titles: String,
}

fn run(cli: Cli) -> Result<()> {
    let config = ExtractConfig {
        sources: SourceSet {
            ratings: cli.ratings,
            episodes: cli.episodes,
            titles: cli.titles,
        },
        output_dir: cli.output,
    };

    let start = Instant::now();
    let stats = run_extraction(&config)?;
    info!(
        duration_secs = start.elapsed().as_secs_f64(),
        series = stats.series(),
        "Extraction complete"
    );

    print_summary(&config, &stats);
    Ok(())
}

fn print_summary(config: &ExtractConfig, stats: &ExtractionStats) {
    println!();
    println!("=== Summary ===");
    print_pass("Ratings", &stats.ratings);
    print_pass("Episodes", &stats.episodes);
    print_pass("Titles", &stats.titles);
    println!(
        "Assembly time:      {:.2}s",
        stats.assembly_elapsed.as_secs_f64()
    );
    println!(
        "Total time:         {:.2}s",
        stats.total_elapsed().as_secs_f64()
    );
    println!();
    println!("Rows read:          {}", stats.rows_read());
    println!("Series written:     {}", stats.series());
    println!("Series dropped:     {}", stats.series_dropped());
    println!("Episodes written:   {}", stats.episodes_emitted());
    println!("Output directory:   {}", config.output_dir.display());
}

fn print_pass(name: &str, pass: &PassStats) {
    println!(
        "{:<10} {:>12} rows, {:>10} kept in {:.2}s",
        name,
        pass.rows,
        pass.kept,
        pass.elapsed.as_secs_f64()
    );
    for reason in Discard::ALL {
        let count = pass.discarded(reason);
        if count > 0 {
            println!("           {:>12} {}", count, reason);
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    match run(cli) {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
