use crate::assemble::assemble;
use crate::config::{SourceSet, PROGRESS_INTERVAL};
use crate::dataset::{Dataset, Decoded, Discard, EpisodeLinks, Ratings, Titles};
use crate::index::{CrossReference, Outcome};
use crate::output::{prepare_output_dir, OutputWriter};
use crate::parser::TsvReader;
use crate::source::SourceReader;
use crate::stats::{ExtractionStats, PassStats};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub sources: SourceSet,
    pub output_dir: PathBuf,
}

/// Runs the whole pipeline: three join passes, then assembly and output.
///
/// Any fetch, decompression, layout, or write failure aborts the run; bad rows
/// are counted as [`Discard::Malformed`] and skipped. The output directory is
/// cleared up front, so an aborted run leaves it partially filled and without
/// a `search.json`.
pub fn run_extraction(config: &ExtractConfig) -> Result<ExtractionStats> {
    let reader = SourceReader::new()?;
    run_extraction_with(&reader, config)
}

pub fn run_extraction_with(reader: &SourceReader, config: &ExtractConfig) -> Result<ExtractionStats> {
    prepare_output_dir(&config.output_dir)?;

    let mut stats = ExtractionStats::new();
    let mut xref = CrossReference::new();

    stats.ratings = run_pass::<Ratings, _>(reader, &config.sources.ratings, |row| {
        xref.insert_rating(row)
    })?;

    stats.episodes = run_pass::<EpisodeLinks, _>(reader, &config.sources.episodes, |link| {
        xref.link_episode(link)
    })?;
    xref.finish_links();

    stats.titles = run_pass::<Titles, _>(reader, &config.sources.titles, |title| {
        xref.attach_title(title)
    })?;

    let start = Instant::now();
    let mut output = OutputWriter::create(&config.output_dir)?;
    match assemble(&mut xref, &mut output) {
        Ok(assembly) => {
            output.finish()?;
            stats.assembly = assembly;
        }
        Err(e) => {
            output.abandon();
            return Err(e.context("Failed to write series output"));
        }
    }
    stats.assembly_elapsed = start.elapsed();

    Ok(stats)
}

/// Fetches one dataset and feeds its decoded rows to `handler` in file order.
/// The decompressed text is dropped when the pass ends.
fn run_pass<D, F>(reader: &SourceReader, locator: &str, mut handler: F) -> Result<PassStats>
where
    D: Dataset,
    F: FnMut(D::Record) -> Outcome,
{
    let start = Instant::now();
    info!(dataset = D::NAME, locator, "Starting dataset pass");

    let text = reader
        .fetch_text(locator)
        .with_context(|| format!("Failed to load dataset {}", D::NAME))?;
    let rows = TsvReader::from_text(&text)
        .with_context(|| format!("Failed to read header of {}", D::NAME))?;
    let schema = D::schema(rows.header())
        .with_context(|| format!("Unexpected layout in {}", D::NAME))?;

    let pb = ProgressBar::new_spinner();
    pb.set_message(D::NAME);
    let mut stats = PassStats::new();

    for row in rows {
        let row = row.with_context(|| format!("Failed to parse {}", D::NAME))?;
        let outcome = if !row.is_complete() {
            Outcome::Discarded(Discard::Malformed)
        } else {
            match D::decode(&schema, &row) {
                Decoded::Record(record) => handler(record),
                Decoded::Skip(reason) => Outcome::Discarded(reason),
            }
        };
        if outcome == Outcome::Discarded(Discard::Malformed) {
            debug!(dataset = D::NAME, line = row.line(), "Skipping malformed row");
        }
        stats.record(outcome);

        if stats.rows % PROGRESS_INTERVAL == 0 {
            pb.set_message(format!("{}: {} rows", D::NAME, stats.rows));
            pb.tick();
            debug!(dataset = D::NAME, rows = stats.rows, "Parsing");
        }
    }

    pb.finish_and_clear();
    stats.elapsed = start.elapsed();

    info!(
        dataset = D::NAME,
        rows = stats.rows,
        kept = stats.kept,
        discarded = stats.total_discarded(),
        duration_secs = stats.elapsed.as_secs_f64(),
        "Dataset pass complete"
    );
    Ok(stats)
}
