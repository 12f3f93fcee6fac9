//! Episodic: static TV-series dataset builder
//!
//! This crate joins three IMDb dumps into a set of static JSON documents that a
//! read-only API can serve without a database:
//!
//! 1. **Ratings Pass** -- Load every `tconst -> (averageRating, numVotes)` pair;
//!    nothing without a rating is ever kept
//! 2. **Episode Link Pass** -- Keep rated episodes of rated series, building one
//!    accumulator per series (episodes in link order) and one per episode
//! 3. **Titles Pass** -- Attach basics to the series and titles to the episodes
//!    created by pass 2; every other title is skipped
//! 4. **Assembly** -- Emit one `<seriesId>.json` per qualifying series plus a
//!    streamed `search.json`, freeing each series as soon as it is written
//!
//! # Architecture
//!
//! - **Sequential passes** -- Each pass depends on the previous one's maps, so
//!   the dumps are fetched, parsed, and dropped one at a time
//! - **Streaming rows** -- The parser yields one row at a time; only the
//!   decompressed text of the current dump is resident
//! - **Progressive pruning** -- Ratings move into accumulators as links consume
//!   them, and accumulators are removed as series are emitted
//! - **Deterministic output** -- Series are emitted in numeric id order and all
//!   nested maps and indexes are sorted
//!
//! # Key Modules
//!
//! - [`source`] -- HTTP or local retrieval with gzip decompression
//! - [`parser`] -- Streaming TSV reader with `\N` null handling
//! - [`dataset`] -- Fixed schemas and row decoders for the three dumps
//! - [`index`] -- Cross-reference maps and the per-pass row handlers
//! - [`assemble`] -- Series/episode documents and sorted indexes
//! - [`output`] -- Search index streaming and per-series files
//! - [`extract`] -- Pipeline driver
//! - [`models`] -- Records, accumulators, and output documents
//! - [`stats`] -- Per-pass counters for the run summary
//! - [`config`] -- Source locations and tuning constants
//!
//! # Example Usage
//!
//! ```bash
//! # Build tmp/imdb/tv from the live IMDb dumps
//! episodic
//!
//! # Build from local copies into another directory
//! episodic --ratings title.ratings.tsv.gz --episodes title.episode.tsv.gz \
//!     --titles title.basics.tsv.gz --output public/imdb/tv
//! ```

pub mod assemble;
pub mod config;
pub mod dataset;
pub mod extract;
pub mod index;
pub mod models;
pub mod output;
pub mod parser;
pub mod source;
pub mod stats;
