/// Ratings dump (`tconst, averageRating, numVotes`)
pub const DEFAULT_RATINGS_URL: &str = "https://datasets.imdbws.com/title.ratings.tsv.gz";

/// Episode link dump (`tconst, parentTconst, seasonNumber, episodeNumber`)
pub const DEFAULT_EPISODES_URL: &str = "https://datasets.imdbws.com/title.episode.tsv.gz";

/// Title basics dump, by far the largest of the three
pub const DEFAULT_TITLES_URL: &str = "https://datasets.imdbws.com/title.basics.tsv.gz";

/// Series output directory; cleared at the start of every run
pub const DEFAULT_OUTPUT_DIR: &str = "tmp/imdb/tv";

/// Search index file name, written inside the series directory
pub const SEARCH_FILE_NAME: &str = "search.json";

/// Token the dumps use for a null field
pub const NULL_SENTINEL: &str = "\\N";

/// Progress update interval (tick every N rows)
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// TCP connect timeout for dataset downloads
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Buffer size for the search index and per-series writers
pub const WRITE_BUFFER_SIZE: usize = 128 * 1024;

/// Where each dataset is fetched from. Locators starting with `http://` or
/// `https://` are downloaded, anything else is read as a local file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    pub ratings: String,
    pub episodes: String,
    pub titles: String,
}

impl Default for SourceSet {
    fn default() -> Self {
        Self {
            ratings: DEFAULT_RATINGS_URL.to_string(),
            episodes: DEFAULT_EPISODES_URL.to_string(),
            titles: DEFAULT_TITLES_URL.to_string(),
        }
    }
}
