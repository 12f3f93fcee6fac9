use serde::Serialize;
use std::collections::BTreeMap;

/// Opaque tconst-style identifier of a series (`tt0903747`)
pub type SeriesId = String;

/// Opaque tconst-style identifier of an episode
pub type EpisodeId = String;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRecord {
    pub average_rating: f64,
    pub num_votes: u64,
}

/// A row of the ratings dump, keyed by the title it rates.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRow {
    pub id: String,
    pub rating: RatingRecord,
}

/// Placement of an episode inside its parent series. Rows with an unknown
/// season or episode number never make it this far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeLinkRecord {
    pub episode_id: EpisodeId,
    pub series_id: SeriesId,
    pub season_number: u32,
    pub episode_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleType {
    Series,
    MiniSeries,
    Episode,
}

impl TitleType {
    /// Maps the dump's `titleType` column; movies, shorts, games etc. are `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tvSeries" => Some(TitleType::Series),
            "tvMiniSeries" => Some(TitleType::MiniSeries),
            "tvEpisode" => Some(TitleType::Episode),
            _ => None,
        }
    }

    pub fn is_series(self) -> bool {
        matches!(self, TitleType::Series | TitleType::MiniSeries)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Basics {
    pub primary_title: String,
    pub start_year: Option<u32>,
    pub end_year: Option<u32>,
    pub runtime_minutes: Option<u32>,
    pub is_adult: bool,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleRecord {
    pub id: String,
    pub title_type: TitleType,
    pub basics: Basics,
}

/// Per-series join state. Created by the first episode link that references
/// the series, which is also when its rating is moved in.
#[derive(Debug, Clone)]
pub struct SeriesAccumulator {
    pub rating: RatingRecord,
    pub basics: Option<Basics>,
    pub episode_ids: Vec<EpisodeId>, // link order
}

#[derive(Debug, Clone)]
pub struct EpisodeAccumulator {
    pub season_number: u32,
    pub episode_number: u32,
    pub rating: RatingRecord,
    pub primary_title: Option<String>,
}

/// Season number -> episode number -> episode. Integer keys serialize as JSON
/// object keys in ascending numeric order.
pub type EpisodeMap = BTreeMap<u32, BTreeMap<u32, EpisodeEntry>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeEntry {
    pub id: EpisodeId,
    #[serde(rename = "pT")]
    pub primary_title: String,
    #[serde(rename = "aR")]
    pub average_rating: f64,
    #[serde(rename = "nV")]
    pub num_votes: u64,
}

/// One element of `search.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRecord {
    pub id: SeriesId,
    #[serde(rename = "pT")]
    pub primary_title: String,
    #[serde(rename = "sY")]
    pub start_year: Option<u32>,
    #[serde(rename = "nV")]
    pub num_votes: u64,
}

/// Contents of `<seriesId>.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesDetails {
    pub id: SeriesId,
    #[serde(rename = "pT")]
    pub primary_title: String,
    #[serde(rename = "sY")]
    pub start_year: Option<u32>,
    #[serde(rename = "eY")]
    pub end_year: Option<u32>,
    #[serde(rename = "rM")]
    pub runtime_minutes: Option<u32>,
    #[serde(rename = "aR")]
    pub average_rating: f64,
    #[serde(rename = "nV")]
    pub num_votes: u64,
    #[serde(rename = "iA")]
    pub is_adult: bool,
    #[serde(rename = "g")]
    pub genres: Vec<String>,
    #[serde(rename = "eI")]
    pub episode_index: Vec<u32>,
    #[serde(rename = "sI")]
    pub seasons_index: Vec<u32>,
    #[serde(rename = "eM")]
    pub episode_map: EpisodeMap,
}
