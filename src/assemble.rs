//! Turns the joined accumulators into output documents, one series at a time.

use crate::index::CrossReference;
use crate::models::{EpisodeEntry, EpisodeMap, SearchRecord, SeriesAccumulator, SeriesDetails};
use anyhow::Result;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Receives each qualifying series as soon as it is assembled.
pub trait SeriesSink {
    fn emit(&mut self, search: &SearchRecord, details: &SeriesDetails) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyStats {
    pub series_emitted: u64,
    pub series_dropped: u64,
    pub episodes_emitted: u64,
}

/// Orders tconst ids numerically: `tt999` before `tt1000`.
pub fn natural_id_order(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Drains every series out of `xref`, emitting the qualifying ones in id
/// order. Each series and its episodes are removed from the maps before the
/// next series is visited.
pub fn assemble<S: SeriesSink>(xref: &mut CrossReference, sink: &mut S) -> Result<AssemblyStats> {
    let mut stats = AssemblyStats::default();

    let mut ids: Vec<String> = xref.series.keys().cloned().collect();
    ids.sort_unstable_by(|a, b| natural_id_order(a, b));

    info!(series = ids.len(), "Assembling series");

    for id in ids {
        let Some(series) = xref.series.remove(&id) else {
            continue;
        };

        match assemble_series(xref, id, series) {
            Some((search, details)) => {
                sink.emit(&search, &details)?;
                stats.series_emitted += 1;
                stats.episodes_emitted += details
                    .episode_map
                    .values()
                    .map(|season| season.len() as u64)
                    .sum::<u64>();
            }
            None => stats.series_dropped += 1,
        }
    }

    info!(
        emitted = stats.series_emitted,
        dropped = stats.series_dropped,
        episodes = stats.episodes_emitted,
        "Assembly complete"
    );
    Ok(stats)
}

/// Builds both documents for one series, consuming its episode accumulators.
/// Returns `None` when the series never received basics or has no episodes.
fn assemble_series(
    xref: &mut CrossReference,
    id: String,
    series: SeriesAccumulator,
) -> Option<(SearchRecord, SeriesDetails)> {
    let SeriesAccumulator {
        rating,
        basics,
        episode_ids,
    } = series;

    let Some(basics) = basics.filter(|_| !episode_ids.is_empty()) else {
        for episode_id in &episode_ids {
            xref.episodes.remove(episode_id);
        }
        debug!(id = %id, "Dropping series without basics or episodes");
        return None;
    };

    let mut episode_map = EpisodeMap::new();
    let mut seasons = BTreeSet::new();
    let mut numbers = BTreeSet::new();

    for episode_id in episode_ids {
        let Some(episode) = xref.episodes.remove(&episode_id) else {
            continue;
        };

        seasons.insert(episode.season_number);
        numbers.insert(episode.episode_number);

        episode_map.entry(episode.season_number).or_default().insert(
            episode.episode_number,
            EpisodeEntry {
                id: episode_id,
                primary_title: episode.primary_title.unwrap_or_default(),
                average_rating: episode.rating.average_rating,
                num_votes: episode.rating.num_votes,
            },
        );
    }

    if episode_map.is_empty() {
        debug!(id = %id, "Dropping series whose episodes were all consumed");
        return None;
    }

    let search = SearchRecord {
        id: id.clone(),
        primary_title: basics.primary_title.clone(),
        start_year: basics.start_year,
        num_votes: rating.num_votes,
    };

    let details = SeriesDetails {
        id,
        primary_title: basics.primary_title,
        start_year: basics.start_year,
        end_year: basics.end_year,
        runtime_minutes: basics.runtime_minutes,
        average_rating: rating.average_rating,
        num_votes: rating.num_votes,
        is_adult: basics.is_adult,
        genres: basics.genres,
        episode_index: numbers.into_iter().collect(),
        seasons_index: seasons.into_iter().collect(),
        episode_map,
    };

    Some((search, details))
}
