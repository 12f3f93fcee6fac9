//! In-memory join state for the three dataset passes.
//!
//! Passes must run in the order ratings, episode links, titles. Ratings gate
//! which links are kept; the accumulators created by the link pass are the
//! membership test for the title pass. Ratings are moved into accumulators as
//! links consume them and the leftovers are released once the link pass
//! ends, so peak memory follows the rated TV subset rather than the dumps.

use crate::dataset::Discard;
use crate::models::{
    EpisodeAccumulator, EpisodeLinkRecord, RatingRecord, RatingRow, SeriesAccumulator, TitleRecord,
};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Kept,
    Discarded(Discard),
}

#[derive(Default)]
pub struct CrossReference {
    ratings: FxHashMap<String, RatingRecord>,
    pub(crate) series: FxHashMap<String, SeriesAccumulator>,
    pub(crate) episodes: FxHashMap<String, EpisodeAccumulator>,
}

impl CrossReference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass 1. Unconditional; a repeated id keeps the last rating.
    pub fn insert_rating(&mut self, row: RatingRow) -> Outcome {
        self.ratings.insert(row.id, row.rating);
        Outcome::Kept
    }

    /// Pass 2. Keeps a link only when both ends are rated and neither id has
    /// already been claimed in the other role.
    pub fn link_episode(&mut self, link: EpisodeLinkRecord) -> Outcome {
        let EpisodeLinkRecord {
            episode_id,
            series_id,
            season_number,
            episode_number,
        } = link;

        if episode_id == series_id
            || self.episodes.contains_key(&episode_id)
            || self.series.contains_key(&episode_id)
            || self.episodes.contains_key(&series_id)
        {
            debug!(episode = %episode_id, series = %series_id, "Conflicting episode link");
            return Outcome::Discarded(Discard::Conflict);
        }

        let series_known = self.series.contains_key(&series_id);
        if !self.ratings.contains_key(&episode_id)
            || !(series_known || self.ratings.contains_key(&series_id))
        {
            return Outcome::Discarded(Discard::Unrated);
        }

        let Some(episode_rating) = self.ratings.remove(&episode_id) else {
            return Outcome::Discarded(Discard::Unrated);
        };

        let series = match self.series.entry(series_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let Some(rating) = self.ratings.remove(entry.key()) else {
                    return Outcome::Discarded(Discard::Unrated);
                };
                entry.insert(SeriesAccumulator {
                    rating,
                    basics: None,
                    episode_ids: Vec::new(),
                })
            }
        };
        series.episode_ids.push(episode_id.clone());

        self.episodes.insert(
            episode_id,
            EpisodeAccumulator {
                season_number,
                episode_number,
                rating: episode_rating,
                primary_title: None,
            },
        );
        Outcome::Kept
    }

    /// Ends pass 2. Ratings that no link consumed can never reach the output.
    pub fn finish_links(&mut self) {
        let unused = self.rating_count();
        self.ratings = FxHashMap::default();
        info!(
            series = self.series_count(),
            episodes = self.episode_count(),
            unused_ratings = unused,
            "Episode links resolved"
        );
    }

    /// Pass 3. Only ids created by pass 2, in the matching role, take basics.
    pub fn attach_title(&mut self, title: TitleRecord) -> Outcome {
        let TitleRecord {
            id,
            title_type,
            basics,
        } = title;

        if title_type.is_series() {
            if let Some(series) = self.series.get_mut(&id) {
                series.basics = Some(basics);
                return Outcome::Kept;
            }
        } else if let Some(episode) = self.episodes.get_mut(&id) {
            episode.primary_title = Some(basics.primary_title);
            return Outcome::Kept;
        }

        if self.series.contains_key(&id) || self.episodes.contains_key(&id) {
            debug!(id = %id, ?title_type, "Title type conflicts with linked role");
            Outcome::Discarded(Discard::Conflict)
        } else {
            Outcome::Discarded(Discard::Unreferenced)
        }
    }

    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    #[cfg(test)]
    pub fn contains_series(&self, id: &str) -> bool {
        self.series.contains_key(id)
    }

    #[cfg(test)]
    pub fn contains_episode(&self, id: &str) -> bool {
        self.episodes.contains_key(id)
    }

    #[cfg(test)]
    pub fn series(&self, id: &str) -> Option<&SeriesAccumulator> {
        self.series.get(id)
    }

    #[cfg(test)]
    pub fn episode(&self, id: &str) -> Option<&EpisodeAccumulator> {
        self.episodes.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Basics, TitleType};

    fn rating(id: &str, average_rating: f64, num_votes: u64) -> RatingRow {
        RatingRow {
            id: id.to_string(),
            rating: RatingRecord {
                average_rating,
                num_votes,
            },
        }
    }

    fn link(episode: &str, series: &str, season: u32, number: u32) -> EpisodeLinkRecord {
        EpisodeLinkRecord {
            episode_id: episode.to_string(),
            series_id: series.to_string(),
            season_number: season,
            episode_number: number,
        }
    }

    fn title(id: &str, title_type: TitleType, name: &str) -> TitleRecord {
        TitleRecord {
            id: id.to_string(),
            title_type,
            basics: Basics {
                primary_title: name.to_string(),
                ..Basics::default()
            },
        }
    }

    fn rated(ids: &[&str]) -> CrossReference {
        let mut xref = CrossReference::new();
        for id in ids {
            xref.insert_rating(rating(id, 7.5, 10));
        }
        xref
    }

    #[test]
    fn link_creates_accumulators() {
        let mut xref = rated(&["tt1", "tt2", "tt3"]);
        assert_eq!(xref.link_episode(link("tt2", "tt1", 1, 1)), Outcome::Kept);
        assert_eq!(xref.link_episode(link("tt3", "tt1", 1, 2)), Outcome::Kept);

        let series = xref.series("tt1").unwrap();
        assert_eq!(series.episode_ids, vec!["tt2", "tt3"]);
        assert!(series.basics.is_none());

        let episode = xref.episode("tt3").unwrap();
        assert_eq!((episode.season_number, episode.episode_number), (1, 2));
        assert_eq!(episode.rating.num_votes, 10);
    }

    #[test]
    fn link_moves_ratings_out_of_the_rating_map() {
        let mut xref = rated(&["tt1", "tt2", "tt3", "tt99"]);
        xref.link_episode(link("tt2", "tt1", 1, 1));
        xref.link_episode(link("tt3", "tt1", 1, 2));
        assert_eq!(xref.rating_count(), 1);

        xref.finish_links();
        assert_eq!(xref.rating_count(), 0);
        assert_eq!(xref.series_count(), 1);
        assert_eq!(xref.episode_count(), 2);
    }

    #[test]
    fn link_requires_rated_episode() {
        let mut xref = rated(&["tt1"]);
        assert_eq!(
            xref.link_episode(link("tt2", "tt1", 1, 1)),
            Outcome::Discarded(Discard::Unrated)
        );
        assert!(!xref.contains_series("tt1"));
        assert!(!xref.contains_episode("tt2"));
        // The series rating is still available for a later rated episode.
        assert_eq!(xref.rating_count(), 1);
    }

    #[test]
    fn link_requires_rated_series() {
        let mut xref = rated(&["tt2"]);
        assert_eq!(
            xref.link_episode(link("tt2", "tt1", 1, 1)),
            Outcome::Discarded(Discard::Unrated)
        );
        assert!(!xref.contains_episode("tt2"));
        assert_eq!(xref.rating_count(), 1);
    }

    #[test]
    fn link_rejects_duplicate_episode() {
        let mut xref = rated(&["tt1", "tt2", "tt5"]);
        xref.link_episode(link("tt2", "tt1", 1, 1));
        assert_eq!(
            xref.link_episode(link("tt2", "tt5", 2, 2)),
            Outcome::Discarded(Discard::Conflict)
        );
        assert_eq!(xref.series("tt1").unwrap().episode_ids, vec!["tt2"]);
        assert!(!xref.contains_series("tt5"));
    }

    #[test]
    fn link_rejects_role_conflicts() {
        let mut xref = rated(&["tt1", "tt2", "tt3", "tt4"]);
        xref.link_episode(link("tt2", "tt1", 1, 1));

        // A known series cannot become an episode.
        assert_eq!(
            xref.link_episode(link("tt1", "tt4", 1, 1)),
            Outcome::Discarded(Discard::Conflict)
        );
        // A known episode cannot become a series.
        assert_eq!(
            xref.link_episode(link("tt3", "tt2", 1, 1)),
            Outcome::Discarded(Discard::Conflict)
        );
        // Self-parented rows are nonsense.
        assert_eq!(
            xref.link_episode(link("tt4", "tt4", 1, 1)),
            Outcome::Discarded(Discard::Conflict)
        );
    }

    #[test]
    fn title_attaches_series_basics() {
        let mut xref = rated(&["tt1", "tt2"]);
        xref.link_episode(link("tt2", "tt1", 1, 1));
        xref.finish_links();

        assert_eq!(
            xref.attach_title(title("tt1", TitleType::MiniSeries, "Show")),
            Outcome::Kept
        );
        assert_eq!(
            xref.series("tt1").unwrap().basics.as_ref().unwrap().primary_title,
            "Show"
        );
    }

    #[test]
    fn title_attaches_episode_title() {
        let mut xref = rated(&["tt1", "tt2"]);
        xref.link_episode(link("tt2", "tt1", 1, 1));
        xref.finish_links();

        assert_eq!(
            xref.attach_title(title("tt2", TitleType::Episode, "Pilot")),
            Outcome::Kept
        );
        assert_eq!(
            xref.episode("tt2").unwrap().primary_title.as_deref(),
            Some("Pilot")
        );
    }

    #[test]
    fn title_without_accumulator_is_unreferenced() {
        let mut xref = rated(&["tt7"]);
        xref.finish_links();
        assert_eq!(
            xref.attach_title(title("tt7", TitleType::Series, "Lonely")),
            Outcome::Discarded(Discard::Unreferenced)
        );
        assert_eq!(xref.series_count(), 0);
        assert_eq!(xref.episode_count(), 0);
    }

    #[test]
    fn title_with_wrong_role_is_a_conflict() {
        let mut xref = rated(&["tt1", "tt2"]);
        xref.link_episode(link("tt2", "tt1", 1, 1));
        xref.finish_links();

        assert_eq!(
            xref.attach_title(title("tt1", TitleType::Episode, "Show")),
            Outcome::Discarded(Discard::Conflict)
        );
        assert_eq!(
            xref.attach_title(title("tt2", TitleType::Series, "Pilot")),
            Outcome::Discarded(Discard::Conflict)
        );
        assert!(xref.series("tt1").unwrap().basics.is_none());
        assert!(xref.episode("tt2").unwrap().primary_title.is_none());
    }
}
