//! Fixed schemas of the three dumps and their row decoders.
//!
//! Decoding is explicit per dataset: every row either becomes a typed record
//! or is skipped for a counted reason ([`Discard`]). Only a missing column
//! fails the run; a bad value costs at most its own row.

use crate::models::{Basics, EpisodeLinkRecord, RatingRecord, RatingRow, TitleRecord, TitleType};
use crate::parser::{Column, Header, TsvRow};
use anyhow::Result;
use std::fmt;

/// Why a row was dropped. None of these are errors: they are how the join
/// filters the dumps down to rated, placed TV titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Discard {
    /// Season or episode number is null.
    UnknownPlacement,
    /// Series or episode has no rating.
    Unrated,
    /// Title is neither a series nor an episode.
    UnknownTitleType,
    /// Title row for an id no episode link referenced.
    Unreferenced,
    /// Id already seen in the other role (series vs episode) or linked twice.
    Conflict,
    /// Wrong field count, null id, or a value the record can't do without
    /// that isn't numeric.
    Malformed,
}

impl Discard {
    pub const ALL: [Discard; 6] = [
        Discard::UnknownPlacement,
        Discard::Unrated,
        Discard::UnknownTitleType,
        Discard::Unreferenced,
        Discard::Conflict,
        Discard::Malformed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Discard::UnknownPlacement => "unknown placement",
            Discard::Unrated => "unrated",
            Discard::UnknownTitleType => "other title type",
            Discard::Unreferenced => "unreferenced",
            Discard::Conflict => "conflicting id",
            Discard::Malformed => "malformed",
        }
    }
}

impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Record(T),
    Skip(Discard),
}

pub trait Dataset {
    const NAME: &'static str;

    /// Column positions resolved from the header.
    type Schema;
    type Record;

    fn schema(header: &Header) -> Result<Self::Schema>;

    /// Decodes a complete row. Rows with the wrong field count never get here.
    fn decode(schema: &Self::Schema, row: &TsvRow) -> Decoded<Self::Record>;
}

pub struct Ratings;

pub struct RatingsSchema {
    tconst: Column,
    average_rating: Column,
    num_votes: Column,
}

impl Dataset for Ratings {
    const NAME: &'static str = "title.ratings";
    type Schema = RatingsSchema;
    type Record = RatingRow;

    fn schema(header: &Header) -> Result<RatingsSchema> {
        Ok(RatingsSchema {
            tconst: header.column("tconst")?,
            average_rating: header.column("averageRating")?,
            num_votes: header.column("numVotes")?,
        })
    }

    fn decode(schema: &RatingsSchema, row: &TsvRow) -> Decoded<RatingRow> {
        let (Some(id), Some(average_rating), Some(num_votes)) = (
            row.field(schema.tconst),
            row.number::<f64>(schema.average_rating),
            row.number::<u64>(schema.num_votes),
        ) else {
            return Decoded::Skip(Discard::Malformed);
        };

        Decoded::Record(RatingRow {
            id: id.to_string(),
            rating: RatingRecord {
                average_rating,
                num_votes,
            },
        })
    }
}

pub struct EpisodeLinks;

pub struct EpisodeLinksSchema {
    tconst: Column,
    parent_tconst: Column,
    season_number: Column,
    episode_number: Column,
}

impl Dataset for EpisodeLinks {
    const NAME: &'static str = "title.episode";
    type Schema = EpisodeLinksSchema;
    type Record = EpisodeLinkRecord;

    fn schema(header: &Header) -> Result<EpisodeLinksSchema> {
        Ok(EpisodeLinksSchema {
            tconst: header.column("tconst")?,
            parent_tconst: header.column("parentTconst")?,
            season_number: header.column("seasonNumber")?,
            episode_number: header.column("episodeNumber")?,
        })
    }

    fn decode(schema: &EpisodeLinksSchema, row: &TsvRow) -> Decoded<EpisodeLinkRecord> {
        let (Some(season), Some(episode)) = (
            row.field(schema.season_number),
            row.field(schema.episode_number),
        ) else {
            return Decoded::Skip(Discard::UnknownPlacement);
        };

        let (Some(episode_id), Some(series_id), Ok(season_number), Ok(episode_number)) = (
            row.field(schema.tconst),
            row.field(schema.parent_tconst),
            season.trim().parse::<u32>(),
            episode.trim().parse::<u32>(),
        ) else {
            return Decoded::Skip(Discard::Malformed);
        };

        Decoded::Record(EpisodeLinkRecord {
            episode_id: episode_id.to_string(),
            series_id: series_id.to_string(),
            season_number,
            episode_number,
        })
    }
}

pub struct Titles;

pub struct TitlesSchema {
    tconst: Column,
    title_type: Column,
    primary_title: Column,
    is_adult: Column,
    start_year: Column,
    end_year: Column,
    runtime_minutes: Column,
    genres: Column,
}

impl Dataset for Titles {
    const NAME: &'static str = "title.basics";
    type Schema = TitlesSchema;
    type Record = TitleRecord;

    fn schema(header: &Header) -> Result<TitlesSchema> {
        Ok(TitlesSchema {
            tconst: header.column("tconst")?,
            title_type: header.column("titleType")?,
            primary_title: header.column("primaryTitle")?,
            is_adult: header.column("isAdult")?,
            start_year: header.column("startYear")?,
            end_year: header.column("endYear")?,
            runtime_minutes: header.column("runtimeMinutes")?,
            genres: header.column("genres")?,
        })
    }

    fn decode(schema: &TitlesSchema, row: &TsvRow) -> Decoded<TitleRecord> {
        // Most of the dump is movies and shorts; reject them before touching
        // the remaining columns.
        let Some(title_type) = row.field(schema.title_type).and_then(TitleType::parse) else {
            return Decoded::Skip(Discard::UnknownTitleType);
        };
        let Some(id) = row.field(schema.tconst) else {
            return Decoded::Skip(Discard::Malformed);
        };

        let genres = row
            .field(schema.genres)
            .map(|g| {
                g.split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        // Non-numeric years and runtimes leave a gap instead of dropping the title.
        Decoded::Record(TitleRecord {
            id: id.to_string(),
            title_type,
            basics: Basics {
                primary_title: row.field(schema.primary_title).unwrap_or_default().to_string(),
                start_year: row.number(schema.start_year),
                end_year: row.number(schema.end_year),
                runtime_minutes: row.number(schema.runtime_minutes),
                is_adult: row.flag(schema.is_adult),
                genres,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TsvReader;

    fn decode_all<D: Dataset>(text: &str) -> Result<Vec<Decoded<D::Record>>> {
        let reader = TsvReader::from_text(text)?;
        let schema = D::schema(reader.header())?;
        reader
            .map(|row| row.map(|row| D::decode(&schema, &row)))
            .collect()
    }

    const TITLES_HEADER: &str = "tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres\n";

    #[test]
    fn ratings_decode() {
        let rows = decode_all::<Ratings>("tconst\taverageRating\tnumVotes\ntt1\t8.0\t1000\n").unwrap();
        assert_eq!(
            rows,
            vec![Decoded::Record(RatingRow {
                id: "tt1".to_string(),
                rating: RatingRecord {
                    average_rating: 8.0,
                    num_votes: 1000
                },
            })]
        );
    }

    #[test]
    fn ratings_skip_unusable_values() {
        let rows = decode_all::<Ratings>(
            "tconst\taverageRating\tnumVotes\ntt1\t8.0\t\\N\ntt2\tgood\t10\ntt3\t7.5\tlots\n\\N\t7.5\t10\n",
        )
        .unwrap();
        assert_eq!(rows, vec![Decoded::Skip(Discard::Malformed); 4]);
    }

    #[test]
    fn ratings_schema_requires_columns() {
        assert!(decode_all::<Ratings>("tconst\tnumVotes\ntt1\t5\n").is_err());
    }

    #[test]
    fn episode_links_decode() {
        let rows = decode_all::<EpisodeLinks>(
            "tconst\tparentTconst\tseasonNumber\tepisodeNumber\ntt2\ttt1\t1\t3\n",
        )
        .unwrap();
        assert_eq!(
            rows,
            vec![Decoded::Record(EpisodeLinkRecord {
                episode_id: "tt2".to_string(),
                series_id: "tt1".to_string(),
                season_number: 1,
                episode_number: 3,
            })]
        );
    }

    #[test]
    fn episode_links_skip_unknown_placement() {
        let rows = decode_all::<EpisodeLinks>(
            "tconst\tparentTconst\tseasonNumber\tepisodeNumber\ntt2\ttt1\t\\N\t3\ntt3\ttt1\t1\t\\N\n",
        )
        .unwrap();
        assert_eq!(
            rows,
            vec![
                Decoded::Skip(Discard::UnknownPlacement),
                Decoded::Skip(Discard::UnknownPlacement)
            ]
        );
    }

    #[test]
    fn titles_decode_series_basics() {
        let text = format!(
            "{TITLES_HEADER}tt1\ttvSeries\tShow\tShow\t0\t2008\t2013\t49\tCrime,Drama,Thriller\n"
        );
        let rows = decode_all::<Titles>(&text).unwrap();
        let Decoded::Record(title) = &rows[0] else {
            panic!("expected a record, got {:?}", rows[0]);
        };
        assert_eq!(title.title_type, TitleType::Series);
        assert_eq!(title.basics.primary_title, "Show");
        assert_eq!(title.basics.start_year, Some(2008));
        assert_eq!(title.basics.end_year, Some(2013));
        assert_eq!(title.basics.runtime_minutes, Some(49));
        assert!(!title.basics.is_adult);
        assert_eq!(title.basics.genres, vec!["Crime", "Drama", "Thriller"]);
    }

    #[test]
    fn titles_null_fields() {
        let text = format!("{TITLES_HEADER}tt2\ttvEpisode\tPilot\tPilot\t1\t\\N\t\\N\t\\N\t\\N\n");
        let rows = decode_all::<Titles>(&text).unwrap();
        let Decoded::Record(title) = &rows[0] else {
            panic!("expected a record, got {:?}", rows[0]);
        };
        assert_eq!(title.title_type, TitleType::Episode);
        assert_eq!(title.basics.start_year, None);
        assert_eq!(title.basics.runtime_minutes, None);
        assert!(title.basics.is_adult);
        assert!(title.basics.genres.is_empty());
    }

    #[test]
    fn titles_skip_other_types_without_decoding() {
        // Garbage in numeric columns must not fail a row that is skipped anyway.
        let text = format!("{TITLES_HEADER}tt9\tmovie\tFilm\tFilm\tx\tyear\t\\N\t\\N\tDrama\n");
        let rows = decode_all::<Titles>(&text).unwrap();
        assert_eq!(rows, vec![Decoded::Skip(Discard::UnknownTitleType)]);
    }

    #[test]
    fn episode_links_skip_non_numeric_placement() {
        let rows = decode_all::<EpisodeLinks>(
            "tconst\tparentTconst\tseasonNumber\tepisodeNumber\ntt2\ttt1\tone\t3\ntt3\t\\N\t1\t1\n",
        )
        .unwrap();
        assert_eq!(rows, vec![Decoded::Skip(Discard::Malformed); 2]);
    }

    #[test]
    fn titles_keep_rows_with_non_numeric_basics() {
        let text = format!(
            "{TITLES_HEADER}tt1\ttvSeries\tShow\tShow\tyes\t2001\tsoon\tReality-TV\tReality-TV\n"
        );
        let rows = decode_all::<Titles>(&text).unwrap();
        let Decoded::Record(title) = &rows[0] else {
            panic!("expected a record, got {:?}", rows[0]);
        };
        assert_eq!(title.basics.start_year, Some(2001));
        assert_eq!(title.basics.end_year, None);
        assert_eq!(title.basics.runtime_minutes, None);
        assert!(!title.basics.is_adult);
        assert_eq!(title.basics.genres, vec!["Reality-TV"]);
    }

    #[test]
    fn titles_skip_null_id() {
        let text = format!("{TITLES_HEADER}\\N\ttvSeries\tShow\tShow\t0\t\\N\t\\N\t\\N\t\\N\n");
        assert_eq!(decode_all::<Titles>(&text).unwrap(), vec![Decoded::Skip(Discard::Malformed)]);
    }
}
