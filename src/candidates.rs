//! Candidate items fetched from the *arr APIs each cycle.
//!
//! A [`Candidate`] is one of a show (missing-episode hunt), an episode
//! (cutoff-unmet hunt) or a movie (both hunts on the Radarr side). Whether
//! a candidate can be acted on is answered by [`Candidate::eligibility`],
//! which is explicit about the cases where the answer needs a second
//! request to the remote API.

use crate::arr::types::{EpisodeResource, MovieResource, SeriesResource};
use refresharr_common::{EpisodeId, MovieId, SeriesId, WorkCategory};
use std::fmt;

/// A Sonarr series with the episodes fetched for it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
    pub id: SeriesId,
    pub title: String,
    pub monitored: bool,
    /// `None` until the episode list has been fetched for this show.
    pub episodes: Option<Vec<Episode>>,
}

impl Show {
    pub fn with_episodes(mut self, episodes: Vec<Episode>) -> Self {
        self.episodes = Some(episodes);
        self
    }

    /// Episodes that are monitored and have no file.
    pub fn missing_monitored_episodes(&self) -> impl Iterator<Item = &Episode> + '_ {
        self.episodes
            .iter()
            .flatten()
            .filter(|episode| episode.is_missing_and_monitored())
    }
}

impl From<SeriesResource> for Show {
    fn from(resource: SeriesResource) -> Self {
        Self {
            id: SeriesId::new(resource.id),
            title: resource.title.unwrap_or_else(|| "Unknown Show".to_string()),
            monitored: resource.monitored,
            episodes: None,
        }
    }
}

/// A Sonarr episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub id: EpisodeId,
    pub series_id: SeriesId,
    pub monitored: bool,
    pub has_file: bool,
    pub season_number: i32,
    pub episode_number: i32,
    pub title: String,
    /// Parent series title, when the record carried it.
    pub series_title: Option<String>,
    /// Parent series monitored flag, when the record embedded the series.
    pub series_monitored: Option<bool>,
}

impl Episode {
    pub fn is_missing_and_monitored(&self) -> bool {
        self.monitored && !self.has_file
    }
}

impl From<EpisodeResource> for Episode {
    fn from(resource: EpisodeResource) -> Self {
        let series = resource.series.unwrap_or_default();
        Self {
            id: EpisodeId::new(resource.id),
            series_id: SeriesId::new(resource.series_id),
            monitored: resource.monitored,
            has_file: resource.has_file,
            season_number: resource.season_number,
            episode_number: resource.episode_number,
            title: resource
                .title
                .unwrap_or_else(|| "Unknown Episode Title".to_string()),
            series_title: resource.series_title.or(series.title),
            series_monitored: series.monitored,
        }
    }
}

/// A Radarr movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub year: Option<i32>,
    pub monitored: bool,
    pub has_file: bool,
}

impl From<MovieResource> for Movie {
    fn from(resource: MovieResource) -> Self {
        Self {
            id: MovieId::new(resource.id),
            title: resource.title.unwrap_or_else(|| "Unknown Movie".to_string()),
            year: resource.year,
            monitored: resource.monitored,
            has_file: resource.has_file,
        }
    }
}

/// Something the hunt loop can refresh and search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Show(Show),
    Episode(Episode),
    Movie(Movie),
}

/// A remote fetch needed before eligibility can be decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The show's episode list.
    Episodes(SeriesId),
    /// The parent series record (for its monitored flag).
    Series(SeriesId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ineligible(&'static str),
    /// Eligible so far; the answer depends on a secondary fetch.
    Deferred(Lookup),
}

impl Eligibility {
    pub fn is_ineligible(&self) -> bool {
        matches!(self, Self::Ineligible(_))
    }
}

impl Candidate {
    /// Identifier recorded in the processed-ID store.
    ///
    /// Shows are tracked by series ID in the missing store, episodes and
    /// movies by their own ID.
    pub fn id(&self) -> i64 {
        match self {
            Self::Show(show) => show.id.get(),
            Self::Episode(episode) => episode.id.get(),
            Self::Movie(movie) => movie.id.get(),
        }
    }

    pub fn eligibility(&self, category: WorkCategory, monitored_only: bool) -> Eligibility {
        match (self, category) {
            (Self::Show(show), WorkCategory::Missing) => {
                if monitored_only && !show.monitored {
                    return Eligibility::Ineligible("show is not monitored");
                }
                match &show.episodes {
                    None => Eligibility::Deferred(Lookup::Episodes(show.id)),
                    Some(_) if show.missing_monitored_episodes().next().is_some() => {
                        Eligibility::Eligible
                    }
                    Some(_) => Eligibility::Ineligible("no missing monitored episodes"),
                }
            }
            (Self::Show(_), WorkCategory::Upgrade) => {
                Eligibility::Ineligible("shows are searched per episode for upgrades")
            }
            (Self::Episode(episode), WorkCategory::Missing) => {
                if episode.is_missing_and_monitored() {
                    Eligibility::Eligible
                } else {
                    Eligibility::Ineligible("episode is unmonitored or has a file")
                }
            }
            (Self::Episode(episode), WorkCategory::Upgrade) => {
                if !monitored_only {
                    return Eligibility::Eligible;
                }
                if !episode.monitored {
                    return Eligibility::Ineligible("episode is not monitored");
                }
                match episode.series_monitored {
                    Some(true) => Eligibility::Eligible,
                    Some(false) => Eligibility::Ineligible("series is not monitored"),
                    None => Eligibility::Deferred(Lookup::Series(episode.series_id)),
                }
            }
            (Self::Movie(movie), category) => {
                if category == WorkCategory::Missing && movie.has_file {
                    return Eligibility::Ineligible("movie already has a file");
                }
                if monitored_only && !movie.monitored {
                    return Eligibility::Ineligible("movie is not monitored");
                }
                Eligibility::Eligible
            }
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show(show) => write!(f, "'{}'", show.title),
            Self::Episode(episode) => write!(
                f,
                "\"{}\" - S{:02}E{:02} - \"{}\"",
                episode.series_title.as_deref().unwrap_or("Unknown Series"),
                episode.season_number,
                episode.episode_number,
                episode.title
            ),
            Self::Movie(movie) => match movie.year {
                Some(year) => write!(f, "'{}' ({})", movie.title, year),
                None => write!(f, "'{}'", movie.title),
            },
        }
    }
}
