//! Enums shared by the store, the selection policy and the hunt loop.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which *arr library a piece of work belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Television, served by Sonarr.
    Series,
    /// Movies, served by Radarr.
    Movies,
}

impl MediaKind {
    /// All media kinds, in the order a cycle visits them.
    pub const ALL: [MediaKind; 2] = [MediaKind::Series, MediaKind::Movies];

    /// Name of the *arr application serving this kind.
    pub fn arr_name(self) -> &'static str {
        match self {
            Self::Series => "Sonarr",
            Self::Movies => "Radarr",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Series => write!(f, "series"),
            Self::Movies => write!(f, "movies"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "series" | "sonarr" | "tv" => Ok(Self::Series),
            "movies" | "radarr" | "movie" => Ok(Self::Movies),
            other => Err(Error::configuration(format!(
                "unknown media kind '{other}'"
            ))),
        }
    }
}

/// The two kinds of work tracked by the processed-ID stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkCategory {
    /// Items without a file.
    Missing,
    /// Items whose file is below the quality cutoff.
    Upgrade,
}

impl WorkCategory {
    /// Both categories.
    pub const ALL: [WorkCategory; 2] = [WorkCategory::Missing, WorkCategory::Upgrade];
}

impl fmt::Display for WorkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Upgrade => write!(f, "upgrade"),
        }
    }
}

/// What a cycle hunts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HuntMode {
    Missing,
    Upgrade,
    Both,
}

impl HuntMode {
    /// Work categories this mode runs, in execution order.
    pub fn categories(self) -> &'static [WorkCategory] {
        match self {
            Self::Missing => &[WorkCategory::Missing],
            Self::Upgrade => &[WorkCategory::Upgrade],
            Self::Both => &WorkCategory::ALL,
        }
    }
}

impl fmt::Display for HuntMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Upgrade => write!(f, "upgrade"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl FromStr for HuntMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "missing" => Ok(Self::Missing),
            "upgrade" => Ok(Self::Upgrade),
            "both" => Ok(Self::Both),
            _ => Err(Error::configuration(format!(
                "unknown hunt mode '{s}', use 'missing', 'upgrade' or 'both'"
            ))),
        }
    }
}

/// Order in which candidates (or pages) are visited within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionOrder {
    /// Index order as returned by the remote API.
    Sequential,
    /// Shuffled indices, or uniformly sampled page numbers.
    Randomized,
}

impl SelectionOrder {
    /// Map the `random_selection` configuration flag to an order.
    pub fn from_random_flag(random: bool) -> Self {
        if random {
            Self::Randomized
        } else {
            Self::Sequential
        }
    }
}

impl fmt::Display for SelectionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Randomized => write!(f, "randomized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hunt_mode_parse() {
        assert_eq!("missing".parse::<HuntMode>().unwrap(), HuntMode::Missing);
        assert_eq!(" Upgrade ".parse::<HuntMode>().unwrap(), HuntMode::Upgrade);
        assert_eq!("BOTH".parse::<HuntMode>().unwrap(), HuntMode::Both);

        let err = "everything".parse::<HuntMode>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("everything"));
    }

    #[test]
    fn test_hunt_mode_categories() {
        assert_eq!(HuntMode::Missing.categories(), &[WorkCategory::Missing]);
        assert_eq!(HuntMode::Upgrade.categories(), &[WorkCategory::Upgrade]);
        assert_eq!(
            HuntMode::Both.categories(),
            &[WorkCategory::Missing, WorkCategory::Upgrade]
        );
    }

    #[test]
    fn test_media_kind_parse_and_display() {
        assert_eq!("sonarr".parse::<MediaKind>().unwrap(), MediaKind::Series);
        assert_eq!("movies".parse::<MediaKind>().unwrap(), MediaKind::Movies);
        assert!("music".parse::<MediaKind>().is_err());
        assert_eq!(MediaKind::Series.to_string(), "series");
        assert_eq!(MediaKind::Movies.arr_name(), "Radarr");
    }

    #[test]
    fn test_selection_order_from_flag() {
        assert_eq!(SelectionOrder::from_random_flag(true), SelectionOrder::Randomized);
        assert_eq!(SelectionOrder::from_random_flag(false), SelectionOrder::Sequential);
    }
}
