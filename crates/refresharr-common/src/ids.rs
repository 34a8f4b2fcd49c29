//! Typed ID wrappers for the integer identifiers the *arr APIs hand out.
//!
//! Sonarr and Radarr number series, episodes, movies and commands from
//! independent sequences, so the wrappers keep an episode ID from being
//! passed where a series ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arr_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// The raw identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

arr_id!(
    /// Sonarr series identifier.
    SeriesId
);

arr_id!(
    /// Sonarr episode identifier.
    EpisodeId
);

arr_id!(
    /// Radarr movie identifier.
    MovieId
);

arr_id!(
    /// Identifier of a command accepted by the `command` endpoint.
    CommandId
);
