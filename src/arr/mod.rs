mod client;
pub mod radarr;
pub mod sonarr;
pub mod types;

pub use client::{create_transport, ArrTransport, HttpTransport};
pub use radarr::RadarrApi;
pub use sonarr::SonarrApi;
