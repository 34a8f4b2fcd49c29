//! Refresharr - searches Sonarr and Radarr for missing and cutoff-unmet media
//!
//! Each cycle picks a small, quota-bounded batch of monitored items that
//! have not been searched recently, refreshes them, triggers a search, and
//! records what was searched so later cycles move on to other items.

pub mod arr;
pub mod candidates;
pub mod config;
pub mod hunter;
pub mod pagination;
pub mod selection;
pub mod state;
