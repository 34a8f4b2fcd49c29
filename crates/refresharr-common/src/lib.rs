//! Refresharr-Common: Shared types, IDs, and errors.
//!
//! This crate provides functionality used across refresharr:
//!
//! - **Typed IDs**: Integer wrappers for series, episodes, movies and commands
//! - **Core Types**: Media kinds, work categories, hunt modes, selection order
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use refresharr_common::{HuntMode, SeriesId, WorkCategory, Error, Result};
//!
//! let mode: HuntMode = "both".parse().unwrap();
//! assert_eq!(mode.categories(), &[WorkCategory::Missing, WorkCategory::Upgrade]);
//!
//! let series = SeriesId::new(12);
//! assert_eq!(series.get(), 12);
//!
//! fn example() -> Result<()> {
//!     Err(Error::malformed("command response has no id"))
//! }
//! assert!(example().unwrap_err().is_transient());
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
