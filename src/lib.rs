//! `FacetFind` - Filter a garment catalog by color and size with faceted counts.

#![deny(
    warnings,
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]

pub mod catalog;
pub mod dimension;
pub mod error;
pub mod search;
pub mod types;

pub use catalog::Catalog;
pub use dimension::{Dimension, FacetSet, Schema};
pub use error::{Error, Result};
pub use search::{SearchEngine, SearchOptions, SearchResults};
pub use types::{Color, ColorCount, FacetCount, FacetValue, Item, Size, SizeCount};
