//! Catalog loading
//!
//! A catalog file is a TOML document:
//!
//! ```toml
//! sizes = ["Small", "Medium", "Large"]
//! colors = ["Red", "Blue", "Black", "White", "Yellow"]
//!
//! [[items]]
//! id = "0f8fad5b-d9cb-469f-a165-70867728950e"
//! name = "Black - Medium"
//! size = "Medium"
//! color = "black"
//! ```
//!
//! `sizes` and `colors` fall back to the default schema when omitted, `id`
//! to a fresh random identifier and `name` to `"<Color> - <Size>"`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;
use uuid::Uuid;

use crate::dimension::{Dimension, Schema};
use crate::error::{Error, Result};
use crate::search::SearchEngine;
use crate::types::Item;

/// Sample stock as `(color, size)` labels of the default schema
const SAMPLE: [(&str, &str); 8] = [
    ("Black", "Medium"),
    ("Blue", "Large"),
    ("Red", "Small"),
    ("Black", "Small"),
    ("Black", "Large"),
    ("Yellow", "Small"),
    ("White", "Medium"),
    ("Black", "Large"),
];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    sizes:  Option<Vec<String>>,
    colors: Option<Vec<String>>,
    #[serde(default)]
    items:  Vec<ItemEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemEntry {
    id:    Option<Uuid>,
    name:  Option<String>,
    size:  String,
    color: String,
}

/// A schema together with the items it describes
#[derive(Debug, Clone)]
pub struct Catalog {
    schema: Schema,
    items:  Vec<Item>,
}

impl Catalog {
    /// Create a catalog from parts
    #[must_use]
    pub const fn new(schema: Schema, items: Vec<Item>) -> Self {
        Self { schema, items }
    }

    /// The eight-shirt sample catalog over the default schema
    #[must_use]
    pub fn sample() -> Self {
        let schema = Schema::default();
        let items = SAMPLE
            .iter()
            .filter_map(|&(color, size)| {
                let item = Item::new(
                    Uuid::new_v4(),
                    format!("{color} - {size}"),
                    schema.sizes.value(size)?,
                    schema.colors.value(color)?,
                );
                Some(item)
            })
            .collect();
        Self { schema, items }
    }

    /// Parse a catalog from TOML text
    ///
    /// # Errors
    /// Returns error if:
    /// - The text is not a valid catalog document
    /// - A dimension is invalid
    /// - An item names an unknown size or color
    /// - Two items share an identifier
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text).map_err(|e| Error::catalog(&e.to_string()))?;

        let defaults = Schema::default();
        let sizes = match file.sizes {
            Some(labels) => Dimension::new(&labels)?,
            None => defaults.sizes,
        };
        let colors = match file.colors {
            Some(labels) => Dimension::new(&labels)?,
            None => defaults.colors,
        };
        let schema = Schema::new(sizes, colors);

        let mut seen = HashSet::with_capacity(file.items.len());
        let mut items = Vec::with_capacity(file.items.len());
        for entry in file.items {
            let size = schema.sizes.resolve(&entry.size)?;
            let color = schema.colors.resolve(&entry.color)?;
            let id = entry.id.unwrap_or_else(Uuid::new_v4);
            if !seen.insert(id) {
                return Err(Error::catalog(&format!("duplicate item id {id}")));
            }

            let name = entry.name.unwrap_or_else(|| {
                format!(
                    "{} - {}",
                    schema.colors.label(color).unwrap_or_default(),
                    schema.sizes.label(size).unwrap_or_default()
                )
            });
            debug!("item {id}: {name}");
            items.push(Item::new(id, name, size, color));
        }

        Ok(Self { schema, items })
    }

    /// Load a catalog file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not a valid catalog
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let catalog = Self::from_toml(&text)?;
        info!(
            "Loaded {} items ({} sizes, {} colors) from {}",
            catalog.items.len(),
            catalog.schema.sizes.len(),
            catalog.schema.colors.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Schema describing the items
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Items in catalog order
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Build a search engine over this catalog
    #[must_use = "SearchEngine must be used to search the catalog"]
    pub fn into_engine(self) -> SearchEngine {
        SearchEngine::with_schema(self.schema, self.items)
    }
}
