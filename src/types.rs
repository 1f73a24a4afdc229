//! Common types and constants for `FacetFind`

use std::fmt;

use uuid::Uuid;

/// Maximum number of values a single dimension may hold
pub const MAX_DIMENSION_VALUES: usize = 32;

/// Maximum label length in bytes
pub const MAX_LABEL_LENGTH: usize = 32;

/// A value of one filterable dimension, addressed by its position in that dimension
pub trait FacetValue: Copy + Eq + fmt::Debug {
    /// Human readable name of the dimension this value belongs to
    const DIMENSION: &'static str;

    /// Value at `index` of its dimension
    fn from_index(index: u8) -> Self;

    /// Position of this value in its dimension
    fn index(self) -> usize;
}

/// A garment size, a position in the schema's size dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Size(u8);

/// A garment color, a position in the schema's color dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(u8);

impl FacetValue for Size {
    const DIMENSION: &'static str = "size";

    fn from_index(index: u8) -> Self {
        Self(index)
    }

    fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl FacetValue for Color {
    const DIMENSION: &'static str = "color";

    fn from_index(index: u8) -> Self {
        Self(index)
    }

    fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Unique identifier
    pub id:    Uuid,
    /// Display name
    pub name:  String,
    /// Size of the item
    pub size:  Size,
    /// Color of the item
    pub color: Color,
}

impl Item {
    /// Create a new item
    #[must_use]
    pub fn new(id: Uuid, name: impl Into<String>, size: Size, color: Color) -> Self {
        Self { id, name: name.into(), size, color }
    }
}

/// Number of matched items having one value of a dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetCount<V> {
    /// The dimension value
    pub value: V,
    /// Matched items having `value`
    pub count: usize,
}

/// Matched items per color
pub type ColorCount = FacetCount<Color>;

/// Matched items per size
pub type SizeCount = FacetCount<Size>;

const _: () = {
    assert!(MAX_DIMENSION_VALUES > 0);
    assert!(MAX_DIMENSION_VALUES <= u32::BITS as usize);
    assert!(MAX_DIMENSION_VALUES <= u8::MAX as usize);
    assert!(MAX_LABEL_LENGTH > 0);
};
