//! Closed, ordered value sets for the filterable dimensions of a catalog

use std::marker::PhantomData;

use arrayvec::{ArrayString, ArrayVec};
use log::debug;

use crate::error::{Error, Result};
use crate::types::{Color, FacetValue, MAX_DIMENSION_VALUES, MAX_LABEL_LENGTH, Size};

/// Sizes known to the default schema, in canonical order
pub const DEFAULT_SIZES: [&str; 3] = ["Small", "Medium", "Large"];

/// Colors known to the default schema, in canonical order
pub const DEFAULT_COLORS: [&str; 5] = ["Red", "Blue", "Black", "White", "Yellow"];

/// A closed, ordered set of labelled values
///
/// The position of a label is the value's identity: `V::from_index(i)` names
/// the `i`-th label. Labels are unique ignoring ASCII case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension<V> {
    /// Labels in canonical order
    labels: ArrayVec<ArrayString<MAX_LABEL_LENGTH>, MAX_DIMENSION_VALUES>,
    marker: PhantomData<V>,
}

impl<V: FacetValue> Dimension<V> {
    /// Create a dimension from labels in canonical order
    ///
    /// # Errors
    /// Returns error if:
    /// - No labels are given, or a label is empty
    /// - Two labels are equal ignoring ASCII case
    /// - A label exceeds `MAX_LABEL_LENGTH`
    /// - More than `MAX_DIMENSION_VALUES` labels are given
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        let mut dimension = Self { labels: ArrayVec::new(), marker: PhantomData };

        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() {
                return Err(Error::catalog(&format!("empty {} label", V::DIMENSION)));
            }
            if dimension.value(label).is_some() {
                return Err(Error::catalog(&format!("duplicate {} '{label}'", V::DIMENSION)));
            }
            let label = ArrayString::from(label).map_err(|_| Error::LabelTooLong)?;
            dimension.labels.try_push(label).map_err(|_| Error::TooManyValues)?;
        }

        if dimension.is_empty() {
            return Err(Error::catalog(&format!("{} dimension has no values", V::DIMENSION)));
        }

        debug!("{} dimension: {:?}", V::DIMENSION, dimension.labels);
        Ok(dimension)
    }

    /// Build a dimension from labels known to be valid
    fn builtin(labels: &[&str]) -> Self {
        let labels = labels
            .iter()
            .filter_map(|label| ArrayString::from(label).ok())
            .take(MAX_DIMENSION_VALUES)
            .collect();
        Self { labels, marker: PhantomData }
    }

    /// Number of values
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the dimension has no values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Whether `value` is a position of this dimension
    #[must_use]
    pub fn contains(&self, value: V) -> bool {
        value.index() < self.len()
    }

    /// All values in canonical order
    pub fn all(&self) -> impl Iterator<Item = V> {
        (0..self.labels.len()).filter_map(|i| u8::try_from(i).ok()).map(V::from_index)
    }

    /// Label of `value`, if it belongs to this dimension
    #[must_use]
    pub fn label(&self, value: V) -> Option<&str> {
        self.labels.get(value.index()).map(ArrayString::as_str)
    }

    /// Value named `label`, compared ignoring ASCII case
    #[must_use]
    pub fn value(&self, label: &str) -> Option<V> {
        let label = label.trim();
        self.labels
            .iter()
            .position(|known| known.eq_ignore_ascii_case(label))
            .and_then(|i| u8::try_from(i).ok())
            .map(V::from_index)
    }

    /// Value named `label`
    ///
    /// # Errors
    /// Returns error if no value of this dimension is named `label`
    pub fn resolve(&self, label: &str) -> Result<V> {
        self.value(label)
            .ok_or_else(|| Error::catalog(&format!("unknown {} '{}'", V::DIMENSION, label.trim())))
    }

    /// Resolve every label, preserving order
    ///
    /// # Errors
    /// Returns error on the first unknown label
    pub fn values<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<V>> {
        labels.iter().map(|label| self.resolve(label.as_ref())).collect()
    }
}

/// A set of values of one dimension, stored as a bitset over positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FacetSet<V> {
    bits:   u32,
    marker: PhantomData<V>,
}

impl<V: FacetValue> FacetSet<V> {
    /// Create an empty set
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0, marker: PhantomData }
    }

    /// Insert `value`; positions beyond `MAX_DIMENSION_VALUES` are ignored
    pub fn insert(&mut self, value: V) {
        if let Some(bit) = Self::bit(value) {
            self.bits |= bit;
        }
    }

    /// Check if the set contains `value`
    #[must_use]
    pub fn contains(self, value: V) -> bool {
        Self::bit(value).is_some_and(|bit| self.bits & bit != 0)
    }

    /// Number of values in the set
    #[must_use]
    pub const fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Check if the set is empty
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    fn bit(value: V) -> Option<u32> {
        u32::try_from(value.index()).ok().and_then(|shift| 1_u32.checked_shl(shift))
    }
}

impl<V: FacetValue> FromIterator<V> for FacetSet<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut set = Self::empty();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

/// The filterable dimensions a catalog is described by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Size values in canonical order
    pub sizes:  Dimension<Size>,
    /// Color values in canonical order
    pub colors: Dimension<Color>,
}

impl Schema {
    /// Create a schema from its two dimensions
    #[must_use]
    pub const fn new(sizes: Dimension<Size>, colors: Dimension<Color>) -> Self {
        Self { sizes, colors }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self { sizes: Dimension::builtin(&DEFAULT_SIZES), colors: Dimension::builtin(&DEFAULT_COLORS) }
    }
}
