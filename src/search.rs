//! Search engine implementation

use std::marker::PhantomData;
use std::sync::Arc;

use arrayvec::ArrayVec;
use log::trace;

use crate::dimension::{Dimension, FacetSet, Schema};
use crate::error::{Error, Result};
use crate::types::{Color, ColorCount, FacetCount, FacetValue, Item, MAX_DIMENSION_VALUES, Size, SizeCount};

/// Filter criteria for a search
///
/// An empty filter matches every value of its dimension. A `None` filter is
/// invalid and makes [`SearchEngine::search`] fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Sizes to match
    pub sizes:  Option<Vec<Size>>,
    /// Colors to match
    pub colors: Option<Vec<Color>>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { sizes: Some(Vec::new()), colors: Some(Vec::new()) }
    }
}

impl SearchOptions {
    /// Restrict the search to `colors`
    #[must_use]
    pub fn with_colors(mut self, colors: impl IntoIterator<Item = Color>) -> Self {
        self.colors = Some(colors.into_iter().collect());
        self
    }

    /// Restrict the search to `sizes`
    #[must_use]
    pub fn with_sizes(mut self, sizes: impl IntoIterator<Item = Size>) -> Self {
        self.sizes = Some(sizes.into_iter().collect());
        self
    }

    /// Build options from color and size labels of `schema`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if a label is not a value of its dimension
    pub fn from_labels<C: AsRef<str>, S: AsRef<str>>(
        schema: &Schema,
        colors: &[C],
        sizes: &[S],
    ) -> Result<Self> {
        let as_argument = |e: Error| match e {
            Error::Catalog(msg) => Error::InvalidArgument(msg),
            other => other,
        };
        Ok(Self {
            sizes:  Some(schema.sizes.values(sizes).map_err(as_argument)?),
            colors: Some(schema.colors.values(colors).map_err(as_argument)?),
        })
    }
}

/// Outcome of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults<'a> {
    /// Matching items in catalog order
    pub items:        Vec<&'a Item>,
    /// Matched items per size, one entry per size in canonical order
    pub size_counts:  Vec<SizeCount>,
    /// Matched items per color, one entry per color in canonical order
    pub color_counts: Vec<ColorCount>,
}

impl SearchResults<'_> {
    /// Matched items of `size`
    #[must_use]
    pub fn size_count(&self, size: Size) -> usize {
        count_of(&self.size_counts, size)
    }

    /// Matched items of `color`
    #[must_use]
    pub fn color_count(&self, color: Color) -> usize {
        count_of(&self.color_counts, color)
    }
}

fn count_of<V: FacetValue>(counts: &[FacetCount<V>], value: V) -> usize {
    counts.iter().find(|c| c.value == value).map_or(0, |c| c.count)
}

/// Running per-value counts for one dimension
#[derive(Debug)]
struct Tally<V> {
    counts: ArrayVec<usize, MAX_DIMENSION_VALUES>,
    marker: PhantomData<V>,
}

impl<V: FacetValue> Tally<V> {
    fn new(dimension: &Dimension<V>) -> Self {
        Self { counts: dimension.all().map(|_| 0).collect(), marker: PhantomData }
    }

    /// Values outside the dimension are not counted
    fn record(&mut self, value: V) {
        if let Some(count) = self.counts.get_mut(value.index()) {
            *count += 1;
        }
    }

    fn finish(self, dimension: &Dimension<V>) -> Vec<FacetCount<V>> {
        dimension.all().zip(self.counts).map(|(value, count)| FacetCount { value, count }).collect()
    }
}

/// Membership test for one filter; an empty filter matches every value
#[derive(Debug)]
struct Filter<'a, V> {
    values: &'a [V],
    set:    FacetSet<V>,
    /// Some value lies beyond the bitset and needs a linear lookup
    wide:   bool,
}

impl<'a, V: FacetValue> Filter<'a, V> {
    fn new(values: &'a [V]) -> Self {
        Self {
            values,
            set: values.iter().copied().collect(),
            wide: values.iter().any(|value| value.index() >= MAX_DIMENSION_VALUES),
        }
    }

    fn matches(&self, value: V) -> bool {
        self.values.is_empty()
            || self.set.contains(value)
            || (self.wide && self.values.contains(&value))
    }
}

/// Faceted search over an immutable catalog
///
/// The catalog is shared, so clones are cheap and searches may run from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    schema: Arc<Schema>,
    items:  Arc<[Item]>,
}

impl SearchEngine {
    /// Creates a search engine over `items` described by the default schema
    #[must_use = "SearchEngine must be used to search the catalog"]
    pub fn new(items: impl Into<Arc<[Item]>>) -> Self {
        Self::with_schema(Schema::default(), items)
    }

    /// Creates a search engine over `items` described by `schema`
    #[must_use = "SearchEngine must be used to search the catalog"]
    pub fn with_schema(schema: Schema, items: impl Into<Arc<[Item]>>) -> Self {
        Self { schema: Arc::new(schema), items: items.into() }
    }

    /// Schema the counts are reported over
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The catalog, in order
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Filter the catalog and count matches per size and color
    ///
    /// An item matches when the color filter is empty or holds its color, and
    /// the size filter is empty or holds its size.
    ///
    /// # Errors
    /// Returns `InvalidArgument` before any filtering if `options` or either
    /// of its filters is `None`
    pub fn search(&self, options: Option<&SearchOptions>) -> Result<SearchResults<'_>> {
        let Some((sizes, colors)) =
            options.and_then(|o| Some((o.sizes.as_deref()?, o.colors.as_deref()?)))
        else {
            return Err(Error::invalid_argument("no search options provided"));
        };

        let sizes = Filter::new(sizes);
        let colors = Filter::new(colors);

        let mut items = Vec::new();
        let mut size_tally = Tally::new(&self.schema.sizes);
        let mut color_tally = Tally::new(&self.schema.colors);

        for item in self.items.iter() {
            if colors.matches(item.color) && sizes.matches(item.size) {
                size_tally.record(item.size);
                color_tally.record(item.color);
                items.push(item);
            }
        }

        trace!("search matched {} of {} items", items.len(), self.items.len());

        Ok(SearchResults {
            items,
            size_counts: size_tally.finish(&self.schema.sizes),
            color_counts: color_tally.finish(&self.schema.colors),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use uuid::Uuid;

    use super::*;
    use crate::dimension::DEFAULT_COLORS;

    fn size(label: &str) -> Size {
        Schema::default().sizes.resolve(label).unwrap()
    }

    fn color(label: &str) -> Color {
        Schema::default().colors.resolve(label).unwrap()
    }

    fn shirt(color_label: &str, size_label: &str) -> Item {
        Item::new(
            Uuid::new_v4(),
            format!("{color_label} - {size_label}"),
            size(size_label),
            color(color_label),
        )
    }

    fn shirts() -> Vec<Item> {
        vec![
            shirt("Black", "Medium"),
            shirt("Blue", "Large"),
            shirt("Red", "Small"),
            shirt("Black", "Small"),
            shirt("Black", "Large"),
            shirt("Yellow", "Small"),
            shirt("White", "Medium"),
            shirt("Black", "Large"),
        ]
    }

    fn options(colors: &[&str], sizes: &[&str]) -> SearchOptions {
        SearchOptions::from_labels(&Schema::default(), colors, sizes).unwrap()
    }

    fn is_match(item: &Item, options: &SearchOptions) -> bool {
        let colors = options.colors.as_deref().unwrap();
        let sizes = options.sizes.as_deref().unwrap();
        (colors.is_empty() || colors.contains(&item.color))
            && (sizes.is_empty() || sizes.contains(&item.size))
    }

    /// Check every documented property of `results` against a brute-force scan
    fn assert_results(engine: &SearchEngine, options: &SearchOptions, results: &SearchResults<'_>) {
        let expected: Vec<&Item> = engine.items().iter().filter(|i| is_match(i, options)).collect();
        assert_eq!(results.items, expected);

        let schema = engine.schema();
        assert_eq!(results.size_counts.len(), schema.sizes.len());
        assert_eq!(results.color_counts.len(), schema.colors.len());

        for (entry, size) in results.size_counts.iter().zip(schema.sizes.all()) {
            assert_eq!(entry.value, size);
            let expected = results.items.iter().filter(|i| i.size == size).count();
            assert_eq!(entry.count, expected, "size {:?}", schema.sizes.label(size));
        }
        for (entry, color) in results.color_counts.iter().zip(schema.colors.all()) {
            assert_eq!(entry.value, color);
            let expected = results.items.iter().filter(|i| i.color == color).count();
            assert_eq!(entry.count, expected, "color {:?}", schema.colors.label(color));
        }
    }

    fn check(engine: &SearchEngine, options: &SearchOptions) {
        let results = engine.search(Some(options)).unwrap();
        assert_results(engine, options, &results);
    }

    #[test]
    fn test_missing_options() {
        let engine = SearchEngine::new(shirts());
        assert!(matches!(engine.search(None), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_color_filter() {
        let engine = SearchEngine::new(shirts());
        let options = SearchOptions { colors: None, ..SearchOptions::default() };
        assert!(matches!(engine.search(Some(&options)), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_size_filter() {
        let engine = SearchEngine::new(shirts());
        let options = SearchOptions { sizes: None, ..SearchOptions::default() };
        assert!(matches!(engine.search(Some(&options)), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_filter_on_empty_catalog() {
        let engine = SearchEngine::new(Vec::new());
        let options = SearchOptions { sizes: None, colors: None };
        assert!(matches!(engine.search(Some(&options)), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_single_size() {
        let engine = SearchEngine::new(shirts());
        check(&engine, &options(&[], &["Large"]));
    }

    #[test]
    fn test_single_color() {
        let engine = SearchEngine::new(shirts());
        check(&engine, &options(&["Blue"], &[]));
    }

    #[test]
    fn test_single_color_single_size() {
        let engine = SearchEngine::new(shirts());
        check(&engine, &options(&["Black"], &["Large"]));
    }

    #[test]
    fn test_single_color_multiple_sizes() {
        let engine = SearchEngine::new(shirts());
        let options = options(&["Black"], &["Large", "Medium"]);
        let results = engine.search(Some(&options)).unwrap();
        assert_results(&engine, &options, &results);

        let names: Vec<&str> = results.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Black - Medium", "Black - Large", "Black - Large"]);

        assert_eq!(results.size_count(size("Small")), 0);
        assert_eq!(results.size_count(size("Medium")), 1);
        assert_eq!(results.size_count(size("Large")), 2);

        assert_eq!(results.color_count(color("Black")), 3);
        for label in ["Red", "Blue", "White", "Yellow"] {
            assert_eq!(results.color_count(color(label)), 0, "{label}");
        }
    }

    #[test]
    fn test_multiple_colors_single_size() {
        let engine = SearchEngine::new(shirts());
        let options = options(&["Red", "White"], &["Large"]);
        let results = engine.search(Some(&options)).unwrap();
        assert_results(&engine, &options, &results);
        assert!(results.items.is_empty());
        assert!(results.color_counts.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_multiple_colors_multiple_sizes() {
        let engine = SearchEngine::new(shirts());
        check(&engine, &options(&["Black", "Blue"], &["Small", "Medium"]));
    }

    #[test]
    fn test_without_filters_matches_everything() {
        let engine = SearchEngine::new(shirts());
        let options = SearchOptions::default();
        let results = engine.search(Some(&options)).unwrap();
        assert_results(&engine, &options, &results);

        let all: Vec<&Item> = engine.items().iter().collect();
        assert_eq!(results.items, all);
        assert_eq!(results.color_count(color("Black")), 4);
        assert_eq!(results.size_count(size("Small")), 3);
    }

    #[test]
    fn test_zero_stock() {
        let engine = SearchEngine::new(Vec::new());
        let options = options(&["Yellow", "White"], &["Large", "Medium"]);
        let results = engine.search(Some(&options)).unwrap();
        assert_results(&engine, &options, &results);
        assert!(results.items.is_empty());
        assert_eq!(results.color_counts.len(), DEFAULT_COLORS.len());
        assert!(results.size_counts.iter().all(|c| c.count == 0));
        assert!(results.color_counts.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_zero_stock_without_filters() {
        let engine = SearchEngine::new(Vec::new());
        check(&engine, &SearchOptions::default());
    }

    #[test]
    fn test_duplicate_filter_values() {
        let engine = SearchEngine::new(shirts());
        let once = options(&["Black"], &["Large"]);
        let twice = options(&["Black", "black"], &["Large", "Large"]);
        assert_eq!(engine.search(Some(&once)).unwrap(), engine.search(Some(&twice)).unwrap());
    }

    #[test]
    fn test_search_is_idempotent() {
        let engine = SearchEngine::new(shirts());
        let before = engine.items().to_vec();
        let options = options(&["Black", "Yellow"], &["Small"]);

        let first = engine.search(Some(&options)).unwrap();
        let second = engine.search(Some(&options)).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.items(), before.as_slice());
    }

    #[test]
    fn test_counts_are_unique_and_ordered() {
        let engine = SearchEngine::new(shirts());
        let results = engine.search(Some(&SearchOptions::default())).unwrap();

        let colors: Vec<Color> = results.color_counts.iter().map(|c| c.value).collect();
        let canonical: Vec<Color> = engine.schema().colors.all().collect();
        assert_eq!(colors, canonical);

        let unique: HashSet<Size> = results.size_counts.iter().map(|c| c.value).collect();
        assert_eq!(unique.len(), results.size_counts.len());
    }

    #[test]
    fn test_unknown_label() {
        let result = SearchOptions::from_labels(&Schema::default(), &["Green"], &["Large"]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_filter_value_outside_schema_matches_nothing() {
        let engine = SearchEngine::new(shirts());
        let options = SearchOptions::default().with_colors([Color::from_index(9)]);
        let results = engine.search(Some(&options)).unwrap();
        assert_results(&engine, &options, &results);
        assert!(results.items.is_empty());
        assert!(results.color_counts.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_filter_value_outside_schema_matches_stray_item() {
        let stray = Item::new(Uuid::new_v4(), "Green - Small", size("Small"), Color::from_index(7));
        let engine = SearchEngine::new(vec![shirt("Red", "Small"), stray]);

        let options = SearchOptions::default().with_colors([Color::from_index(7)]);
        let results = engine.search(Some(&options)).unwrap();
        assert_results(&engine, &options, &results);
        assert_eq!(results.items.len(), 1);
        assert_eq!(results.items[0].name, "Green - Small");
        assert_eq!(results.size_count(size("Small")), 1);
        assert!(results.color_counts.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_filter_value_beyond_bitset_matches_stray_item() {
        let far = Color::from_index(200);
        let stray = Item::new(Uuid::new_v4(), "Far - Large", size("Large"), far);
        let engine = SearchEngine::new(vec![stray, shirt("Black", "Large")]);

        let options = SearchOptions::default().with_colors([far]);
        let results = engine.search(Some(&options)).unwrap();
        assert_eq!(results.items.len(), 1);
        assert_eq!(results.items[0].color, far);
    }

    #[test]
    fn test_items_outside_schema_are_matched_but_not_counted() {
        let stray = Item::new(Uuid::new_v4(), "Green - Huge", Size::from_index(7), Color::from_index(7));
        let engine = SearchEngine::new(vec![shirt("Red", "Small"), stray]);

        let results = engine.search(Some(&SearchOptions::default())).unwrap();
        assert_eq!(results.items.len(), 2);
        assert_eq!(results.color_counts.iter().map(|c| c.count).sum::<usize>(), 1);
        assert_eq!(results.size_counts.iter().map(|c| c.count).sum::<usize>(), 1);

        let red = options(&["Red"], &[]);
        assert_eq!(engine.search(Some(&red)).unwrap().items.len(), 1);
    }

    #[test]
    fn test_custom_schema() {
        let schema = Schema::new(
            Dimension::new(&["XS", "S", "M", "L", "XL"]).unwrap(),
            Dimension::new(&["Green", "Grey"]).unwrap(),
        );
        let xl = schema.sizes.resolve("XL").unwrap();
        let grey = schema.colors.resolve("Grey").unwrap();
        let green = schema.colors.resolve("Green").unwrap();
        let items = vec![
            Item::new(Uuid::new_v4(), "Grey - XL", xl, grey),
            Item::new(Uuid::new_v4(), "Green - XL", xl, green),
        ];
        let engine = SearchEngine::with_schema(schema, items);

        let options = SearchOptions::default().with_colors([grey]);
        let results = engine.search(Some(&options)).unwrap();
        assert_results(&engine, &options, &results);
        assert_eq!(results.size_counts.len(), 5);
        assert_eq!(results.size_count(xl), 1);
    }

    #[test]
    fn test_concurrent_searches() {
        let engine = SearchEngine::new(shirts());
        let expected = engine.search(Some(&options(&["Black"], &[]))).unwrap();

        thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let engine = engine.clone();
                    scope.spawn(move || {
                        let options = options(&["Black"], &[]);
                        let results = engine.search(Some(&options)).unwrap();
                        (results.items.len(), results.color_counts)
                    })
                })
                .collect();

            for handle in handles {
                let (len, counts) = handle.join().unwrap();
                assert_eq!(len, expected.items.len());
                assert_eq!(counts, expected.color_counts);
            }
        });
    }

    mod properties {
        use proptest::prelude::*;
        use uuid::Uuid;

        use super::check;
        use crate::search::{SearchEngine, SearchOptions};
        use crate::types::{Color, FacetValue, Item, Size};

        fn arb_catalog() -> impl Strategy<Value = Vec<Item>> {
            prop::collection::vec((0_u8..3, 0_u8..5), 0..40).prop_map(|pairs| {
                pairs
                    .into_iter()
                    .map(|(s, c)| Item::new(Uuid::nil(), "generated", Size::from_index(s), Color::from_index(c)))
                    .collect()
            })
        }

        fn arb_options() -> impl Strategy<Value = SearchOptions> {
            (prop::collection::vec(0_u8..3, 0..4), prop::collection::vec(0_u8..5, 0..6)).prop_map(
                |(sizes, colors)| {
                    SearchOptions::default()
                        .with_sizes(sizes.into_iter().map(Size::from_index))
                        .with_colors(colors.into_iter().map(Color::from_index))
                },
            )
        }

        proptest! {
            #[test]
            fn test_results_agree_with_brute_force(catalog in arb_catalog(), options in arb_options()) {
                let engine = SearchEngine::new(catalog);
                check(&engine, &options);
            }

            #[test]
            fn test_counts_sum_to_matches(catalog in arb_catalog(), options in arb_options()) {
                let engine = SearchEngine::new(catalog);
                let results = engine.search(Some(&options)).unwrap();
                prop_assert_eq!(results.size_counts.iter().map(|c| c.count).sum::<usize>(), results.items.len());
                prop_assert_eq!(results.color_counts.iter().map(|c| c.count).sum::<usize>(), results.items.len());
            }
        }
    }
}
