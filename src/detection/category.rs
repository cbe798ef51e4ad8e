//! The closed category taxonomy and the label lookup table.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use image::Rgb;
use serde::{Deserialize, Serialize};

/// Coarse semantic grouping of fine-grained class labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vehicle,
    Pedestrian,
    Animal,
    Traffic,
    Other,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 5] = [
        Category::Vehicle,
        Category::Pedestrian,
        Category::Animal,
        Category::Traffic,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vehicle => "vehicle",
            Category::Pedestrian => "pedestrian",
            Category::Animal => "animal",
            Category::Traffic => "traffic",
            Category::Other => "other",
        }
    }

    /// Default display color for the category.
    pub fn default_color(&self) -> Rgb<u8> {
        match self {
            Category::Vehicle => Rgb([59, 130, 246]),
            Category::Pedestrian => Rgb([16, 185, 129]),
            Category::Animal => Rgb([249, 115, 22]),
            Category::Traffic => Rgb([250, 204, 21]),
            Category::Other => Rgb([168, 85, 247]),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// COCO labels that map onto the road-scene taxonomy. Anything else is `Other`.
pub const DEFAULT_LABELS: &[(&str, Category)] = &[
    ("person", Category::Pedestrian),
    ("bicycle", Category::Vehicle),
    ("car", Category::Vehicle),
    ("motorcycle", Category::Vehicle),
    ("bus", Category::Vehicle),
    ("train", Category::Vehicle),
    ("truck", Category::Vehicle),
    ("traffic light", Category::Traffic),
    ("stop sign", Category::Traffic),
    ("bird", Category::Animal),
    ("cat", Category::Animal),
    ("dog", Category::Animal),
    ("horse", Category::Animal),
    ("sheep", Category::Animal),
    ("cow", Category::Animal),
    ("elephant", Category::Animal),
    ("bear", Category::Animal),
    ("zebra", Category::Animal),
    ("giraffe", Category::Animal),
];

/// Immutable label→category and category→color lookup.
///
/// Built once at startup and shared by reference; nothing mutates it after
/// construction.
#[derive(Clone, Debug)]
pub struct CategoryTable {
    labels: HashMap<String, Category>,
    colors: BTreeMap<Category, Rgb<u8>>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_LABELS
                .iter()
                .map(|(label, category)| (label.to_string(), *category)),
            BTreeMap::new(),
        )
    }
}

impl CategoryTable {
    /// Creates a table from explicit label mappings and color overrides.
    ///
    /// Categories without an override use [`Category::default_color`].
    pub fn new(
        labels: impl IntoIterator<Item = (String, Category)>,
        color_overrides: BTreeMap<Category, Rgb<u8>>,
    ) -> Self {
        let colors = Category::ALL
            .iter()
            .map(|cat| {
                let color = color_overrides
                    .get(cat)
                    .copied()
                    .unwrap_or_else(|| cat.default_color());
                (*cat, color)
            })
            .collect();

        Self {
            labels: labels.into_iter().collect(),
            colors,
        }
    }

    /// Looks up the category for a label, defaulting to [`Category::Other`].
    pub fn category_of(&self, label: &str) -> Category {
        self.labels.get(label).copied().unwrap_or(Category::Other)
    }

    /// Display color for a category.
    pub fn color_of(&self, category: Category) -> Rgb<u8> {
        self.colors
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_color())
    }

    /// Number of labels with an explicit mapping.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
