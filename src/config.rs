//! YAML configuration.
//!
//! Every field is optional. A minimal file looks like:
//!
//! ```yaml
//! pipeline:
//!   confidence_threshold: 0.6
//! render:
//!   color_policy: by_index_cyclic
//! categories:
//!   labels:
//!     scooter: vehicle
//!   colors:
//!     vehicle: [0, 0, 255]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::detection::{Category, CategoryTable, DEFAULT_LABELS};
use crate::error::DetpipeError;
use crate::pipeline::{PipelineParams, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD};
use crate::render::{LabelFont, RenderOptions};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineSection,
    pub render: RenderSection,
    pub categories: CategoriesSection,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub confidence_threshold: f64,
    pub iou_threshold: f64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    #[serde(flatten)]
    pub options: RenderOptions,
    /// TrueType font for labels. The bundled DejaVu Sans is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesSection {
    /// Extra label mappings, applied over the built-in ones.
    pub labels: BTreeMap<String, Category>,
    /// Per-category RGB color overrides.
    pub colors: BTreeMap<Category, [u8; 3]>,
    /// Drop the built-in label mappings and use only `labels`.
    pub replace_defaults: bool,
}

impl Config {
    /// Reads and validates a config file.
    pub fn from_path(path: &Path) -> Result<Self, DetpipeError> {
        let text = std::fs::read_to_string(path)?;
        let config: Config =
            serde_yaml::from_str(&text).map_err(|source| DetpipeError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.params().validate()?;
        Ok(config)
    }

    /// Pipeline parameters before any command-line overrides.
    pub fn params(&self) -> PipelineParams {
        PipelineParams {
            confidence_threshold: self.pipeline.confidence_threshold,
            iou_threshold: self.pipeline.iou_threshold,
            render: self.render.options.clone(),
        }
    }

    pub fn category_table(&self) -> CategoryTable {
        let defaults = if self.categories.replace_defaults {
            Vec::new()
        } else {
            DEFAULT_LABELS
                .iter()
                .map(|(label, category)| (label.to_string(), *category))
                .collect()
        };
        // Later entries win when collected into the table's map.
        let labels = defaults.into_iter().chain(
            self.categories
                .labels
                .iter()
                .map(|(label, category)| (label.clone(), *category)),
        );
        let colors = self
            .categories
            .colors
            .iter()
            .map(|(category, rgb)| (*category, Rgb(*rgb)))
            .collect();

        CategoryTable::new(labels, colors)
    }

    pub fn font(&self) -> Result<LabelFont, DetpipeError> {
        match &self.render.font_path {
            Some(path) => LabelFont::from_path(path),
            None => LabelFont::embedded(),
        }
    }
}
