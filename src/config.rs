//! YAML configuration for the grid and its prefetcher.

use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use serde::Deserialize;

use crate::cache::{ContentMode, RequestOptions};
use crate::error::Error;
use crate::layout::GridLayout;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GridConfig {
    /// Directory scanned for assets.
    pub library_path: PathBuf,

    #[serde(default = "GridConfig::default_columns")]
    pub columns: u32,

    /// Cell size in points; the thumbnail request size is this times the
    /// display scale.
    #[serde(default = "GridConfig::default_cell_size")]
    pub cell_width: f64,
    #[serde(default = "GridConfig::default_cell_size")]
    pub cell_height: f64,

    #[serde(default = "GridConfig::default_spacing")]
    pub spacing: f64,

    /// Device pixels per point on the presenting surface.
    #[serde(default = "GridConfig::default_display_scale")]
    pub display_scale: f64,

    #[serde(default)]
    pub content_mode: ContentMode,

    /// Concurrent thumbnail preparations in the prefetcher.
    #[serde(default = "GridConfig::default_max_in_flight")]
    pub max_in_flight: usize,
}

impl GridConfig {
    fn default_columns() -> u32 {
        4
    }

    fn default_cell_size() -> f64 {
        128.0
    }

    fn default_spacing() -> f64 {
        2.0
    }

    fn default_display_scale() -> f64 {
        1.0
    }

    fn default_max_in_flight() -> usize {
        4
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.columns > 0, "columns must be positive");
        ensure!(
            self.cell_width > 0.0 && self.cell_height > 0.0,
            "cell size must be positive"
        );
        ensure!(self.spacing >= 0.0, "spacing must not be negative");
        ensure!(self.display_scale > 0.0, "display-scale must be positive");
        ensure!(self.max_in_flight > 0, "max-in-flight must be positive");
        Ok(())
    }

    pub fn layout(&self) -> GridLayout {
        GridLayout::new(self.columns, self.cell_width, self.cell_height, self.spacing)
    }

    /// Cache request options, derived once from cell geometry and display
    /// scale the way the host surface would at layout time.
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            target_size: self.layout().thumbnail_target_size(self.display_scale),
            mode: self.content_mode,
        }
    }
}

pub fn from_yaml_file(path: &Path) -> Result<GridConfig, Error> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&raw)?)
}
