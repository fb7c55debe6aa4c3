//! Editor options.
//!
//! Every field has a default, so hosts only need to pass what they change:
//!
//! ```ignore
//! let options = EditorOptions::from_json(r#"{ "SnapToGrid": true, "GridSize": 10 }"#)?;
//! ```

use crate::error::FlowError;
use crate::model::LineMode;
use serde::{Deserialize, Serialize};

/// Which algorithm `auto_layout` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAlgorithm {
    /// Kahn layering, left to right.
    #[default]
    Layered,
    /// Sugiyama layering with crossing reduction. Needs the `layout` feature;
    /// without it the layered algorithm is used.
    Sugiyama,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LayoutOptions {
    pub algorithm: LayoutAlgorithm,
    /// Gap between layers.
    pub horizontal_spacing: f32,
    /// Gap between nodes of one layer.
    pub vertical_spacing: f32,
    pub start_x: f32,
    pub start_y: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            algorithm: LayoutAlgorithm::Layered,
            horizontal_spacing: 80.0,
            vertical_spacing: 40.0,
            start_x: 50.0,
            start_y: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EditorOptions {
    /// Background drags pan the canvas.
    pub enable_panning: bool,
    pub snap_to_grid: bool,
    pub grid_size: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Factor applied by `zoom_in`/`zoom_out`.
    pub zoom_step: f32,
    pub double_click_threshold_ms: u64,
    /// Length of the straight segment leaving each anchor.
    pub standoff: f32,
    pub title_bar_height: f32,
    pub port_radius: f32,
    /// Model-space radius for port hit testing.
    pub port_hit_radius: f32,
    pub fit_padding: f32,
    /// Line mode of new connections and tethers.
    pub default_line_mode: LineMode,
    /// Host address the flow data is marshaled to and from.
    pub flow_data_address: Option<String>,
    pub layout: LayoutOptions,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            enable_panning: true,
            snap_to_grid: false,
            grid_size: 20.0,
            min_zoom: 0.1,
            max_zoom: 4.0,
            zoom_step: 1.2,
            double_click_threshold_ms: 400,
            standoff: crate::path::DEFAULT_STANDOFF,
            title_bar_height: 28.0,
            port_radius: 6.0,
            port_hit_radius: 10.0,
            fit_padding: 50.0,
            default_line_mode: LineMode::Bezier,
            flow_data_address: None,
            layout: LayoutOptions::default(),
        }
    }
}

impl EditorOptions {
    /// Parses and validates host-supplied options.
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        let options: EditorOptions =
            serde_json::from_str(json).map_err(|e| FlowError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        fn positive(name: &str, v: f32) -> Result<(), FlowError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(FlowError::InvalidOptions(format!("{} must be positive, got {}", name, v)))
            }
        }
        fn non_negative(name: &str, v: f32) -> Result<(), FlowError> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(FlowError::InvalidOptions(format!("{} must not be negative, got {}", name, v)))
            }
        }

        positive("MinZoom", self.min_zoom)?;
        positive("MaxZoom", self.max_zoom)?;
        if self.max_zoom < self.min_zoom {
            return Err(FlowError::InvalidOptions(format!(
                "MaxZoom {} is below MinZoom {}",
                self.max_zoom, self.min_zoom
            )));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(FlowError::InvalidOptions(format!("ZoomStep must exceed 1, got {}", self.zoom_step)));
        }
        positive("GridSize", self.grid_size)?;
        non_negative("Standoff", self.standoff)?;
        non_negative("TitleBarHeight", self.title_bar_height)?;
        non_negative("PortRadius", self.port_radius)?;
        non_negative("PortHitRadius", self.port_hit_radius)?;
        non_negative("FitPadding", self.fit_padding)?;
        non_negative("Layout.HorizontalSpacing", self.layout.horizontal_spacing)?;
        non_negative("Layout.VerticalSpacing", self.layout.vertical_spacing)?;
        Ok(())
    }

    /// Clamps a zoom factor to `[min_zoom, max_zoom]`. Non-finite input
    /// becomes 1.0 before clamping.
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        let zoom = if zoom.is_finite() { zoom } else { 1.0 };
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
