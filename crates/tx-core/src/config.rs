//! Tool configuration
//!
//! Settings for both gizmos, loadable from a RON file. Every section falls
//! back to its defaults when omitted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FREE_ROTATE_DEGREES_PER_PIXEL, DEFAULT_SETTLE_DELAY_MS};
use crate::error::ConfigError;

/// Gizmo geometry and colors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GizmoConfig {
    /// Ring radius as a fraction of the gizmo size
    pub ring_radius_factor: f32,
    /// Ring tube radius as a fraction of the gizmo size
    pub ring_tube_factor: f32,
    /// Picker sphere radius as a fraction of the gizmo size
    pub picker_radius_factor: f32,
    /// Extra pick distance around a ring tube, as a fraction of the gizmo size
    pub ring_hit_tolerance: f32,
    /// Gizmo size as a fraction of the selection's largest extent
    pub size_factor: f32,
    /// Segments around a ring
    pub ring_segments: u32,
    /// Segments around a ring's tube
    pub tube_segments: u32,
    /// X axis color (RGB)
    pub x_axis_color: [f32; 3],
    /// Y axis color (RGB)
    pub y_axis_color: [f32; 3],
    /// Z axis color (RGB)
    pub z_axis_color: [f32; 3],
    /// Color of a grabbed or hovered handle (RGB)
    pub highlight_color: [f32; 3],
    pub highlight_opacity: f32,
    pub base_opacity: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            ring_radius_factor: 0.8,
            ring_tube_factor: 0.0075,
            picker_radius_factor: 0.05,
            ring_hit_tolerance: 0.03,
            size_factor: 0.8,
            ring_segments: 64,
            tube_segments: 8,
            x_axis_color: [1.0, 0.0, 0.0],
            y_axis_color: [0.0, 1.0, 0.0],
            z_axis_color: [0.0, 0.0, 1.0],
            highlight_color: [1.0, 230.0 / 255.0, 3.0 / 255.0],
            highlight_opacity: 1.0,
            base_opacity: 0.8,
        }
    }
}

/// Translate anchor handle settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslateConfig {
    /// Handle scale as a fraction of the selection's largest extent
    pub handle_scale: f32,
    /// Minimum handle scale, for tiny selections
    pub min_handle_scale: f32,
    /// Arrow length relative to the handle scale
    pub arrow_length: f32,
    /// Arrow pick radius relative to the handle scale
    pub arrow_hit_radius: f32,
    /// Center handle radius relative to the handle scale
    pub center_radius: f32,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            handle_scale: 0.6,
            min_handle_scale: 0.1,
            arrow_length: 1.0,
            arrow_hit_radius: 0.08,
            center_radius: 0.12,
        }
    }
}

/// Keyboard modifiers the tools react to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Modifier {
    Control,
    Shift,
    Alt,
}

/// Rotate gizmo settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RotateConfig {
    /// Delay after release during which selection events are still swallowed
    pub settle_delay_ms: u64,
    /// Modifier that enables free rotation without grabbing a ring
    pub free_rotate_modifier: Modifier,
    /// Free rotation sensitivity
    pub free_rotate_degrees_per_pixel: f32,
}

impl Default for RotateConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            free_rotate_modifier: Modifier::Control,
            free_rotate_degrees_per_pixel: DEFAULT_FREE_ROTATE_DEGREES_PER_PIXEL,
        }
    }
}

/// What a pick selects
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SelectionScope {
    /// Only the picked nodes
    #[default]
    Picked,
    /// Every fragment of the picked model, anchored at its root node
    WholeModel,
}

/// Complete configuration for the transform tools
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransformConfig {
    pub gizmo: GizmoConfig,
    pub translate: TranslateConfig,
    pub rotate: RotateConfig,
    pub selection_scope: SelectionScope,
    /// Fit the camera to the selection when the rotate tool picks it up
    pub fit_view_on_select: bool,
}

impl TransformConfig {
    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::load_from_str(&content)?;
        tracing::info!("Loaded transform config from {}", path.display());
        Ok(config)
    }

    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Save configuration to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }
}
