//! Two-state gizmo material

use tx_core::GizmoConfig;

/// Base and highlight appearance of a handle.
///
/// The material is a value: toggling the highlight yields a new material
/// and never touches colors shared with other handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoMaterial {
    base_color: [f32; 3],
    base_opacity: f32,
    highlight_color: [f32; 3],
    highlight_opacity: f32,
    highlighted: bool,
}

impl GizmoMaterial {
    /// Create a material in its base state
    pub fn new(
        base_color: [f32; 3],
        base_opacity: f32,
        highlight_color: [f32; 3],
        highlight_opacity: f32,
    ) -> Self {
        Self {
            base_color,
            base_opacity,
            highlight_color,
            highlight_opacity,
            highlighted: false,
        }
    }

    /// Material with the configured highlight and base opacity
    pub fn from_config(base_color: [f32; 3], config: &GizmoConfig) -> Self {
        Self::new(
            base_color,
            config.base_opacity,
            config.highlight_color,
            config.highlight_opacity,
        )
    }

    /// Same material in the given state
    pub fn with_highlight(self, highlighted: bool) -> Self {
        Self {
            highlighted,
            ..self
        }
    }

    /// Whether the highlight state is active
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Current RGBA color
    pub fn rgba(&self) -> [f32; 4] {
        let ([r, g, b], a) = if self.highlighted {
            (self.highlight_color, self.highlight_opacity)
        } else {
            (self.base_color, self.base_opacity)
        };
        [r, g, b, a]
    }
}
