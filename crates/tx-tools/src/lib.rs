//! Transform Tools
//!
//! Interactive translate and rotate tools for a 3D model viewer, plus a
//! programmatic API for scripted transforms.
//!
//! # Module Structure
//!
//! ```text
//! tx-tools/
//! ├── context.rs     # Shared scene, renderer, camera, events and config
//! ├── tool.rs        # Tool trait, input events, ToolController
//! ├── translate.rs   # Translate tool and relative/absolute placement
//! ├── rotate.rs      # Rotate tool (ring drag, free rotation)
//! ├── api.rs         # TransformApi and CenterMode
//! └── extension.rs   # TransformExtension bundling both tools
//! ```

pub mod api;
pub mod context;
pub mod extension;
pub mod rotate;
pub mod tool;
pub mod translate;

#[cfg(test)]
mod testing;

pub use api::{CenterMode, TransformApi, rotate_nodes};
pub use context::{SharedCamera, ToolContext, create_shared_camera};
pub use extension::TransformExtension;
pub use rotate::{ROTATE_TOOL, RotateTool};
pub use tool::{Key, PointerButton, PointerEvent, SharedTool, Tool, ToolController};
pub use translate::{
    TRANSLATE_TOOL, TranslateState, TranslateTool, apply_absolute, apply_relative,
};
