//! Host-facing bundle of both tools and the programmatic API
//!
//! Translate and rotate are mutually exclusive: turning one on turns the
//! other off.

use std::sync::Arc;

use parking_lot::Mutex;
use tx_core::{EventKind, Selection, SubscriptionId, TransformEvent};

use crate::api::TransformApi;
use crate::context::ToolContext;
use crate::rotate::{ROTATE_TOOL, RotateTool};
use crate::tool::{Key, PointerEvent, ToolController};
use crate::translate::{TRANSLATE_TOOL, TranslateTool};

pub struct TransformExtension {
    ctx: ToolContext,
    controller: ToolController,
    api: TransformApi,
}

impl TransformExtension {
    /// Create both tools and register them, translate first
    pub fn new(ctx: ToolContext) -> Self {
        let mut controller = ToolController::new();
        controller.register_tool(Arc::new(Mutex::new(TranslateTool::new(ctx.clone()))));
        controller.register_tool(Arc::new(Mutex::new(RotateTool::new(ctx.clone()))));
        let api = TransformApi::new(ctx.scene.clone());
        tracing::info!("Transform extension loaded");
        Self {
            ctx,
            controller,
            api,
        }
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    pub fn controller(&self) -> &ToolController {
        &self.controller
    }

    pub fn api(&self) -> &TransformApi {
        &self.api
    }

    pub fn is_translate_active(&self) -> bool {
        self.controller.is_active(TRANSLATE_TOOL)
    }

    pub fn is_rotate_active(&self) -> bool {
        self.controller.is_active(ROTATE_TOOL)
    }

    /// Toggle the translate tool. Returns whether it is now active.
    pub fn toggle_translate(&self) -> bool {
        self.toggle(TRANSLATE_TOOL, ROTATE_TOOL)
    }

    /// Toggle the rotate tool. Returns whether it is now active.
    pub fn toggle_rotate(&self) -> bool {
        self.toggle(ROTATE_TOOL, TRANSLATE_TOOL)
    }

    fn toggle(&self, tool: &str, other: &str) -> bool {
        if self.controller.is_active(tool) {
            self.controller.deactivate_tool(tool);
            return false;
        }
        self.controller.deactivate_tool(other);
        self.controller.activate_tool(tool)
    }

    pub fn deactivate_all(&self) {
        self.controller.deactivate_tool(TRANSLATE_TOOL);
        self.controller.deactivate_tool(ROTATE_TOOL);
    }

    /// Listen for one kind of transform event
    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&TransformEvent) + Send + 'static,
    {
        self.ctx.events.lock().subscribe(kind, listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.ctx.events.lock().unsubscribe(id)
    }

    // Input forwarding

    pub fn button_down(&self, event: &PointerEvent) -> bool {
        self.controller.button_down(event)
    }

    pub fn button_up(&self, event: &PointerEvent) -> bool {
        self.controller.button_up(event)
    }

    pub fn mouse_move(&self, event: &PointerEvent) -> bool {
        self.controller.mouse_move(event)
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.controller.key_down(key)
    }

    pub fn key_up(&self, key: Key) -> bool {
        self.controller.key_up(key)
    }

    /// Forward a host selection change. Returns true when a tool rejected it
    /// and the host should keep its previous selection.
    pub fn selection_changed(&self, selections: &[Selection]) -> bool {
        self.controller.selection_changed(selections)
    }
}

impl Drop for TransformExtension {
    fn drop(&mut self) {
        self.deactivate_all();
        tracing::info!("Transform extension unloaded");
    }
}
