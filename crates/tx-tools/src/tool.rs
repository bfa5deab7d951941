//! Tool trait and the controller that routes input to active tools

use std::sync::Arc;

use glam::Vec2;
use parking_lot::Mutex;
use tx_core::{Modifier, Selection};

/// Pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Left,
    Middle,
    Right,
}

/// Pointer position in viewport pixels (origin top-left) and the button involved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            button: PointerButton::Left,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Keys the tools care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Modifier(Modifier),
    Escape,
    Other(char),
}

/// Interactive tool driven by the host's input events.
///
/// Every handler returns true when it consumed the event.
pub trait Tool: Send {
    /// Registration name
    fn name(&self) -> &'static str;

    /// All names the tool answers to
    fn names(&self) -> Vec<&'static str> {
        vec![self.name()]
    }

    fn is_active(&self) -> bool;

    fn activate(&mut self);

    fn deactivate(&mut self);

    fn handle_button_down(&mut self, _event: &PointerEvent) -> bool {
        false
    }

    fn handle_button_up(&mut self, _event: &PointerEvent) -> bool {
        false
    }

    fn handle_mouse_move(&mut self, _event: &PointerEvent) -> bool {
        false
    }

    fn handle_key_down(&mut self, _key: Key) -> bool {
        false
    }

    fn handle_key_up(&mut self, _key: Key) -> bool {
        false
    }

    /// The host selection changed; an empty list means it was cleared
    fn handle_selection_changed(&mut self, _selections: &[Selection]) -> bool {
        false
    }
}

pub type SharedTool = Arc<Mutex<dyn Tool>>;

/// Registry of tools; input goes to active tools in registration order
/// until one of them consumes it.
#[derive(Default)]
pub struct ToolController {
    tools: Vec<SharedTool>,
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Returns false if one of its names is already taken.
    pub fn register_tool(&mut self, tool: SharedTool) -> bool {
        let names = tool.lock().names();
        if names.iter().any(|name| self.tool(name).is_some()) {
            tracing::warn!("Tool {:?} already registered", names);
            return false;
        }
        tracing::debug!("Registered tool {:?}", names);
        self.tools.push(tool);
        true
    }

    pub fn tool(&self, name: &str) -> Option<SharedTool> {
        self.tools
            .iter()
            .find(|tool| tool.lock().names().iter().any(|n| *n == name))
            .cloned()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.tool(name).is_some_and(|tool| tool.lock().is_active())
    }

    /// Activate a tool by name. Activating an active tool is a no-op.
    pub fn activate_tool(&self, name: &str) -> bool {
        let Some(tool) = self.tool(name) else {
            tracing::warn!("No tool named '{}'", name);
            return false;
        };
        let mut tool = tool.lock();
        if !tool.is_active() {
            tool.activate();
        }
        true
    }

    /// Deactivate a tool by name. Deactivating an inactive tool is a no-op.
    pub fn deactivate_tool(&self, name: &str) -> bool {
        let Some(tool) = self.tool(name) else {
            return false;
        };
        let mut tool = tool.lock();
        if tool.is_active() {
            tool.deactivate();
        }
        true
    }

    /// Names of the active tools, in registration order
    pub fn active_tools(&self) -> Vec<&'static str> {
        self.tools
            .iter()
            .filter_map(|tool| {
                let tool = tool.lock();
                tool.is_active().then(|| tool.name())
            })
            .collect()
    }

    fn dispatch(&self, mut handler: impl FnMut(&mut dyn Tool) -> bool) -> bool {
        for tool in &self.tools {
            let mut tool = tool.lock();
            if tool.is_active() && handler(&mut *tool) {
                return true;
            }
        }
        false
    }

    pub fn button_down(&self, event: &PointerEvent) -> bool {
        self.dispatch(|tool| tool.handle_button_down(event))
    }

    pub fn button_up(&self, event: &PointerEvent) -> bool {
        self.dispatch(|tool| tool.handle_button_up(event))
    }

    pub fn mouse_move(&self, event: &PointerEvent) -> bool {
        self.dispatch(|tool| tool.handle_mouse_move(event))
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.dispatch(|tool| tool.handle_key_down(key))
    }

    pub fn key_up(&self, key: Key) -> bool {
        self.dispatch(|tool| tool.handle_key_up(key))
    }

    /// Every active tool sees selection changes
    pub fn selection_changed(&self, selections: &[Selection]) -> bool {
        let mut consumed = false;
        for tool in &self.tools {
            let mut tool = tool.lock();
            if tool.is_active() {
                consumed |= tool.handle_selection_changed(selections);
            }
        }
        consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        name: &'static str,
        active: bool,
        consume: bool,
        activations: usize,
        seen: usize,
    }

    impl Tool for Probe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn activate(&mut self) {
            self.active = true;
            self.activations += 1;
        }

        fn deactivate(&mut self) {
            self.active = false;
        }

        fn handle_button_down(&mut self, _event: &PointerEvent) -> bool {
            self.seen += 1;
            self.consume
        }
    }

    fn probe(name: &'static str, consume: bool) -> Arc<Mutex<Probe>> {
        Arc::new(Mutex::new(Probe {
            name,
            consume,
            ..Default::default()
        }))
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut controller = ToolController::new();
        assert!(controller.register_tool(probe("a", false)));
        assert!(!controller.register_tool(probe("a", false)));
        assert!(controller.tool("a").is_some());
        assert!(controller.tool("b").is_none());
    }

    #[test]
    fn test_activation_is_idempotent() {
        let mut controller = ToolController::new();
        let a = probe("a", false);
        controller.register_tool(a.clone());
        assert!(controller.activate_tool("a"));
        assert!(controller.activate_tool("a"));
        assert_eq!(a.lock().activations, 1);
        assert_eq!(controller.active_tools(), vec!["a"]);
        assert!(controller.deactivate_tool("a"));
        assert!(controller.deactivate_tool("a"));
        assert!(!controller.is_active("a"));
        assert!(!controller.activate_tool("missing"));
    }

    #[test]
    fn test_first_consumer_stops_dispatch() {
        let mut controller = ToolController::new();
        let (a, b, c) = (probe("a", false), probe("b", true), probe("c", true));
        controller.register_tool(a.clone());
        controller.register_tool(b.clone());
        controller.register_tool(c.clone());
        for name in ["a", "b", "c"] {
            controller.activate_tool(name);
        }

        assert!(controller.button_down(&PointerEvent::new(0.0, 0.0)));
        assert_eq!(a.lock().seen, 1);
        assert_eq!(b.lock().seen, 1);
        assert_eq!(c.lock().seen, 0);

        // Inactive tools are skipped
        controller.deactivate_tool("b");
        controller.button_down(&PointerEvent::new(0.0, 0.0));
        assert_eq!(b.lock().seen, 1);
        assert_eq!(c.lock().seen, 1);
    }
}
