//! Input Event Handling
//!
//! This module describes pointer input (mouse and touch) in client coordinates
//! and maps it into canvas-local pixels. The browser adapter builds these
//! events from DOM events; the drawing surface consumes them.

/// Type of pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventType {
    /// Button pressed or finger placed (start of stroke)
    Down,
    /// Pointer moved (continues a stroke if one is active)
    Move,
    /// Button released or finger lifted (end of stroke)
    Up,
    /// Pointer left the canvas; ends an active stroke like `Up`
    Leave,
    /// The platform cancelled the touch sequence
    Cancel,
}

/// A pointer input event in client (viewport) coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// Type of event
    pub event_type: PointerEventType,
    /// Active contact points in client space; one entry for mouse events,
    /// every active touch for touch events (may be empty on touch end)
    pub client_points: Vec<[f32; 2]>,
}

impl PointerEvent {
    /// A mouse event at a single client position
    pub fn mouse(event_type: PointerEventType, client_x: f32, client_y: f32) -> Self {
        Self {
            event_type,
            client_points: vec![[client_x, client_y]],
        }
    }

    /// A touch event carrying the currently active touches in order
    pub fn touch(event_type: PointerEventType, touches: Vec<[f32; 2]>) -> Self {
        Self {
            event_type,
            client_points: touches,
        }
    }

    /// The point that drives drawing: the mouse position, or the first active touch
    pub fn primary_client_position(&self) -> Option<[f32; 2]> {
        self.client_points.first().copied()
    }

    /// The primary position translated into canvas-local pixels
    pub fn canvas_position(&self, rect: &CanvasRect) -> Option<[f32; 2]> {
        self.primary_client_position().map(|p| rect.to_canvas_local(p))
    }

    /// Whether this event finishes a stroke
    pub fn ends_stroke(&self) -> bool {
        matches!(
            self.event_type,
            PointerEventType::Up | PointerEventType::Leave | PointerEventType::Cancel
        )
    }
}

/// Top-left corner of the canvas element in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
}

impl CanvasRect {
    pub fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }

    /// Subtract the canvas's top-left offset from a client position
    pub fn to_canvas_local(&self, client: [f32; 2]) -> [f32; 2] {
        [client[0] - self.left, client[1] - self.top]
    }
}
