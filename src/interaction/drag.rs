use crate::foundation::core::{Point, Vec2};
use crate::interaction::listeners::{
    ListenerGuard, ListenerOwner, PointerEventKind, PointerListeners,
};

/// What a pointer event did to a [`DragController`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragEvent {
    /// Pointer went down on the node. Emitted before any move; hosts use it for selection.
    Pressed,
    /// Live position changed; not yet committed.
    Moved(Point),
    /// Gesture ended at this position. Emitted exactly once per gesture.
    Committed(Point),
}

#[derive(Debug)]
enum DragState {
    Idle,
    Dragging {
        /// Pointer position relative to the parent frame at press time.
        grab: Vec2,
        /// Node position at press time.
        start: Point,
        _listeners: ListenerGuard,
    },
}

/// Per-node drag state machine.
///
/// Positions are parent-relative: every pointer sample is converted into the parent frame's
/// coordinates before use, so the node can sit anywhere inside a positioned container. Move/up
/// listeners exist only while a drag is active and are released on drop.
#[derive(Debug)]
pub struct DragController {
    listeners: PointerListeners,
    owner: ListenerOwner,
    position: Point,
    state: DragState,
}

impl DragController {
    pub fn new(listeners: &PointerListeners, initial: Point) -> Self {
        Self {
            owner: listeners.new_owner(),
            listeners: listeners.clone(),
            position: initial,
            state: DragState::Idle,
        }
    }

    /// Identity under which this controller's listeners are registered.
    pub fn owner(&self) -> ListenerOwner {
        self.owner
    }

    /// Position to display, including any uncommitted drag offset.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Adopt an externally committed position. Ignored mid-drag so the gesture keeps control.
    pub fn set_position(&mut self, p: Point) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.position = p;
        true
    }

    /// Start a gesture. `client` is the pointer in viewport space, `parent_origin` the top-left of
    /// the parent frame in the same space.
    pub fn pointer_down(&mut self, client: Point, parent_origin: Point) -> DragEvent {
        let guard = self.listeners.attach(
            self.owner,
            &[PointerEventKind::Move, PointerEventKind::Up],
        );
        self.state = DragState::Dragging {
            grab: client - parent_origin,
            start: self.position,
            _listeners: guard,
        };
        DragEvent::Pressed
    }

    /// Track the pointer; `None` unless a drag is active.
    pub fn pointer_move(&mut self, client: Point, parent_origin: Point) -> Option<DragEvent> {
        let DragState::Dragging { grab, start, .. } = &self.state else {
            return None;
        };
        let rel = client - parent_origin;
        self.position = *start + (rel - *grab);
        Some(DragEvent::Moved(self.position))
    }

    /// Finish the gesture and release listeners; `None` unless a drag was active.
    pub fn pointer_up(&mut self) -> Option<DragEvent> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => None,
            DragState::Dragging { .. } => Some(DragEvent::Committed(self.position)),
        }
    }

    /// Abandon an active gesture without committing; the position snaps back.
    pub fn cancel(&mut self) {
        if let DragState::Dragging { start, .. } =
            std::mem::replace(&mut self.state, DragState::Idle)
        {
            self.position = start;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/drag.rs"]
mod tests;
