use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::color::Color;
use crate::assets::source::ImageRef;
use crate::config::SelectionStyle;
use crate::foundation::core::{Affine, Point, Rect, Size};
use crate::geometry::transform::{
    compose_base_image_transform, element_size, element_transform_at,
};
use crate::interaction::drag::{DragController, DragEvent};
use crate::interaction::listeners::{PointerEventKind, PointerListeners};
use crate::scene::model::{ElementBody, ElementId, ElementKind};
use crate::scene::state::SceneState;

/// Request emitted by the live view for its host to act on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Pointer went down on an element.
    Select(ElementId),
    /// Pointer went down on empty space.
    ClearSelection,
    /// Element is being dragged; only the view has moved it so far.
    Preview { id: ElementId, position: Point },
    /// Drag finished; write `position` back into the scene.
    Commit { id: ElementId, position: Point },
}

/// Retained visual tree: the container, the base image, and one node per element.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VisualTree {
    /// Container size, fixed to the base image's natural size.
    pub size: Size,
    pub base: BaseNode,
    /// Paint order.
    pub elements: Vec<ElementNode>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BaseNode {
    pub source: ImageRef,
    pub alt: String,
    /// Maps the natural-size image box into the container.
    pub transform: Affine,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ElementNode {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Displayed top-left; differs from the stored position during a drag.
    pub position: Point,
    pub size: Size,
    pub rotation_deg: f64,
    /// Maps the node's local box into the container.
    pub transform: Affine,
    pub content: NodeContent,
    pub selected: bool,
    pub dragging: bool,
    /// Present only on the selected node; in local box coordinates.
    pub outline: Option<Outline>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeContent {
    /// Single line, centered in the box.
    Text {
        text: String,
        color: Color,
        font_size: f64,
        font_family: String,
    },
    Image { source: ImageRef },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Outline {
    pub rect: Rect,
    pub color: Color,
    pub width: f64,
}

/// Interactive rendering of a scene snapshot.
///
/// Owns one [`DragController`] per element, keyed by id so an in-flight drag survives re-syncs.
/// Controllers of removed elements are dropped on sync, which detaches their listeners.
pub struct LiveView {
    scene: Arc<SceneState>,
    selection: Option<ElementId>,
    style: SelectionStyle,
    listeners: PointerListeners,
    /// Container top-left in client coordinates.
    frame_origin: Point,
    drags: HashMap<ElementId, DragController>,
}

impl LiveView {
    pub fn new(scene: Arc<SceneState>, style: SelectionStyle) -> Self {
        let mut view = Self {
            scene: Arc::clone(&scene),
            selection: None,
            style,
            listeners: PointerListeners::new(),
            frame_origin: Point::ORIGIN,
            drags: HashMap::new(),
        };
        view.sync(scene, None);
        view
    }

    /// Global listener table used by this view's drag controllers.
    pub fn listeners(&self) -> &PointerListeners {
        &self.listeners
    }

    pub fn frame_origin(&self) -> Point {
        self.frame_origin
    }

    /// Move the container in client space (layout change or scroll).
    pub fn set_frame_origin(&mut self, origin: Point) {
        self.frame_origin = origin;
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    /// Reconcile with a new snapshot and selection.
    pub fn sync(&mut self, scene: Arc<SceneState>, selection: Option<ElementId>) {
        self.drags
            .retain(|id, _| scene.elements.iter().any(|e| e.id == *id));
        for el in &scene.elements {
            let committed = Point::new(el.x, el.y);
            match self.drags.get_mut(&el.id) {
                Some(drag) => {
                    drag.set_position(committed);
                }
                None => {
                    self.drags
                        .insert(el.id, DragController::new(&self.listeners, committed));
                }
            }
        }
        self.selection = selection.filter(|id| scene.element(*id).is_some());
        self.scene = scene;
    }

    /// Position currently shown for `id`.
    pub fn displayed_position(&self, id: ElementId) -> Option<Point> {
        self.drags.get(&id).map(DragController::position)
    }

    fn node_transform(&self, id: ElementId) -> Option<(Affine, Size)> {
        let el = self.scene.element(id)?;
        let pos = self.displayed_position(id).unwrap_or(Point::new(el.x, el.y));
        Some((element_transform_at(el, pos).to_affine(), element_size(el)))
    }

    /// Top-most element under a client-space point.
    pub fn hit_test(&self, client: Point) -> Option<ElementId> {
        let p = client - self.frame_origin.to_vec2();
        self.scene.elements.iter().rev().find_map(|el| {
            let (affine, size) = self.node_transform(el.id)?;
            if affine.determinant() == 0.0 {
                return None;
            }
            let local = affine.inverse() * p;
            let hit = local.x >= 0.0
                && local.y >= 0.0
                && local.x <= size.width
                && local.y <= size.height;
            hit.then_some(el.id)
        })
    }

    pub fn pointer_down(&mut self, client: Point) -> Vec<Action> {
        // A press can only start one gesture; drags whose release never arrived snap back.
        for (id, drag) in self.drags.iter_mut().filter(|(_, d)| d.is_dragging()) {
            drag.cancel();
            tracing::debug!(%id, "drag cancelled by a new press");
        }

        let Some(id) = self.hit_test(client) else {
            self.selection = None;
            return vec![Action::ClearSelection];
        };
        let origin = self.frame_origin;
        if let Some(drag) = self.drags.get_mut(&id) {
            drag.pointer_down(client, origin);
        }
        self.selection = Some(id);
        vec![Action::Select(id)]
    }

    pub fn pointer_move(&mut self, client: Point) -> Vec<Action> {
        let origin = self.frame_origin;
        let owners = self.listeners.listeners_for(PointerEventKind::Move);
        let mut actions = Vec::new();
        for (id, drag) in self.drags.iter_mut() {
            if !owners.contains(&drag.owner()) {
                continue;
            }
            if let Some(DragEvent::Moved(position)) = drag.pointer_move(client, origin) {
                actions.push(Action::Preview { id: *id, position });
            }
        }
        actions
    }

    pub fn pointer_up(&mut self, _client: Point) -> Vec<Action> {
        let owners = self.listeners.listeners_for(PointerEventKind::Up);
        let mut actions = Vec::new();
        for (id, drag) in self.drags.iter_mut() {
            if !owners.contains(&drag.owner()) {
                continue;
            }
            if let Some(DragEvent::Committed(position)) = drag.pointer_up() {
                tracing::debug!(%id, x = position.x, y = position.y, "drag committed");
                actions.push(Action::Commit { id: *id, position });
            }
        }
        actions
    }

    /// Snapshot of what is on screen.
    pub fn tree(&self) -> VisualTree {
        let base = &self.scene.base;
        let canvas = base.canvas();
        let elements = self
            .scene
            .elements
            .iter()
            .map(|el| {
                let position = self
                    .displayed_position(el.id)
                    .unwrap_or(Point::new(el.x, el.y));
                let size = element_size(el);
                let selected = self.selection == Some(el.id);
                let content = match &el.body {
                    ElementBody::Text(t) => NodeContent::Text {
                        text: t.text.clone(),
                        color: t.color,
                        font_size: t.font_size,
                        font_family: t.font_family.clone(),
                    },
                    ElementBody::Image(i) => NodeContent::Image {
                        source: i.source.clone(),
                    },
                };
                ElementNode {
                    id: el.id,
                    kind: el.kind(),
                    position,
                    size,
                    rotation_deg: el.rotation_deg,
                    transform: element_transform_at(el, position).to_affine(),
                    content,
                    selected,
                    dragging: self.drags.get(&el.id).is_some_and(|d| d.is_dragging()),
                    outline: selected.then(|| self.outline(size)),
                }
            })
            .collect();

        VisualTree {
            size: canvas.size(),
            base: BaseNode {
                source: base.source.clone(),
                alt: base.alt.clone(),
                transform: compose_base_image_transform(&base.transform, canvas).to_affine(),
            },
            elements,
        }
    }

    fn outline(&self, size: Size) -> Outline {
        // Ring sits outside the box: offset gap, then the stroke centered on its own width.
        let grow = self.style.offset + self.style.width / 2.0;
        Outline {
            rect: Rect::from_origin_size(Point::ORIGIN, size).inflate(grow, grow),
            color: self.style.color,
            width: self.style.width,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/live.rs"]
mod tests;
