use std::collections::HashSet;
use std::sync::Arc;

use crate::assets::source::ImageRef;
use crate::config::TextDefaults;
use crate::foundation::core::{Point, Size};
use crate::foundation::error::{PlacardError, PlacardResult};
use crate::geometry::transform::{fit_within, normalize_degrees};
use crate::scene::model::{
    BaseImage, BaseTransformPatch, CanvasElement, ElementBody, ElementId, ElementPatch, ImageBody,
    TextBody,
};

/// Immutable view of the composition: base image plus overlays in paint order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneState {
    pub base: BaseImage,
    /// Collection order is paint order; later elements sit on top.
    pub elements: Vec<CanvasElement>,
}

impl SceneState {
    pub fn element(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn position_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Check the base image, every element, and id uniqueness.
    pub fn validate(&self) -> PlacardResult<()> {
        self.base.validate()?;
        let mut seen = HashSet::with_capacity(self.elements.len());
        for el in &self.elements {
            if !seen.insert(el.id) {
                return Err(PlacardError::validation(format!(
                    "duplicate element id '{}'",
                    el.id
                )));
            }
            el.validate()
                .map_err(|e| PlacardError::validation(format!("element '{}': {e}", el.id)))?;
        }
        Ok(())
    }
}

/// Authoritative scene state with cheap read-only snapshots.
///
/// Renderers hold `Arc<SceneState>` snapshots; mutations go through [`Scene`] and copy the state
/// only while a snapshot is still alive.
#[derive(Clone, Debug)]
pub struct Scene {
    state: Arc<SceneState>,
    revision: u64,
}

impl Scene {
    /// Fresh scene over `base` with no overlays.
    pub fn new(base: BaseImage) -> Self {
        Self {
            state: Arc::new(SceneState {
                base,
                elements: Vec::new(),
            }),
            revision: 0,
        }
    }

    /// Adopt a previously saved state after validating it.
    pub fn from_state(state: SceneState) -> PlacardResult<Self> {
        state.validate()?;
        Ok(Self {
            state: Arc::new(state),
            revision: 0,
        })
    }

    pub fn snapshot(&self) -> Arc<SceneState> {
        Arc::clone(&self.state)
    }

    /// Incremented on every effective mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn base(&self) -> &BaseImage {
        &self.state.base
    }

    pub fn elements(&self) -> &[CanvasElement] {
        &self.state.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&CanvasElement> {
        self.state.element(id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.state.position_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.state.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.elements.is_empty()
    }

    fn state_mut(&mut self) -> &mut SceneState {
        self.revision += 1;
        Arc::make_mut(&mut self.state)
    }

    /// Append a text element built from `defaults`.
    pub fn add_text_element(&mut self, defaults: &TextDefaults) -> ElementId {
        let id = ElementId::new();
        self.state_mut().elements.push(CanvasElement {
            id,
            x: defaults.position.x,
            y: defaults.position.y,
            rotation_deg: 0.0,
            body: ElementBody::Text(TextBody {
                text: defaults.text.clone(),
                color: defaults.color,
                font_size: defaults.font_size,
                font_family: defaults.font_family.clone(),
                width: defaults.width,
            }),
        });
        id
    }

    /// Append an image element once its natural size is known.
    ///
    /// The stored size is `natural` capped to `max_side` on the longer dimension.
    pub fn insert_image_element(
        &mut self,
        source: ImageRef,
        natural: Size,
        at: Point,
        max_side: f64,
    ) -> PlacardResult<ElementId> {
        let size = fit_within(natural, max_side);
        let el = CanvasElement {
            id: ElementId::new(),
            x: at.x,
            y: at.y,
            rotation_deg: 0.0,
            body: ElementBody::Image(ImageBody {
                source,
                width: size.width,
                height: size.height,
            }),
        };
        el.validate()?;

        let id = el.id;
        self.state_mut().elements.push(el);
        Ok(id)
    }

    /// Merge `patch` into the element `id`.
    ///
    /// Returns `Ok(false)` when `id` is unknown. Invalid patches leave the element untouched.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> PlacardResult<bool> {
        let Some(idx) = self.state.position_of(id) else {
            tracing::debug!(%id, "update for unknown element ignored");
            return Ok(false);
        };
        if patch.is_empty() {
            return Ok(true);
        }

        let mut updated = self.state.elements[idx].clone();
        if let Err(e) = updated.apply(patch) {
            tracing::warn!(%id, error = %e, "rejected element patch");
            return Err(e);
        }
        self.state_mut().elements[idx] = updated;
        Ok(true)
    }

    /// Remove the element `id`; returns whether anything was removed.
    pub fn delete_element(&mut self, id: ElementId) -> bool {
        let Some(idx) = self.state.position_of(id) else {
            tracing::debug!(%id, "delete for unknown element ignored");
            return false;
        };
        self.state_mut().elements.remove(idx);
        true
    }

    pub fn update_base_image_transform(&mut self, patch: &BaseTransformPatch) -> PlacardResult<()> {
        let mut t = self.state.base.transform;
        if let Err(e) = t.apply(patch) {
            tracing::warn!(error = %e, "rejected base transform patch");
            return Err(e);
        }
        if t != self.state.base.transform {
            self.state_mut().base.transform = t;
        }
        Ok(())
    }

    /// Rotate the base image a quarter turn clockwise, keeping degrees in `[0, 360)`.
    pub fn rotate_base_clockwise(&mut self) {
        let next = normalize_degrees(self.state.base.transform.rotate_deg + 90.0);
        self.state_mut().base.transform.rotate_deg = next;
    }

    /// Mirror the base image left-to-right.
    pub fn flip_base_horizontal(&mut self) {
        let t = &mut self.state_mut().base.transform;
        t.scale_x = -t.scale_x;
    }

    /// Mirror the base image top-to-bottom.
    pub fn flip_base_vertical(&mut self) {
        let t = &mut self.state_mut().base.transform;
        t.scale_y = -t.scale_y;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/state.rs"]
mod tests;
