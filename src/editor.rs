use std::sync::Arc;

use crate::assets::fonts::{FontBook, TextLayoutEngine};
use crate::assets::source::{ImageLoader, ImageRef, load_image};
use crate::config::EditorConfig;
use crate::foundation::core::{Point, Size};
use crate::foundation::error::{PlacardError, PlacardResult};
use crate::render::export::{ExportOpts, ExportedImage, export_composition};
use crate::render::live::{Action, LiveView, VisualTree};
use crate::scene::model::{BaseImage, BaseTransformPatch, CanvasElement, ElementId, ElementPatch};
use crate::scene::state::{Scene, SceneState};

/// One editing session: the scene, the current selection, and the live view over both.
///
/// All methods run on a single thread; the only suspension points are image loads.
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    selection: Option<ElementId>,
    view: LiveView,
    loader: Box<dyn ImageLoader>,
    fonts: FontBook,
    layout: TextLayoutEngine,
}

impl Editor {
    /// Start a session over `base` using system fonts plus `config.font_dirs`.
    pub fn new(base: BaseImage, loader: Box<dyn ImageLoader>, config: EditorConfig) -> Self {
        let mut fonts = FontBook::with_system_fonts();
        for dir in &config.font_dirs {
            fonts.load_font_dir(dir);
        }
        Self::with_fonts(Scene::new(base), loader, config, fonts)
    }

    /// Start a session over an existing scene with an explicit font database.
    pub fn with_fonts(
        scene: Scene,
        loader: Box<dyn ImageLoader>,
        config: EditorConfig,
        fonts: FontBook,
    ) -> Self {
        let view = LiveView::new(scene.snapshot(), config.selection.clone());
        Self {
            config,
            scene,
            selection: None,
            view,
            loader,
            fonts,
            layout: TextLayoutEngine::new(),
        }
    }

    /// Load `source` once to learn its natural size, then start a session over it.
    #[tracing::instrument(skip_all, fields(source = %source))]
    pub async fn open(
        source: ImageRef,
        alt: impl Into<String>,
        loader: Box<dyn ImageLoader>,
        config: EditorConfig,
    ) -> PlacardResult<Self> {
        let image = load_image(loader.as_ref(), &source)
            .await
            .map_err(|e| PlacardError::base_image_load(format!("{source}: {e}")))?;
        let base = BaseImage::new(source, alt, image.width, image.height)?;
        Ok(Self::new(base, loader, config))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn snapshot(&self) -> Arc<SceneState> {
        self.scene.snapshot()
    }

    pub fn elements(&self) -> &[CanvasElement] {
        self.scene.elements()
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Selected element id, if it still exists.
    pub fn selection(&self) -> Option<ElementId> {
        self.selection.filter(|id| self.scene.contains(*id))
    }

    pub fn selected_element(&self) -> Option<&CanvasElement> {
        self.selection().and_then(|id| self.scene.element(id))
    }

    /// Select `id`, or clear with `None`. Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<ElementId>) {
        self.selection = id.filter(|id| {
            let known = self.scene.contains(*id);
            if !known {
                tracing::debug!(%id, "select of unknown element ignored");
            }
            known
        });
        self.refresh();
    }

    /// Append a text element with the configured defaults and select it.
    pub fn add_text_element(&mut self) -> ElementId {
        let id = self.scene.add_text_element(&self.config.text);
        self.selection = Some(id);
        self.refresh();
        id
    }

    /// Decode `source`, then append it as an image element and select it.
    ///
    /// The element's size is the natural size capped to `overlay_max_side`. Nothing changes if
    /// the source cannot be loaded or decoded.
    #[tracing::instrument(skip_all, fields(source = %source))]
    pub async fn add_image_element(&mut self, source: ImageRef) -> PlacardResult<ElementId> {
        let image = load_image(self.loader.as_ref(), &source)
            .await
            .map_err(|e| PlacardError::image_decode(format!("{source}: {e}")))?;

        let natural = Size::new(f64::from(image.width), f64::from(image.height));
        let id = self.scene.insert_image_element(
            source,
            natural,
            self.config.image_position,
            self.config.overlay_max_side,
        )?;
        self.selection = Some(id);
        self.refresh();
        Ok(id)
    }

    /// Merge `patch` into element `id`; unknown ids are ignored.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> PlacardResult<()> {
        if self.scene.update_element(id, patch)? {
            self.refresh();
        }
        Ok(())
    }

    /// Remove element `id`. The selection is always cleared, whichever element was selected.
    pub fn delete_element(&mut self, id: ElementId) {
        self.scene.delete_element(id);
        self.selection = None;
        self.refresh();
    }

    pub fn update_base_image_transform(&mut self, patch: &BaseTransformPatch) -> PlacardResult<()> {
        self.scene.update_base_image_transform(patch)?;
        self.refresh();
        Ok(())
    }

    pub fn rotate_base_clockwise(&mut self) {
        self.scene.rotate_base_clockwise();
        self.refresh();
    }

    pub fn flip_base_horizontal(&mut self) {
        self.scene.flip_base_horizontal();
        self.refresh();
    }

    pub fn flip_base_vertical(&mut self) {
        self.scene.flip_base_vertical();
        self.refresh();
    }

    pub fn view(&self) -> &LiveView {
        &self.view
    }

    pub fn visual_tree(&self) -> VisualTree {
        self.view.tree()
    }

    /// Position of the canvas container in client coordinates.
    pub fn set_frame_origin(&mut self, origin: Point) {
        self.view.set_frame_origin(origin);
    }

    pub fn pointer_down(&mut self, client: Point) -> Vec<Action> {
        let actions = self.view.pointer_down(client);
        self.apply_actions(&actions);
        actions
    }

    pub fn pointer_move(&mut self, client: Point) -> Vec<Action> {
        self.view.pointer_move(client)
    }

    pub fn pointer_up(&mut self, client: Point) -> Vec<Action> {
        let actions = self.view.pointer_up(client);
        self.apply_actions(&actions);
        actions
    }

    fn apply_actions(&mut self, actions: &[Action]) {
        for action in actions {
            match *action {
                Action::Select(id) => self.selection = Some(id),
                Action::ClearSelection => self.selection = None,
                Action::Preview { .. } => {}
                Action::Commit { id, position } => {
                    let patch = ElementPatch::position(position.x, position.y);
                    if let Err(e) = self.scene.update_element(id, &patch) {
                        tracing::warn!(%id, error = %e, "dropping drag commit");
                    }
                }
            }
        }
        self.refresh();
    }

    /// Rasterize the current scene to PNG.
    ///
    /// Reads a snapshot only; the scene is unchanged whether or not the export succeeds.
    #[tracing::instrument(skip_all, fields(elements = self.scene.len()))]
    pub async fn export_composition(&mut self) -> PlacardResult<ExportedImage> {
        let snapshot = self.scene.snapshot();
        let opts = ExportOpts::from(&self.config);
        export_composition(
            &snapshot,
            self.loader.as_ref(),
            &mut self.fonts,
            &mut self.layout,
            &opts,
        )
        .await
    }

    fn refresh(&mut self) {
        let selection = self.selection();
        self.selection = selection;
        self.view.sync(self.scene.snapshot(), selection);
    }
}

#[cfg(test)]
#[path = "../tests/unit/editor/editor.rs"]
mod tests;
