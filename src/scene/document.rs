use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::foundation::error::{PlacardError, PlacardResult};
use crate::scene::state::{Scene, SceneState};

/// JSON-facing saved scene.
///
/// ```json
/// {
///   "base": { "source": "crowd.jpg", "original_width": 1200, "original_height": 800 },
///   "elements": [
///     { "id": "…", "type": "text", "x": 50, "y": 50, "text": "Hello", "color": "#000000",
///       "font_size": 48, "font_family": "Inter, sans-serif", "width": 300 }
///   ]
/// }
/// ```
///
/// Image sources are resolved by the loader the scene is rendered with; relative paths are usually
/// taken relative to the document's directory.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDocument {
    state: SceneState,
}

impl SceneDocument {
    /// Parse and validate a scene document from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> PlacardResult<Self> {
        let state: SceneState = serde_json::from_reader(r)
            .map_err(|e| PlacardError::serde(format!("parse scene JSON: {e}")))?;
        state.validate()?;
        Ok(Self { state })
    }

    /// Parse and validate a scene document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PlacardResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PlacardError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Capture the current state of `scene`.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            state: (*scene.snapshot()).clone(),
        }
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn into_scene(self) -> PlacardResult<Scene> {
        Scene::from_state(self.state)
    }

    /// Pretty-printed JSON.
    pub fn to_writer<W: Write>(&self, w: W) -> PlacardResult<()> {
        serde_json::to_writer_pretty(w, &self.state)
            .map_err(|e| PlacardError::serde(format!("write scene JSON: {e}")))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> PlacardResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            PlacardError::validation(format!("create scene JSON '{}': {e}", path.display()))
        })?;
        let mut w = BufWriter::new(f);
        self.to_writer(&mut w)?;
        w.flush()
            .map_err(|e| PlacardError::validation(format!("flush '{}': {e}", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/document.rs"]
mod tests;
