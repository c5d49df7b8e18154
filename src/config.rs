use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::assets::color::Color;
use crate::foundation::core::Point;
use crate::foundation::error::{PlacardError, PlacardResult};

/// Environment variable holding extra font directories (platform path-list syntax).
pub const FONT_DIRS_ENV: &str = "PLACARD_FONT_DIRS";

/// Editor-wide settings.
///
/// Every field has a default, so a config file only needs the values it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Fill painted behind the base image on export.
    pub background: Color,
    /// Default file name offered for exported PNGs.
    pub export_file_name: String,
    /// Longer-side cap applied to newly added image overlays.
    pub overlay_max_side: f64,
    /// Where new image overlays are placed.
    pub image_position: Point,
    pub text: TextDefaults,
    pub selection: SelectionStyle,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` fonts.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            // `--background: 0 0% 100%`
            background: Color::WHITE,
            export_file_name: "protest-canvas.png".to_string(),
            overlay_max_side: 200.0,
            image_position: Point::new(100.0, 100.0),
            text: TextDefaults::default(),
            selection: SelectionStyle::default(),
            font_dirs: Vec::new(),
        }
    }
}

/// Field values for a freshly added text element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub text: String,
    pub color: Color,
    pub font_size: f64,
    pub font_family: String,
    pub width: f64,
    pub position: Point,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            text: "Your Text Here".to_string(),
            color: Color::BLACK,
            font_size: 48.0,
            font_family: "Inter, sans-serif".to_string(),
            width: 300.0,
            position: Point::new(50.0, 50.0),
        }
    }
}

/// Outline drawn around the selected element in the live view.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SelectionStyle {
    pub color: Color,
    pub width: f64,
    /// Gap between the element box and the outline.
    pub offset: f64,
}

impl Default for SelectionStyle {
    fn default() -> Self {
        Self {
            // `--primary`
            color: Color::rgb(0x2b, 0x6c, 0xf0),
            width: 2.0,
            offset: 2.0,
        }
    }
}

impl EditorConfig {
    /// Parse a config from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> PlacardResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| PlacardError::serde(format!("parse editor config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PlacardResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PlacardError::validation(format!("open editor config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Append font directories listed in `PLACARD_FONT_DIRS`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dirs) = std::env::var_os(FONT_DIRS_ENV) {
            self.font_dirs
                .extend(std::env::split_paths(&dirs).filter(|p| !p.as_os_str().is_empty()));
        }
        self
    }

    pub fn validate(&self) -> PlacardResult<()> {
        if self.export_file_name.trim().is_empty() {
            return Err(PlacardError::validation("export_file_name must be non-empty"));
        }
        if !(self.overlay_max_side.is_finite() && self.overlay_max_side > 0.0) {
            return Err(PlacardError::validation(
                "overlay_max_side must be finite and > 0",
            ));
        }
        let t = &self.text;
        if !(t.font_size.is_finite() && t.font_size > 0.0) {
            return Err(PlacardError::validation(
                "text.font_size must be finite and > 0",
            ));
        }
        if !(t.width.is_finite() && t.width > 0.0) {
            return Err(PlacardError::validation("text.width must be finite and > 0"));
        }
        if t.font_family.trim().is_empty() {
            return Err(PlacardError::validation("text.font_family must be non-empty"));
        }
        for (name, p) in [("text.position", t.position), ("image_position", self.image_position)] {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(PlacardError::validation(format!("{name} must be finite")));
            }
        }
        if !(self.selection.width.is_finite() && self.selection.width >= 0.0) {
            return Err(PlacardError::validation(
                "selection.width must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
