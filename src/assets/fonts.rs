use std::{
    borrow::Cow,
    collections::HashMap,
    path::Path,
    sync::Arc,
};

use crate::assets::color::Color;
use crate::foundation::error::{PlacardError, PlacardResult};

/// A concrete font face resolved from a CSS `font-family` list.
#[derive(Clone)]
pub struct FontFace {
    /// Primary family name of the resolved face.
    pub family: String,
    /// Raw font file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside collections (`.ttc`), `0` otherwise.
    pub index: u32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

/// DejaVu Sans, used when no requested or generic family is installed.
static BUNDLED_SANS: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Font database used by both renderers to turn CSS family lists into font bytes.
pub struct FontBook {
    db: usvg::fontdb::Database,
    fallback: Option<usvg::fontdb::ID>,
    resolved: HashMap<String, FontFace>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::with_system_fonts()
    }
}

impl FontBook {
    /// Database holding only the bundled fallback face.
    pub fn empty() -> Self {
        let mut db = usvg::fontdb::Database::new();
        let fallback = db
            .load_font_source(usvg::fontdb::Source::Binary(Arc::new(BUNDLED_SANS)))
            .first()
            .copied();
        Self {
            db,
            fallback,
            resolved: HashMap::new(),
        }
    }

    /// Database seeded with the fonts installed on the system.
    pub fn with_system_fonts() -> Self {
        let mut book = Self::empty();
        book.db.load_system_fonts();
        book
    }

    /// Load every `.ttf`/`.otf`/`.ttc` file in `dir` (non-recursive). Missing dirs are ignored.
    pub fn load_font_dir(&mut self, dir: &Path) {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return;
        };

        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if ext != "ttf" && ext != "otf" && ext != "ttc" {
                continue;
            }
            if let Err(e) = self.db.load_font_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
            }
        }
        self.resolved.clear();
    }

    /// Number of faces known to the database.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Resolve a CSS family list such as `"Inter, sans-serif"` to a concrete face.
    ///
    /// Falls back to the generic sans-serif family, then to the bundled face.
    pub fn resolve(&mut self, css_family: &str) -> PlacardResult<FontFace> {
        if let Some(face) = self.resolved.get(css_family) {
            return Ok(face.clone());
        }

        let names = parse_family_list(css_family);
        let mut families = names
            .iter()
            .map(|n| generic_family(n).unwrap_or(usvg::fontdb::Family::Name(n.as_str())))
            .collect::<Vec<_>>();
        families.push(usvg::fontdb::Family::SansSerif);

        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight::NORMAL,
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };

        let id = self
            .db
            .query(&query)
            .or(self.fallback)
            .or_else(|| self.db.faces().next().map(|f| f.id))
            .ok_or_else(|| {
                PlacardError::render(format!("no font available for family '{css_family}'"))
            })?;

        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "unknown".to_string());
        let (bytes, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| PlacardError::render(format!("font data for '{family}' unavailable")))?;

        let face = FontFace {
            family,
            bytes: Arc::new(bytes),
            index,
        };
        tracing::debug!(css_family, resolved = %face.family, "resolved font family");
        self.resolved.insert(css_family.to_string(), face.clone());
        Ok(face)
    }
}

/// Split a CSS `font-family` value into unquoted family names.
pub fn parse_family_list(css: &str) -> Vec<String> {
    css.split(',')
        .map(|s| s.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn generic_family(name: &str) -> Option<usvg::fontdb::Family<'static>> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Some(usvg::fontdb::Family::Serif),
        "sans-serif" | "system-ui" => Some(usvg::fontdb::Family::SansSerif),
        "monospace" => Some(usvg::fontdb::Family::Monospace),
        "cursive" => Some(usvg::fontdb::Family::Cursive),
        "fantasy" => Some(usvg::fontdb::Family::Fantasy),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Color> for TextBrushRgba8 {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

#[derive(Clone)]
/// Shaped single-line text plus the face it was shaped with.
pub struct PreparedText {
    pub layout: Arc<parley::Layout<TextBrushRgba8>>,
    pub face: FontFace,
}

impl PreparedText {
    /// Width of the laid-out line in pixels.
    pub fn width(&self) -> f64 {
        f64::from(self.layout.width())
    }

    /// Height of the laid-out line in pixels.
    pub fn height(&self) -> f64 {
        f64::from(self.layout.height())
    }
}

impl std::fmt::Debug for PreparedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedText")
            .field("layout_ptr", &Arc::as_ptr(&self.layout))
            .field("face", &self.face)
            .finish()
    }
}

/// Stateful helper for building Parley text layouts from resolved faces.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<(String, u32, usize), String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    /// Shape `text` on a single line (`white-space: nowrap`).
    pub fn layout_line(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> PlacardResult<PreparedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(PlacardError::validation(
                "text font size must be finite and > 0",
            ));
        }

        let family_name = self.register(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        Ok(PreparedText {
            layout: Arc::new(layout),
            face: face.clone(),
        })
    }

    fn register(&mut self, face: &FontFace) -> PlacardResult<String> {
        let key = (face.family.clone(), face.index, face.bytes.len());
        if let Some(name) = self.registered.get(&key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.bytes.as_ref().clone()),
            None,
        );
        let family_id =
            family_for_index(&families, face.index, parley::fontique::FontInfo::index)
                .ok_or_else(|| {
                    PlacardError::render(format!("font '{}' registered no families", face.family))
                })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PlacardError::render("registered font family has no name"))?
            .to_string();

        self.registered.insert(key, family_name.clone());
        Ok(family_name)
    }
}

/// Family owning the face at `index` of a registered file, else the file's first family.
fn family_for_index<F: Copy, I>(
    families: &[(F, Vec<I>)],
    index: u32,
    index_of: impl Fn(&I) -> u32,
) -> Option<F> {
    families
        .iter()
        .find(|(_, fonts)| fonts.iter().any(|f| index_of(f) == index))
        .or_else(|| families.first())
        .map(|(id, _)| *id)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
