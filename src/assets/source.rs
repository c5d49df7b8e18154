use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Context;
use base64::{Engine as _, engine::general_purpose};
use futures::future::{FutureExt, LocalBoxFuture};

use crate::assets::decode::{PreparedImage, decode_image};
use crate::foundation::error::{PlacardError, PlacardResult};

/// Opaque reference to image bytes: a data URI, a relative path, or a URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// Build a `data:` URI embedding `bytes` with the given media type.
    pub fn data_uri(media_type: &str, bytes: &[u8]) -> Self {
        Self(format!(
            "data:{media_type};base64,{}",
            general_purpose::STANDARD.encode(bytes)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Data URIs can be megabytes long; keep log lines readable.
        if self.is_data_uri() && self.0.len() > 48 {
            let head: String = self.0.chars().take(48).collect();
            write!(f, "{head}…")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Asynchronous byte source for image references.
///
/// Each returned future resolves exactly once, to the encoded bytes or a failure.
pub trait ImageLoader {
    /// Fetch the encoded bytes behind `source`.
    fn fetch<'a>(&'a self, source: &'a ImageRef) -> LocalBoxFuture<'a, anyhow::Result<Vec<u8>>>;
}

/// Fetch and decode an image through `loader`.
pub async fn load_image(loader: &dyn ImageLoader, source: &ImageRef) -> PlacardResult<PreparedImage> {
    let bytes = loader.fetch(source).await?;
    decode_image(&bytes)
}

/// Loader for `data:` URIs and paths relative to a root directory.
#[derive(Clone, Debug)]
pub struct FileImageLoader {
    root: PathBuf,
}

impl FileImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_path(&self, source: &str) -> anyhow::Result<Vec<u8>> {
        let norm = normalize_rel_path(source)?;
        let path = self.root.join(Path::new(&norm));
        std::fs::read(&path).with_context(|| format!("read image bytes from '{}'", path.display()))
    }
}

impl ImageLoader for FileImageLoader {
    fn fetch<'a>(&'a self, source: &'a ImageRef) -> LocalBoxFuture<'a, anyhow::Result<Vec<u8>>> {
        async move {
            let s = source.as_str();
            if s.starts_with("data:") {
                return decode_data_uri(s);
            }
            if s.starts_with("http://") || s.starts_with("https://") {
                anyhow::bail!("remote image sources are not supported: {s}");
            }
            self.read_path(s)
        }
        .boxed_local()
    }
}

/// In-memory loader keyed by source string; also resolves `data:` URIs.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageLoader {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(source.into(), bytes);
    }

    pub fn with(mut self, source: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(source, bytes);
        self
    }
}

impl ImageLoader for MemoryImageLoader {
    fn fetch<'a>(&'a self, source: &'a ImageRef) -> LocalBoxFuture<'a, anyhow::Result<Vec<u8>>> {
        async move {
            if let Some(bytes) = self.entries.get(source.as_str()) {
                return Ok(bytes.clone());
            }
            if source.is_data_uri() {
                return decode_data_uri(source.as_str());
            }
            anyhow::bail!("no image registered for '{source}'")
        }
        .boxed_local()
    }
}

/// Decode the payload of a `data:[<media type>][;base64],<data>` URI.
pub fn decode_data_uri(uri: &str) -> anyhow::Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .context("data URI must start with 'data:'")?;
    let (meta, payload) = rest
        .split_once(',')
        .context("data URI is missing the ',' separator")?;
    if !meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        anyhow::bail!("only base64 data URIs are supported");
    }
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    general_purpose::STANDARD
        .decode(payload.as_bytes())
        .context("decode base64 data URI payload")
}

/// Normalize and validate root-relative image paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> PlacardResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PlacardError::validation("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(PlacardError::validation("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PlacardError::validation("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PlacardError::validation("image path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
