//! Filesystem-backed asset provider

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use log::debug;

use super::{
    mime_from_extension, AssetError, AssetProvider, DocumentAsset, FontFace, FontFamily,
    ImageAsset, WIDTH_TABLE_LEN,
};

/// Loads assets from disk relative to a base directory, and from inline
/// `data:<mime>;base64,` URIs
#[derive(Debug, Clone, Default)]
pub struct FsAssets {
    base_path: PathBuf,
}

impl FsAssets {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a relative path against the base directory
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.base_path.join(relative)
    }

    /// Read raw bytes and their mime type for a source reference
    fn read_source(&self, src: &str) -> Result<(Vec<u8>, String), AssetError> {
        if let Some(rest) = src.strip_prefix("data:") {
            return decode_data_uri(src, rest);
        }

        let path = self.resolve_path(src);
        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_from_extension)
            .unwrap_or("unknown")
            .to_string();
        let bytes = read_file(&path)?;
        Ok((bytes, mime))
    }

    fn load_face(&self, file: &str) -> Result<FontFace, AssetError> {
        let path = self.resolve_path(file);
        if !path.exists() {
            return Err(AssetError::not_found(path.display().to_string()));
        }

        let mut sidecar = path.clone().into_os_string();
        sidecar.push(".widths.json");
        let sidecar = PathBuf::from(sidecar);
        debug!("reading advance widths from {}", sidecar.display());

        let bytes = read_file(&sidecar)?;
        let widths: Vec<f64> = serde_json::from_slice(&bytes)
            .map_err(|e| AssetError::malformed(sidecar.display().to_string(), e.to_string()))?;
        if widths.len() < WIDTH_TABLE_LEN {
            return Err(AssetError::malformed(
                sidecar.display().to_string(),
                format!(
                    "expected {} advance widths, found {}",
                    WIDTH_TABLE_LEN,
                    widths.len()
                ),
            ));
        }
        Ok(FontFace::new(widths))
    }
}

impl AssetProvider for FsAssets {
    fn load_font(&self, name: &str, files: &[String]) -> Result<FontFamily, AssetError> {
        let mut faces = files.iter().map(|f| self.load_face(f));
        let regular = faces
            .next()
            .ok_or_else(|| AssetError::malformed(name, "font declares no files"))??;

        let mut family = FontFamily::new(name, regular);
        if let Some(face) = faces.next() {
            family = family.with_bold(face?);
        }
        if let Some(face) = faces.next() {
            family = family.with_italic(face?);
        }
        if let Some(face) = faces.next() {
            family = family.with_bold_italic(face?);
        }
        Ok(family)
    }

    fn load_image(&self, src: &str) -> Result<ImageAsset, AssetError> {
        let (bytes, mime) = self.read_source(src)?;
        let mime = if mime == "image/jpg" {
            "image/jpeg".to_string()
        } else {
            mime
        };
        ImageAsset::from_bytes(src, &mime, bytes)
    }

    fn load_document(&self, src: &str) -> Result<DocumentAsset, AssetError> {
        let (bytes, mime) = self.read_source(src)?;
        if mime != "application/pdf" {
            return Err(AssetError::UnsupportedFormat {
                src: src.to_string(),
                mime,
            });
        }
        if !bytes.starts_with(b"%PDF") {
            return Err(AssetError::malformed(src, "missing %PDF header"));
        }
        Ok(DocumentAsset {
            src: src.to_string(),
            mime,
            bytes: bytes.into(),
        })
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, AssetError> {
    fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            AssetError::not_found(path.display().to_string())
        } else {
            AssetError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Decode the part of a data URI after `data:`
fn decode_data_uri(src: &str, rest: &str) -> Result<(Vec<u8>, String), AssetError> {
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AssetError::malformed(truncate(src), "data URI without payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| AssetError::malformed(truncate(src), "only base64 data URIs are supported"))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| AssetError::malformed(truncate(src), e.to_string()))?;
    Ok((bytes, mime.to_string()))
}

/// Data URIs can be huge; keep error messages readable
fn truncate(src: &str) -> String {
    let mut end = src.len().min(48);
    while !src.is_char_boundary(end) {
        end -= 1;
    }
    src[..end].to_string()
}
