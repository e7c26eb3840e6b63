//! Writing baked texture maps to disk.

use crate::error::Result;
use crate::types::TextureData;
use std::path::Path;

/// Encode `texture` as PNG at `path`, replacing any stale file there.
pub fn write_png(path: &Path, texture: &TextureData) -> Result<()> {
    let png = texture.to_png()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    std::fs::write(path, png)?;
    Ok(())
}
