use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::overlay::domain::sprite_placement::SpriteKind;

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("sprite directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("failed to decode sprite {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decoded sprite artwork, one RGBA image per kind.
///
/// Kinds without an image are simply absent; blitting them is a no-op.
#[derive(Default)]
pub struct SpriteSheet {
    sprites: HashMap<SpriteKind, RgbaImage>,
}

impl SpriteSheet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads `<dir>/<kind.file_name()>` for every sprite kind.
    ///
    /// Missing files are skipped with a warning; a file that exists but
    /// does not decode is an error.
    pub fn load_dir(dir: &Path) -> Result<Self, SpriteError> {
        if !dir.is_dir() {
            return Err(SpriteError::MissingDirectory(dir.to_path_buf()));
        }
        let mut sheet = Self::empty();
        for &kind in SpriteKind::ALL {
            let path = dir.join(kind.file_name());
            if !path.exists() {
                log::warn!("Sprite {} not found, {kind:?} will not be drawn", path.display());
                continue;
            }
            let image = image::open(&path)
                .map_err(|source| SpriteError::Decode {
                    path: path.clone(),
                    source,
                })?
                .to_rgba8();
            log::debug!(
                "Loaded sprite {} ({}x{})",
                path.display(),
                image.width(),
                image.height()
            );
            sheet.insert(kind, image);
        }
        Ok(sheet)
    }

    pub fn insert(&mut self, kind: SpriteKind, image: RgbaImage) {
        self.sprites.insert(kind, image);
    }

    pub fn get(&self, kind: SpriteKind) -> Option<&RgbaImage> {
        self.sprites.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
