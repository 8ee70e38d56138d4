use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::cat::frames::{self, SpriteFrame, SPRITE_SIZE};
use crate::error::PetError;

/// Palette files are `oneko*.png` in this directory.
pub const SPRITE_DIR: &str = "src/sprite/";
const PALETTE_PREFIX: &str = "oneko";
const PALETTE_SUFFIX: &str = ".png";

/// A decoded sprite sheet: RGBA8 pixels, grid of `SPRITE_SIZE` cells.
pub struct SpriteSheet {
    image: RgbaImage,
}

impl SpriteSheet {
    pub fn load(path: &Path) -> Result<Self, PetError> {
        let image = image::open(path)
            .map_err(|source| PetError::SheetLoad {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();
        Self::from_image(image)
    }

    /// Wrap an already-decoded image. Rejects sheets that don't cover every
    /// cell the frame tables reference.
    pub fn from_image(image: RgbaImage) -> Result<Self, PetError> {
        let (cols, rows) = frames::required_grid();
        let (min_width, min_height) = (cols * SPRITE_SIZE, rows * SPRITE_SIZE);
        if image.width() < min_width || image.height() < min_height {
            return Err(PetError::SheetTooSmall {
                width: image.width(),
                height: image.height(),
                min_width,
                min_height,
            });
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGBA8 bytes, row-major, no padding.
    pub fn rgba(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.image.get_pixel_checked(x, y).map(|p| p.0[3])
    }

    pub fn cell_in_bounds(&self, frame: SpriteFrame) -> bool {
        let (x, y) = frame.pixel_origin();
        x + SPRITE_SIZE <= self.width() && y + SPRITE_SIZE <= self.height()
    }
}

/// Find palette sheets in `dir`, sorted by path.
pub fn discover_palettes(dir: &Path) -> Result<Vec<PathBuf>, PetError> {
    let entries = std::fs::read_dir(dir).map_err(|source| PetError::SpriteDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.starts_with(PALETTE_PREFIX)
                && name.len() > PALETTE_SUFFIX.len()
                && name.ends_with(PALETTE_SUFFIX)
        })
        .map(|e| e.path())
        .collect();
    found.sort();

    if found.is_empty() {
        return Err(PetError::NoPalettes(dir.to_path_buf()));
    }

    log::info!("Found {} sprite palette(s):", found.len());
    for (i, p) in found.iter().enumerate() {
        log::info!("  [{i}] {}", p.display());
    }
    Ok(found)
}

/// The palette list and which one is on screen.
pub struct PaletteRing {
    paths: Vec<PathBuf>,
    current: usize,
}

impl PaletteRing {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths, current: 0 }
    }

    pub fn current(&self) -> Option<&Path> {
        self.paths.get(self.current).map(PathBuf::as_path)
    }

    /// Index and path of the palette after the current one (wraps).
    pub fn peek_next(&self) -> Option<(usize, &Path)> {
        if self.paths.is_empty() {
            return None;
        }
        let idx = (self.current + 1) % self.paths.len();
        Some((idx, &self.paths[idx]))
    }

    /// Commit a swap once its sheet loaded.
    pub fn set_current(&mut self, idx: usize) {
        if idx < self.paths.len() {
            self.current = idx;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn rejects_undersized_sheet() {
        let img = RgbaImage::new(128, 128);
        match SpriteSheet::from_image(img) {
            Err(PetError::SheetTooSmall { min_width, min_height, .. }) => {
                assert_eq!((min_width, min_height), (256, 128));
            }
            _ => panic!("expected SheetTooSmall"),
        }
    }

    #[test]
    fn alpha_lookup_and_bounds() {
        let mut img = RgbaImage::new(256, 128);
        img.put_pixel(10, 20, Rgba([1, 2, 3, 200]));
        let sheet = SpriteSheet::from_image(img).unwrap();
        assert_eq!(sheet.alpha_at(10, 20), Some(200));
        assert_eq!(sheet.alpha_at(0, 0), Some(0));
        assert_eq!(sheet.alpha_at(256, 0), None);
        assert!(sheet.cell_in_bounds(SpriteFrame::new(7, 3)));
        assert!(!sheet.cell_in_bounds(SpriteFrame::new(8, 0)));
        assert_eq!(sheet.rgba().len(), 256 * 128 * 4);
    }

    #[test]
    fn discovers_only_oneko_pngs_sorted() {
        let dir = std::env::temp_dir().join(format!("oneko-palettes-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["oneko-tora.png", "oneko.png", "notes.txt", "cat.png", "oneko-dog.gif"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }

        let found = discover_palettes(&dir).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["oneko-tora.png", "oneko.png"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = std::env::temp_dir().join("oneko-definitely-missing-dir");
        assert!(matches!(discover_palettes(&dir), Err(PetError::SpriteDir { .. })));
    }

    #[test]
    fn palette_ring_wraps_and_commits() {
        let mut ring = PaletteRing::new(vec!["a.png".into(), "b.png".into()]);
        assert_eq!(ring.current(), Some(Path::new("a.png")));
        let (idx, path) = ring.peek_next().unwrap();
        assert_eq!((idx, path), (1, Path::new("b.png")));
        // Not committed yet.
        assert_eq!(ring.current(), Some(Path::new("a.png")));
        ring.set_current(idx);
        assert_eq!(ring.peek_next().unwrap().0, 0);
    }
}
