use std::path::PathBuf;

/// Everything that can go wrong outside the behavior engine.
#[derive(Debug, thiserror::Error)]
pub enum PetError {
    #[error("failed to read sprite directory {}: {source}", dir.display())]
    SpriteDir {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("no sprite palettes found in {}", .0.display())]
    NoPalettes(PathBuf),

    #[error("failed to load sprite sheet {}: {source}", path.display())]
    SheetLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("sprite sheet is {width}x{height}, needs at least {min_width}x{min_height}")]
    SheetTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    #[error("window: {0}")]
    Window(String),

    #[error("renderer: {0}")]
    Render(String),
}
