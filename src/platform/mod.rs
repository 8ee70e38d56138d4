#[cfg(windows)]
pub mod win32;

use glam::IVec2;

use crate::error::PetError;
#[cfg(any(not(windows), test))]
use crate::mask::{MaskBitmap, ShapeBackend};

/// Shape backend for targets without a window-region capability.
/// Masks are still synthesized; nothing gets installed.
#[cfg(any(not(windows), test))]
pub struct NullShape;

#[cfg(any(not(windows), test))]
impl ShapeBackend for NullShape {
    type Handle = MaskBitmap;

    fn build(&mut self, bitmap: &MaskBitmap) -> Option<MaskBitmap> {
        Some(bitmap.clone())
    }

    fn apply(&mut self, _handle: &MaskBitmap) {}

    fn reset(&mut self) {}
}

#[cfg(windows)]
pub type PlatformShape = win32::Win32Shape;
#[cfg(not(windows))]
pub type PlatformShape = NullShape;

/// Shape backend for this window on this platform.
#[cfg(windows)]
pub fn shape_backend(window: &winit::window::Window) -> Result<PlatformShape, PetError> {
    win32::Win32Shape::new(window)
}

#[cfg(not(windows))]
pub fn shape_backend(_window: &winit::window::Window) -> Result<PlatformShape, PetError> {
    log::warn!("No window shaping on this platform; the sprite window stays rectangular");
    Ok(NullShape)
}

/// Global pointer position in screen pixels, if the platform can report it.
pub fn cursor_position() -> Option<IVec2> {
    #[cfg(windows)]
    {
        win32::get_mouse_pos()
    }
    #[cfg(not(windows))]
    {
        None
    }
}

/// True while Escape is held. The sprite window never takes focus, so this
/// polls the key state instead of waiting for keyboard events.
pub fn escape_pressed() -> bool {
    #[cfg(windows)]
    {
        win32::is_escape_pressed()
    }
    #[cfg(not(windows))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn no_polling_without_win32() {
        assert!(!escape_pressed());
        assert_eq!(cursor_position(), None);
    }

    #[test]
    fn null_shape_keeps_the_bitmap() {
        let sheet = crate::sheet::SpriteSheet::from_image(image::RgbaImage::new(256, 128)).unwrap();
        let bitmap =
            MaskBitmap::from_sheet(&sheet, crate::cat::frames::SpriteFrame::new(0, 0)).unwrap();
        let mut shape = NullShape;
        assert_eq!(shape.build(&bitmap), Some(bitmap));
    }
}
