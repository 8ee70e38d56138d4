use bytemuck::{Pod, Zeroable};

use crate::cat::frames::{SpriteFrame, SPRITE_SIZE};

/// Per-draw uniform: which cell of the sheet texture to sample.
/// Stride = 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Top-left of the cell in normalized texture coordinates.
    pub uv_origin: [f32; 2],
    /// Cell extent in normalized texture coordinates.
    pub uv_size: [f32; 2],
}

impl SpriteInstance {
    pub fn for_frame(frame: SpriteFrame, sheet_w: u32, sheet_h: u32) -> Self {
        let (px, py) = frame.pixel_origin();
        let (w, h) = (sheet_w.max(1) as f32, sheet_h.max(1) as f32);
        Self {
            uv_origin: [px as f32 / w, py as f32 / h],
            uv_size: [SPRITE_SIZE as f32 / w, SPRITE_SIZE as f32 / h],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_maps_to_uv_rect() {
        let inst = SpriteInstance::for_frame(SpriteFrame::new(7, 3), 256, 128);
        assert_eq!(inst.uv_origin, [0.875, 0.75]);
        assert_eq!(inst.uv_size, [0.125, 0.25]);
    }

    #[test]
    fn stride_matches_uniform_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 16);
    }
}
