//! Window shape masks.
//!
//! Each sheet cell gets a 1-bit mask (opaque iff alpha > 128). The cache
//! keeps one platform handle per cell and installs it on the window only
//! when the drawn frame changes.

use std::collections::HashMap;

use crate::cat::frames::{SpriteFrame, SPRITE_SIZE};
use crate::sheet::SpriteSheet;

/// Alpha strictly above this counts as opaque.
pub const ALPHA_THRESHOLD: u8 = 128;

const SIZE: usize = SPRITE_SIZE as usize;

/// Binary visibility mask for one cell. Bit `x` of `rows[y]` = opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskBitmap {
    rows: [u32; SIZE],
}

impl MaskBitmap {
    /// Sample the cell's alpha channel. `None` if the cell lies outside the sheet.
    pub fn from_sheet(sheet: &SpriteSheet, frame: SpriteFrame) -> Option<Self> {
        if !sheet.cell_in_bounds(frame) {
            return None;
        }
        let (ox, oy) = frame.pixel_origin();
        let mut rows = [0u32; SIZE];
        for (y, row) in rows.iter_mut().enumerate() {
            for x in 0..SIZE {
                let a = sheet.alpha_at(ox + x as u32, oy + y as u32)?;
                if a > ALPHA_THRESHOLD {
                    *row |= 1u32 << x;
                }
            }
        }
        Some(Self { rows })
    }

    #[cfg(test)]
    pub fn is_opaque(&self, x: usize, y: usize) -> bool {
        x < SIZE && y < SIZE && self.rows[y] & (1u32 << x) != 0
    }

    #[cfg(test)]
    pub fn opaque_count(&self) -> u32 {
        self.rows.iter().map(|r| r.count_ones()).sum()
    }

    #[cfg(any(windows, test))]
    /// Horizontal opaque runs on row `y` as half-open `[start, end)` spans.
    pub fn spans(&self, y: usize) -> Vec<(u32, u32)> {
        let row = self.rows[y];
        let mut out = Vec::new();
        let mut x = 0;
        while x < SIZE {
            if row & (1u32 << x) == 0 {
                x += 1;
                continue;
            }
            let start = x;
            while x < SIZE && row & (1u32 << x) != 0 {
                x += 1;
            }
            out.push((start as u32, x as u32));
        }
        out
    }
}

/// Platform capability for non-rectangular windows.
///
/// Handles own the platform resource and release it on drop.
pub trait ShapeBackend {
    type Handle;

    /// Turn a bitmap into a platform mask. `None` if the platform refused.
    fn build(&mut self, bitmap: &MaskBitmap) -> Option<Self::Handle>;

    /// Install `handle` as the window's visible / hit-test region.
    fn apply(&mut self, handle: &Self::Handle);

    /// Drop any shape so the whole rectangle shows.
    fn reset(&mut self);
}

/// Frame-keyed cache of platform masks.
pub struct MaskCache<B: ShapeBackend> {
    backend: B,
    masks: HashMap<SpriteFrame, B::Handle>,
    /// `None` means nothing applied yet, so the next `apply_for` always installs.
    last_applied: Option<SpriteFrame>,
}

impl<B: ShapeBackend> MaskCache<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            masks: HashMap::new(),
            last_applied: None,
        }
    }

    /// Build masks for any of `frames` not cached yet. Returns how many were built.
    pub fn ensure_masks_for(&mut self, sheet: &SpriteSheet, frames: &[SpriteFrame]) -> usize {
        let mut built = 0;
        for &frame in frames {
            if self.masks.contains_key(&frame) {
                continue;
            }
            match self.build(sheet, frame) {
                Some(handle) => {
                    self.masks.insert(frame, handle);
                    built += 1;
                }
                None => log::warn!("No shape mask for frame {:?}", frame),
            }
        }
        built
    }

    /// Install the mask for `frame` if it differs from the last one applied.
    /// Returns true if a platform call was made.
    pub fn apply_for(&mut self, sheet: &SpriteSheet, frame: SpriteFrame) -> bool {
        if self.last_applied == Some(frame) {
            return false;
        }
        self.last_applied = Some(frame);

        if !self.masks.contains_key(&frame) {
            if let Some(handle) = self.build(sheet, frame) {
                self.masks.insert(frame, handle);
            }
        }

        match self.masks.get(&frame) {
            Some(handle) => {
                self.backend.apply(handle);
                log::debug!("Applied shape mask {:?}", frame);
            }
            // Degrade to a plain rectangle rather than keep a stale shape.
            None => self.backend.reset(),
        }
        true
    }

    /// Drop every mask and rebuild against a new sheet.
    pub fn rebuild(&mut self, sheet: &SpriteSheet, frames: &[SpriteFrame]) {
        self.clear();
        let built = self.ensure_masks_for(sheet, frames);
        log::info!("Rebuilt {built} shape masks");
    }

    /// Release every handle and forget the last applied frame.
    pub fn clear(&mut self) {
        self.masks.clear();
        self.last_applied = None;
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    #[cfg(test)]
    pub fn contains(&self, frame: SpriteFrame) -> bool {
        self.masks.contains_key(&frame)
    }

    #[cfg(test)]
    pub fn last_applied(&self) -> Option<SpriteFrame> {
        self.last_applied
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn build(&mut self, sheet: &SpriteSheet, frame: SpriteFrame) -> Option<B::Handle> {
        let bitmap = MaskBitmap::from_sheet(sheet, frame)?;
        self.backend.build(&bitmap)
    }
}
