use glam::IVec2;
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows::Win32::Foundation::{HWND, POINT, TRUE};
use windows::Win32::Graphics::Dwm::{DwmSetWindowAttribute, DWMWINDOWATTRIBUTE};
use windows::Win32::Graphics::Gdi::{
    CombineRgn, CreateRectRgn, DeleteObject, SetWindowRgn, HGDIOBJ, HRGN, RGN_COPY, RGN_ERROR,
    RGN_OR,
};
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetWindowLongPtrW, SetWindowLongPtrW, SetWindowPos, GWL_EXSTYLE,
    SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, WS_EX_NOACTIVATE,
    WS_EX_TOOLWINDOW,
};

use crate::error::PetError;
use crate::mask::{MaskBitmap, ShapeBackend};

/// Extract the Win32 HWND from a winit window.
pub fn get_hwnd(window: &winit::window::Window) -> Result<HWND, PetError> {
    let handle = window
        .window_handle()
        .map_err(|e| PetError::Window(format!("window handle unavailable: {e}")))?;
    match handle.as_raw() {
        RawWindowHandle::Win32(h) => Ok(HWND(h.hwnd.get() as *mut core::ffi::c_void)),
        other => Err(PetError::Window(format!(
            "expected Win32 window handle, got {other:?}"
        ))),
    }
}

/// Keep the sprite window off the taskbar and out of focus, and strip the
/// DWM frame decorations so only the shaped region shows.
pub unsafe fn make_sprite_window(hwnd: HWND) {
    let style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
    let new_style = style | WS_EX_NOACTIVATE.0 as isize | WS_EX_TOOLWINDOW.0 as isize;
    SetWindowLongPtrW(hwnd, GWL_EXSTYLE, new_style);
    log::debug!("Window ex-style: 0x{:08X} -> 0x{:08X}", style, new_style);

    let _ = SetWindowPos(
        hwnd,
        HWND::default(),
        0,
        0,
        0,
        0,
        SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
    );

    // DWMWA_NCRENDERING_POLICY(2) = DWMNCRP_DISABLED(2)
    set_dwm_u32(hwnd, 2, 2);
    // DWMWA_WINDOW_CORNER_PREFERENCE(33) = DWMWCP_DONOTROUND(1)
    set_dwm_u32(hwnd, 33, 1);
    // DWMWA_BORDER_COLOR(34) = DWMWA_COLOR_NONE
    set_dwm_u32(hwnd, 34, 0xFFFF_FFFE);
}

unsafe fn set_dwm_u32(hwnd: HWND, attribute: i32, value: u32) {
    let _ = DwmSetWindowAttribute(
        hwnd,
        DWMWINDOWATTRIBUTE(attribute),
        &value as *const u32 as *const core::ffi::c_void,
        4,
    );
}

/// Get the current global mouse cursor position in screen pixels.
pub fn get_mouse_pos() -> Option<IVec2> {
    let mut point = POINT::default();
    unsafe { GetCursorPos(&mut point) }.ok()?;
    Some(IVec2::new(point.x, point.y))
}

/// Check if ESC is currently held (works without keyboard focus).
pub fn is_escape_pressed() -> bool {
    // VK_ESCAPE = 0x1B. High bit set = key is currently down.
    unsafe { GetAsyncKeyState(0x1B) & (0x8000u16 as i16) != 0 }
}

/// A GDI region owned by the mask cache. Deleted on drop.
pub struct Region(HRGN);

impl Drop for Region {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(HGDIOBJ(self.0 .0));
        }
    }
}

/// Window shaping through `SetWindowRgn`.
pub struct Win32Shape {
    hwnd: HWND,
}

impl Win32Shape {
    pub fn new(window: &winit::window::Window) -> Result<Self, PetError> {
        let hwnd = get_hwnd(window)?;
        unsafe {
            make_sprite_window(hwnd);
        }
        log::info!("Win32 sprite window ready (tool window, region-shaped)");
        Ok(Self { hwnd })
    }
}

impl ShapeBackend for Win32Shape {
    type Handle = Region;

    fn build(&mut self, bitmap: &MaskBitmap) -> Option<Region> {
        unsafe {
            let acc = CreateRectRgn(0, 0, 0, 0);
            if acc.is_invalid() {
                return None;
            }
            let region = Region(acc);
            for y in 0..crate::cat::frames::SPRITE_SIZE as usize {
                for (x0, x1) in bitmap.spans(y) {
                    let run = CreateRectRgn(x0 as i32, y as i32, x1 as i32, y as i32 + 1);
                    if run.is_invalid() {
                        return None;
                    }
                    let run = Region(run);
                    if CombineRgn(region.0, region.0, run.0, RGN_OR) == RGN_ERROR {
                        return None;
                    }
                }
            }
            Some(region)
        }
    }

    fn apply(&mut self, handle: &Region) {
        unsafe {
            // SetWindowRgn takes ownership of the region it is given, so hand
            // it a copy and keep the cached one.
            let copy = CreateRectRgn(0, 0, 0, 0);
            if copy.is_invalid() {
                log::warn!("CreateRectRgn failed; keeping previous window shape");
                return;
            }
            if CombineRgn(copy, handle.0, HRGN::default(), RGN_COPY) == RGN_ERROR {
                drop(Region(copy));
                log::warn!("CombineRgn failed; keeping previous window shape");
                return;
            }
            if SetWindowRgn(self.hwnd, copy, TRUE) == 0 {
                drop(Region(copy));
                log::warn!("SetWindowRgn failed");
            }
        }
    }

    fn reset(&mut self) {
        unsafe {
            let _ = SetWindowRgn(self.hwnd, HRGN::default(), TRUE);
        }
    }
}
