//! Window discovery and coordinate/DPI queries over the Win32 API.

use std::ptr;

use windows_sys::Win32::Foundation::{HWND, LPARAM, POINT, RECT};
use windows_sys::Win32::Graphics::Gdi::{
    ClientToScreen, GetDC, GetDeviceCaps, MonitorFromWindow, ReleaseDC, ScreenToClient,
    LOGPIXELSX, LOGPIXELSY, MONITOR_DEFAULTTONEAREST,
};
use windows_sys::Win32::UI::HiDpi::{GetDpiForMonitor, GetDpiForWindow, MDT_EFFECTIVE_DPI};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    EnumWindows, FindWindowW, GetClientRect, GetCursorPos, GetWindowThreadProcessId, IsIconic,
    IsWindow, IsWindowVisible,
};

use super::wide;
use crate::error::InputError;
use crate::geometry::{Point, Rect};
use crate::system::{WindowHandle, WindowSystem};

/// The live Win32 window system.
pub struct Win32WindowSystem;

fn hwnd(handle: WindowHandle) -> HWND {
    handle.0 as HWND
}

/// Collected by the `EnumWindows` callback below.
struct PidScan {
    pid: u32,
    found: Vec<WindowHandle>,
}

unsafe extern "system" fn collect_pid_windows(window: HWND, lparam: LPARAM) -> i32 {
    let scan = &mut *(lparam as *mut PidScan);
    let mut pid = 0u32;
    GetWindowThreadProcessId(window, &mut pid);
    if pid == scan.pid {
        scan.found.push(WindowHandle(window as isize));
    }
    1 // keep enumerating
}

impl WindowSystem for Win32WindowSystem {
    fn find_by_title(&self, title: &str) -> Result<WindowHandle, InputError> {
        let title = wide(title);
        let window = unsafe { FindWindowW(ptr::null(), title.as_ptr()) };
        if window.is_null() {
            return Err(InputError::TargetNotFound);
        }
        Ok(WindowHandle(window as isize))
    }

    fn find_by_class(&self, class: &str) -> Result<WindowHandle, InputError> {
        let class = wide(class);
        let window = unsafe { FindWindowW(class.as_ptr(), ptr::null()) };
        if window.is_null() {
            return Err(InputError::TargetNotFound);
        }
        Ok(WindowHandle(window as isize))
    }

    fn find_by_pid(&self, pid: u32) -> Result<Vec<WindowHandle>, InputError> {
        let mut scan = PidScan {
            pid,
            found: Vec::new(),
        };
        unsafe {
            EnumWindows(
                Some(collect_pid_windows),
                &mut scan as *mut PidScan as LPARAM,
            );
        }
        if scan.found.is_empty() {
            return Err(InputError::TargetNotFound);
        }
        Ok(scan.found)
    }

    fn is_valid(&self, handle: WindowHandle) -> bool {
        unsafe { IsWindow(hwnd(handle)) != 0 }
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        unsafe { IsWindowVisible(hwnd(handle)) != 0 }
    }

    fn is_minimized(&self, handle: WindowHandle) -> bool {
        unsafe { IsIconic(hwnd(handle)) != 0 }
    }

    fn client_rect(&self, handle: WindowHandle) -> Result<Rect, InputError> {
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        if unsafe { GetClientRect(hwnd(handle), &mut rect) } == 0 {
            return Err(InputError::TargetInvalid);
        }
        Ok(Rect {
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
        })
    }

    fn client_to_screen(
        &self,
        handle: WindowHandle,
        point: Point,
    ) -> Result<Point, InputError> {
        // Conversion results are meaningless for minimized windows.
        if self.is_minimized(handle) {
            return Err(InputError::TargetNotVisible);
        }
        let mut raw = POINT {
            x: point.x,
            y: point.y,
        };
        if unsafe { ClientToScreen(hwnd(handle), &mut raw) } == 0 {
            return Err(InputError::TargetInvalid);
        }
        Ok(Point::new(raw.x, raw.y))
    }

    fn screen_to_client(
        &self,
        handle: WindowHandle,
        point: Point,
    ) -> Result<Point, InputError> {
        if self.is_minimized(handle) {
            return Err(InputError::TargetNotVisible);
        }
        let mut raw = POINT {
            x: point.x,
            y: point.y,
        };
        if unsafe { ScreenToClient(hwnd(handle), &mut raw) } == 0 {
            return Err(InputError::TargetInvalid);
        }
        Ok(Point::new(raw.x, raw.y))
    }

    fn cursor_pos(&self) -> Result<Point, InputError> {
        let mut raw = POINT { x: 0, y: 0 };
        if unsafe { GetCursorPos(&mut raw) } == 0 {
            return Err(InputError::DeliveryFailed("GetCursorPos failed".into()));
        }
        Ok(Point::new(raw.x, raw.y))
    }

    /// Probes DPI capability tiers in order: per-window, per-monitor, then
    /// the system device context. The first tier that answers wins.
    fn dpi(&self, handle: WindowHandle) -> Result<(u32, u32), InputError> {
        let window = hwnd(handle);

        let per_window = unsafe { GetDpiForWindow(window) };
        if per_window != 0 {
            return Ok((per_window, per_window));
        }

        let monitor = unsafe { MonitorFromWindow(window, MONITOR_DEFAULTTONEAREST) };
        if !monitor.is_null() {
            let mut x = 0u32;
            let mut y = 0u32;
            let hr = unsafe { GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &mut x, &mut y) };
            if hr == 0 && x != 0 && y != 0 {
                return Ok((x, y));
            }
        }

        let dc = unsafe { GetDC(window) };
        if !dc.is_null() {
            let x = unsafe { GetDeviceCaps(dc, LOGPIXELSX) };
            let y = unsafe { GetDeviceCaps(dc, LOGPIXELSY) };
            unsafe { ReleaseDC(window, dc) };
            if x > 0 && y > 0 {
                return Ok((x as u32, y as u32));
            }
        }

        Err(InputError::DpiUnavailable)
    }
}
