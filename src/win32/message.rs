//! Message-queue posting and scan-to-VK mapping over the Win32 API.

use windows_sys::Win32::Foundation::{GetLastError, ERROR_ACCESS_DENIED, HWND};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{MapVirtualKeyW, MAPVK_VSC_TO_VK};
use windows_sys::Win32::UI::WindowsAndMessaging::PostMessageW;

use crate::error::InputError;
use crate::keys::Key;
use crate::system::{MessageSink, WindowHandle};

/// Posts messages with `PostMessageW`. Fire-and-forget: success means queued,
/// not processed; a hung target accepts messages until its queue fills.
pub struct Win32MessageSink;

impl MessageSink for Win32MessageSink {
    fn post(
        &self,
        handle: WindowHandle,
        message: u32,
        wparam: u32,
        lparam: u32,
    ) -> Result<(), InputError> {
        let posted = unsafe {
            PostMessageW(
                handle.0 as HWND,
                message,
                wparam as usize,
                lparam as isize,
            )
        };
        if posted != 0 {
            return Ok(());
        }
        match unsafe { GetLastError() } {
            // UIPI: the target runs at a higher integrity level.
            ERROR_ACCESS_DENIED => Err(InputError::PermissionDenied),
            code => Err(InputError::DeliveryFailed(format!(
                "PostMessageW failed for message {message:#06x} (error {code})"
            ))),
        }
    }

    fn scan_to_vk(&self, key: Key) -> u32 {
        unsafe { MapVirtualKeyW(u32::from(key.0), MAPVK_VSC_TO_VK) }
    }
}
