//! Win32 implementations of the collaborator seams.
//!
//! Everything OS-specific lives here: window discovery and coordinate
//! queries (`Win32WindowSystem`), message-queue posting (`Win32MessageSink`),
//! and the dynamically loaded interception driver port (`InterceptionPort`).
//! The rest of the crate is platform-neutral and tested against mocks.

mod interception;
mod message;
mod window;

pub use interception::InterceptionPort;
pub use message::Win32MessageSink;
pub use window::Win32WindowSystem;

use windows_sys::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};

/// Opts the process into per-monitor-v2 DPI awareness so coordinate and DPI
/// queries see physical pixels instead of virtualized ones. Call once at
/// startup, before any window queries. Returns false when the OS refuses
/// (already set, or a manifest pinned a different awareness level); injection
/// still works, but mixed-DPI positioning may be off.
pub fn enable_per_monitor_dpi() -> bool {
    unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) != 0 }
}

/// UTF-16 NUL-terminated conversion for Win32 wide-string parameters.
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
