//! Collaborator seams: the three external interfaces the engine consumes.
//!
//! The engine never talks to the OS directly; it goes through these traits.
//! `win32` provides the real implementations on Windows, and tests inject
//! mocks to run the full dispatch/validation/trajectory pipeline off-target.
//!
//! - `WindowSystem`: window discovery, liveness/visibility queries, and
//!   coordinate/DPI resolution.
//! - `MessageSink`: message-queue delivery of packed 32-bit parameters.
//! - `DriverPort`: the kernel driver's binary-protocol endpoint; consumes
//!   the stroke buffers produced by `encode::stroke`.

use std::path::Path;

use crate::error::InputError;
use crate::geometry::{Point, Rect};
use crate::keys::Key;

/// An opaque OS window handle. Becomes stale when the window is destroyed;
/// the engine re-validates it before every action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// A driver device index. The probe scan assigns meaning (mouse or keyboard)
/// by querying the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId(pub i32);

/// An opaque driver session context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverContext(pub usize);

/// Window discovery and coordinate/DPI queries.
///
/// Coordinate conversions fail with `TargetInvalid` when the handle is stale
/// and `TargetNotVisible` when the window is iconified, since the underlying
/// queries return meaningless values for minimized windows.
pub trait WindowSystem: Send + Sync {
    /// Finds a top-level window by exact title.
    fn find_by_title(&self, title: &str) -> Result<WindowHandle, InputError>;
    /// Finds a top-level window by class name.
    fn find_by_class(&self, class: &str) -> Result<WindowHandle, InputError>;
    /// Returns all top-level windows owned by the given process.
    fn find_by_pid(&self, pid: u32) -> Result<Vec<WindowHandle>, InputError>;

    /// True while the handle identifies an existing window.
    fn is_valid(&self, handle: WindowHandle) -> bool;
    /// True when the window has the visible style bit.
    fn is_visible(&self, handle: WindowHandle) -> bool;
    /// True when the window is minimized (iconic).
    fn is_minimized(&self, handle: WindowHandle) -> bool;

    /// The window's client-area rectangle, in client coordinates
    /// (top-left is always (0,0)).
    fn client_rect(&self, handle: WindowHandle) -> Result<Rect, InputError>;
    /// Converts a client-space point to screen space.
    fn client_to_screen(&self, handle: WindowHandle, point: Point)
        -> Result<Point, InputError>;
    /// Converts a screen-space point to client space.
    fn screen_to_client(&self, handle: WindowHandle, point: Point)
        -> Result<Point, InputError>;
    /// The physical cursor position, in screen coordinates.
    fn cursor_pos(&self) -> Result<Point, InputError>;

    /// Per-window DPI as an (x, y) pair. Implementations probe capability
    /// tiers in order and return `DpiUnavailable` only when every tier fails;
    /// callers then fall back to the conventional 96.
    fn dpi(&self, handle: WindowHandle) -> Result<(u32, u32), InputError>;
}

/// Message-queue event delivery.
pub trait MessageSink: Send + Sync {
    /// Posts one message. Fire-and-forget: success means the message was
    /// queued, not that the target processed it.
    fn post(
        &self,
        handle: WindowHandle,
        message: u32,
        wparam: u32,
        lparam: u32,
    ) -> Result<(), InputError>;

    /// Maps a scan code to the backend's virtual-key code. Returns 0 when
    /// the OS has no mapping for the code.
    fn scan_to_vk(&self, key: Key) -> u32;
}

/// The kernel driver's binary-protocol endpoint.
///
/// Lifecycle: `load` → (`mouse_stroke_size`/`key_stroke_size` validation) →
/// `create_context` → per-device capability probes → `send` calls →
/// `destroy_context` → `unload`.
pub trait DriverPort: Send {
    /// Loads the driver library image and resolves its entry points.
    fn load(&mut self, library: &Path) -> Result<(), InputError>;
    /// Releases the driver library image. Idempotent.
    fn unload(&mut self);

    /// The stroke sizes the loaded driver expects, used to validate the wire
    /// encoding against the driver version at load time.
    fn mouse_stroke_size(&self) -> usize;
    fn key_stroke_size(&self) -> usize;

    /// Creates a driver session context. Fails with `DriverNotInstalled`
    /// when the kernel component is absent.
    fn create_context(&mut self) -> Result<DriverContext, InputError>;
    fn destroy_context(&mut self, context: DriverContext);

    fn is_mouse(&self, device: DeviceId) -> bool;
    fn is_keyboard(&self, device: DeviceId) -> bool;

    /// Sends one encoded stroke to a device through the session.
    fn send(
        &self,
        context: DriverContext,
        device: DeviceId,
        stroke: &[u8],
    ) -> Result<(), InputError>;
}
