//! Backend dispatch: the capability interface both injection paths implement.
//!
//! The dispatcher never branches on a backend enum at call sites; every
//! public action resolves to an `InputBackend` trait object and goes through
//! the same five capabilities. `MessageBackend` posts packed window messages,
//! `DriverBackend` speaks the kernel driver's stroke protocol.

mod driver;
mod message;

pub(crate) use driver::DriverBackend;
pub(crate) use message::MessageBackend;

use serde::Deserialize;

use crate::error::InputError;
use crate::geometry::Point;
use crate::keys::Key;
use crate::system::WindowHandle;

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

/// Which injection mechanism handles public actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Message-queue injection via `PostMessageW`. The default; needs no
    /// setup and no driver.
    #[default]
    Message,
    /// Kernel-level hardware emulation through the interception driver.
    /// Initialized lazily on first use.
    Driver,
}

// ---------------------------------------------------------------------------
// Event vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Down,
    Up,
}

/// A fully resolved action destination.
///
/// The engine resolves both coordinate spaces up front so each backend can
/// pick the one its wire format needs: the message path packs client
/// coordinates (wheel messages use screen), the driver path steers the
/// physical cursor in screen space. For a global target (`window` is None)
/// the two spaces coincide.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Destination {
    pub window: Option<WindowHandle>,
    /// Client-space point; equals `screen` for global targets.
    pub client: Point,
    /// Screen-space point.
    pub screen: Point,
}

// ---------------------------------------------------------------------------
// Capability interface
// ---------------------------------------------------------------------------

/// The five capabilities a backend must provide.
///
/// Implementations own their event encoding and their timing (inter-event
/// delays, humanization); the engine owns target validation and locking.
pub(crate) trait InputBackend {
    /// Moves the pointer to the destination.
    fn move_to(&mut self, dest: &Destination) -> Result<(), InputError>;

    /// Presses and releases a button at the destination. `double` performs
    /// the platform's double-click sequence.
    fn click(&mut self, dest: &Destination, button: MouseButton, double: bool)
        -> Result<(), InputError>;

    /// Vertical wheel rotation at the destination. Positive is away from
    /// the user; one detent is ±120.
    fn scroll(&mut self, dest: &Destination, delta: i16) -> Result<(), InputError>;

    /// A single key transition.
    fn key(
        &mut self,
        window: Option<WindowHandle>,
        key: Key,
        state: KeyState,
    ) -> Result<(), InputError>;

    /// A full key press (down, dwell, up) with backend-appropriate timing.
    fn press(&mut self, window: Option<WindowHandle>, key: Key) -> Result<(), InputError>;
}
