//! Kernel-driver injection backend.
//!
//! Speaks the stroke wire protocol from `encode::stroke` through a
//! `DriverPort`. Unlike the message path this steers the *physical* cursor,
//! so pointer motion goes through the trajectory synthesizer and click/press
//! timing is humanized with random jitter.
//!
//! Session lifecycle is lazy: nothing is loaded until the first action runs
//! on this backend. Initialization order and failure mapping:
//! load library (`DriverLoadFailed`) → stroke-size validation
//! (`DriverLoadFailed`, incompatible driver version) → create context
//! (`DriverNotInstalled`) → device probe (`NoDevicesFound`). Once created the
//! session is immutable until `shutdown`, which destroys the context and
//! releases the library; the next use re-probes from scratch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::encode::stroke::{
    KeyStroke, MouseStroke, KEY_DOWN, KEY_STROKE_SIZE, KEY_UP, MOUSE_LEFT_DOWN, MOUSE_LEFT_UP,
    MOUSE_MIDDLE_DOWN, MOUSE_MIDDLE_UP, MOUSE_RIGHT_DOWN, MOUSE_RIGHT_UP, MOUSE_STROKE_SIZE,
};
use crate::error::InputError;
use crate::keys::Key;
use crate::system::{DeviceId, DriverContext, DriverPort, WindowHandle, WindowSystem};
use crate::trajectory::{self, TrajectoryOptions};

use super::{Destination, InputBackend, KeyState, MouseButton};

// Base pauses for humanized driver timing; `human_sleep` adds up to a third
// of the base on top.
/// Pause after the approach move, before the button goes down.
const CLICK_SETTLE_MS: u64 = 50;
/// Pause between button-down and button-up.
const BUTTON_DWELL_MS: u64 = 60;
/// Pause between the two clicks of a double click.
const DOUBLE_CLICK_GAP_MS: u64 = 80;
/// Pause between key-down and key-up.
const KEY_DWELL_MS: u64 = 40;

/// An initialized driver session. Immutable for its lifetime.
struct Session {
    context: DriverContext,
    mouse: DeviceId,
    keyboard: DeviceId,
}

pub(crate) struct DriverBackend {
    port: Box<dyn DriverPort>,
    windows: Arc<dyn WindowSystem>,
    session: Option<Session>,
    /// Upper bound of the device probe scan. Encodes an assumption about the
    /// maximum number of attached input devices.
    probe_limit: i32,
    trajectory: TrajectoryOptions,
}

impl DriverBackend {
    pub fn new(
        port: Box<dyn DriverPort>,
        windows: Arc<dyn WindowSystem>,
        probe_limit: i32,
        trajectory: TrajectoryOptions,
    ) -> Self {
        DriverBackend {
            port,
            windows,
            session: None,
            probe_limit,
            trajectory,
        }
    }

    /// Lazily initializes the driver session. No-op once a session exists.
    pub fn ensure_ready(&mut self, library: &Path) -> Result<(), InputError> {
        if self.session.is_some() {
            return Ok(());
        }

        self.port.load(library)?;

        // An incompatible stroke layout means an incompatible driver
        // version; refusing here turns silent memory corruption into a
        // load-time configuration error.
        let (mouse_size, key_size) = (self.port.mouse_stroke_size(), self.port.key_stroke_size());
        if mouse_size != MOUSE_STROKE_SIZE || key_size != KEY_STROKE_SIZE {
            self.port.unload();
            return Err(InputError::DriverLoadFailed(format!(
                "driver stroke layout mismatch: mouse {mouse_size}B/key {key_size}B, \
                 expected {MOUSE_STROKE_SIZE}B/{KEY_STROKE_SIZE}B"
            )));
        }

        let context = match self.port.create_context() {
            Ok(context) => context,
            Err(err) => {
                self.port.unload();
                return Err(err);
            }
        };

        let mut mouse = None;
        let mut keyboard = None;
        for index in 1..=self.probe_limit {
            let device = DeviceId(index);
            if mouse.is_none() && self.port.is_mouse(device) {
                mouse = Some(device);
            }
            if keyboard.is_none() && self.port.is_keyboard(device) {
                keyboard = Some(device);
            }
            if mouse.is_some() && keyboard.is_some() {
                break;
            }
        }

        let (Some(mouse), Some(keyboard)) = (mouse, keyboard) else {
            self.port.destroy_context(context);
            self.port.unload();
            return Err(InputError::NoDevicesFound);
        };

        log::info!(
            "driver session ready: mouse=device{} keyboard=device{}",
            mouse.0,
            keyboard.0
        );
        self.session = Some(Session {
            context,
            mouse,
            keyboard,
        });
        Ok(())
    }

    /// Destroys the session and releases the driver library. The next action
    /// on this backend re-initializes and re-probes.
    pub fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            self.port.destroy_context(session.context);
            self.port.unload();
            log::info!("driver session destroyed");
        }
    }

    fn session(&self) -> Result<&Session, InputError> {
        self.session.as_ref().ok_or_else(|| {
            InputError::BackendUnavailable("driver session not initialized".into())
        })
    }

    /// Sleeps `base` plus up to a third extra, so synthesized event timing
    /// does not form a fixed-period signature.
    fn human_sleep(base_ms: u64) {
        let jitter = rand::thread_rng().gen_range(0..=base_ms / 3);
        std::thread::sleep(Duration::from_millis(base_ms + jitter));
    }
}

impl InputBackend for DriverBackend {
    /// Steers the physical cursor to the destination's screen point via the
    /// trajectory synthesizer, one relative stroke per step.
    fn move_to(&mut self, dest: &Destination) -> Result<(), InputError> {
        let session = self.session()?;
        let port = &self.port;
        let windows = &self.windows;
        let (context, mouse) = (session.context, session.mouse);

        trajectory::drive(
            dest.screen,
            &mut || windows.cursor_pos(),
            &mut |dx, dy| {
                let stroke = MouseStroke::relative_move(dx, dy);
                port.send(context, mouse, &stroke.encode())
            },
            &self.trajectory,
        )
    }

    fn click(
        &mut self,
        dest: &Destination,
        button: MouseButton,
        double: bool,
    ) -> Result<(), InputError> {
        let (down, up) = match button {
            MouseButton::Left => (MOUSE_LEFT_DOWN, MOUSE_LEFT_UP),
            MouseButton::Right => (MOUSE_RIGHT_DOWN, MOUSE_RIGHT_UP),
            MouseButton::Middle => (MOUSE_MIDDLE_DOWN, MOUSE_MIDDLE_UP),
        };

        let presses = if double { 2 } else { 1 };
        for i in 0..presses {
            if i > 0 {
                Self::human_sleep(DOUBLE_CLICK_GAP_MS);
            }
            self.move_to(dest)?;
            Self::human_sleep(CLICK_SETTLE_MS);

            let session = self.session()?;
            self.port.send(
                session.context,
                session.mouse,
                &MouseStroke::button(down).encode(),
            )?;
            Self::human_sleep(BUTTON_DWELL_MS);
            self.port.send(
                session.context,
                session.mouse,
                &MouseStroke::button(up).encode(),
            )?;
        }
        Ok(())
    }

    /// Wheel rotation is positional hardware state; the destination point is
    /// irrelevant to the driver, which scrolls wherever the cursor is.
    fn scroll(&mut self, _dest: &Destination, delta: i16) -> Result<(), InputError> {
        let session = self.session()?;
        self.port.send(
            session.context,
            session.mouse,
            &MouseStroke::wheel(delta).encode(),
        )
    }

    /// Scan codes pass through to the driver unchanged.
    fn key(
        &mut self,
        _window: Option<WindowHandle>,
        key: Key,
        state: KeyState,
    ) -> Result<(), InputError> {
        let session = self.session()?;
        let stroke_state = match state {
            KeyState::Down => KEY_DOWN,
            KeyState::Up => KEY_UP,
        };
        self.port.send(
            session.context,
            session.keyboard,
            &KeyStroke::new(key.0, stroke_state).encode(),
        )
    }

    fn press(&mut self, window: Option<WindowHandle>, key: Key) -> Result<(), InputError> {
        self.key(window, key, KeyState::Down)?;
        Self::human_sleep(KEY_DWELL_MS);
        self.key(window, key, KeyState::Up)
    }
}
