//! The engine: concurrency wrapper, target validation, and backend dispatch.
//!
//! `Engine` is an explicit value, not process-global state: callers construct
//! one (or receive one) and tests build isolated instances around mock
//! collaborators. Two locks guard it:
//!
//! - the *operation lock* (a `Mutex` around the dispatcher) is held for the
//!   full duration of every public action. Coarse by design: input synthesis
//!   is inherently sequential, and holding one lock across a whole action is
//!   what keeps one caller's Shift-down from leaking into another caller's
//!   keystroke.
//! - the *selection lock* (an `RwLock` around backend choice + driver path)
//!   is read for the full duration of an action, so a backend switch blocks
//!   until in-flight actions finish and can never interleave two encodings
//!   within one logical action.
//!
//! Target liveness and visibility are re-validated immediately before every
//! action; a handle that was valid at discovery time may be long gone by the
//! time an action runs.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::backend::{
    BackendKind, Destination, DriverBackend, InputBackend, KeyState, MessageBackend, MouseButton,
};
use crate::config::EngineConfig;
use crate::error::InputError;
use crate::geometry::{Point, Rect};
use crate::keys::Key;
use crate::system::{DriverPort, MessageSink, WindowHandle, WindowSystem};

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// An injection destination: a window, or "no window" for global injection.
///
/// The engine never destroys the underlying window; it only queries it
/// before each action and fails fast once the handle goes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    handle: Option<WindowHandle>,
}

impl Target {
    /// A window target.
    pub fn window(handle: WindowHandle) -> Self {
        Target {
            handle: Some(handle),
        }
    }

    /// Global injection: no window association. Only the driver backend can
    /// service global targets; window-relative queries (`dpi`,
    /// `client_rect`, coordinate conversion) fail with `TargetInvalid`.
    pub fn global() -> Self {
        Target { handle: None }
    }

    pub fn handle(&self) -> Option<WindowHandle> {
        self.handle
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Backend selection state, guarded by the selection RwLock.
#[derive(Debug, Clone)]
struct Selection {
    backend: BackendKind,
    driver_library: PathBuf,
}

/// Owns both backends; resolves the active one per action.
struct Dispatcher {
    message: MessageBackend,
    driver: DriverBackend,
}

impl Dispatcher {
    /// Returns the backend for the current selection, initializing the
    /// driver session lazily when the driver backend is selected.
    fn active(&mut self, selection: &Selection) -> Result<&mut dyn InputBackend, InputError> {
        match selection.backend {
            BackendKind::Message => Ok(&mut self.message),
            BackendKind::Driver => {
                self.driver.ensure_ready(&selection.driver_library)?;
                Ok(&mut self.driver)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine {
    ops: Mutex<Dispatcher>,
    selection: RwLock<Selection>,
    windows: Arc<dyn WindowSystem>,
}

fn poisoned<T>(_: T) -> InputError {
    InputError::BackendUnavailable("engine lock poisoned".into())
}

impl Engine {
    /// Builds an engine around explicit collaborator implementations.
    /// This is the constructor tests use with mocks; `Engine::new()` wires
    /// the real Win32 collaborators on Windows.
    pub fn with_collaborators(
        windows: Arc<dyn WindowSystem>,
        sink: Arc<dyn MessageSink>,
        port: Box<dyn DriverPort>,
        config: &EngineConfig,
    ) -> Self {
        let message = MessageBackend::new(sink, config.click_delay(), config.key_delay());
        let driver = DriverBackend::new(
            port,
            windows.clone(),
            config.max_probe_devices,
            config.trajectory_options(),
        );
        Engine {
            ops: Mutex::new(Dispatcher { message, driver }),
            selection: RwLock::new(Selection {
                backend: config.backend,
                driver_library: config.driver_library.clone(),
            }),
            windows,
        }
    }

    /// An engine with default configuration and real Win32 collaborators.
    #[cfg(target_os = "windows")]
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    #[cfg(target_os = "windows")]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_collaborators(
            Arc::new(crate::win32::Win32WindowSystem),
            Arc::new(crate::win32::Win32MessageSink),
            Box::new(crate::win32::InterceptionPort::new()),
            config,
        )
    }

    // -----------------------------------------------------------------------
    // Backend configuration
    // -----------------------------------------------------------------------

    /// Switches the backend for subsequent actions. Blocks until in-flight
    /// actions complete; never interrupts one. Initialization errors for the
    /// driver backend surface on the first action, not here.
    pub fn set_backend(&self, backend: BackendKind) -> Result<(), InputError> {
        let mut selection = self.selection.write().map_err(poisoned)?;
        if selection.backend != backend {
            log::info!("backend switched to {:?}", backend);
        }
        selection.backend = backend;
        Ok(())
    }

    /// The currently selected backend.
    pub fn backend(&self) -> Result<BackendKind, InputError> {
        Ok(self.selection.read().map_err(poisoned)?.backend)
    }

    /// Overrides the driver library path. Takes effect on the next driver
    /// session creation; an existing session keeps its image until
    /// `shutdown_driver`.
    pub fn set_driver_library(&self, path: impl Into<PathBuf>) -> Result<(), InputError> {
        let mut selection = self.selection.write().map_err(poisoned)?;
        selection.driver_library = path.into();
        Ok(())
    }

    /// Destroys the driver session (if any) and releases the driver library.
    /// The next driver-backend action re-initializes and re-probes devices.
    pub fn shutdown_driver(&self) -> Result<(), InputError> {
        let mut ops = self.ops.lock().map_err(poisoned)?;
        ops.driver.shutdown();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Target discovery
    // -----------------------------------------------------------------------

    pub fn find_by_title(&self, title: &str) -> Result<Target, InputError> {
        Ok(Target::window(self.windows.find_by_title(title)?))
    }

    pub fn find_by_class(&self, class: &str) -> Result<Target, InputError> {
        Ok(Target::window(self.windows.find_by_class(class)?))
    }

    pub fn find_by_pid(&self, pid: u32) -> Result<Vec<Target>, InputError> {
        Ok(self
            .windows
            .find_by_pid(pid)?
            .into_iter()
            .map(Target::window)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Mouse
    // -----------------------------------------------------------------------

    /// Moves the pointer to `point` (client coordinates of the target).
    pub fn move_to(&self, target: &Target, point: Point) -> Result<(), InputError> {
        self.run(target, |engine, backend| {
            let dest = engine.destination(target, point)?;
            backend.move_to(&dest)
        })
    }

    /// Moves the pointer relative to the current *physical* cursor position.
    pub fn move_rel(&self, target: &Target, dx: i32, dy: i32) -> Result<(), InputError> {
        self.run(target, |engine, backend| {
            let cursor = engine.windows.cursor_pos()?;
            let screen = Point::new(cursor.x + dx, cursor.y + dy);
            let client = match target.handle {
                Some(handle) => engine.windows.screen_to_client(handle, screen)?,
                None => screen,
            };
            backend.move_to(&Destination {
                window: target.handle,
                client,
                screen,
            })
        })
    }

    /// Left click at `point` (client coordinates).
    pub fn click(&self, target: &Target, point: Point) -> Result<(), InputError> {
        self.click_button(target, point, MouseButton::Left, false)
    }

    /// Right click at `point` (client coordinates).
    pub fn click_right(&self, target: &Target, point: Point) -> Result<(), InputError> {
        self.click_button(target, point, MouseButton::Right, false)
    }

    /// Middle click at `point` (client coordinates).
    pub fn click_middle(&self, target: &Target, point: Point) -> Result<(), InputError> {
        self.click_button(target, point, MouseButton::Middle, false)
    }

    /// Left double-click at `point` (client coordinates).
    pub fn double_click(&self, target: &Target, point: Point) -> Result<(), InputError> {
        self.click_button(target, point, MouseButton::Left, true)
    }

    fn click_button(
        &self,
        target: &Target,
        point: Point,
        button: MouseButton,
        double: bool,
    ) -> Result<(), InputError> {
        self.run(target, |engine, backend| {
            let dest = engine.destination(target, point)?;
            backend.click(&dest, button, double)
        })
    }

    /// Vertical wheel scroll at `point` (client coordinates). One detent is
    /// ±120; positive scrolls away from the user.
    pub fn scroll(&self, target: &Target, point: Point, delta: i16) -> Result<(), InputError> {
        self.run(target, |engine, backend| {
            let dest = engine.destination(target, point)?;
            backend.scroll(&dest, delta)
        })
    }

    // -----------------------------------------------------------------------
    // Keyboard
    // -----------------------------------------------------------------------

    pub fn key_down(&self, target: &Target, key: Key) -> Result<(), InputError> {
        self.run(target, |_, backend| {
            backend.key(target.handle, key, KeyState::Down)
        })
    }

    pub fn key_up(&self, target: &Target, key: Key) -> Result<(), InputError> {
        self.run(target, |_, backend| {
            backend.key(target.handle, key, KeyState::Up)
        })
    }

    /// A full key press (down, dwell, up).
    pub fn press(&self, target: &Target, key: Key) -> Result<(), InputError> {
        self.run(target, |_, backend| backend.press(target.handle, key))
    }

    /// Presses `keys` in order and releases them in reverse, as one atomic
    /// action. If any press fails, the keys already held are released
    /// (best-effort) before the error returns: modifiers are never left
    /// logically stuck because of a mid-sequence failure.
    pub fn hotkey(&self, target: &Target, keys: &[Key]) -> Result<(), InputError> {
        if keys.is_empty() {
            return Ok(());
        }
        self.run(target, |_, backend| {
            let mut held: Vec<Key> = Vec::with_capacity(keys.len());
            for &key in keys {
                if let Err(err) = backend.key(target.handle, key, KeyState::Down) {
                    release_all(backend, target.handle, &held);
                    return Err(err);
                }
                held.push(key);
            }

            let mut first_error = None;
            for &key in held.iter().rev() {
                if let Err(err) = backend.key(target.handle, key, KeyState::Up) {
                    // Keep releasing the rest; report the first failure.
                    first_error.get_or_insert(err);
                }
            }
            match first_error {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }

    /// Types text by resolving each character to a scan code plus Shift
    /// state on the US layout. The whole string is one atomic action.
    ///
    /// Characters without a mapping fail with `UnsupportedKey`, leaving the
    /// already-typed prefix delivered. If a shifted press fails mid-sequence
    /// the Shift key is released (best-effort) before the error returns.
    pub fn type_text(&self, target: &Target, text: &str) -> Result<(), InputError> {
        self.run(target, |_, backend| {
            for c in text.chars() {
                let (key, shifted) = Key::from_char(c).ok_or_else(|| {
                    InputError::UnsupportedKey(format!("no scan code mapping for {c:?}"))
                })?;

                if shifted {
                    backend.key(target.handle, Key::SHIFT, KeyState::Down)?;
                    let pressed = backend.press(target.handle, key);
                    let released = backend.key(target.handle, Key::SHIFT, KeyState::Up);
                    pressed?;
                    released?;
                } else {
                    backend.press(target.handle, key)?;
                }
            }
            Ok(())
        })
    }

    /// Types text as raw WM_CHAR messages, including surrogate pairs for
    /// characters outside the BMP. Reaches characters the scan-code table
    /// cannot, but only the message backend has a character channel, so this
    /// fails with `BackendUnavailable` while the driver backend is selected.
    pub fn type_chars(&self, target: &Target, text: &str) -> Result<(), InputError> {
        let ops = self.ops.lock().map_err(poisoned)?;
        let selection = self.selection.read().map_err(poisoned)?;
        if selection.backend != BackendKind::Message {
            return Err(InputError::BackendUnavailable(
                "character injection requires the message backend".into(),
            ));
        }
        self.validate(target)?;
        let window = target.handle.ok_or(InputError::TargetInvalid)?;

        let mut units = [0u16; 2];
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            for &unit in c.encode_utf16(&mut units).iter() {
                ops.message.post_char(window, unit)?;
            }
            // Pace between characters only; no trailing sleep.
            if chars.peek().is_some() {
                std::thread::sleep(ops.message.char_delay());
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Coordinates & DPI
    // -----------------------------------------------------------------------

    /// Converts a client-space point of the target window to screen space.
    pub fn client_to_screen(&self, target: &Target, point: Point) -> Result<Point, InputError> {
        self.validate(target)?;
        let handle = target.handle.ok_or(InputError::TargetInvalid)?;
        self.windows.client_to_screen(handle, point)
    }

    /// Converts a screen-space point to the target window's client space.
    pub fn screen_to_client(&self, target: &Target, point: Point) -> Result<Point, InputError> {
        self.validate(target)?;
        let handle = target.handle.ok_or(InputError::TargetInvalid)?;
        self.windows.screen_to_client(handle, point)
    }

    /// The target's client-area rectangle (client coordinates).
    pub fn client_rect(&self, target: &Target) -> Result<Rect, InputError> {
        self.validate(target)?;
        let handle = target.handle.ok_or(InputError::TargetInvalid)?;
        self.windows.client_rect(handle)
    }

    /// Per-window DPI. On `DpiUnavailable` callers should assume the
    /// conventional 96x96 and treat positioning accuracy as degraded.
    pub fn dpi(&self, target: &Target) -> Result<(u32, u32), InputError> {
        let handle = target.handle.ok_or(InputError::TargetInvalid)?;
        if !self.windows.is_valid(handle) {
            return Err(InputError::TargetInvalid);
        }
        self.windows.dpi(handle)
    }

    /// The physical cursor position, in screen coordinates.
    pub fn cursor_pos(&self) -> Result<Point, InputError> {
        self.windows.cursor_pos()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Runs one public action: acquires the operation lock, pins the backend
    /// selection, re-validates the target, resolves the active backend, and
    /// hands it to `f`. Both guards are held until `f` returns.
    fn run<R>(
        &self,
        target: &Target,
        f: impl FnOnce(&Engine, &mut dyn InputBackend) -> Result<R, InputError>,
    ) -> Result<R, InputError> {
        let mut ops: MutexGuard<'_, Dispatcher> = self.ops.lock().map_err(poisoned)?;
        let selection = self.selection.read().map_err(poisoned)?;
        self.validate(target)?;
        let backend = ops.active(&selection)?;
        f(self, backend)
    }

    /// Fails fast on stale or non-actionable targets. Global targets skip
    /// the checks; there is no window to validate.
    fn validate(&self, target: &Target) -> Result<(), InputError> {
        let Some(handle) = target.handle else {
            return Ok(());
        };
        if !self.windows.is_valid(handle) {
            return Err(InputError::TargetInvalid);
        }
        if self.windows.is_minimized(handle) || !self.windows.is_visible(handle) {
            return Err(InputError::TargetNotVisible);
        }
        Ok(())
    }

    /// Resolves both coordinate spaces for an action destination.
    fn destination(&self, target: &Target, client: Point) -> Result<Destination, InputError> {
        let screen = match target.handle {
            Some(handle) => self.windows.client_to_screen(handle, client)?,
            None => client,
        };
        Ok(Destination {
            window: target.handle,
            client,
            screen,
        })
    }
}

/// Best-effort release of held keys during hotkey unwind. Failures are
/// logged, not propagated; the original press error is what the caller sees.
fn release_all(backend: &mut dyn InputBackend, window: Option<WindowHandle>, held: &[Key]) {
    for &key in held.iter().rev() {
        if let Err(err) = backend.key(window, key, KeyState::Up) {
            log::warn!("hotkey unwind: failed to release {:?}: {}", key, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::encode::message::{
        WM_CHAR, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE,
    };
    use crate::system::{DeviceId, DriverContext};

    const HANDLE: WindowHandle = WindowHandle(7);

    /// One window at screen origin (100, 200), toggleable liveness flags.
    struct MockWindows {
        valid: AtomicBool,
        visible: AtomicBool,
        minimized: AtomicBool,
        cursor: StdMutex<Point>,
    }

    impl MockWindows {
        fn new() -> Self {
            MockWindows {
                valid: AtomicBool::new(true),
                visible: AtomicBool::new(true),
                minimized: AtomicBool::new(false),
                cursor: StdMutex::new(Point::new(0, 0)),
            }
        }
    }

    impl WindowSystem for MockWindows {
        fn find_by_title(&self, title: &str) -> Result<WindowHandle, InputError> {
            if title == "target" {
                Ok(HANDLE)
            } else {
                Err(InputError::TargetNotFound)
            }
        }

        fn find_by_class(&self, _class: &str) -> Result<WindowHandle, InputError> {
            Ok(HANDLE)
        }

        fn find_by_pid(&self, _pid: u32) -> Result<Vec<WindowHandle>, InputError> {
            Ok(vec![HANDLE])
        }

        fn is_valid(&self, handle: WindowHandle) -> bool {
            handle == HANDLE && self.valid.load(Ordering::SeqCst)
        }

        fn is_visible(&self, _handle: WindowHandle) -> bool {
            self.visible.load(Ordering::SeqCst)
        }

        fn is_minimized(&self, _handle: WindowHandle) -> bool {
            self.minimized.load(Ordering::SeqCst)
        }

        fn client_rect(&self, _handle: WindowHandle) -> Result<Rect, InputError> {
            Ok(Rect {
                left: 0,
                top: 0,
                right: 800,
                bottom: 600,
            })
        }

        fn client_to_screen(
            &self,
            _handle: WindowHandle,
            point: Point,
        ) -> Result<Point, InputError> {
            Ok(Point::new(point.x + 100, point.y + 200))
        }

        fn screen_to_client(
            &self,
            _handle: WindowHandle,
            point: Point,
        ) -> Result<Point, InputError> {
            Ok(Point::new(point.x - 100, point.y - 200))
        }

        fn cursor_pos(&self) -> Result<Point, InputError> {
            Ok(*self.cursor.lock().unwrap())
        }

        fn dpi(&self, _handle: WindowHandle) -> Result<(u32, u32), InputError> {
            Ok((96, 96))
        }
    }

    /// Records posted messages; optionally fails the key-down of one VK code.
    struct RecordingSink {
        posts: StdMutex<Vec<(u32, u32, u32)>>,
        fail_down_vk: Option<u32>,
    }

    impl RecordingSink {
        fn new() -> Self {
            RecordingSink {
                posts: StdMutex::new(Vec::new()),
                fail_down_vk: None,
            }
        }

        fn posts(&self) -> Vec<(u32, u32, u32)> {
            self.posts.lock().unwrap().clone()
        }
    }

    impl MessageSink for RecordingSink {
        fn post(
            &self,
            _handle: WindowHandle,
            message: u32,
            wparam: u32,
            lparam: u32,
        ) -> Result<(), InputError> {
            if message == WM_KEYDOWN && Some(wparam) == self.fail_down_vk {
                return Err(InputError::DeliveryFailed("injected failure".into()));
            }
            self.posts.lock().unwrap().push((message, wparam, lparam));
            Ok(())
        }

        fn scan_to_vk(&self, key: Key) -> u32 {
            u32::from(key.0) + 0x100
        }
    }

    /// A driver port that accepts everything; device 1 is a mouse, 2 a
    /// keyboard. Records sent strokes.
    struct FakePort {
        sent: Arc<StdMutex<Vec<(i32, Vec<u8>)>>>,
    }

    impl DriverPort for FakePort {
        fn load(&mut self, _library: &std::path::Path) -> Result<(), InputError> {
            Ok(())
        }

        fn unload(&mut self) {}

        fn mouse_stroke_size(&self) -> usize {
            crate::encode::stroke::MOUSE_STROKE_SIZE
        }

        fn key_stroke_size(&self) -> usize {
            crate::encode::stroke::KEY_STROKE_SIZE
        }

        fn create_context(&mut self) -> Result<DriverContext, InputError> {
            Ok(DriverContext(1))
        }

        fn destroy_context(&mut self, _context: DriverContext) {}

        fn is_mouse(&self, device: DeviceId) -> bool {
            device.0 == 1
        }

        fn is_keyboard(&self, device: DeviceId) -> bool {
            device.0 == 2
        }

        fn send(
            &self,
            _context: DriverContext,
            device: DeviceId,
            stroke: &[u8],
        ) -> Result<(), InputError> {
            self.sent.lock().unwrap().push((device.0, stroke.to_vec()));
            Ok(())
        }
    }

    fn fast_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.timing.click_delay_ms = 0;
        config.timing.key_delay_ms = 0;
        config
    }

    fn engine_with(
        windows: Arc<MockWindows>,
        sink: Arc<RecordingSink>,
    ) -> (Engine, Arc<StdMutex<Vec<(i32, Vec<u8>)>>>) {
        let _ = env_logger::builder().is_test(true).try_init();
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let port = FakePort { sent: sent.clone() };
        let engine = Engine::with_collaborators(windows, sink, Box::new(port), &fast_config());
        (engine, sent)
    }

    /// A destroyed window fails before anything reaches the sink.
    #[test]
    fn stale_target_fails_without_delivery() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows.clone(), sink.clone());
        let target = engine.find_by_title("target").unwrap();

        windows.valid.store(false, Ordering::SeqCst);
        let err = engine.click(&target, Point::new(10, 10)).unwrap_err();
        assert!(matches!(err, InputError::TargetInvalid));
        assert!(sink.posts().is_empty());
    }

    #[test]
    fn minimized_target_is_not_actionable() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows.clone(), sink);
        let target = engine.find_by_title("target").unwrap();

        windows.minimized.store(true, Ordering::SeqCst);
        let err = engine.press(&target, Key::A).unwrap_err();
        assert!(matches!(err, InputError::TargetNotVisible));
    }

    /// A click resolves client coordinates and posts the down/up pair.
    #[test]
    fn click_posts_button_pair_at_client_point() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows, sink.clone());
        let target = engine.find_by_title("target").unwrap();

        engine.click(&target, Point::new(30, 40)).unwrap();
        let posts = sink.posts();
        assert_eq!(posts.len(), 2);
        let lparam = crate::encode::message::pointer_lparam(30, 40);
        assert_eq!(posts[0].0, WM_LBUTTONDOWN);
        assert_eq!(posts[0].2, lparam);
        assert_eq!(posts[1].0, WM_LBUTTONUP);
        assert_eq!(posts[1].2, lparam);
    }

    /// `move_rel` offsets the physical cursor, then converts back to the
    /// window's client space.
    #[test]
    fn move_rel_offsets_physical_cursor() {
        let windows = Arc::new(MockWindows::new());
        *windows.cursor.lock().unwrap() = Point::new(150, 260);
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows, sink.clone());
        let target = engine.find_by_title("target").unwrap();

        engine.move_rel(&target, 5, -10).unwrap();
        let posts = sink.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, WM_MOUSEMOVE);
        // screen (155, 250) maps to client (55, 50)
        assert_eq!(posts[0].2, crate::encode::message::pointer_lparam(55, 50));
    }

    /// A failed press mid-hotkey releases the keys already held, in reverse.
    #[test]
    fn hotkey_unwinds_held_keys_on_failure() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink {
            posts: StdMutex::new(Vec::new()),
            fail_down_vk: Some(u32::from(Key::C.0) + 0x100),
        });
        let (engine, _) = engine_with(windows, sink.clone());
        let target = engine.find_by_title("target").unwrap();

        let err = engine
            .hotkey(&target, &[Key::CTRL, Key::SHIFT, Key::C])
            .unwrap_err();
        assert!(matches!(err, InputError::DeliveryFailed(_)));

        let vk = |key: Key| u32::from(key.0) + 0x100;
        let seq: Vec<(u32, u32)> = sink.posts().iter().map(|p| (p.0, p.1)).collect();
        assert_eq!(
            seq,
            vec![
                (WM_KEYDOWN, vk(Key::CTRL)),
                (WM_KEYDOWN, vk(Key::SHIFT)),
                (WM_KEYUP, vk(Key::SHIFT)),
                (WM_KEYUP, vk(Key::CTRL)),
            ]
        );
    }

    #[test]
    fn hotkey_releases_in_reverse_order() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows, sink.clone());
        let target = engine.find_by_title("target").unwrap();

        engine.hotkey(&target, &[Key::CTRL, Key::S]).unwrap();
        let vk = |key: Key| u32::from(key.0) + 0x100;
        let seq: Vec<(u32, u32)> = sink.posts().iter().map(|p| (p.0, p.1)).collect();
        assert_eq!(
            seq,
            vec![
                (WM_KEYDOWN, vk(Key::CTRL)),
                (WM_KEYDOWN, vk(Key::S)),
                (WM_KEYUP, vk(Key::S)),
                (WM_KEYUP, vk(Key::CTRL)),
            ]
        );
    }

    /// Uppercase characters get a Shift wrap around the base key press.
    #[test]
    fn type_text_wraps_shifted_characters() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows, sink.clone());
        let target = engine.find_by_title("target").unwrap();

        engine.type_text(&target, "aB").unwrap();
        let vk = |key: Key| u32::from(key.0) + 0x100;
        let seq: Vec<(u32, u32)> = sink.posts().iter().map(|p| (p.0, p.1)).collect();
        assert_eq!(
            seq,
            vec![
                (WM_KEYDOWN, vk(Key::A)),
                (WM_KEYUP, vk(Key::A)),
                (WM_KEYDOWN, vk(Key::SHIFT)),
                (WM_KEYDOWN, vk(Key::B)),
                (WM_KEYUP, vk(Key::B)),
                (WM_KEYUP, vk(Key::SHIFT)),
            ]
        );
    }

    /// An unmapped character stops typing; the prefix stays delivered.
    #[test]
    fn type_text_rejects_unmapped_character() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows, sink.clone());
        let target = engine.find_by_title("target").unwrap();

        let err = engine.type_text(&target, "ab\u{00e9}cd").unwrap_err();
        assert!(matches!(err, InputError::UnsupportedKey(_)));
        assert_eq!(sink.posts().len(), 4); // a down/up, b down/up
    }

    /// `type_chars` posts UTF-16 units, splitting supplementary-plane
    /// characters into surrogate pairs.
    #[test]
    fn type_chars_posts_utf16_units() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows, sink.clone());
        let target = engine.find_by_title("target").unwrap();

        engine.type_chars(&target, "é\u{1F600}").unwrap();
        let posts = sink.posts();
        assert_eq!(posts.len(), 3);
        assert!(posts.iter().all(|p| p.0 == WM_CHAR));
        assert_eq!(posts[0].1, 0x00E9);
        assert_eq!(posts[1].1, 0xD83D);
        assert_eq!(posts[2].1, 0xDE00);
    }

    /// The inter-character pacing sleeps only *between* characters; a
    /// single-character call returns without paying the delay at all.
    #[test]
    fn type_chars_paces_between_characters_only() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let mut config = EngineConfig::default();
        config.timing.key_delay_ms = 200;
        let port = FakePort {
            sent: Arc::new(StdMutex::new(Vec::new())),
        };
        let engine = Engine::with_collaborators(windows, sink, Box::new(port), &config);
        let target = engine.find_by_title("target").unwrap();

        let started = std::time::Instant::now();
        engine.type_chars(&target, "x").unwrap();
        assert!(started.elapsed() < std::time::Duration::from_millis(100));
    }

    #[test]
    fn type_chars_requires_message_backend() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows, sink);
        let target = engine.find_by_title("target").unwrap();

        engine.set_backend(BackendKind::Driver).unwrap();
        let err = engine.type_chars(&target, "x").unwrap_err();
        assert!(matches!(err, InputError::BackendUnavailable(_)));
    }

    /// Switching to the driver backend routes keystrokes to the port.
    #[test]
    fn driver_backend_routes_to_port() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, sent) = engine_with(windows, sink.clone());
        let target = engine.find_by_title("target").unwrap();

        engine.set_backend(BackendKind::Driver).unwrap();
        engine.key_down(&target, Key::A).unwrap();

        assert!(sink.posts().is_empty());
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 2); // keyboard device
        assert_eq!(sent[0].1.len(), crate::encode::stroke::KEY_STROKE_SIZE);
    }

    /// Global targets have no message queue; the message backend refuses.
    #[test]
    fn global_target_needs_driver_backend() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows, sink);

        let err = engine
            .click(&Target::global(), Point::new(5, 5))
            .unwrap_err();
        assert!(matches!(err, InputError::BackendUnavailable(_)));
    }

    #[test]
    fn coordinate_queries_round_trip() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows, sink);
        let target = engine.find_by_title("target").unwrap();

        let screen = engine.client_to_screen(&target, Point::new(10, 20)).unwrap();
        assert_eq!(screen, Point::new(110, 220));
        let client = engine.screen_to_client(&target, screen).unwrap();
        assert_eq!(client, Point::new(10, 20));
    }

    #[test]
    fn global_target_has_no_coordinate_space() {
        let windows = Arc::new(MockWindows::new());
        let sink = Arc::new(RecordingSink::new());
        let (engine, _) = engine_with(windows, sink);

        let err = engine
            .client_to_screen(&Target::global(), Point::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, InputError::TargetInvalid));
    }
}
