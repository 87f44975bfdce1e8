//! Message-queue injection backend.
//!
//! Posts `WM_*` messages with parameters packed by `encode::message`.
//! Requires a window target: a message has to land in some queue. Delivery
//! is fire-and-forget; a successful post says nothing about when (or
//! whether) the target application processes the event.
//!
//! Timing matches what target applications expect from real input: a short
//! pause between button-down and button-up, and between key-down and key-up.

use std::sync::Arc;
use std::time::Duration;

use crate::encode::message::{
    key_lparam, pointer_lparam, wheel_wparam, MK_LBUTTON, MK_MBUTTON, MK_RBUTTON, WM_CHAR,
    WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDBLCLK, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDBLCLK,
    WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_RBUTTONDBLCLK, WM_RBUTTONDOWN,
    WM_RBUTTONUP,
};
use crate::error::InputError;
use crate::keys::Key;
use crate::system::{MessageSink, WindowHandle};

use super::{Destination, InputBackend, KeyState, MouseButton};

pub(crate) struct MessageBackend {
    sink: Arc<dyn MessageSink>,
    /// Pause between button-down and button-up.
    click_delay: Duration,
    /// Pause between key-down and key-up, and between typed characters.
    key_delay: Duration,
}

impl MessageBackend {
    pub fn new(sink: Arc<dyn MessageSink>, click_delay: Duration, key_delay: Duration) -> Self {
        MessageBackend {
            sink,
            click_delay,
            key_delay,
        }
    }

    fn require_window(dest: Option<WindowHandle>) -> Result<WindowHandle, InputError> {
        dest.ok_or_else(|| {
            InputError::BackendUnavailable("message backend requires a window target".into())
        })
    }

    /// Posts one WM_CHAR code unit. Used by the engine's unicode text path;
    /// surrogate pairs arrive as two consecutive units.
    pub fn post_char(&self, window: WindowHandle, unit: u16) -> Result<(), InputError> {
        self.sink.post(window, WM_CHAR, unit as u32, 1)
    }

    pub fn char_delay(&self) -> Duration {
        self.key_delay
    }

    fn vk_for(&self, key: Key) -> Result<u32, InputError> {
        let vk = self.sink.scan_to_vk(key);
        if vk == 0 {
            return Err(InputError::UnsupportedKey(format!(
                "no virtual-key mapping for scan code {:#04x}",
                key.0
            )));
        }
        Ok(vk)
    }
}

impl InputBackend for MessageBackend {
    /// Posts a WM_MOUSEMOVE with the client-space point. The physical cursor
    /// does not move; only the target's queue sees the motion.
    fn move_to(&mut self, dest: &Destination) -> Result<(), InputError> {
        let window = Self::require_window(dest.window)?;
        let lparam = pointer_lparam(dest.client.x, dest.client.y);
        self.sink.post(window, WM_MOUSEMOVE, 0, lparam)
    }

    fn click(
        &mut self,
        dest: &Destination,
        button: MouseButton,
        double: bool,
    ) -> Result<(), InputError> {
        let window = Self::require_window(dest.window)?;
        let lparam = pointer_lparam(dest.client.x, dest.client.y);

        let (down_msg, up_msg, dblclk_msg, down_flag) = match button {
            MouseButton::Left => (WM_LBUTTONDOWN, WM_LBUTTONUP, WM_LBUTTONDBLCLK, MK_LBUTTON),
            MouseButton::Right => (WM_RBUTTONDOWN, WM_RBUTTONUP, WM_RBUTTONDBLCLK, MK_RBUTTON),
            MouseButton::Middle => (WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MBUTTONDBLCLK, MK_MBUTTON),
        };

        self.sink.post(window, down_msg, down_flag, lparam)?;
        std::thread::sleep(self.click_delay);
        self.sink.post(window, up_msg, 0, lparam)?;

        if double {
            // The double-click message replaces the second button-down.
            self.sink.post(window, dblclk_msg, down_flag, lparam)?;
            std::thread::sleep(self.click_delay);
            self.sink.post(window, up_msg, 0, lparam)?;
        }
        Ok(())
    }

    /// Wheel messages are the one mouse message family carrying *screen*
    /// coordinates in the lparam.
    fn scroll(&mut self, dest: &Destination, delta: i16) -> Result<(), InputError> {
        let window = Self::require_window(dest.window)?;
        let wparam = wheel_wparam(delta);
        let lparam = pointer_lparam(dest.screen.x, dest.screen.y);
        self.sink.post(window, WM_MOUSEWHEEL, wparam, lparam)
    }

    fn key(
        &mut self,
        window: Option<WindowHandle>,
        key: Key,
        state: KeyState,
    ) -> Result<(), InputError> {
        let window = Self::require_window(window)?;
        let vk = self.vk_for(key)?;
        let (message, up) = match state {
            KeyState::Down => (WM_KEYDOWN, false),
            KeyState::Up => (WM_KEYUP, true),
        };
        self.sink.post(window, message, vk, key_lparam(key, up))
    }

    fn press(&mut self, window: Option<WindowHandle>, key: Key) -> Result<(), InputError> {
        self.key(window, key, KeyState::Down)?;
        std::thread::sleep(self.key_delay);
        self.key(window, key, KeyState::Up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use std::sync::Mutex;

    /// Records every posted message; maps scan codes to themselves + 0x100
    /// so vk lookups are deterministic without an OS.
    struct RecordingSink {
        posts: Mutex<Vec<(u32, u32, u32)>>,
        unmapped: Option<Key>,
    }

    impl RecordingSink {
        fn new() -> Self {
            RecordingSink {
                posts: Mutex::new(Vec::new()),
                unmapped: None,
            }
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
            self.posts.lock().unwrap().push((message, wparam, lparam));
            Ok(())
        }

        fn scan_to_vk(&self, key: Key) -> u32 {
            if self.unmapped == Some(key) {
                0
            } else {
                key.0 as u32 + 0x100
            }
        }
    }

    fn backend(sink: Arc<RecordingSink>) -> MessageBackend {
        MessageBackend::new(sink, Duration::ZERO, Duration::ZERO)
    }

    fn dest(client: Point, screen: Point) -> Destination {
        Destination {
            window: Some(WindowHandle(1)),
            client,
            screen,
        }
    }

    #[test]
    fn click_posts_down_then_up_with_packed_client_point() {
        let sink = Arc::new(RecordingSink::new());
        let mut b = backend(sink.clone());
        b.click(
            &dest(Point::new(100, 200), Point::new(1100, 1200)),
            MouseButton::Left,
            false,
        )
        .unwrap();

        let posts = sink.posts.lock().unwrap();
        let lparam = pointer_lparam(100, 200);
        assert_eq!(
            *posts,
            vec![
                (WM_LBUTTONDOWN, MK_LBUTTON, lparam),
                (WM_LBUTTONUP, 0, lparam),
            ]
        );
    }

    /// A double click is a full first click followed by the DBLCLK/up pair;
    /// the DBLCLK message stands in for the second button-down.
    #[test]
    fn double_click_posts_four_messages() {
        let sink = Arc::new(RecordingSink::new());
        let mut b = backend(sink.clone());
        b.click(
            &dest(Point::new(5, 5), Point::new(5, 5)),
            MouseButton::Right,
            true,
        )
        .unwrap();

        let messages: Vec<u32> = sink.posts.lock().unwrap().iter().map(|p| p.0).collect();
        assert_eq!(
            messages,
            vec![
                WM_RBUTTONDOWN,
                WM_RBUTTONUP,
                WM_RBUTTONDBLCLK,
                WM_RBUTTONUP,
            ]
        );
    }

    #[test]
    fn scroll_uses_screen_coordinates_and_high_word_delta() {
        let sink = Arc::new(RecordingSink::new());
        let mut b = backend(sink.clone());
        b.scroll(&dest(Point::new(10, 10), Point::new(810, 610)), 120)
            .unwrap();

        let posts = sink.posts.lock().unwrap();
        let (message, wparam, lparam) = posts[0];
        assert_eq!(message, WM_MOUSEWHEEL);
        assert_eq!(wparam >> 16, 120);
        assert_eq!(wparam & 0xFFFF, 0);
        assert_eq!(lparam, pointer_lparam(810, 610));
    }

    #[test]
    fn key_up_carries_transition_bits() {
        let sink = Arc::new(RecordingSink::new());
        let mut b = backend(sink.clone());
        b.key(Some(WindowHandle(1)), Key::A, KeyState::Up).unwrap();

        let posts = sink.posts.lock().unwrap();
        let (message, wparam, lparam) = posts[0];
        assert_eq!(message, WM_KEYUP);
        assert_eq!(wparam, Key::A.0 as u32 + 0x100);
        assert_eq!(lparam >> 30, 0b11);
    }

    #[test]
    fn unmappable_scan_code_is_an_unsupported_key() {
        let sink = Arc::new(RecordingSink {
            posts: Mutex::new(Vec::new()),
            unmapped: Some(Key::F12),
        });
        let mut b = backend(sink.clone());
        let err = b
            .key(Some(WindowHandle(1)), Key::F12, KeyState::Down)
            .unwrap_err();
        assert!(matches!(err, InputError::UnsupportedKey(_)));
        assert!(sink.posts.lock().unwrap().is_empty(), "nothing posted");
    }

    #[test]
    fn global_target_is_rejected() {
        let sink = Arc::new(RecordingSink::new());
        let mut b = backend(sink);
        let err = b
            .move_to(&Destination {
                window: None,
                client: Point::new(0, 0),
                screen: Point::new(0, 0),
            })
            .unwrap_err();
        assert!(matches!(err, InputError::BackendUnavailable(_)));
    }
}
