//! Synthetic mouse and keyboard input for Windows targets.
//!
//! The crate drives a target window (or the whole desktop) through one of
//! two interchangeable backends:
//!
//! - the **message backend** posts window messages straight into the
//!   target's queue. It needs no privileges and works on background windows,
//!   but applications reading hardware state directly will not see it.
//! - the **driver backend** replays strokes through a kernel filter driver,
//!   making the input indistinguishable from a physical device. It requires
//!   the driver to be installed and moves the real cursor.
//!
//! `Engine` is the entry point: an explicit value holding both backends, a
//! coarse operation lock that keeps composite actions (double clicks,
//! hotkeys, typed strings) atomic, and the backend selection. All OS access
//! goes through the `system` traits, so the full pipeline runs under mocks
//! in tests and on non-Windows hosts.
//!
//! Key identity is the hardware scan code (Set 1), not the virtual-key
//! code: scan codes survive both backends unchanged, while VK codes exist
//! only as a message-backend encoding detail.

mod backend;
pub mod config;
mod encode;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod system;
mod trajectory;

#[cfg(target_os = "windows")]
pub mod win32;

pub use backend::BackendKind;
pub use config::EngineConfig;
pub use engine::{Engine, Target};
pub use error::InputError;
pub use geometry::{Point, Rect};
pub use keys::Key;
pub use system::WindowHandle;
