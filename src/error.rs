//! Closed error taxonomy for the input synthesis engine.
//!
//! Every backend-specific failure (DLL load error, driver session error,
//! Win32 error code) is mapped into one of these variants before it reaches
//! the caller, so callers can branch on cause without knowing which backend
//! is active. Nothing is swallowed; no operation fails silently.

use thiserror::Error;

/// Errors returned by every public engine operation.
#[derive(Debug, Error)]
pub enum InputError {
    /// No window matched the title/class/PID criteria.
    #[error("target window not found")]
    TargetNotFound,

    /// The target handle no longer resolves to a live window. Handles can go
    /// stale at any time; the engine re-checks before every action.
    #[error("target window handle is no longer valid")]
    TargetInvalid,

    /// The target window is minimized or hidden. Client-coordinate queries
    /// return meaningless values while a window is iconified, so actions are
    /// refused rather than delivered to garbage coordinates.
    #[error("target window is minimized or hidden")]
    TargetNotVisible,

    /// The character has no scan-code mapping on the US-layout table, or the
    /// scan code has no virtual-key equivalent on the active backend.
    #[error("unsupported key: {0}")]
    UnsupportedKey(String),

    /// The selected backend cannot service the request. Also covers internal
    /// lock poisoning, which leaves the engine in an unknown state.
    #[error("input backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The driver DLL loaded but no usable driver context could be created,
    /// which means the kernel component is missing or not accessible.
    #[error("interception driver not installed or accessible")]
    DriverNotInstalled,

    /// The driver DLL could not be loaded, its symbols are missing, or its
    /// stroke layout does not match the wire protocol this engine speaks.
    /// This is a configuration error, not a transient one.
    #[error("driver library load failed: {0}")]
    DriverLoadFailed(String),

    /// Device probing found no mouse-capable or no keyboard-capable device
    /// within the configured probe range.
    #[error("no interception input devices found")]
    NoDevicesFound,

    /// The post/send delivery call itself failed.
    #[error("event delivery failed: {0}")]
    DeliveryFailed(String),

    /// A mouse trajectory exceeded the fixed wall-clock ceiling without
    /// converging on the target. Bounds worst-case latency when the OS stops
    /// updating the cursor position as expected.
    #[error("mouse trajectory timed out before reaching the target")]
    MoveTimeout,

    /// OS-level privilege isolation (e.g. UIPI) blocked delivery. The engine
    /// surfaces this; it never attempts to work around it.
    #[error("permission denied by OS privilege isolation")]
    PermissionDenied,

    /// All DPI probe tiers failed. Callers should fall back to the
    /// conventional 96x96 default, knowing accuracy is degraded.
    #[error("DPI could not be determined; the conventional default is 96x96")]
    DpiUnavailable,
}
