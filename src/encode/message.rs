//! Window-message parameter packing.
//!
//! Mouse and keyboard window messages carry their payload in two packed
//! 32-bit parameters. The layouts are fixed by the platform ABI:
//!
//! - pointer lparam: low word = x, high word = y, both signed 16-bit;
//! - wheel wparam: low word = key-state flags (always zero here), high word
//!   = signed rolling delta;
//! - keyboard lparam: bit 0 = repeat count (always 1), bits 16-23 = scan
//!   code, bit 24 = extended-key flag, bits 30-31 = previous-state and
//!   transition flags (both set on key-up, both clear on key-down).
//!
//! Coordinates outside the signed 16-bit range are clamped, not wrapped:
//! the wire format simply cannot represent wider values, and a saturated
//! coordinate is the least surprising reading of an out-of-range request.

use crate::keys::Key;

/// Message identifiers, from winuser.h.
pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_CHAR: u32 = 0x0102;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_LBUTTONDBLCLK: u32 = 0x0203;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_RBUTTONDBLCLK: u32 = 0x0206;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;
pub const WM_MBUTTONDBLCLK: u32 = 0x0209;
pub const WM_MOUSEWHEEL: u32 = 0x020A;

/// Button-state wparam flags for mouse messages.
pub const MK_LBUTTON: u32 = 0x0001;
pub const MK_RBUTTON: u32 = 0x0002;
pub const MK_MBUTTON: u32 = 0x0010;

/// Packs a coordinate pair into a pointer lparam: low word x, high word y.
///
/// Each axis is clamped to [-32768, 32767] before packing.
pub fn pointer_lparam(x: i32, y: i32) -> u32 {
    let lx = clamp_i16(x) as u16;
    let ly = clamp_i16(y) as u16;
    (lx as u32) | ((ly as u32) << 16)
}

/// Packs a wheel wparam: high word = signed rolling delta, low word = key
/// state flags, always zero for synthesized scrolls.
pub fn wheel_wparam(delta: i16) -> u32 {
    (delta as u16 as u32) << 16
}

/// Packs a keyboard lparam for a key-down or key-up message.
pub fn key_lparam(key: Key, up: bool) -> u32 {
    // Repeat count = 1.
    let mut lparam: u32 = 1;
    // Scan code, bits 16-23.
    lparam |= ((key.0 as u32) & 0xFF) << 16;
    // Extended-key flag, bit 24.
    if key.is_extended() {
        lparam |= 1 << 24;
    }
    // Previous-state (bit 30) and transition (bit 31) flags.
    if up {
        lparam |= (1 << 30) | (1 << 31);
    }
    lparam
}

fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test-side inverse of `pointer_lparam`.
    fn pointer_from_lparam(lparam: u32) -> (i32, i32) {
        let x = (lparam & 0xFFFF) as u16 as i16 as i32;
        let y = (lparam >> 16) as u16 as i16 as i32;
        (x, y)
    }

    #[test]
    fn pointer_round_trips_in_range() {
        for (x, y) in [(0, 0), (100, 200), (-300, 400), (32767, -32768)] {
            assert_eq!(pointer_from_lparam(pointer_lparam(x, y)), (x, y));
        }
    }

    /// Out-of-range coordinates are clamped to the i16 boundary, not wrapped.
    #[test]
    fn pointer_clamps_instead_of_wrapping() {
        assert_eq!(pointer_from_lparam(pointer_lparam(40_000, 0)), (32_767, 0));
        assert_eq!(
            pointer_from_lparam(pointer_lparam(0, -40_000)),
            (0, -32_768)
        );
    }

    #[test]
    fn wheel_delta_lands_in_the_high_word() {
        let w = wheel_wparam(120);
        assert_eq!(w >> 16, 120);
        assert_eq!(w & 0xFFFF, 0);

        let w = wheel_wparam(-120);
        assert_eq!((w >> 16) as u16 as i16, -120);
        assert_eq!(w & 0xFFFF, 0);
    }

    #[test]
    fn key_down_lparam_layout() {
        let l = key_lparam(Key::A, false);
        assert_eq!(l & 0xFFFF, 1, "repeat count");
        assert_eq!((l >> 16) & 0xFF, 0x1E, "scan code");
        assert_eq!((l >> 24) & 1, 0, "A is not extended");
        assert_eq!(l >> 30, 0, "transition bits clear on key-down");
    }

    #[test]
    fn key_up_sets_both_transition_bits() {
        let l = key_lparam(Key::A, true);
        assert_eq!(l >> 30, 0b11);
    }

    #[test]
    fn extended_keys_set_bit_24() {
        let l = key_lparam(Key::DELETE, false);
        assert_eq!((l >> 24) & 1, 1);
        assert_eq!((l >> 16) & 0xFF, 0x53);
    }
}
