//! Driver stroke wire protocol.
//!
//! The kernel driver consumes C structs; this module serializes strokes into
//! byte buffers matching that layout byte-for-byte. Host struct padding is
//! never trusted: every field is written at an explicit little-endian offset,
//! so the encoding is identical regardless of compiler or ABI defaults.
//!
//! Mouse stroke layout (20 bytes):
//!
//! | offset | size | field       |
//! |--------|------|-------------|
//! | 0      | 2    | state       |
//! | 2      | 2    | flags       |
//! | 4      | 2    | rolling     |
//! | 6      | 2    | (padding)   |
//! | 8      | 4    | x           |
//! | 12     | 4    | y           |
//! | 16     | 4    | information |
//!
//! The two padding bytes at offset 6 keep the 32-bit fields on 4-byte
//! boundaries, exactly where the C compiler places them in the driver's
//! struct. Keyboard stroke layout (8 bytes) is naturally aligned:
//! code u16 + state u16 + information u32.

/// Wire size of a serialized mouse stroke.
pub const MOUSE_STROKE_SIZE: usize = 20;
/// Wire size of a serialized keyboard stroke.
pub const KEY_STROKE_SIZE: usize = 8;

// Mouse stroke state bits.
pub const MOUSE_LEFT_DOWN: u16 = 0x001;
pub const MOUSE_LEFT_UP: u16 = 0x002;
pub const MOUSE_RIGHT_DOWN: u16 = 0x004;
pub const MOUSE_RIGHT_UP: u16 = 0x008;
pub const MOUSE_MIDDLE_DOWN: u16 = 0x010;
pub const MOUSE_MIDDLE_UP: u16 = 0x020;
pub const MOUSE_WHEEL: u16 = 0x400;

// Mouse stroke flags.
pub const MOUSE_MOVE_RELATIVE: u16 = 0x000;

// Keyboard stroke state bits.
pub const KEY_DOWN: u16 = 0x00;
pub const KEY_UP: u16 = 0x01;

/// One atomic mouse event in the driver's wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseStroke {
    pub state: u16,
    pub flags: u16,
    pub rolling: i16,
    pub x: i32,
    pub y: i32,
    pub information: u32,
}

impl MouseStroke {
    /// A relative motion stroke.
    pub fn relative_move(dx: i32, dy: i32) -> Self {
        MouseStroke {
            flags: MOUSE_MOVE_RELATIVE,
            x: dx,
            y: dy,
            ..Default::default()
        }
    }

    /// A button-state stroke (down/up bits only, no motion).
    pub fn button(state: u16) -> Self {
        MouseStroke {
            state,
            ..Default::default()
        }
    }

    /// A vertical wheel stroke.
    pub fn wheel(delta: i16) -> Self {
        MouseStroke {
            state: MOUSE_WHEEL,
            rolling: delta,
            ..Default::default()
        }
    }

    /// Serializes into the 20-byte wire layout.
    pub fn encode(&self) -> [u8; MOUSE_STROKE_SIZE] {
        let mut buf = [0u8; MOUSE_STROKE_SIZE];
        buf[0..2].copy_from_slice(&self.state.to_le_bytes());
        buf[2..4].copy_from_slice(&self.flags.to_le_bytes());
        buf[4..6].copy_from_slice(&self.rolling.to_le_bytes());
        // 6..8 stays zero: alignment padding before the 32-bit fields.
        buf[8..12].copy_from_slice(&self.x.to_le_bytes());
        buf[12..16].copy_from_slice(&self.y.to_le_bytes());
        buf[16..20].copy_from_slice(&self.information.to_le_bytes());
        buf
    }
}

/// One atomic keyboard event in the driver's wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyStroke {
    pub code: u16,
    pub state: u16,
    pub information: u32,
}

impl KeyStroke {
    pub fn new(code: u16, state: u16) -> Self {
        KeyStroke {
            code,
            state,
            information: 0,
        }
    }

    /// Serializes into the 8-byte wire layout.
    pub fn encode(&self) -> [u8; KEY_STROKE_SIZE] {
        let mut buf = [0u8; KEY_STROKE_SIZE];
        buf[0..2].copy_from_slice(&self.code.to_le_bytes());
        buf[2..4].copy_from_slice(&self.state.to_le_bytes());
        buf[4..8].copy_from_slice(&self.information.to_le_bytes());
        buf
    }
}
