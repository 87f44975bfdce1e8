//! Scan code (Set 1) key identifiers and the US-layout character table.
//!
//! A `Key` is a layout-independent physical key identifier, stable across
//! both injection backends: the message backend maps it to a virtual-key
//! code through the OS, the driver backend passes it through unchanged.
//!
//! `Key::from_char` resolves a character to `(key, shifted)` on the US
//! layout: `'a'` is `(A, false)`, `'A'` is `(A, true)`, `'!'` is
//! `(NUM1, true)`. Characters outside the table yield `None` and surface as
//! `InputError::UnsupportedKey` at the API boundary.

/// A hardware scan code (Scan Code Set 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(pub u16);

impl Key {
    pub const ESC: Key = Key(0x01);
    pub const NUM1: Key = Key(0x02);
    pub const NUM2: Key = Key(0x03);
    pub const NUM3: Key = Key(0x04);
    pub const NUM4: Key = Key(0x05);
    pub const NUM5: Key = Key(0x06);
    pub const NUM6: Key = Key(0x07);
    pub const NUM7: Key = Key(0x08);
    pub const NUM8: Key = Key(0x09);
    pub const NUM9: Key = Key(0x0A);
    pub const NUM0: Key = Key(0x0B);
    pub const MINUS: Key = Key(0x0C);
    pub const EQUAL: Key = Key(0x0D);
    pub const BACKSPACE: Key = Key(0x0E);
    pub const TAB: Key = Key(0x0F);
    pub const Q: Key = Key(0x10);
    pub const W: Key = Key(0x11);
    pub const E: Key = Key(0x12);
    pub const R: Key = Key(0x13);
    pub const T: Key = Key(0x14);
    pub const Y: Key = Key(0x15);
    pub const U: Key = Key(0x16);
    pub const I: Key = Key(0x17);
    pub const O: Key = Key(0x18);
    pub const P: Key = Key(0x19);
    pub const LEFT_BRACKET: Key = Key(0x1A);
    pub const RIGHT_BRACKET: Key = Key(0x1B);
    pub const ENTER: Key = Key(0x1C);
    pub const CTRL: Key = Key(0x1D);
    pub const A: Key = Key(0x1E);
    pub const S: Key = Key(0x1F);
    pub const D: Key = Key(0x20);
    pub const F: Key = Key(0x21);
    pub const G: Key = Key(0x22);
    pub const H: Key = Key(0x23);
    pub const J: Key = Key(0x24);
    pub const K: Key = Key(0x25);
    pub const L: Key = Key(0x26);
    pub const SEMICOLON: Key = Key(0x27);
    pub const QUOTE: Key = Key(0x28);
    pub const BACKTICK: Key = Key(0x29);
    pub const SHIFT: Key = Key(0x2A);
    pub const BACKSLASH: Key = Key(0x2B);
    pub const Z: Key = Key(0x2C);
    pub const X: Key = Key(0x2D);
    pub const C: Key = Key(0x2E);
    pub const V: Key = Key(0x2F);
    pub const B: Key = Key(0x30);
    pub const N: Key = Key(0x31);
    pub const M: Key = Key(0x32);
    pub const COMMA: Key = Key(0x33);
    pub const DOT: Key = Key(0x34);
    pub const SLASH: Key = Key(0x35);
    pub const ALT: Key = Key(0x38);
    pub const SPACE: Key = Key(0x39);
    pub const CAPS_LOCK: Key = Key(0x3A);
    pub const F1: Key = Key(0x3B);
    pub const F2: Key = Key(0x3C);
    pub const F3: Key = Key(0x3D);
    pub const F4: Key = Key(0x3E);
    pub const F5: Key = Key(0x3F);
    pub const F6: Key = Key(0x40);
    pub const F7: Key = Key(0x41);
    pub const F8: Key = Key(0x42);
    pub const F9: Key = Key(0x43);
    pub const F10: Key = Key(0x44);
    pub const NUM_LOCK: Key = Key(0x45);
    pub const SCROLL_LOCK: Key = Key(0x46);
    pub const F11: Key = Key(0x57);
    pub const F12: Key = Key(0x58);

    // Navigation/editing block. These carry the E0 prefix on the wire and
    // need the extended-key flag in message-backend keyboard lparams.
    pub const HOME: Key = Key(0x47);
    pub const UP: Key = Key(0x48);
    pub const PAGE_UP: Key = Key(0x49);
    pub const LEFT: Key = Key(0x4B);
    pub const RIGHT: Key = Key(0x4D);
    pub const END: Key = Key(0x4F);
    pub const DOWN: Key = Key(0x50);
    pub const PAGE_DOWN: Key = Key(0x51);
    pub const INSERT: Key = Key(0x52);
    pub const DELETE: Key = Key(0x53);

    // Right-side modifiers share the base scan code with their left-side
    // counterparts; the E0 prefix distinguishes them.
    pub const RIGHT_CTRL: Key = Key(0x1D);
    pub const RIGHT_ALT: Key = Key(0x38);
    pub const NUMPAD_DIVIDE: Key = Key(0x35);

    /// Resolves a character to `(key, shift_required)` on the US layout.
    ///
    /// Returns `None` for characters with no physical key on that layout.
    pub fn from_char(c: char) -> Option<(Key, bool)> {
        let (key, shifted) = match c {
            'a'..='z' => (Self::letter(c), false),
            'A'..='Z' => (Self::letter(c.to_ascii_lowercase()), true),
            '1' => (Key::NUM1, false),
            '!' => (Key::NUM1, true),
            '2' => (Key::NUM2, false),
            '@' => (Key::NUM2, true),
            '3' => (Key::NUM3, false),
            '#' => (Key::NUM3, true),
            '4' => (Key::NUM4, false),
            '$' => (Key::NUM4, true),
            '5' => (Key::NUM5, false),
            '%' => (Key::NUM5, true),
            '6' => (Key::NUM6, false),
            '^' => (Key::NUM6, true),
            '7' => (Key::NUM7, false),
            '&' => (Key::NUM7, true),
            '8' => (Key::NUM8, false),
            '*' => (Key::NUM8, true),
            '9' => (Key::NUM9, false),
            '(' => (Key::NUM9, true),
            '0' => (Key::NUM0, false),
            ')' => (Key::NUM0, true),
            '`' => (Key::BACKTICK, false),
            '~' => (Key::BACKTICK, true),
            '-' => (Key::MINUS, false),
            '_' => (Key::MINUS, true),
            '=' => (Key::EQUAL, false),
            '+' => (Key::EQUAL, true),
            '[' => (Key::LEFT_BRACKET, false),
            '{' => (Key::LEFT_BRACKET, true),
            ']' => (Key::RIGHT_BRACKET, false),
            '}' => (Key::RIGHT_BRACKET, true),
            '\\' => (Key::BACKSLASH, false),
            '|' => (Key::BACKSLASH, true),
            ';' => (Key::SEMICOLON, false),
            ':' => (Key::SEMICOLON, true),
            '\'' => (Key::QUOTE, false),
            '"' => (Key::QUOTE, true),
            ',' => (Key::COMMA, false),
            '<' => (Key::COMMA, true),
            '.' => (Key::DOT, false),
            '>' => (Key::DOT, true),
            '/' => (Key::SLASH, false),
            '?' => (Key::SLASH, true),
            ' ' => (Key::SPACE, false),
            '\n' => (Key::ENTER, false),
            '\t' => (Key::TAB, false),
            _ => return None,
        };
        Some((key, shifted))
    }

    /// Scan codes for the letter rows are not contiguous with ASCII, so the
    /// lowercase letters go through an explicit table.
    fn letter(c: char) -> Key {
        match c {
            'a' => Key::A,
            'b' => Key::B,
            'c' => Key::C,
            'd' => Key::D,
            'e' => Key::E,
            'f' => Key::F,
            'g' => Key::G,
            'h' => Key::H,
            'i' => Key::I,
            'j' => Key::J,
            'k' => Key::K,
            'l' => Key::L,
            'm' => Key::M,
            'n' => Key::N,
            'o' => Key::O,
            'p' => Key::P,
            'q' => Key::Q,
            'r' => Key::R,
            's' => Key::S,
            't' => Key::T,
            'u' => Key::U,
            'v' => Key::V,
            'w' => Key::W,
            'x' => Key::X,
            'y' => Key::Y,
            'z' => Key::Z,
            _ => unreachable!("caller matched a-z"),
        }
    }

    /// True for keys that carry the E0 prefix: the navigation/editing block,
    /// right-side modifiers, NumLock, and numpad divide. The message backend
    /// sets bit 24 of the keyboard lparam for these.
    ///
    /// Right-side modifiers and numpad divide share their base scan code with
    /// the left-side/main variant, so those base codes are classified as
    /// extended as a whole.
    pub fn is_extended(self) -> bool {
        matches!(
            self,
            Key::INSERT
                | Key::DELETE
                | Key::HOME
                | Key::END
                | Key::PAGE_UP
                | Key::PAGE_DOWN
                | Key::UP
                | Key::DOWN
                | Key::LEFT
                | Key::RIGHT
                | Key::NUM_LOCK
                | Key::RIGHT_CTRL
                | Key::RIGHT_ALT
                | Key::NUMPAD_DIVIDE
        )
    }
}
