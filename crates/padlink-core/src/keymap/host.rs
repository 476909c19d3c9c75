//! Host key identities reported by the capture layer.
//!
//! The capture collaborator (the GUI shell, or a test harness) reports key
//! presses as [`HostKey`] values, one per distinct physical key the host
//! exposes.  `HostKey` is opaque to the wire protocol: it exists only to be
//! translated to a `(page, code)` table entry at the capture boundary, via
//! [`crate::keymap::table::entry_for_key`].
//!
//! Left/right modifier variants are distinct identities and distinct table
//! entries; nothing folds them together.  A host key whose [`usage`] is
//! `None` has no device-side representation and is ignored by the resolver.
//!
//! [`usage`]: HostKey::usage

use serde::{Deserialize, Serialize};

use super::table::UsagePage;

/// A physical key identity from the host input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostKey {
    // Modifiers
    LeftCtrl,
    RightCtrl,
    LeftShift,
    RightShift,
    LeftAlt,
    RightAlt,
    LeftWin,
    RightWin,
    // Letters
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,
    // Digit row
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Digit0,
    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,
    // Editing and whitespace
    Enter,
    Escape,
    Backspace,
    Tab,
    Space,
    // Navigation
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    ArrowRight,
    ArrowLeft,
    ArrowDown,
    ArrowUp,
    // Locks
    CapsLock,
    NumLock,
    ScrollLock,
    // Punctuation
    Minus,
    Equal,
    BracketLeft,
    BracketRight,
    Backslash,
    Semicolon,
    Quote,
    Backquote,
    Comma,
    Period,
    Slash,
    // System
    PrintScreen,
    Pause,
    ContextMenu,
    // Numpad
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadDivide,
    NumpadMultiply,
    NumpadSubtract,
    NumpadAdd,
    NumpadEnter,
    NumpadDecimal,
    // Media transport
    MediaNextTrack,
    MediaPreviousTrack,
    MediaStop,
    MediaPlayPause,
    // Volume
    VolumeMute,
    VolumeDown,
    VolumeUp,
    // Browser
    BrowserBack,
    BrowserForward,
    BrowserRefresh,
    BrowserStop,
    BrowserSearch,
    BrowserFavorites,
    BrowserHome,
    // Launchers
    LaunchMail,
    LaunchMedia,
    LaunchApp1,
    LaunchApp2,
    // Power
    Sleep,
    // Japanese layout / IME
    IntlYen,
    Henkan,
    Muhenkan,
    ZenkakuHankaku,
    KatakanaHiragana,
    /// Any key the host input layer cannot name (dead keys, vendor keys).
    /// Has no usage and is dropped by the resolver.
    Unidentified,
}

impl HostKey {
    /// Returns the `(page, code)` this key translates to, or `None` for
    /// keys with no device-side representation.
    ///
    /// This is a hand-authored per-key mapping rather than a code-only
    /// lookup, so a Consumer-page code that happens to collide numerically
    /// with a Keyboard-page code (e.g. Mute 0xE2 vs Alt 0xE2) resolves to
    /// the intended page.
    pub fn usage(self) -> Option<(UsagePage, u16)> {
        use UsagePage::{Consumer, Keyboard};
        let (page, code) = match self {
            HostKey::LeftCtrl => (Keyboard, 0xE0),
            HostKey::LeftShift => (Keyboard, 0xE1),
            HostKey::LeftAlt => (Keyboard, 0xE2),
            HostKey::LeftWin => (Keyboard, 0xE3),
            HostKey::RightCtrl => (Keyboard, 0xE4),
            HostKey::RightShift => (Keyboard, 0xE5),
            HostKey::RightAlt => (Keyboard, 0xE6),
            HostKey::RightWin => (Keyboard, 0xE7),
            HostKey::KeyA => (Keyboard, 0x04),
            HostKey::KeyB => (Keyboard, 0x05),
            HostKey::KeyC => (Keyboard, 0x06),
            HostKey::KeyD => (Keyboard, 0x07),
            HostKey::KeyE => (Keyboard, 0x08),
            HostKey::KeyF => (Keyboard, 0x09),
            HostKey::KeyG => (Keyboard, 0x0A),
            HostKey::KeyH => (Keyboard, 0x0B),
            HostKey::KeyI => (Keyboard, 0x0C),
            HostKey::KeyJ => (Keyboard, 0x0D),
            HostKey::KeyK => (Keyboard, 0x0E),
            HostKey::KeyL => (Keyboard, 0x0F),
            HostKey::KeyM => (Keyboard, 0x10),
            HostKey::KeyN => (Keyboard, 0x11),
            HostKey::KeyO => (Keyboard, 0x12),
            HostKey::KeyP => (Keyboard, 0x13),
            HostKey::KeyQ => (Keyboard, 0x14),
            HostKey::KeyR => (Keyboard, 0x15),
            HostKey::KeyS => (Keyboard, 0x16),
            HostKey::KeyT => (Keyboard, 0x17),
            HostKey::KeyU => (Keyboard, 0x18),
            HostKey::KeyV => (Keyboard, 0x19),
            HostKey::KeyW => (Keyboard, 0x1A),
            HostKey::KeyX => (Keyboard, 0x1B),
            HostKey::KeyY => (Keyboard, 0x1C),
            HostKey::KeyZ => (Keyboard, 0x1D),
            HostKey::Digit1 => (Keyboard, 0x1E),
            HostKey::Digit2 => (Keyboard, 0x1F),
            HostKey::Digit3 => (Keyboard, 0x20),
            HostKey::Digit4 => (Keyboard, 0x21),
            HostKey::Digit5 => (Keyboard, 0x22),
            HostKey::Digit6 => (Keyboard, 0x23),
            HostKey::Digit7 => (Keyboard, 0x24),
            HostKey::Digit8 => (Keyboard, 0x25),
            HostKey::Digit9 => (Keyboard, 0x26),
            HostKey::Digit0 => (Keyboard, 0x27),
            HostKey::F1 => (Keyboard, 0x3A),
            HostKey::F2 => (Keyboard, 0x3B),
            HostKey::F3 => (Keyboard, 0x3C),
            HostKey::F4 => (Keyboard, 0x3D),
            HostKey::F5 => (Keyboard, 0x3E),
            HostKey::F6 => (Keyboard, 0x3F),
            HostKey::F7 => (Keyboard, 0x40),
            HostKey::F8 => (Keyboard, 0x41),
            HostKey::F9 => (Keyboard, 0x42),
            HostKey::F10 => (Keyboard, 0x43),
            HostKey::F11 => (Keyboard, 0x44),
            HostKey::F12 => (Keyboard, 0x45),
            HostKey::F13 => (Keyboard, 0x68),
            HostKey::F14 => (Keyboard, 0x69),
            HostKey::F15 => (Keyboard, 0x6A),
            HostKey::F16 => (Keyboard, 0x6B),
            HostKey::F17 => (Keyboard, 0x6C),
            HostKey::F18 => (Keyboard, 0x6D),
            HostKey::F19 => (Keyboard, 0x6E),
            HostKey::F20 => (Keyboard, 0x6F),
            HostKey::F21 => (Keyboard, 0x70),
            HostKey::F22 => (Keyboard, 0x71),
            HostKey::F23 => (Keyboard, 0x72),
            HostKey::F24 => (Keyboard, 0x73),
            HostKey::Enter => (Keyboard, 0x28),
            HostKey::Escape => (Keyboard, 0x29),
            HostKey::Backspace => (Keyboard, 0x2A),
            HostKey::Tab => (Keyboard, 0x2B),
            HostKey::Space => (Keyboard, 0x2C),
            HostKey::Insert => (Keyboard, 0x49),
            HostKey::Delete => (Keyboard, 0x4C),
            HostKey::Home => (Keyboard, 0x4A),
            HostKey::End => (Keyboard, 0x4D),
            HostKey::PageUp => (Keyboard, 0x4B),
            HostKey::PageDown => (Keyboard, 0x4E),
            HostKey::ArrowRight => (Keyboard, 0x4F),
            HostKey::ArrowLeft => (Keyboard, 0x50),
            HostKey::ArrowDown => (Keyboard, 0x51),
            HostKey::ArrowUp => (Keyboard, 0x52),
            HostKey::CapsLock => (Keyboard, 0x39),
            HostKey::NumLock => (Keyboard, 0x53),
            HostKey::ScrollLock => (Keyboard, 0x47),
            HostKey::Minus => (Keyboard, 0x2D),
            HostKey::Equal => (Keyboard, 0x2E),
            HostKey::BracketLeft => (Keyboard, 0x2F),
            HostKey::BracketRight => (Keyboard, 0x30),
            HostKey::Backslash => (Keyboard, 0x31),
            HostKey::Semicolon => (Keyboard, 0x33),
            HostKey::Quote => (Keyboard, 0x34),
            HostKey::Backquote => (Keyboard, 0x35),
            HostKey::Comma => (Keyboard, 0x36),
            HostKey::Period => (Keyboard, 0x37),
            HostKey::Slash => (Keyboard, 0x38),
            HostKey::PrintScreen => (Keyboard, 0x46),
            HostKey::Pause => (Keyboard, 0x48),
            HostKey::ContextMenu => (Keyboard, 0x65),
            HostKey::Numpad0 => (Keyboard, 0x62),
            HostKey::Numpad1 => (Keyboard, 0x59),
            HostKey::Numpad2 => (Keyboard, 0x5A),
            HostKey::Numpad3 => (Keyboard, 0x5B),
            HostKey::Numpad4 => (Keyboard, 0x5C),
            HostKey::Numpad5 => (Keyboard, 0x5D),
            HostKey::Numpad6 => (Keyboard, 0x5E),
            HostKey::Numpad7 => (Keyboard, 0x5F),
            HostKey::Numpad8 => (Keyboard, 0x60),
            HostKey::Numpad9 => (Keyboard, 0x61),
            HostKey::NumpadDivide => (Keyboard, 0x54),
            HostKey::NumpadMultiply => (Keyboard, 0x55),
            HostKey::NumpadSubtract => (Keyboard, 0x56),
            HostKey::NumpadAdd => (Keyboard, 0x57),
            HostKey::NumpadEnter => (Keyboard, 0x58),
            HostKey::NumpadDecimal => (Keyboard, 0x63),
            HostKey::MediaNextTrack => (Consumer, 0xB5),
            HostKey::MediaPreviousTrack => (Consumer, 0xB6),
            HostKey::MediaStop => (Consumer, 0xB7),
            HostKey::MediaPlayPause => (Consumer, 0xCD),
            HostKey::VolumeMute => (Consumer, 0xE2),
            HostKey::VolumeDown => (Consumer, 0xEA),
            HostKey::VolumeUp => (Consumer, 0xE9),
            HostKey::BrowserBack => (Consumer, 0x225),
            HostKey::BrowserForward => (Consumer, 0x224),
            HostKey::BrowserRefresh => (Consumer, 0x227),
            HostKey::BrowserStop => (Consumer, 0x226),
            HostKey::BrowserSearch => (Consumer, 0x221),
            HostKey::BrowserFavorites => (Consumer, 0x22A),
            HostKey::BrowserHome => (Consumer, 0x223),
            HostKey::LaunchMail => (Consumer, 0x18A),
            HostKey::LaunchMedia => (Consumer, 0x183),
            HostKey::LaunchApp1 => (Consumer, 0x192),
            HostKey::LaunchApp2 => (Consumer, 0x194),
            HostKey::Sleep => (Consumer, 0x32),
            HostKey::IntlYen => (Keyboard, 0x87),
            HostKey::Henkan => (Keyboard, 0x8A),
            HostKey::Muhenkan => (Keyboard, 0x8B),
            HostKey::ZenkakuHankaku => (Keyboard, 0x89),
            HostKey::KatakanaHiragana => (Keyboard, 0x88),
            HostKey::Unidentified => return None,
        };
        Some((page, code))
    }
}
