//! The static HID code table: human key names on the USB HID Keyboard and
//! Consumer usage pages.
//!
//! Reference: USB HID Usage Tables 1.3, Section 10 (Keyboard/Keypad page
//! 0x07) and Section 15 (Consumer page 0x0C).
//!
//! # What is a HID usage page/code? (for beginners)
//!
//! The **USB Human Interface Device (HID)** standard assigns every control a
//! two-part identifier: a *usage page* (the category) and a *usage code*
//! (the specific control within that page).  Ordinary keyboard keys live on
//! the Keyboard/Keypad page; media and system controls (Play/Pause, Volume
//! Up, Sleep) live on the Consumer page.  The macro-pad firmware selects
//! which HID report to emit based on the page, so the page is part of every
//! entry here, not an implementation detail.
//!
//! On the wire the two pages are identified by the same small integers the
//! device firmware uses: `1` for Keyboard, `2` for Consumer.
//!
//! # Table construction
//!
//! The table is authored once, in [`ENTRIES`], and never mutated.  Two
//! derived views are built lazily on first use:
//!
//! - a reverse index `(page, code) -> name` for display lookups, and
//! - the curated special-key picker catalog ([`special_keys`]).
//!
//! Duplicate `(page, code)` pairs in the authored list are tolerated: the
//! first entry in authoring order wins the name lookup.  This is a
//! deliberate, tested tie-break, not an accident of map insertion order.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::host::HostKey;

/// USB HID usage page, restricted to the two pages the macro-pad emits.
///
/// The numeric values are the wire-level page bytes used by the device
/// protocol and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum UsagePage {
    /// Keyboard/Keypad page (HID page 0x07).
    Keyboard = 1,
    /// Consumer page (HID page 0x0C).
    Consumer = 2,
}

impl UsagePage {
    /// Returns the wire-level page byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// One authored entry in the HID code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidEntry {
    /// Display name shown in the UI (e.g. `"Ctrl"`, `"Play/Pause"`).
    pub name: &'static str,
    /// Usage page the code lives on.
    pub page: UsagePage,
    /// Usage code within the page.  Never zero for an authored entry.
    pub code: u16,
}

/// One row of the special-key picker catalog.
///
/// The catalog is prefixed with a sentinel row whose `(page, code)` is
/// `(0, 0)`, meaning "no selection".  Real rows carry the wire page byte of
/// the authored entry they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialKey {
    pub name: &'static str,
    pub page: u8,
    pub code: u16,
}

impl SpecialKey {
    /// Returns `true` for the "no selection" prompt row.
    pub fn is_sentinel(&self) -> bool {
        self.page == 0 && self.code == 0
    }
}

/// Label returned by [`display_name`] for the all-zero pair.
pub const UNASSIGNED_LABEL: &str = "(Unassigned)";

/// Prompt text of the sentinel row in [`special_keys`].
const SPECIAL_KEY_PROMPT: &str = "-- Select Special Key --";

/// The authored key table.
///
/// Order matters: when two entries share a `(page, code)` pair, the first
/// one wins the reverse name lookup.
const ENTRIES: &[HidEntry] = &{
    use UsagePage::{Consumer, Keyboard};
    const fn k(name: &'static str, page: UsagePage, code: u16) -> HidEntry {
        HidEntry { name, page, code }
    }
    [
        // ── Keyboard/Keypad page ─────────────────────────────────────────
        // Modifiers (0xE0..=0xE7)
        k("Ctrl", Keyboard, 0xE0),
        k("Shift", Keyboard, 0xE1),
        k("Alt", Keyboard, 0xE2),
        k("Win", Keyboard, 0xE3),
        k("Right Ctrl", Keyboard, 0xE4),
        k("Right Shift", Keyboard, 0xE5),
        k("Right Alt", Keyboard, 0xE6),
        k("Right Win", Keyboard, 0xE7),
        // Letters (0x04..=0x1D)
        k("A", Keyboard, 0x04),
        k("B", Keyboard, 0x05),
        k("C", Keyboard, 0x06),
        k("D", Keyboard, 0x07),
        k("E", Keyboard, 0x08),
        k("F", Keyboard, 0x09),
        k("G", Keyboard, 0x0A),
        k("H", Keyboard, 0x0B),
        k("I", Keyboard, 0x0C),
        k("J", Keyboard, 0x0D),
        k("K", Keyboard, 0x0E),
        k("L", Keyboard, 0x0F),
        k("M", Keyboard, 0x10),
        k("N", Keyboard, 0x11),
        k("O", Keyboard, 0x12),
        k("P", Keyboard, 0x13),
        k("Q", Keyboard, 0x14),
        k("R", Keyboard, 0x15),
        k("S", Keyboard, 0x16),
        k("T", Keyboard, 0x17),
        k("U", Keyboard, 0x18),
        k("V", Keyboard, 0x19),
        k("W", Keyboard, 0x1A),
        k("X", Keyboard, 0x1B),
        k("Y", Keyboard, 0x1C),
        k("Z", Keyboard, 0x1D),
        // Digit row (0x1E..=0x27)
        k("1", Keyboard, 0x1E),
        k("2", Keyboard, 0x1F),
        k("3", Keyboard, 0x20),
        k("4", Keyboard, 0x21),
        k("5", Keyboard, 0x22),
        k("6", Keyboard, 0x23),
        k("7", Keyboard, 0x24),
        k("8", Keyboard, 0x25),
        k("9", Keyboard, 0x26),
        k("0", Keyboard, 0x27),
        // Function keys F1..F12 (0x3A..=0x45)
        k("F1", Keyboard, 0x3A),
        k("F2", Keyboard, 0x3B),
        k("F3", Keyboard, 0x3C),
        k("F4", Keyboard, 0x3D),
        k("F5", Keyboard, 0x3E),
        k("F6", Keyboard, 0x3F),
        k("F7", Keyboard, 0x40),
        k("F8", Keyboard, 0x41),
        k("F9", Keyboard, 0x42),
        k("F10", Keyboard, 0x43),
        k("F11", Keyboard, 0x44),
        k("F12", Keyboard, 0x45),
        // Extended function keys F13..F24 (0x68..=0x73)
        k("F13", Keyboard, 0x68),
        k("F14", Keyboard, 0x69),
        k("F15", Keyboard, 0x6A),
        k("F16", Keyboard, 0x6B),
        k("F17", Keyboard, 0x6C),
        k("F18", Keyboard, 0x6D),
        k("F19", Keyboard, 0x6E),
        k("F20", Keyboard, 0x6F),
        k("F21", Keyboard, 0x70),
        k("F22", Keyboard, 0x71),
        k("F23", Keyboard, 0x72),
        k("F24", Keyboard, 0x73),
        // Editing and whitespace
        k("Enter", Keyboard, 0x28),
        k("Escape", Keyboard, 0x29),
        k("Backspace", Keyboard, 0x2A),
        k("Tab", Keyboard, 0x2B),
        k("Space", Keyboard, 0x2C),
        // Navigation cluster
        k("Insert", Keyboard, 0x49),
        k("Delete", Keyboard, 0x4C),
        k("Home", Keyboard, 0x4A),
        k("End", Keyboard, 0x4D),
        k("PageUp", Keyboard, 0x4B),
        k("PageDown", Keyboard, 0x4E),
        k("Right", Keyboard, 0x4F),
        k("Left", Keyboard, 0x50),
        k("Down", Keyboard, 0x51),
        k("Up", Keyboard, 0x52),
        // Lock keys
        k("CapsLock", Keyboard, 0x39),
        k("NumLock", Keyboard, 0x53),
        k("ScrollLock", Keyboard, 0x47),
        // Punctuation
        k("-", Keyboard, 0x2D),
        k("=", Keyboard, 0x2E),
        k("[", Keyboard, 0x2F),
        k("]", Keyboard, 0x30),
        k("\\", Keyboard, 0x31),
        k(";", Keyboard, 0x33),
        k("'", Keyboard, 0x34),
        k("`", Keyboard, 0x35),
        k(",", Keyboard, 0x36),
        k(".", Keyboard, 0x37),
        k("/", Keyboard, 0x38),
        // Numpad
        k("Num /", Keyboard, 0x54),
        k("Num *", Keyboard, 0x55),
        k("Num -", Keyboard, 0x56),
        k("Num +", Keyboard, 0x57),
        k("Num Enter", Keyboard, 0x58),
        k("Num 1", Keyboard, 0x59),
        k("Num 2", Keyboard, 0x5A),
        k("Num 3", Keyboard, 0x5B),
        k("Num 4", Keyboard, 0x5C),
        k("Num 5", Keyboard, 0x5D),
        k("Num 6", Keyboard, 0x5E),
        k("Num 7", Keyboard, 0x5F),
        k("Num 8", Keyboard, 0x60),
        k("Num 9", Keyboard, 0x61),
        k("Num 0", Keyboard, 0x62),
        k("Num .", Keyboard, 0x63),
        // System keys
        k("PrintScreen", Keyboard, 0x46),
        k("Pause", Keyboard, 0x48),
        k("Menu", Keyboard, 0x65),
        // Japanese layout / IME keys
        k("¥", Keyboard, 0x87),
        k("Henkan", Keyboard, 0x8A),
        k("Muhenkan", Keyboard, 0x8B),
        k("Zenkaku/Hankaku", Keyboard, 0x89),
        k("Katakana/Hiragana", Keyboard, 0x88),
        // ── Consumer page ────────────────────────────────────────────────
        k("Play/Pause", Consumer, 0xCD),
        k("Stop", Consumer, 0xB7),
        k("Next Track", Consumer, 0xB5),
        k("Prev Track", Consumer, 0xB6),
        k("Fast Forward", Consumer, 0xB3),
        k("Rewind", Consumer, 0xB4),
        k("Volume Up", Consumer, 0xE9),
        k("Volume Down", Consumer, 0xEA),
        k("Mute", Consumer, 0xE2),
        k("WWW Home", Consumer, 0x223),
        k("WWW Search", Consumer, 0x221),
        k("WWW Favorites", Consumer, 0x22A),
        k("WWW Refresh", Consumer, 0x227),
        k("WWW Stop", Consumer, 0x226),
        k("WWW Forward", Consumer, 0x224),
        k("WWW Back", Consumer, 0x225),
        k("Launch Mail", Consumer, 0x18A),
        k("Launch Media", Consumer, 0x183),
        k("Launch App 1", Consumer, 0x192),
        k("Launch App 2", Consumer, 0x194),
        k("Sleep", Consumer, 0x32),
        k("Power", Consumer, 0x30),
    ]
};

/// Keyboard-page codes that belong in the special-key picker in addition to
/// F13..F24: lock keys, PrintScreen, Pause, Menu, and the Japanese
/// layout/IME keys.
const SPECIAL_KEYBOARD_CODES: &[u16] = &[
    0x46, 0x48, 0x39, 0x53, 0x47, 0x65, 0x87, 0x8A, 0x8B, 0x89, 0x88,
];

/// Builds the `(page, code) -> entry` reverse index with the documented
/// first-entry-wins tie-break for duplicates.
fn build_entry_index<'e>(entries: &'e [HidEntry]) -> HashMap<(u8, u16), &'e HidEntry> {
    let mut index = HashMap::with_capacity(entries.len());
    for entry in entries {
        // `or_insert` keeps the earlier entry when a later one collides.
        index
            .entry((entry.page.as_u8(), entry.code))
            .or_insert(entry);
    }
    index
}

fn entry_index() -> &'static HashMap<(u8, u16), &'static HidEntry> {
    static INDEX: OnceLock<HashMap<(u8, u16), &'static HidEntry>> = OnceLock::new();
    INDEX.get_or_init(|| build_entry_index(ENTRIES))
}

/// Looks up the display name for a wire-level `(page, code)` pair.
///
/// This lookup is total: `(0, 0)` is the unassigned slot and returns
/// `"(Unassigned)"`; any other pair that is not in the table returns a
/// synthesized `"Unknown(page, code)"` label.  It never fails, so callers
/// can render arbitrary device-reported codes without guarding.
pub fn display_name(page: u8, code: u16) -> String {
    if page == 0 && code == 0 {
        return UNASSIGNED_LABEL.to_string();
    }
    match entry_index().get(&(page, code)) {
        Some(entry) => entry.name.to_string(),
        None => format!("Unknown({page}, {code})"),
    }
}

/// Looks up the table entry for a captured host key.  O(1).
///
/// Returns `None` for keys with no device-side representation; the
/// combination resolver drops those silently.
pub fn entry_for_key(key: HostKey) -> Option<&'static HidEntry> {
    let (page, code) = key.usage()?;
    // The authored table is the source of truth for names; a host key whose
    // usage is not authored has no display name and therefore no mapping.
    entry_index().get(&(page.as_u8(), code)).copied()
}

/// Returns the special-key picker catalog.
///
/// The catalog holds every Consumer-page entry, the extended function keys
/// F13..F24, and the fixed Keyboard-page set in [`SPECIAL_KEYBOARD_CODES`],
/// sorted by page ascending and then by name ascending (byte-wise,
/// case-sensitive).  The first row is always the "no selection" sentinel.
pub fn special_keys() -> &'static [SpecialKey] {
    static CATALOG: OnceLock<Vec<SpecialKey>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        let mut keys: Vec<SpecialKey> = ENTRIES
            .iter()
            .filter(|e| {
                e.page == UsagePage::Consumer
                    || (e.page == UsagePage::Keyboard && (0x68..=0x73).contains(&e.code))
                    || (e.page == UsagePage::Keyboard && SPECIAL_KEYBOARD_CODES.contains(&e.code))
            })
            .map(|e| SpecialKey {
                name: e.name,
                page: e.page.as_u8(),
                code: e.code,
            })
            .collect();
        keys.sort_by(|a, b| a.page.cmp(&b.page).then(a.name.cmp(b.name)));
        let mut catalog = Vec::with_capacity(keys.len() + 1);
        catalog.push(SpecialKey {
            name: SPECIAL_KEY_PROMPT,
            page: 0,
            code: 0,
        });
        catalog.extend(keys);
        catalog
    })
}

/// Returns `true` when `code` is a Keyboard-page modifier (0xE0..=0xE7).
///
/// Modifiers sort before all other codes in a combo; see
/// [`crate::keymap::combo`].
pub fn is_modifier_code(code: u16) -> bool {
    (0xE0..=0xE7).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_returns_authored_names() {
        // Spot checks across both pages.
        assert_eq!(display_name(1, 0x04), "A");
        assert_eq!(display_name(1, 0xE0), "Ctrl");
        assert_eq!(display_name(1, 0x68), "F13");
        assert_eq!(display_name(2, 0xCD), "Play/Pause");
        assert_eq!(display_name(2, 0x223), "WWW Home");
    }

    #[test]
    fn test_display_name_zero_pair_is_unassigned() {
        assert_eq!(display_name(0, 0), "(Unassigned)");
    }

    #[test]
    fn test_display_name_unknown_pair_is_synthesized() {
        assert_eq!(display_name(9, 9999), "Unknown(9, 9999)");
        // Page 0 with a nonzero code is not the unassigned pair.
        assert_eq!(display_name(0, 5), "Unknown(0, 5)");
    }

    #[test]
    fn test_authored_table_has_no_duplicate_pairs() {
        // The tie-break exists as a guarantee, but the authored table itself
        // must stay collision-free so every name is reachable.
        let mut seen = std::collections::HashSet::new();
        for e in ENTRIES {
            assert!(
                seen.insert((e.page, e.code)),
                "duplicate authored pair: {:?} 0x{:02X}",
                e.page,
                e.code
            );
        }
    }

    #[test]
    fn test_entry_index_prefers_first_entry_on_duplicates() {
        // Arrange: a synthetic list with a colliding pair.
        let entries = [
            HidEntry {
                name: "First",
                page: UsagePage::Keyboard,
                code: 0x10,
            },
            HidEntry {
                name: "Second",
                page: UsagePage::Keyboard,
                code: 0x10,
            },
        ];

        // Act
        let index = build_entry_index(&entries);

        // Assert
        assert_eq!(index.get(&(1, 0x10)).map(|e| e.name), Some("First"));
    }

    #[test]
    fn test_special_keys_starts_with_sentinel() {
        let catalog = special_keys();
        assert!(catalog[0].is_sentinel());
        assert_eq!(catalog[0].name, "-- Select Special Key --");
    }

    #[test]
    fn test_special_keys_sorted_by_page_then_name() {
        let catalog = &special_keys()[1..];
        for window in catalog.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            assert!(
                (a.page, a.name) <= (b.page, b.name),
                "{:?} must sort before {:?}",
                a,
                b
            );
        }
    }

    #[test]
    fn test_special_keys_includes_extended_function_keys() {
        let catalog = special_keys();
        for code in 0x68..=0x73u16 {
            assert!(
                catalog.iter().any(|s| s.page == 1 && s.code == code),
                "F-key code 0x{code:02X} missing from catalog"
            );
        }
    }

    #[test]
    fn test_special_keys_includes_all_consumer_entries() {
        let catalog = special_keys();
        let consumer_count = ENTRIES
            .iter()
            .filter(|e| e.page == UsagePage::Consumer)
            .count();
        assert_eq!(
            catalog.iter().filter(|s| s.page == 2).count(),
            consumer_count
        );
    }

    #[test]
    fn test_special_keys_excludes_plain_keys() {
        let catalog = special_keys();
        // Letters, digits, and F1..F12 are assignable through key capture,
        // not the picker.
        assert!(!catalog.iter().any(|s| s.page == 1 && s.code == 0x04)); // A
        assert!(!catalog.iter().any(|s| s.page == 1 && s.code == 0x3A)); // F1
        assert!(!catalog.iter().any(|s| s.page == 1 && s.code == 0xE0)); // Ctrl
    }

    #[test]
    fn test_special_keys_includes_ime_and_lock_keys() {
        let catalog = special_keys();
        for &code in SPECIAL_KEYBOARD_CODES {
            assert!(
                catalog.iter().any(|s| s.page == 1 && s.code == code),
                "special keyboard code 0x{code:02X} missing from catalog"
            );
        }
    }

    #[test]
    fn test_is_modifier_code_bounds() {
        assert!(is_modifier_code(0xE0));
        assert!(is_modifier_code(0xE7));
        assert!(!is_modifier_code(0xDF));
        assert!(!is_modifier_code(0xE8));
        assert!(!is_modifier_code(0x04));
    }

    #[test]
    fn test_entry_for_key_maps_known_keys() {
        let entry = entry_for_key(HostKey::KeyA).expect("A must map");
        assert_eq!(entry.name, "A");
        assert_eq!(entry.page, UsagePage::Keyboard);
        assert_eq!(entry.code, 0x04);

        let entry = entry_for_key(HostKey::MediaPlayPause).expect("Play/Pause must map");
        assert_eq!(entry.page, UsagePage::Consumer);
        assert_eq!(entry.code, 0xCD);
    }
}
