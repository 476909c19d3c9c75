//! Key combination capture and resolution.
//!
//! A capture session records the keys a user holds down while assigning a
//! slot, then resolves them into an ordered combo of at most
//! [`MAX_COMBO_KEYS`] HID codes.
//!
//! Capture rules (enforced here, not in the UI):
//!
//! - a session starts empty on focus gain and is cleared on focus loss;
//! - pressing a key already in the session is a no-op;
//! - once four keys are held, further key-downs are ignored;
//! - Backspace is never captured itself; it removes the most recently
//!   added key.
//!
//! Resolution maps each captured key through the HID table, drops keys
//! with no mapping, deduplicates by resulting code (first occurrence wins),
//! and sorts modifiers (Keyboard page 0xE0..=0xE7) before everything else,
//! ascending by code within each partition.  The ordering is a
//! device/display convention; it must simply be stable and reproducible.

use super::host::HostKey;
use super::table::{entry_for_key, is_modifier_code, HidEntry, UNASSIGNED_LABEL};

/// Maximum number of simultaneous codes in one slot.
pub const MAX_COMBO_KEYS: usize = 4;

/// Accumulates pressed keys for one slot assignment.
#[derive(Debug, Default)]
pub struct CaptureSession {
    keys: Vec<HostKey>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles one key-down event.
    ///
    /// Backspace removes the most recently added key instead of being
    /// captured.  Returns `true` if the session contents changed.
    pub fn press(&mut self, key: HostKey) -> bool {
        if key == HostKey::Backspace {
            return self.keys.pop().is_some();
        }
        if self.keys.contains(&key) || self.keys.len() >= MAX_COMBO_KEYS {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Resets the session (focus loss or an explicit clear).
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Number of captured keys, in press order.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolves the captured keys into an ordered combo.
    pub fn resolve(&self) -> ResolvedCombo {
        let mut entries: Vec<&'static HidEntry> = self
            .keys
            .iter()
            .filter_map(|&key| entry_for_key(key))
            .filter(|entry| entry.code != 0)
            .collect();

        // Dedup by code, first occurrence wins.  Two identities folding to
        // one code keeps the earlier press.
        let mut seen = Vec::with_capacity(entries.len());
        entries.retain(|entry| {
            if seen.contains(&entry.code) {
                false
            } else {
                seen.push(entry.code);
                true
            }
        });

        entries.sort_by_key(|entry| (!is_modifier_code(entry.code) as u8, entry.code));

        ResolvedCombo { entries }
    }
}

/// The ordered, deduplicated outcome of a capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCombo {
    entries: Vec<&'static HidEntry>,
}

impl ResolvedCombo {
    /// Returns `true` when no captured key mapped to a code.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The resolved codes in display order.
    pub fn code_list(&self) -> Vec<u16> {
        self.entries.iter().map(|e| e.code).collect()
    }

    /// The resolved codes zero-padded into a slot-shaped array.
    pub fn codes(&self) -> [u16; MAX_COMBO_KEYS] {
        let mut codes = [0u16; MAX_COMBO_KEYS];
        for (slot, entry) in codes.iter_mut().zip(self.entries.iter()) {
            *slot = entry.code;
        }
        codes
    }

    /// Display text: the mapped names joined with `" + "` in combo order,
    /// or `"(Unassigned)"` when empty.
    pub fn display(&self) -> String {
        if self.entries.is_empty() {
            return UNASSIGNED_LABEL.to_string();
        }
        self.entries
            .iter()
            .map(|e| e.name)
            .collect::<Vec<_>>()
            .join(" + ")
    }
}
