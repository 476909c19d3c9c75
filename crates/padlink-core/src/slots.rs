//! The 13-slot configuration model.
//!
//! The macro-pad exposes 13 programmable inputs: 8 physical keys and 5
//! rotary-encoder gestures.  Each slot stores an [`AssignmentKind`] and up
//! to four HID codes.  Command slots additionally carry a shell command
//! string, which lives only on the host; the device never sees it and only
//! reports the slot index back when the slot is triggered.
//!
//! [`ConfigTable`] is the single source of truth for what gets pushed on
//! `SET_CONFIG` and what a device `CONFIG:` report is decoded into.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keymap::combo::{ResolvedCombo, MAX_COMBO_KEYS};
use crate::keymap::table::{
    display_name, is_modifier_code, special_keys, SpecialKey, UsagePage, UNASSIGNED_LABEL,
};

/// Number of programmable slots: 8 keys + 5 encoder gestures.
pub const SLOT_COUNT: usize = 13;

/// UI labels for the 13 slots, in device index order.
pub const SLOT_LABELS: [&str; SLOT_COUNT] = [
    "Key 1:",
    "Key 2:",
    "Key 3:",
    "Key 4:",
    "Key 5:",
    "Key 6:",
    "Key 7:",
    "Key 8:",
    "Encoder CW:",
    "Encoder CCW:",
    "Encoder SW:",
    "Encoder SW+CW:",
    "Encoder SW+CCW:",
];

/// Raised when a wire kind byte is not one of the four known values.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown assignment kind: {0}")]
pub struct InvalidKindError(pub u8);

/// What a slot is assigned to.
///
/// The numeric values are the wire-level "type" byte shared with the device
/// firmware and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AssignmentKind {
    /// Slot does nothing.
    Unassigned = 0,
    /// Up to four Keyboard-page codes pressed together.
    KeyCombo = 1,
    /// A single code from the special-key picker, emitted on the Consumer
    /// report by the device.
    SpecialKey = 2,
    /// The device reports the slot index back and the host runs the
    /// locally-stored shell command.
    Command = 3,
}

impl AssignmentKind {
    /// Returns the wire-level type byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for AssignmentKind {
    type Error = InvalidKindError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AssignmentKind::Unassigned),
            1 => Ok(AssignmentKind::KeyCombo),
            2 => Ok(AssignmentKind::SpecialKey),
            3 => Ok(AssignmentKind::Command),
            other => Err(InvalidKindError(other)),
        }
    }
}

/// One configuration row.
///
/// Invariants maintained by the mutators:
/// - `codes` holds a populated prefix of nonzero codes followed by zeros,
///   with no duplicate nonzero entries;
/// - `Unassigned` slots have all-zero codes and no command text;
/// - `Command` slots carry all-zero codes on the wire; the text stays local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    index: u8,
    kind: AssignmentKind,
    codes: [u16; MAX_COMBO_KEYS],
    command_text: Option<String>,
}

impl SlotEntry {
    fn new(index: u8) -> Self {
        Self {
            index,
            kind: AssignmentKind::Unassigned,
            codes: [0; MAX_COMBO_KEYS],
            command_text: None,
        }
    }

    /// The 0-based device slot index.
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn kind(&self) -> AssignmentKind {
        self.kind
    }

    /// The raw code array, populated prefix then zeros.
    pub fn codes(&self) -> [u16; MAX_COMBO_KEYS] {
        self.codes
    }

    /// The populated (nonzero) prefix of the code array.
    pub fn populated_codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.codes.iter().copied().take_while(|&c| c != 0)
    }

    /// The locally-held shell command, when this is a Command slot.
    pub fn command_text(&self) -> Option<&str> {
        self.command_text.as_deref()
    }

    /// Resets the slot to Unassigned, dropping codes and command text.
    pub fn clear(&mut self) {
        self.kind = AssignmentKind::Unassigned;
        self.codes = [0; MAX_COMBO_KEYS];
        self.command_text = None;
    }

    /// Assigns a resolved key combination.  An empty combo unassigns the
    /// slot.
    pub fn assign_combo(&mut self, combo: &ResolvedCombo) {
        if combo.is_empty() {
            self.clear();
            return;
        }
        self.kind = AssignmentKind::KeyCombo;
        self.codes = combo.codes();
    }

    /// Assigns a special key from the picker catalog.  The sentinel prompt
    /// row is a no-op.
    pub fn assign_special(&mut self, key: &SpecialKey) {
        if key.is_sentinel() {
            return;
        }
        self.kind = AssignmentKind::SpecialKey;
        self.codes = [key.code, 0, 0, 0];
    }

    /// Assigns a host-side shell command.  Codes are zeroed: the device
    /// only ever sees kind 3 for this slot.
    pub fn assign_command(&mut self, text: impl Into<String>) {
        self.kind = AssignmentKind::Command;
        self.codes = [0; MAX_COMBO_KEYS];
        self.command_text = Some(text.into());
    }

    /// Attaches command text without touching the kind.  Used when loading
    /// the persisted command map before the device config arrives.
    pub fn set_command_text(&mut self, text: impl Into<String>) {
        self.command_text = Some(text.into());
    }

    /// Overwrites kind and codes wholesale.  Decode path only: the caller
    /// (the wire codec) has already compacted zeros out of the prefix.
    pub(crate) fn overwrite(&mut self, kind: AssignmentKind, codes: [u16; MAX_COMBO_KEYS]) {
        self.kind = kind;
        self.codes = codes;
        if kind == AssignmentKind::Unassigned {
            self.codes = [0; MAX_COMBO_KEYS];
            self.command_text = None;
        }
    }

    /// Derives the display label for this slot.
    ///
    /// Key combos re-sort their codes (modifiers first, then ascending) and
    /// drop names that fail the table lookup, so a device-reported code the
    /// host does not know is omitted rather than rendered as `Unknown(...)`.
    pub fn display_text(&self) -> String {
        match self.kind {
            AssignmentKind::Unassigned => UNASSIGNED_LABEL.to_string(),
            AssignmentKind::KeyCombo => {
                let mut codes: Vec<u16> = self.populated_codes().collect();
                codes.sort_by_key(|&c| (!is_modifier_code(c) as u8, c));
                let names: Vec<String> = codes
                    .iter()
                    .map(|&c| display_name(UsagePage::Keyboard.as_u8(), c))
                    .filter(|name| !name.starts_with("Unknown"))
                    .collect();
                if names.is_empty() {
                    UNASSIGNED_LABEL.to_string()
                } else {
                    names.join(" + ")
                }
            }
            AssignmentKind::SpecialKey => match self.populated_codes().next() {
                None => UNASSIGNED_LABEL.to_string(),
                Some(code) => special_keys()
                    .iter()
                    .filter(|s| !s.is_sentinel())
                    .find(|s| s.code == code)
                    .map(|s| s.name.to_string())
                    .unwrap_or_else(|| display_name(UsagePage::Consumer.as_u8(), code)),
            },
            AssignmentKind::Command => "(Command)".to_string(),
        }
    }
}

/// The full 13-slot configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigTable {
    slots: Vec<SlotEntry>,
}

impl ConfigTable {
    /// Creates a table of 13 unassigned slots, indices 0..=12.
    pub fn new() -> Self {
        Self {
            slots: (0..SLOT_COUNT as u8).map(SlotEntry::new).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&SlotEntry> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SlotEntry> {
        self.slots.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotEntry> {
        self.slots.iter()
    }

    /// Iterates the Command slots that carry non-blank text, for
    /// persistence.
    pub fn command_slots(&self) -> impl Iterator<Item = (u8, &str)> {
        self.slots.iter().filter_map(|slot| {
            if slot.kind() != AssignmentKind::Command {
                return None;
            }
            slot.command_text()
                .filter(|text| !text.trim().is_empty())
                .map(|text| (slot.index(), text))
        })
    }
}

impl Default for ConfigTable {
    fn default() -> Self {
        Self::new()
    }
}
