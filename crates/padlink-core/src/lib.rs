//! # padlink-core
//!
//! Shared library for PadLink containing the serial wire codec, the slot
//! configuration model, and the key code translation tables.
//!
//! This crate is used by the host application and has zero dependencies on
//! OS APIs, UI frameworks, or the serial port itself.
//!
//! # Architecture overview (for beginners)
//!
//! PadLink talks to a small USB macro-pad: 8 physical keys plus a rotary
//! encoder that produces 5 distinct gestures (turn, press, press-and-turn),
//! for a total of 13 programmable "slots".  The device stores, for each
//! slot, an assignment kind and up to four USB HID key codes, and plays
//! them back as real keyboard/consumer input when the slot is triggered.
//!
//! This crate defines:
//!
//! - **`keymap`** – The static HID code table (human key names on the
//!   Keyboard and Consumer usage pages), the [`HostKey`] identities the
//!   capture layer reports, and the resolver that turns a captured key
//!   sequence into an ordered combo of at most four codes.
//!
//! - **`slots`** – The 13-entry configuration table: assignment kinds,
//!   per-slot codes, and the locally-held command text for Command slots.
//!
//! - **`protocol`** – How lines travel over the serial link.  Outbound
//!   commands are encoded as newline-terminated ASCII lines and inbound
//!   bytes are reassembled into typed [`ProtocolEvent`]s by the
//!   [`LineFramer`] and codec.

pub mod keymap;
pub mod protocol;
pub mod slots;

// Re-export the most-used types at the crate root so callers can write
// `padlink_core::ConfigTable` instead of `padlink_core::slots::ConfigTable`.
pub use keymap::combo::{CaptureSession, ResolvedCombo};
pub use keymap::host::HostKey;
pub use keymap::table::{display_name, entry_for_key, special_keys, HidEntry, SpecialKey, UsagePage};
pub use protocol::codec::{apply_config, decode_event, encode_set_config};
pub use protocol::framer::LineFramer;
pub use protocol::messages::{ProtocolEvent, SongInfo};
pub use slots::{AssignmentKind, ConfigTable, SlotEntry, SLOT_COUNT};
