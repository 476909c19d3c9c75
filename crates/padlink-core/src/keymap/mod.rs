//! Key code translation: the static HID table, host key identities, and
//! the combination resolver.

pub mod combo;
pub mod host;
pub mod table;

pub use combo::{CaptureSession, ResolvedCombo};
pub use host::HostKey;
pub use table::{display_name, entry_for_key, special_keys, HidEntry, SpecialKey, UsagePage};
