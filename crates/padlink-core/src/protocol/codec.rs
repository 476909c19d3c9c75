//! Textual codec for the serial line protocol.
//!
//! Encoding is bit-exact against the device firmware's parser: 13 groups of
//! `kind,c0,c1,c2,c3` joined by commas, decimal values, no spaces.
//!
//! Decoding is deliberately lenient.  The firmware prints well-formed
//! lines, but serial links drop bytes and users plug in half-flashed
//! devices, so every parse failure is contained to the smallest possible
//! scope: a slot whose kind byte does not parse is skipped (keeping its
//! prior value), an unparseable code is treated as absent, and an
//! unrecognized line becomes [`ProtocolEvent::Unrecognized`] instead of an
//! error.  Nothing in this module can fail the session.

use tracing::trace;

use crate::keymap::combo::MAX_COMBO_KEYS;
use crate::protocol::messages::{
    ProtocolEvent, ACK_LINE, CMD_PREFIX, CONFIG_PREFIX, SET_CONFIG_PREFIX,
};
use crate::slots::{AssignmentKind, ConfigTable, SLOT_COUNT};

/// Values per slot on the wire: the kind byte plus four codes.
const VALUES_PER_SLOT: usize = 1 + MAX_COMBO_KEYS;

/// Encodes the full table as a `SET_CONFIG:` line (without the newline).
///
/// Command slots emit kind 3 with all-zero codes; their command text lives
/// only on the host and is never placed on the wire.
pub fn encode_set_config(table: &ConfigTable) -> String {
    let groups: Vec<String> = table
        .iter()
        .map(|slot| {
            let codes = if slot.kind() == AssignmentKind::Command {
                [0u16; MAX_COMBO_KEYS]
            } else {
                slot.codes()
            };
            format!(
                "{},{},{},{},{}",
                slot.kind().as_u8(),
                codes[0],
                codes[1],
                codes[2],
                codes[3]
            )
        })
        .collect();
    format!("{SET_CONFIG_PREFIX}{}", groups.join(","))
}

/// Applies a `CONFIG:` payload (the flat 13x5 comma list) to the table.
///
/// Best-effort per slot:
///
/// - a 5-tuple whose kind byte is not a small unsigned integer is skipped
///   and the slot keeps its prior value;
/// - a numeric kind outside 0..=3 resets the slot to Unassigned, matching
///   how the source UI coerces unknown types;
/// - unparseable or zero code values are treated as absent and compacted
///   out of the populated prefix;
/// - a truncated payload applies the slots it covers and stops.
///
/// Returns the number of slots that were applied.
pub fn apply_config(table: &mut ConfigTable, payload: &str) -> usize {
    let parts: Vec<&str> = payload.split(',').collect();
    let mut applied = 0;

    for index in 0..SLOT_COUNT {
        let base = index * VALUES_PER_SLOT;
        if base >= parts.len() {
            break;
        }

        let kind_byte: u8 = match parts[base].trim().parse() {
            Ok(byte) => byte,
            Err(_) => {
                trace!(slot = index, field = parts[base], "skipping slot with unparseable kind");
                continue;
            }
        };

        // Unknown numeric kinds coerce to Unassigned rather than being
        // skipped; the device never reports them, but a corrupted byte
        // should not leave a phantom assignment on screen.
        let kind = AssignmentKind::try_from(kind_byte).unwrap_or(AssignmentKind::Unassigned);

        let mut codes = [0u16; MAX_COMBO_KEYS];
        let mut populated = 0;
        for offset in 0..MAX_COMBO_KEYS {
            let Some(field) = parts.get(base + 1 + offset) else {
                break;
            };
            if let Ok(code) = field.trim().parse::<u16>() {
                if code != 0 {
                    codes[populated] = code;
                    populated += 1;
                }
            }
        }

        let Some(slot) = table.get_mut(index) else {
            break;
        };
        slot.overwrite(kind, codes);
        applied += 1;
    }

    applied
}

/// Decodes one framed inbound line into a typed event.
///
/// Total: every line decodes to *some* event; unknown shapes become
/// [`ProtocolEvent::Unrecognized`] and are ignored upstream.
pub fn decode_event(line: &str) -> ProtocolEvent {
    if line == ACK_LINE {
        return ProtocolEvent::Ack;
    }
    if let Some(payload) = line.strip_prefix(CONFIG_PREFIX) {
        return ProtocolEvent::ConfigReport(payload.to_string());
    }
    if let Some(index) = line.strip_prefix(CMD_PREFIX) {
        if let Ok(index) = index.trim().parse::<i32>() {
            return ProtocolEvent::RunCommand(index);
        }
    }
    ProtocolEvent::Unrecognized(line.to_string())
}
