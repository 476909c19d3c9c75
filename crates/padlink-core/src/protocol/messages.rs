//! Typed protocol messages and line constants.
//!
//! The device speaks newline-terminated ASCII lines at 115200 baud:
//!
//! ```text
//! → GET_CONFIG                          request a full configuration dump
//! → SET_CONFIG:<13 x "kind,c0,c1,c2,c3">  push all 13 slots
//! → SONG_INFO:<title>,<status>,<pos>,<dur>  now-playing push
//! ← OK                                  generic acknowledgement
//! ← CONFIG:<payload>                    device-reported configuration
//! ← CMD:<index>                         run the Command slot at index
//! ```
//!
//! The protocol carries no correlation ids; `OK` is disambiguated by the
//! session (a pending SONG_INFO push claims it first, otherwise it means
//! the last SET_CONFIG write succeeded).

/// Outbound request for a full configuration dump.
pub const GET_CONFIG: &str = "GET_CONFIG";

/// Outbound configuration push prefix.
pub const SET_CONFIG_PREFIX: &str = "SET_CONFIG:";

/// Outbound now-playing push prefix.
pub const SONG_INFO_PREFIX: &str = "SONG_INFO:";

/// Inbound generic acknowledgement line.
pub const ACK_LINE: &str = "OK";

/// Inbound configuration report prefix.
pub const CONFIG_PREFIX: &str = "CONFIG:";

/// Inbound command-trigger prefix.
pub const CMD_PREFIX: &str = "CMD:";

/// Title shown when no media session is active (or the session has no
/// title).  Chosen to fit the device's 128px display without scrolling.
pub const IDLE_TITLE: &str = "Waiting for the beat...";

/// Maximum title length after ASCII filtering; the device buffer is small.
pub const MAX_TITLE_LEN: usize = 50;

/// One decoded inbound line.
///
/// `Unrecognized` is not an error: the device emits human-readable
/// diagnostics for some commands (e.g. `RESET_CONFIG`) and future firmware
/// may add lines this host does not know.  Callers log and move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// `OK`: resolves a pending SONG_INFO push if one exists, otherwise
    /// signals that the last configuration write succeeded.
    Ack,
    /// `CONFIG:` with the raw 13x5 payload still attached.
    ConfigReport(String),
    /// `CMD:` with a parseable slot index.  The index is taken verbatim;
    /// bounds checking happens at the session layer.
    RunCommand(i32),
    /// Anything else, carried for diagnostics.
    Unrecognized(String),
}

/// A now-playing snapshot, produced by the media collaborator.
///
/// The title arrives already transliterated to an ASCII-representable
/// string; this type owns the wire-side sanitization (printable ASCII only,
/// truncation, comma stripping, since the comma is the field separator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongInfo {
    pub title: String,
    pub playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
}

impl SongInfo {
    /// The snapshot pushed when no media session is active.
    pub fn idle() -> Self {
        Self {
            title: IDLE_TITLE.to_string(),
            playing: false,
            position_ms: 0,
            duration_ms: 0,
        }
    }

    /// Formats the comma-separated payload (without the line prefix).
    ///
    /// A blank title degrades to [`IDLE_TITLE`] while keeping the real
    /// playback fields.
    pub fn payload(&self) -> String {
        let title = if self.title.trim().is_empty() {
            IDLE_TITLE.to_string()
        } else {
            sanitize_title(&self.title)
        };
        let status = if self.playing { "1" } else { "0" };
        format!(
            "{title},{status},{},{}",
            self.position_ms, self.duration_ms
        )
    }

    /// Formats the full `SONG_INFO:` line.
    pub fn to_line(&self) -> String {
        format!("{SONG_INFO_PREFIX}{}", self.payload())
    }
}

/// Reduces a transliterated title to what the wire accepts: printable
/// ASCII (0x20..=0x7E), at most [`MAX_TITLE_LEN`] characters, no commas.
fn sanitize_title(title: &str) -> String {
    let filtered: String = title
        .chars()
        .filter(|&c| ('\u{20}'..='\u{7E}').contains(&c))
        .take(MAX_TITLE_LEN)
        .collect();
    filtered.replace(',', "")
}
