//! The media-status collaborator seam.
//!
//! The session does not talk to any media player itself.  A
//! [`NowPlayingSource`] implementation polls whatever the platform offers
//! (GSMTC on Windows, MPRIS on Linux) and returns the current snapshot
//! with the title already transliterated to an ASCII-representable string;
//! wire-side sanitization happens in `padlink_core::SongInfo`.

use padlink_core::SongInfo;

/// Supplies the current now-playing snapshot on each media tick.
pub trait NowPlayingSource: Send {
    /// Returns the active media session's snapshot, or `None` when no
    /// session is playing anything (the device then shows the idle text).
    fn now_playing(&mut self) -> Option<SongInfo>;
}

/// Placeholder source for headless runs and platforms without an
/// integration: reports no active session, so the device displays the
/// idle text.
#[derive(Debug, Default)]
pub struct IdleMediaSource;

impl NowPlayingSource for IdleMediaSource {
    fn now_playing(&mut self) -> Option<SongInfo> {
        None
    }
}
