//! Application layer: the device session and the media-push synchronizer.

pub mod media_sync;
pub mod session;

pub use media_sync::{AckOutcome, MediaPushSynchronizer};
pub use session::{DeviceSession, SessionEvent};
