//! The serial line protocol: typed events, the textual codec, and the
//! byte-stream framer.

pub mod codec;
pub mod framer;
pub mod messages;

pub use codec::{apply_config, decode_event, encode_set_config};
pub use framer::LineFramer;
pub use messages::{ProtocolEvent, SongInfo};
