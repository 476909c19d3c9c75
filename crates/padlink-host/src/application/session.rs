//! The device session: one serialized event-processing point per
//! connected macro-pad.
//!
//! All shared state (the slot table, the line framer, the media-push
//! synchronizer) is owned by [`DeviceSession`] and touched only from the
//! task that drives it.  The transport's read task and the media timer both
//! funnel into that task through channels, so inbound lines are processed
//! strictly in arrival order and no lock is needed anywhere.
//!
//! The `OK` line is ambiguous by design (the protocol has no correlation
//! ids): a pending SONG_INFO push claims it first; otherwise it is the
//! acknowledgement for the last configuration write and is surfaced to the
//! status collaborator as [`SessionEvent::ConfigWritten`].

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use padlink_core::protocol::messages::GET_CONFIG;
use padlink_core::{
    apply_config, decode_event, encode_set_config, AssignmentKind, ConfigTable, LineFramer,
    ProtocolEvent, SongInfo,
};

use crate::application::media_sync::{AckOutcome, MediaPushSynchronizer};
use crate::infrastructure::command_exec::CommandRunner;
use crate::infrastructure::storage::commands::CommandStore;

/// Narrow notification surface for the UI/status collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A `CONFIG:` report was decoded into the table.
    ConfigLoaded { slots_applied: usize },
    /// The device acknowledged the last `SET_CONFIG` write.
    ConfigWritten,
    /// A Command slot was launched on device request.
    CommandLaunched { slot: u8 },
    /// A Command slot failed to launch.
    CommandFailed { slot: u8, error: String },
}

/// See the module docs.
pub struct DeviceSession<R: CommandRunner> {
    table: ConfigTable,
    framer: LineFramer,
    media: MediaPushSynchronizer,
    runner: R,
    store: CommandStore,
    outbound: mpsc::UnboundedSender<String>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<R: CommandRunner> DeviceSession<R> {
    /// Creates a session with a fresh table and attaches the persisted
    /// command texts to their slots.
    ///
    /// A broken command file is logged and treated as empty; it must not
    /// prevent connecting to the device.
    pub fn new(
        runner: R,
        store: CommandStore,
        outbound: mpsc::UnboundedSender<String>,
        events: mpsc::UnboundedSender<SessionEvent>,
        media: MediaPushSynchronizer,
    ) -> Self {
        let mut table = ConfigTable::new();
        match store.load() {
            Ok(saved) => {
                for (index, text) in saved {
                    if let Some(slot) = table.get_mut(index as usize) {
                        slot.set_command_text(text);
                    }
                }
            }
            Err(e) => warn!(error = %e, "could not load command map; starting empty"),
        }

        Self {
            table,
            framer: LineFramer::new(),
            media,
            runner,
            store,
            outbound,
            events,
        }
    }

    /// The configuration table, for the UI collaborator to render.
    pub fn table(&self) -> &ConfigTable {
        &self.table
    }

    /// Mutable access for local edits (capture, picker, command text).
    pub fn table_mut(&mut self) -> &mut ConfigTable {
        &mut self.table
    }

    /// Feeds one inbound byte chunk; complete lines are decoded and
    /// dispatched in arrival order.
    pub fn handle_bytes(&mut self, bytes: &[u8]) {
        for line in self.framer.feed(bytes) {
            self.dispatch(decode_event(&line));
        }
    }

    fn dispatch(&mut self, event: ProtocolEvent) {
        match event {
            ProtocolEvent::Ack => match self.media.on_ack() {
                AckOutcome::PushAcknowledged => {}
                AckOutcome::NotWaiting => {
                    info!("configuration write acknowledged");
                    self.notify(SessionEvent::ConfigWritten);
                }
            },
            ProtocolEvent::ConfigReport(payload) => {
                let slots_applied = apply_config(&mut self.table, &payload);
                info!(slots_applied, "configuration loaded from device");
                self.notify(SessionEvent::ConfigLoaded { slots_applied });
            }
            ProtocolEvent::RunCommand(index) => self.run_command(index),
            ProtocolEvent::Unrecognized(line) => {
                trace!(line = %line, "ignoring unrecognized line");
            }
        }
    }

    fn run_command(&mut self, index: i32) {
        let Ok(index) = usize::try_from(index) else {
            debug!(index, "command index out of range");
            return;
        };
        let Some(slot) = self.table.get(index) else {
            debug!(index, "command index out of range");
            return;
        };
        if slot.kind() != AssignmentKind::Command {
            debug!(index, "slot is not a Command slot; ignoring trigger");
            return;
        }
        let command = slot.command_text().map(str::trim).unwrap_or_default();
        if command.is_empty() {
            debug!(index, "Command slot has no command text");
            return;
        }

        let slot_index = slot.index();
        match self.runner.run(slot_index, command) {
            Ok(()) => self.notify(SessionEvent::CommandLaunched { slot: slot_index }),
            Err(e) => {
                warn!(slot = slot_index, error = %e, "command launch failed");
                self.notify(SessionEvent::CommandFailed {
                    slot: slot_index,
                    error: e.to_string(),
                });
            }
        }
    }

    /// Handles one media tick with the current now-playing snapshot.
    ///
    /// A failed write means the transport is gone and no ACK will ever
    /// arrive, so it is treated exactly like a timeout.
    pub fn handle_tick(&mut self, info: SongInfo, now: Instant) {
        if let Some(line) = self.media.on_tick(info.payload(), now) {
            if !self.send_line(line) {
                self.media.on_timeout();
            }
        }
    }

    /// The deadline the session loop must race against inbound lines.
    pub fn ack_deadline(&self) -> Option<Instant> {
        self.media.deadline()
    }

    /// Expires the outstanding media push.
    pub fn handle_ack_timeout(&mut self) {
        self.media.on_timeout();
    }

    /// Requests a full configuration dump (sent right after connecting).
    pub fn request_config(&mut self) {
        self.send_line(GET_CONFIG.to_string());
    }

    /// Encodes and writes the full table, then persists the command map.
    ///
    /// The device answers with a bare `OK`, surfaced later as
    /// [`SessionEvent::ConfigWritten`].
    pub fn push_config(&mut self) {
        let line = encode_set_config(&self.table);
        self.send_line(line);
        if let Err(e) = self.store.save(self.table.command_slots()) {
            warn!(error = %e, "could not persist command map");
        }
    }

    /// Disconnect cancellation: abandons any pending media push and drops
    /// buffered partial input.  The table is kept so a reconnect can diff
    /// against what the user last saw.
    pub fn handle_disconnect(&mut self) {
        self.media.reset();
        self.framer.reset();
    }

    fn send_line(&self, line: String) -> bool {
        match self.outbound.send(line) {
            Ok(()) => true,
            Err(_) => {
                warn!("transport closed; dropping outbound line");
                false
            }
        }
    }

    fn notify(&self, event: SessionEvent) {
        // A departed UI is not an error; events are best-effort.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::media_sync::DEFAULT_ACK_TIMEOUT;
    use crate::infrastructure::command_exec::MockCommandRunner;

    struct Harness {
        session: DeviceSession<MockCommandRunner>,
        outbound: mpsc::UnboundedReceiver<String>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
    }

    fn temp_store(name: &str) -> CommandStore {
        let dir = std::env::temp_dir().join(format!(
            "padlink_session_{name}_{}",
            std::process::id()
        ));
        CommandStore::new(dir.join("commands.json"))
    }

    fn harness(runner: MockCommandRunner, store: CommandStore) -> Harness {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Harness {
            session: DeviceSession::new(
                runner,
                store,
                outbound_tx,
                events_tx,
                MediaPushSynchronizer::new(DEFAULT_ACK_TIMEOUT),
            ),
            outbound: outbound_rx,
            events: events_rx,
        }
    }

    fn song(title: &str) -> SongInfo {
        SongInfo {
            title: title.to_string(),
            playing: true,
            position_ms: 0,
            duration_ms: 60_000,
        }
    }

    // ── OK routing ───────────────────────────────────────────────────────

    #[test]
    fn test_ok_with_pending_push_resolves_the_push_silently() {
        let mut h = harness(MockCommandRunner::new(), temp_store("ack_media"));
        h.session.handle_tick(song("A"), Instant::now());
        assert!(h.outbound.try_recv().is_ok());

        h.session.handle_bytes(b"OK\n");

        // The push ACK is internal; no ConfigWritten must surface.
        assert!(h.events.try_recv().is_err());
        assert_eq!(h.session.ack_deadline(), None);
    }

    #[test]
    fn test_ok_while_idle_surfaces_config_written() {
        let mut h = harness(MockCommandRunner::new(), temp_store("ack_config"));

        h.session.handle_bytes(b"OK\n");

        assert_eq!(h.events.try_recv().ok(), Some(SessionEvent::ConfigWritten));
    }

    // ── CONFIG: handling ─────────────────────────────────────────────────

    #[test]
    fn test_config_report_updates_table_and_notifies() {
        let mut h = harness(MockCommandRunner::new(), temp_store("config"));

        h.session.handle_bytes(b"CONFIG:1,4,0,0,0,2,205,0,0,0\n");

        assert_eq!(
            h.events.try_recv().ok(),
            Some(SessionEvent::ConfigLoaded { slots_applied: 2 })
        );
        let table = h.session.table();
        assert_eq!(table.get(0).unwrap().kind(), AssignmentKind::KeyCombo);
        assert_eq!(table.get(0).unwrap().codes(), [4, 0, 0, 0]);
        assert_eq!(table.get(1).unwrap().kind(), AssignmentKind::SpecialKey);
    }

    #[test]
    fn test_line_split_across_chunks_dispatches_once_complete() {
        let mut h = harness(MockCommandRunner::new(), temp_store("split"));

        h.session.handle_bytes(b"CONFIG:1,4,0");
        assert!(h.events.try_recv().is_err(), "no event before terminator");

        h.session.handle_bytes(b",0,0\n");
        assert_eq!(
            h.events.try_recv().ok(),
            Some(SessionEvent::ConfigLoaded { slots_applied: 1 })
        );
    }

    // ── CMD: handling ────────────────────────────────────────────────────

    #[test]
    fn test_cmd_runs_the_assigned_command() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|slot, command| *slot == 2 && command == "calc.exe")
            .times(1)
            .returning(|_, _| Ok(()));
        let mut h = harness(runner, temp_store("cmd_run"));
        h.session.table_mut().get_mut(2).unwrap().assign_command("calc.exe");

        h.session.handle_bytes(b"CMD:2\n");

        assert_eq!(
            h.events.try_recv().ok(),
            Some(SessionEvent::CommandLaunched { slot: 2 })
        );
    }

    #[test]
    fn test_cmd_trims_command_text_before_running() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, command| command == "calc.exe")
            .times(1)
            .returning(|_, _| Ok(()));
        let mut h = harness(runner, temp_store("cmd_trim"));
        h.session
            .table_mut()
            .get_mut(0)
            .unwrap()
            .assign_command("  calc.exe  ");

        h.session.handle_bytes(b"CMD:0\n");
    }

    #[test]
    fn test_cmd_failure_surfaces_command_failed() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(|_, command| {
            Err(crate::infrastructure::command_exec::CommandError::Spawn {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no shell"),
            })
        });
        let mut h = harness(runner, temp_store("cmd_fail"));
        h.session.table_mut().get_mut(1).unwrap().assign_command("nope");

        h.session.handle_bytes(b"CMD:1\n");

        match h.events.try_recv() {
            Ok(SessionEvent::CommandFailed { slot: 1, error }) => {
                assert!(error.contains("nope"));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_cmd_ignores_non_command_slots_and_bad_indices() {
        // No expectations: the runner must never be called.
        let mut h = harness(MockCommandRunner::new(), temp_store("cmd_ignore"));
        h.session.table_mut().get_mut(3).unwrap().assign_command("   ");

        h.session.handle_bytes(b"CMD:0\n"); // Unassigned slot
        h.session.handle_bytes(b"CMD:3\n"); // blank command text
        h.session.handle_bytes(b"CMD:13\n"); // out of range
        h.session.handle_bytes(b"CMD:-1\n"); // negative

        assert!(h.events.try_recv().is_err());
    }

    // ── Media push plumbing ──────────────────────────────────────────────

    #[test]
    fn test_tick_writes_song_info_line() {
        let mut h = harness(MockCommandRunner::new(), temp_store("tick"));

        h.session.handle_tick(song("Test Song"), Instant::now());

        assert_eq!(
            h.outbound.try_recv().ok().as_deref(),
            Some("SONG_INFO:Test Song,1,0,60000")
        );
        assert!(h.session.ack_deadline().is_some());
    }

    #[test]
    fn test_tick_after_transport_close_degrades_to_timeout() {
        let mut h = harness(MockCommandRunner::new(), temp_store("tick_closed"));
        // Simulate the write task dying.
        h.outbound.close();

        h.session.handle_tick(song("Test Song"), Instant::now());

        // The push could not be written, so nothing stays pending and the
        // payload will be retried after reconnect.
        assert_eq!(h.session.ack_deadline(), None);
    }

    #[test]
    fn test_ack_timeout_allows_retry_of_same_payload() {
        let mut h = harness(MockCommandRunner::new(), temp_store("timeout_retry"));
        let now = Instant::now();
        h.session.handle_tick(song("A"), now);
        h.outbound.try_recv().expect("first push");

        h.session.handle_ack_timeout();
        h.session.handle_tick(song("A"), now);

        assert_eq!(h.outbound.try_recv().ok().as_deref(), Some("SONG_INFO:A,1,0,60000"));
    }

    // ── Config push and persistence ──────────────────────────────────────

    #[test]
    fn test_request_config_sends_get_config() {
        let mut h = harness(MockCommandRunner::new(), temp_store("get"));
        h.session.request_config();
        assert_eq!(h.outbound.try_recv().ok().as_deref(), Some("GET_CONFIG"));
    }

    #[test]
    fn test_push_config_sends_line_and_saves_commands() {
        let store = temp_store("push");
        let store_clone = store.clone();
        let mut h = harness(MockCommandRunner::new(), store);
        h.session
            .table_mut()
            .get_mut(12)
            .unwrap()
            .assign_command("notepad.exe");

        h.session.push_config();

        let line = h.outbound.try_recv().expect("SET_CONFIG line");
        assert!(line.starts_with("SET_CONFIG:"));
        assert!(!line.contains("notepad"));

        let saved = store_clone.load().expect("load saved map");
        assert_eq!(saved.get(&12).map(String::as_str), Some("notepad.exe"));

        if let Some(dir) = store_clone.path().parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_new_session_attaches_persisted_command_text() {
        let store = temp_store("load_text");
        store.save([(4u8, "mpv file.mkv")].into_iter()).expect("seed");

        let h = harness(MockCommandRunner::new(), store.clone());

        // The text is attached but the slot stays Unassigned until the
        // device reports kind 3 for it.
        let slot = h.session.table().get(4).unwrap();
        assert_eq!(slot.kind(), AssignmentKind::Unassigned);
        assert_eq!(slot.command_text(), Some("mpv file.mkv"));

        if let Some(dir) = store.path().parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    // ── Disconnect ───────────────────────────────────────────────────────

    #[test]
    fn test_disconnect_abandons_push_and_partial_line() {
        let mut h = harness(MockCommandRunner::new(), temp_store("disco"));
        h.session.handle_tick(song("A"), Instant::now());
        h.session.handle_bytes(b"CONF"); // partial line buffered

        h.session.handle_disconnect();

        assert_eq!(h.session.ack_deadline(), None);
        // The dropped tail must not corrupt the next line.
        h.session.handle_bytes(b"OK\n");
        assert_eq!(h.events.try_recv().ok(), Some(SessionEvent::ConfigWritten));
    }
}
